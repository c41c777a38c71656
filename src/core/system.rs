// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Top-level machine: ties the CPU to its interconnect
//!
//! Unlike a full console build, this core has no CD-ROM, SPU, controller
//! ports or timers sharing the bus, so there is no need for the
//! `Rc<RefCell<_>>` web a complete emulator uses to let several owners reach
//! the same device. `System` just owns a [`Cpu`] and an [`Interconnect`]
//! outright and lends the interconnect to the CPU for the duration of a
//! single step.

use crate::core::cpu::Cpu;
use crate::core::error::Result;
use crate::core::memory::{Bios, Interconnect};

/// The emulated machine: one CPU stepping against one interconnect.
pub struct System {
    cpu: Cpu,
    interconnect: Interconnect,
}

impl System {
    /// Build a fresh machine around `bios`, with RAM, DMA and the GPU all at
    /// their power-on reset state.
    pub fn new(bios: Bios) -> Self {
        Self {
            cpu: Cpu::new(),
            interconnect: Interconnect::new(bios),
        }
    }

    /// Run one CPU fetch/decode/execute cycle.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::core::error::EmulatorError`] the interconnect
    /// raises for a condition this core has no defined response to (see
    /// [`Cpu::step`]).
    pub fn step(&mut self) -> Result<()> {
        self.cpu.step(&mut self.interconnect)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn interconnect(&self) -> &Interconnect {
        &self.interconnect
    }
}
