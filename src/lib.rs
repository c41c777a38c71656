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

//! psx-core: the emulated-machine core of a PlayStation emulator
//!
//! This crate provides the CPU, COP0, memory interconnect, DMA controller
//! and GPU register/command state machine. It does not draw pixels, play
//! audio, read discs or poll a controller — those are external collaborators
//! wired in above this crate.
//!
//! # Architecture
//!
//! - [`core::cpu`]: MIPS R3000A-compatible CPU, decode/execute, exceptions
//! - [`core::memory`]: BIOS/RAM buffers and the address-decoding interconnect
//! - [`core::dma`]: the 7-channel DMA controller
//! - [`core::gpu`]: GPU register state and the GP0/GP1 command machine
//! - [`core::system`]: ties CPU + interconnect together into a steppable machine
//!
//! # Example
//!
//! ```no_run
//! use psx_core::core::system::System;
//! use psx_core::core::memory::Bios;
//!
//! let bios = Bios::from_file("SCPH1001.BIN")?;
//! let mut system = System::new(bios);
//! system.step()?;
//! # Ok::<(), psx_core::EmulatorError>(())
//! ```

pub mod core;

pub use core::error::{EmulatorError, Result};
