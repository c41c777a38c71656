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

//! Byte/halfword/word loads and stores
//!
//! The interconnect itself rejects a misaligned halfword/word access with
//! [`BusError::UnalignedAccess`]; every instruction here converts that into
//! the matching CPU exception rather than letting it escape, the same way
//! [`Cpu::step`](super::super::Cpu::step) handles a misaligned fetch.
//! LWL/LWR sidestep the alignment check entirely by rounding the address
//! down to the containing word themselves.

use crate::core::cpu::{Cpu, Exception};
use crate::core::error::{EmulatorError, Result};
use crate::core::instruction::Instruction;
use crate::core::memory::Interconnect;

impl Cpu {
    pub fn op_lb(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let value = bus.load8(addr)? as i8 as i32 as u32;
        self.set_load_delayed(i.t(), value);
        Ok(())
    }

    pub fn op_lbu(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let value = bus.load8(addr)? as u32;
        self.set_load_delayed(i.t(), value);
        Ok(())
    }

    pub fn op_lh(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        match bus.load16(addr) {
            Ok(v) => {
                self.set_load_delayed(i.t(), v as i16 as i32 as u32);
                Ok(())
            }
            Err(EmulatorError::Bus(_)) => {
                self.exception(Exception::LoadAddressError);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn op_lhu(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        match bus.load16(addr) {
            Ok(v) => {
                self.set_load_delayed(i.t(), v as u32);
                Ok(())
            }
            Err(EmulatorError::Bus(_)) => {
                self.exception(Exception::LoadAddressError);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn op_lw(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        match bus.load32(addr) {
            Ok(v) => {
                self.set_load_delayed(i.t(), v);
                Ok(())
            }
            Err(EmulatorError::Bus(_)) => {
                self.exception(Exception::LoadAddressError);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// LWL rt, offset(rs) — load the high-order bytes of an unaligned word,
    /// merged with the low-order bytes already present in `rt`. Merges
    /// against `out_reg[t]`, the value `rt` is about to hold at the end of
    /// this cycle, rather than its pre-cycle value — so an LWL immediately
    /// following another load into the same register sees that load's
    /// result instead of stepping on it.
    pub fn op_lwl(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let t = i.t();
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let aligned_word = bus.load32(addr & !3)?;
        let cur = self.out_reg[t as usize];

        let value = match addr & 3 {
            0 => (cur & 0x00FF_FFFF) | (aligned_word << 24),
            1 => (cur & 0x0000_FFFF) | (aligned_word << 16),
            2 => (cur & 0x0000_00FF) | (aligned_word << 8),
            3 => aligned_word,
            _ => unreachable!(),
        };
        self.set_load_delayed(t, value);
        Ok(())
    }

    /// LWR rt, offset(rs) — mirror of LWL for the low-order bytes.
    pub fn op_lwr(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        let t = i.t();
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let aligned_word = bus.load32(addr & !3)?;
        let cur = self.out_reg[t as usize];

        let value = match addr & 3 {
            0 => aligned_word,
            1 => (cur & 0xFF00_0000) | (aligned_word >> 8),
            2 => (cur & 0xFFFF_0000) | (aligned_word >> 16),
            3 => (cur & 0xFFFF_FF00) | (aligned_word >> 24),
            _ => unreachable!(),
        };
        self.set_load_delayed(t, value);
        Ok(())
    }

    pub fn op_sb(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        if self.cache_isolated() {
            return Ok(());
        }
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        bus.store8(addr, self.reg(i.t()) as u8)
    }

    pub fn op_sh(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        if self.cache_isolated() {
            return Ok(());
        }
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        match bus.store16(addr, self.reg(i.t()) as u16) {
            Ok(()) => Ok(()),
            Err(EmulatorError::Bus(_)) => {
                self.exception(Exception::StoreAddressError);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn op_sw(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        if self.cache_isolated() {
            return Ok(());
        }
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        match bus.store32(addr, self.reg(i.t())) {
            Ok(()) => Ok(()),
            Err(EmulatorError::Bus(_)) => {
                self.exception(Exception::StoreAddressError);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// SWL rt, offset(rs) — store the high-order bytes of `rt` into the
    /// low-order bytes of the containing word.
    pub fn op_swl(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        if self.cache_isolated() {
            return Ok(());
        }
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let aligned_addr = addr & !3;
        let cur = bus.load32(aligned_addr)?;
        let v = self.reg(i.t());

        let merged = match addr & 3 {
            0 => (cur & 0xFFFF_FF00) | (v >> 24),
            1 => (cur & 0xFFFF_0000) | (v >> 16),
            2 => (cur & 0xFF00_0000) | (v >> 8),
            3 => v,
            _ => unreachable!(),
        };
        bus.store32(aligned_addr, merged)
    }

    /// SWR rt, offset(rs) — mirror of SWL for the high-order bytes of the
    /// containing word.
    pub fn op_swr(&mut self, i: Instruction, bus: &mut Interconnect) -> Result<()> {
        if self.cache_isolated() {
            return Ok(());
        }
        let addr = self.reg(i.s()).wrapping_add(i.imm_se());
        let aligned_addr = addr & !3;
        let cur = bus.load32(aligned_addr)?;
        let v = self.reg(i.t());

        let merged = match addr & 3 {
            0 => v,
            1 => (cur & 0x0000_00FF) | (v << 8),
            2 => (cur & 0x0000_FFFF) | (v << 16),
            3 => (cur & 0x00FF_FFFF) | (v << 24),
            _ => unreachable!(),
        };
        bus.store32(aligned_addr, merged)
    }

    /// Stores are dropped on the floor while the data cache is isolated
    /// (`SR` bit 16) — the BIOS briefly isolates the cache to flush it by
    /// writing through what would otherwise be RAM.
    fn cache_isolated(&self) -> bool {
        self.sr & 0x1_0000 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::Bios;

    fn test_bus() -> Interconnect {
        use crate::core::memory::bios::BIOS_SIZE;
        Interconnect::new(Bios::from_bytes(&vec![0u8; BIOS_SIZE]).unwrap())
    }

    #[test]
    fn sw_then_lw_round_trips_through_ram() {
        let mut cpu = Cpu::new();
        let mut bus = test_bus();
        cpu.set_reg(1, 0); // base
        cpu.set_reg(2, 0xDEAD_BEEF);
        cpu.commit();

        cpu.op_sw(Instruction(0xAC22_0000), &mut bus).unwrap(); // SW r2, 0(r1)
        cpu.op_lw(Instruction(0x8C23_0000), &mut bus).unwrap(); // LW r3, 0(r1)
        let (t, v) = cpu.load;
        cpu.set_reg(t, v);
        cpu.commit();
        assert_eq!(cpu.reg(3), 0xDEAD_BEEF);
    }

    #[test]
    fn lh_unaligned_raises_load_address_error() {
        let mut cpu = Cpu::new();
        let mut bus = test_bus();
        cpu.set_reg(1, 1); // misaligned by construction
        cpu.commit();
        cpu.op_lh(Instruction(0x8422_0000), &mut bus).unwrap(); // LH r2, 0(r1)
        assert_eq!((cpu.cause >> 2) & 0x1F, Exception::LoadAddressError as u32);
    }

    #[test]
    fn sw_suppressed_when_cache_isolated() {
        let mut cpu = Cpu::new();
        let mut bus = test_bus();
        cpu.sr = 0x1_0000;
        cpu.set_reg(1, 0);
        cpu.set_reg(2, 0x1234);
        cpu.commit();

        cpu.op_sw(Instruction(0xAC22_0000), &mut bus).unwrap();
        assert_eq!(bus.load32(0).unwrap(), 0);
    }

    #[test]
    fn lwl_merges_high_bytes_with_in_flight_register_value() {
        let mut cpu = Cpu::new();
        let mut bus = test_bus();
        bus.store32(0, 0x1234_5678).unwrap();

        cpu.set_reg(1, 1); // base, so addr = 1 -> unaligned byte lane 1
        cpu.set_reg(2, 0xFFFF_FFFF);
        cpu.commit();

        cpu.op_lwl(Instruction(0x8822_0000), &mut bus).unwrap(); // LWL r2, 0(r1)
        let (t, v) = cpu.load;
        cpu.set_reg(t, v);
        cpu.commit();
        assert_eq!(cpu.reg(2), (0xFFFF_FFFFu32 & 0x0000_FFFF) | (0x1234_5678 << 16));
    }
}
