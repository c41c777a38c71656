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

//! HI/LO multiply and divide unit
//!
//! MULT/DIV and friends write HI/LO directly rather than through the
//! `out_reg` shadow file — HI/LO aren't general-purpose registers, and
//! real hardware doesn't make them visible to the very next instruction
//! either (a stall the instruction scheduler is expected to know about).
//! This core skips modeling that stall and just writes them immediately.

use crate::core::cpu::Cpu;
use crate::core::instruction::Instruction;

impl Cpu {
    pub fn op_mfhi(&mut self, i: Instruction) {
        self.set_reg(i.d(), self.hi);
    }

    pub fn op_mthi(&mut self, i: Instruction) {
        self.hi = self.reg(i.s());
    }

    pub fn op_mflo(&mut self, i: Instruction) {
        self.set_reg(i.d(), self.lo);
    }

    pub fn op_mtlo(&mut self, i: Instruction) {
        self.lo = self.reg(i.s());
    }

    pub fn op_mult(&mut self, i: Instruction) {
        let s = self.reg(i.s()) as i32 as i64;
        let t = self.reg(i.t()) as i32 as i64;
        let v = (s * t) as u64;
        self.hi = (v >> 32) as u32;
        self.lo = v as u32;
    }

    pub fn op_multu(&mut self, i: Instruction) {
        let v = self.reg(i.s()) as u64 * self.reg(i.t()) as u64;
        self.hi = (v >> 32) as u32;
        self.lo = v as u32;
    }

    /// DIV rs, rt — signed divide. Division by zero and the
    /// `i32::MIN / -1` overflow case both follow the R3000A's documented
    /// (not trapped) results rather than panicking.
    pub fn op_div(&mut self, i: Instruction) {
        let n = self.reg(i.s()) as i32;
        let d = self.reg(i.t()) as i32;

        if d == 0 {
            self.hi = n as u32;
            self.lo = if n >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if n == i32::MIN && d == -1 {
            self.hi = 0;
            self.lo = i32::MIN as u32;
        } else {
            self.hi = (n % d) as u32;
            self.lo = (n / d) as u32;
        }
    }

    /// DIVU rs, rt — unsigned divide; by zero leaves HI = dividend,
    /// LO = 0xFFFF_FFFF, matching hardware.
    pub fn op_divu(&mut self, i: Instruction) {
        let n = self.reg(i.s());
        let d = self.reg(i.t());

        if d == 0 {
            self.hi = n;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = n % d;
            self.lo = n / d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mult_sign_extends_operands() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, (-2i32) as u32);
        cpu.set_reg(2, 3);
        cpu.commit();
        cpu.op_mult(Instruction(0x0022_0018)); // MULT r1, r2
        assert_eq!(cpu.lo as i32, -6);
        assert_eq!(cpu.hi, 0xFFFF_FFFF);
    }

    #[test]
    fn div_by_zero_matches_hardware_contract() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, 7);
        cpu.set_reg(2, 0);
        cpu.commit();
        cpu.op_div(Instruction(0x0022_001A)); // DIV r1, r2
        assert_eq!(cpu.hi, 7);
        assert_eq!(cpu.lo, 0xFFFF_FFFF);
    }

    #[test]
    fn div_min_by_negative_one_does_not_panic() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, i32::MIN as u32);
        cpu.set_reg(2, (-1i32) as u32);
        cpu.commit();
        cpu.op_div(Instruction(0x0022_001A));
        assert_eq!(cpu.lo, i32::MIN as u32);
        assert_eq!(cpu.hi, 0);
    }

    #[test]
    fn divu_by_zero() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, 42);
        cpu.set_reg(2, 0);
        cpu.commit();
        cpu.op_divu(Instruction(0x0022_001B));
        assert_eq!(cpu.hi, 42);
        assert_eq!(cpu.lo, 0xFFFF_FFFF);
    }

    #[test]
    fn mfhi_mflo_read_back() {
        let mut cpu = Cpu::new();
        cpu.hi = 0x11;
        cpu.lo = 0x22;
        cpu.op_mfhi(Instruction(0x0000_3010)); // MFHI r6
        cpu.commit();
        assert_eq!(cpu.reg(6), 0x11);
        cpu.op_mflo(Instruction(0x0000_3812)); // MFLO r7
        cpu.commit();
        assert_eq!(cpu.reg(7), 0x22);
    }
}
