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

//! Signed/unsigned add and subtract

use crate::core::cpu::{Cpu, Exception};
use crate::core::instruction::Instruction;

impl Cpu {
    /// ADD rd, rs, rt — signed add, traps to [`Exception::Overflow`] instead
    /// of writing `rd` if the result doesn't fit in 32 signed bits.
    pub fn op_add(&mut self, i: Instruction) {
        let s = self.reg(i.s()) as i32;
        let t = self.reg(i.t()) as i32;
        match s.checked_add(t) {
            Some(v) => self.set_reg(i.d(), v as u32),
            None => self.exception(Exception::Overflow),
        }
    }

    /// ADDU rd, rs, rt — wrapping add, never traps.
    pub fn op_addu(&mut self, i: Instruction) {
        let v = self.reg(i.s()).wrapping_add(self.reg(i.t()));
        self.set_reg(i.d(), v);
    }

    /// ADDI rt, rs, imm — sign-extended immediate, traps on signed overflow.
    pub fn op_addi(&mut self, i: Instruction) {
        let s = self.reg(i.s()) as i32;
        let imm = i.imm_se() as i32;
        match s.checked_add(imm) {
            Some(v) => self.set_reg(i.t(), v as u32),
            None => self.exception(Exception::Overflow),
        }
    }

    /// ADDIU rt, rs, imm — wrapping, never traps (used by compilers even for
    /// unsigned-looking constant arithmetic, hence the name is misleading).
    pub fn op_addiu(&mut self, i: Instruction) {
        let v = self.reg(i.s()).wrapping_add(i.imm_se());
        self.set_reg(i.t(), v);
    }

    /// SUB rd, rs, rt — signed subtract, traps on overflow.
    pub fn op_sub(&mut self, i: Instruction) {
        let s = self.reg(i.s()) as i32;
        let t = self.reg(i.t()) as i32;
        match s.checked_sub(t) {
            Some(v) => self.set_reg(i.d(), v as u32),
            None => self.exception(Exception::Overflow),
        }
    }

    /// SUBU rd, rs, rt — wrapping, never traps.
    pub fn op_subu(&mut self, i: Instruction) {
        let v = self.reg(i.s()).wrapping_sub(self.reg(i.t()));
        self.set_reg(i.d(), v);
    }

    /// SLT rd, rs, rt — signed set-less-than: rd = 1 if rs < rt, else 0.
    pub fn op_slt(&mut self, i: Instruction) {
        let v = (self.reg(i.s()) as i32) < (self.reg(i.t()) as i32);
        self.set_reg(i.d(), v as u32);
    }

    /// SLTU rd, rs, rt — unsigned set-less-than.
    pub fn op_sltu(&mut self, i: Instruction) {
        let v = self.reg(i.s()) < self.reg(i.t());
        self.set_reg(i.d(), v as u32);
    }

    /// SLTI rt, rs, imm — signed set-less-than against a sign-extended
    /// immediate.
    pub fn op_slti(&mut self, i: Instruction) {
        let v = (self.reg(i.s()) as i32) < (i.imm_se() as i32);
        self.set_reg(i.t(), v as u32);
    }

    /// SLTIU rt, rs, imm — unsigned set-less-than; the immediate is still
    /// sign-extended before the unsigned comparison (per MIPS I).
    pub fn op_sltiu(&mut self, i: Instruction) {
        let v = self.reg(i.s()) < i.imm_se();
        self.set_reg(i.t(), v as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with_regs(s: u32, sval: u32, t: u32, tval: u32) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.set_reg(s, sval);
        cpu.set_reg(t, tval);
        cpu.commit();
        cpu
    }

    #[test]
    fn add_overflow_traps_and_discards_result() {
        let mut cpu = cpu_with_regs(1, i32::MAX as u32, 2, 1);
        let instr = Instruction(0x00221820); // ADD r3, r1, r2
        cpu.op_add(instr);
        cpu.commit();
        assert_eq!(cpu.reg(3), 0);
        assert_eq!((cpu.cause >> 2) & 0x1F, Exception::Overflow as u32);
    }

    #[test]
    fn addu_wraps_without_trapping() {
        let mut cpu = cpu_with_regs(1, u32::MAX, 2, 1);
        let instr = Instruction(0x00221821); // ADDU r3, r1, r2
        cpu.op_addu(instr);
        cpu.commit();
        assert_eq!(cpu.reg(3), 0);
    }

    #[test]
    fn addi_sign_extends_negative_immediate() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, 10);
        cpu.commit();
        let instr = Instruction(0x2022FFFF); // ADDI r2, r1, -1
        cpu.op_addi(instr);
        cpu.commit();
        assert_eq!(cpu.reg(2), 9);
    }

    #[test]
    fn sub_overflow_traps() {
        let mut cpu = cpu_with_regs(1, i32::MIN as u32, 2, 1);
        let instr = Instruction(0x00221822); // SUB r3, r1, r2
        cpu.op_sub(instr);
        cpu.commit();
        assert_eq!((cpu.cause >> 2) & 0x1F, Exception::Overflow as u32);
    }

    #[test]
    fn subu_wraps() {
        let mut cpu = cpu_with_regs(1, 0, 2, 1);
        let instr = Instruction(0x00221823); // SUBU r3, r1, r2
        cpu.op_subu(instr);
        cpu.commit();
        assert_eq!(cpu.reg(3), u32::MAX);
    }

    #[test]
    fn slt_compares_as_signed() {
        let mut cpu = cpu_with_regs(1, (-1i32) as u32, 2, 1);
        let instr = Instruction(0x0022182A); // SLT r3, r1, r2
        cpu.op_slt(instr);
        cpu.commit();
        assert_eq!(cpu.reg(3), 1);
    }

    #[test]
    fn sltu_compares_as_unsigned() {
        let mut cpu = cpu_with_regs(1, (-1i32) as u32, 2, 1);
        let instr = Instruction(0x0022182B); // SLTU r3, r1, r2
        cpu.op_sltu(instr);
        cpu.commit();
        assert_eq!(cpu.reg(3), 0);
    }

    #[test]
    fn slti_sign_extends_immediate() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, (-5i32) as u32);
        cpu.commit();
        let instr = Instruction(0x2822FFFF); // SLTI r2, r1, -1
        cpu.op_slti(instr);
        cpu.commit();
        assert_eq!(cpu.reg(2), 1);
    }

    #[test]
    fn sltiu_still_sign_extends_before_unsigned_compare() {
        let mut cpu = Cpu::new();
        cpu.set_reg(1, 5);
        cpu.commit();
        let instr = Instruction(0x2C22FFFF); // SLTIU r2, r1, -1 (as 0xFFFFFFFF)
        cpu.op_sltiu(instr);
        cpu.commit();
        assert_eq!(cpu.reg(2), 1);
    }
}
