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

//! Unconditional jumps
//!
//! Like the conditional branches, every jump here retargets `next_pc` and
//! sets `branch`, taking effect after the delay slot runs.

use crate::core::cpu::Cpu;
use crate::core::instruction::Instruction;

impl Cpu {
    /// J target — PC = (pc & 0xF000_0000) | (target << 2). `pc` here is
    /// already the delay slot's address, matching the branch opcodes.
    pub fn op_j(&mut self, i: Instruction) {
        let pc_high = self.pc & 0xF000_0000;
        self.next_pc = pc_high | (i.imm_jump() << 2);
        self.branch = true;
    }

    /// JAL target — as J, but links the return address ($ra = next_pc,
    /// the instruction after the delay slot) before retargeting.
    pub fn op_jal(&mut self, i: Instruction) {
        self.set_reg(31, self.next_pc);
        self.op_j(i);
    }

    /// JR rs — PC = rs.
    pub fn op_jr(&mut self, i: Instruction) {
        self.next_pc = self.reg(i.s());
        self.branch = true;
    }

    /// JALR rs, rd — as JR, but links the return address into an
    /// explicit destination register rather than always $ra.
    pub fn op_jalr(&mut self, i: Instruction) {
        let return_addr = self.next_pc;
        self.next_pc = self.reg(i.s());
        self.set_reg(i.d(), return_addr);
        self.branch = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j_keeps_top_four_bits_of_pc() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x8000_0004;
        cpu.op_j(Instruction(0x0800_0004)); // J 0x10
        assert!(cpu.branch);
        assert_eq!(cpu.next_pc, 0x8000_0010);
    }

    #[test]
    fn jal_links_return_address_after_delay_slot() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x8000_0004;
        cpu.next_pc = 0x8000_0008;
        cpu.op_jal(Instruction(0x0C00_0004)); // JAL 0x10
        cpu.commit();
        assert_eq!(cpu.reg(31), 0x8000_0008);
        assert_eq!(cpu.next_pc, 0x8000_0010);
    }

    #[test]
    fn jr_jumps_to_register_value() {
        let mut cpu = Cpu::new();
        cpu.set_reg(8, 0x1234_5678);
        cpu.commit();
        cpu.op_jr(Instruction(0x0100_0008)); // JR r8
        assert!(cpu.branch);
        assert_eq!(cpu.next_pc, 0x1234_5678);
    }

    #[test]
    fn jalr_links_into_explicit_destination_register() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x8000_0004;
        cpu.next_pc = 0x8000_0008;
        cpu.set_reg(8, 0x1234_5678);
        cpu.commit();
        cpu.op_jalr(Instruction(0x0100_4809)); // JALR r8, r9
        cpu.commit();
        assert_eq!(cpu.reg(9), 0x8000_0008);
        assert_eq!(cpu.next_pc, 0x1234_5678);
    }
}
