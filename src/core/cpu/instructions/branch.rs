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

//! Conditional PC-relative branches
//!
//! Every branch here executes with a one-instruction delay slot: the branch
//! retargets `next_pc`, not `pc`, so the instruction already fetched for
//! this cycle's successor still runs before control actually jumps.

use crate::core::cpu::Cpu;
use crate::core::instruction::Instruction;

impl Cpu {
    /// Retarget the branch-delay slot's successor to `pc + (offset << 2)`,
    /// where `pc` is already the delay slot's own address (the CPU advances
    /// `pc`/`next_pc` before executing, so by the time a branch runs, `pc`
    /// points one instruction past the branch itself).
    fn branch(&mut self, offset: u32) {
        let offset = offset << 2;
        self.next_pc = self.pc.wrapping_add(offset);
        self.branch = true;
    }

    pub fn op_beq(&mut self, i: Instruction) {
        if self.reg(i.s()) == self.reg(i.t()) {
            self.branch(i.imm_se());
        }
    }

    pub fn op_bne(&mut self, i: Instruction) {
        if self.reg(i.s()) != self.reg(i.t()) {
            self.branch(i.imm_se());
        }
    }

    pub fn op_blez(&mut self, i: Instruction) {
        if (self.reg(i.s()) as i32) <= 0 {
            self.branch(i.imm_se());
        }
    }

    pub fn op_bgtz(&mut self, i: Instruction) {
        if (self.reg(i.s()) as i32) > 0 {
            self.branch(i.imm_se());
        }
    }

    /// BLTZ/BGEZ/BLTZAL/BGEZAL — selected by bits [0] and [4] of the `rt`
    /// field rather than by a distinct primary opcode. The "link" variants
    /// always write `$ra`, whether or not the branch itself is taken.
    pub fn op_bcondz(&mut self, i: Instruction) {
        let t = i.t();
        let test_ge = t & 1 != 0;
        let link = (t >> 4) & 1 != 0;

        let s = self.reg(i.s()) as i32;
        let taken = if test_ge { s >= 0 } else { s < 0 };

        if link {
            let return_addr = self.next_pc;
            self.set_reg(31, return_addr);
        }

        if taken {
            self.branch(i.imm_se());
        }
    }
}
