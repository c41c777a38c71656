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

//! Bitwise register/immediate operations

use crate::core::cpu::Cpu;
use crate::core::instruction::Instruction;

impl Cpu {
    pub fn op_and(&mut self, i: Instruction) {
        self.set_reg(i.d(), self.reg(i.s()) & self.reg(i.t()));
    }

    pub fn op_or(&mut self, i: Instruction) {
        self.set_reg(i.d(), self.reg(i.s()) | self.reg(i.t()));
    }

    pub fn op_xor(&mut self, i: Instruction) {
        self.set_reg(i.d(), self.reg(i.s()) ^ self.reg(i.t()));
    }

    pub fn op_nor(&mut self, i: Instruction) {
        self.set_reg(i.d(), !(self.reg(i.s()) | self.reg(i.t())));
    }

    /// ANDI rt, rs, imm — immediate is zero-extended, not sign-extended.
    pub fn op_andi(&mut self, i: Instruction) {
        self.set_reg(i.t(), self.reg(i.s()) & i.imm());
    }

    pub fn op_ori(&mut self, i: Instruction) {
        self.set_reg(i.t(), self.reg(i.s()) | i.imm());
    }

    pub fn op_xori(&mut self, i: Instruction) {
        self.set_reg(i.t(), self.reg(i.s()) ^ i.imm());
    }

    /// LUI rt, imm — loads `imm` into the upper halfword, zeroing the rest.
    /// Paired with ORI to build arbitrary 32-bit constants.
    pub fn op_lui(&mut self, i: Instruction) {
        self.set_reg(i.t(), i.imm() << 16);
    }
}
