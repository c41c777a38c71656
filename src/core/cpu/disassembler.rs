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

//! MIPS instruction disassembler
//!
//! Purely diagnostic: turns an [`Instruction`] into its assembly mnemonic so
//! a fatal [`crate::core::error::UnhandledError`] or reserved-instruction
//! exception can be logged with something a reader can act on, instead of a
//! bare hex word. Never consulted by `Cpu::step` itself.

use crate::core::instruction::Instruction;

/// Stateless instruction-to-mnemonic formatter.
pub struct Disassembler;

impl Disassembler {
    /// Disassemble `instr`, fetched from `pc`, to a single assembly line.
    /// `pc` is only needed to resolve J/JAL's absolute target.
    ///
    /// # Example
    ///
    /// ```
    /// use psx_core::core::cpu::disassembler::Disassembler;
    /// use psx_core::core::instruction::Instruction;
    ///
    /// let line = Disassembler::disassemble(Instruction(0x3C01_1234), 0xBFC0_0000);
    /// assert_eq!(line, "lui r1, 0x1234");
    /// ```
    pub fn disassemble(instr: Instruction, pc: u32) -> String {
        let (s, t, d, imm) = (instr.s(), instr.t(), instr.d(), instr.imm());

        match instr.op() {
            0x00 => Self::disasm_special(instr),
            0x01 => Self::disasm_bcondz(instr),
            0x02 => format!("j 0x{:08X}", Self::jump_target(instr, pc)),
            0x03 => format!("jal 0x{:08X}", Self::jump_target(instr, pc)),
            0x04 => format!("beq r{s}, r{t}, {}", instr.imm_se() as i32),
            0x05 => format!("bne r{s}, r{t}, {}", instr.imm_se() as i32),
            0x06 => format!("blez r{s}, {}", instr.imm_se() as i32),
            0x07 => format!("bgtz r{s}, {}", instr.imm_se() as i32),
            0x08 => format!("addi r{t}, r{s}, {}", instr.imm_se() as i32),
            0x09 => format!("addiu r{t}, r{s}, {}", instr.imm_se() as i32),
            0x0A => format!("slti r{t}, r{s}, {}", instr.imm_se() as i32),
            0x0B => format!("sltiu r{t}, r{s}, {}", instr.imm_se() as i32),
            0x0C => format!("andi r{t}, r{s}, 0x{imm:04X}"),
            0x0D => format!("ori r{t}, r{s}, 0x{imm:04X}"),
            0x0E => format!("xori r{t}, r{s}, 0x{imm:04X}"),
            0x0F => format!("lui r{t}, 0x{imm:04X}"),
            0x10 => Self::disasm_cop0(instr),
            0x20 => format!("lb r{t}, {}(r{s})", instr.imm_se() as i32),
            0x21 => format!("lh r{t}, {}(r{s})", instr.imm_se() as i32),
            0x22 => format!("lwl r{t}, {}(r{s})", instr.imm_se() as i32),
            0x23 => format!("lw r{t}, {}(r{s})", instr.imm_se() as i32),
            0x24 => format!("lbu r{t}, {}(r{s})", instr.imm_se() as i32),
            0x25 => format!("lhu r{t}, {}(r{s})", instr.imm_se() as i32),
            0x26 => format!("lwr r{t}, {}(r{s})", instr.imm_se() as i32),
            0x28 => format!("sb r{t}, {}(r{s})", instr.imm_se() as i32),
            0x29 => format!("sh r{t}, {}(r{s})", instr.imm_se() as i32),
            0x2A => format!("swl r{t}, {}(r{s})", instr.imm_se() as i32),
            0x2B => format!("sw r{t}, {}(r{s})", instr.imm_se() as i32),
            0x2E => format!("swr r{t}, {}(r{s})", instr.imm_se() as i32),
            0x11 | 0x12 | 0x13 | 0x30 | 0x32 | 0x38 | 0x3A => {
                format!("cop{} 0x{:08X}", instr.op() & 0x03, instr.0)
            }
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }

    fn jump_target(instr: Instruction, pc: u32) -> u32 {
        (pc & 0xF000_0000) | (instr.imm_jump() << 2)
    }

    fn disasm_special(instr: Instruction) -> String {
        let (s, t, d, shift) = (instr.s(), instr.t(), instr.d(), instr.shift());

        match instr.subop() {
            0x00 if instr.0 == 0 => "nop".to_string(),
            0x00 => format!("sll r{d}, r{t}, {shift}"),
            0x02 => format!("srl r{d}, r{t}, {shift}"),
            0x03 => format!("sra r{d}, r{t}, {shift}"),
            0x04 => format!("sllv r{d}, r{t}, r{s}"),
            0x06 => format!("srlv r{d}, r{t}, r{s}"),
            0x07 => format!("srav r{d}, r{t}, r{s}"),
            0x08 => format!("jr r{s}"),
            0x09 if d == 31 => format!("jalr r{s}"),
            0x09 => format!("jalr r{d}, r{s}"),
            0x0C => "syscall".to_string(),
            0x0D => "break".to_string(),
            0x10 => format!("mfhi r{d}"),
            0x11 => format!("mthi r{s}"),
            0x12 => format!("mflo r{d}"),
            0x13 => format!("mtlo r{s}"),
            0x18 => format!("mult r{s}, r{t}"),
            0x19 => format!("multu r{s}, r{t}"),
            0x1A => format!("div r{s}, r{t}"),
            0x1B => format!("divu r{s}, r{t}"),
            0x20 => format!("add r{d}, r{s}, r{t}"),
            0x21 => format!("addu r{d}, r{s}, r{t}"),
            0x22 => format!("sub r{d}, r{s}, r{t}"),
            0x23 => format!("subu r{d}, r{s}, r{t}"),
            0x24 => format!("and r{d}, r{s}, r{t}"),
            0x25 => format!("or r{d}, r{s}, r{t}"),
            0x26 => format!("xor r{d}, r{s}, r{t}"),
            0x27 => format!("nor r{d}, r{s}, r{t}"),
            0x2A => format!("slt r{d}, r{s}, r{t}"),
            0x2B => format!("sltu r{d}, r{s}, r{t}"),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }

    /// BLTZ/BGEZ/BLTZAL/BGEZAL, distinguished by `rt` rather than a funct
    /// field — see [`Cpu::op_bcondz`](crate::core::cpu::Cpu::op_bcondz).
    fn disasm_bcondz(instr: Instruction) -> String {
        let s = instr.s();
        let imm = instr.imm_se() as i32;

        match instr.t() {
            0x00 => format!("bltz r{s}, {imm}"),
            0x01 => format!("bgez r{s}, {imm}"),
            0x10 => format!("bltzal r{s}, {imm}"),
            0x11 => format!("bgezal r{s}, {imm}"),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }

    fn disasm_cop0(instr: Instruction) -> String {
        let (t, d) = (instr.t(), instr.d());

        match instr.s() {
            0x00 => format!("mfc0 r{t}, cop0r{d}"),
            0x04 => format!("mtc0 r{t}, cop0r{d}"),
            0x10 if instr.subop() == 0x10 => "rfe".to_string(),
            _ => format!("??? 0x{:08X}", instr.0),
        }
    }
}
