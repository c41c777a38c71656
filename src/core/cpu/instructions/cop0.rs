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

//! Coprocessor 0 (System Control) instructions
//!
//! This core only models three of COP0's sixteen registers — SR (12), CAUSE
//! (13) and EPC (14) — the ones software actually reads for interrupt
//! masking and exception diagnosis. The rest are the breakpoint/debug
//! registers real BIOS and game code never touch; a zero write to them is a
//! harmless no-op, but a nonzero write means something is trying to use
//! hardware this core doesn't implement, so it's treated as unhandled
//! rather than silently discarded.

use crate::core::cpu::Cpu;
use crate::core::error::{Result, UnhandledError};
use crate::core::instruction::Instruction;

/// COP0 registers that fail on a nonzero MTC0 write (breakpoint/debug
/// registers with no modeled behavior). CAUSE is handled alongside these:
/// it's otherwise CPU-owned and not meant to be rewritten by software.
const RESTRICTED_WRITE_REGISTERS: [u32; 7] = [3, 5, 6, 7, 9, 11, 13];

impl Cpu {
    /// Dispatch a COP0 (opcode `0x10`) instruction by its `rs` field: `0x00`
    /// MFC0, `0x04` MTC0, `0x10` the "CO" class (only RFE is modeled here).
    pub fn op_cop0(&mut self, i: Instruction) -> Result<()> {
        match i.s() {
            0x00 => {
                self.op_mfc0(i);
                Ok(())
            }
            0x04 => self.op_mtc0(i),
            0x10 => {
                if i.subop() == 0x10 {
                    self.op_rfe();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// MFC0 rt, rd — read a COP0 register into a general register, through
    /// the ordinary load-delay slot (hardware treats this like any other
    /// load).
    fn op_mfc0(&mut self, i: Instruction) {
        let value = match i.d() {
            12 => self.sr,
            13 => self.cause,
            14 => self.epc,
            _ => 0,
        };
        self.set_load_delayed(i.t(), value);
    }

    /// MTC0 rt, rd — write a general register into a COP0 register. SR and
    /// EPC accept any value; everything else only accepts zero, and
    /// rejects a nonzero write as unhandled.
    fn op_mtc0(&mut self, i: Instruction) -> Result<()> {
        let register = i.d();
        let value = self.reg(i.t());

        match register {
            12 => {
                self.sr = value;
                Ok(())
            }
            14 => {
                self.epc = value;
                Ok(())
            }
            r if RESTRICTED_WRITE_REGISTERS.contains(&r) => {
                if value == 0 {
                    Ok(())
                } else {
                    Err(UnhandledError::UnhandledCop0Write { register, value }.into())
                }
            }
            _ => Ok(()),
        }
    }

    /// RFE — return from exception, restoring the pre-exception KU/IE mode.
    fn op_rfe(&mut self) {
        self.return_from_exception();
    }
}
