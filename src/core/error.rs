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

//! Error taxonomy for the emulator core
//!
//! Everything the real hardware defines (load/store address errors, syscall,
//! breakpoint, illegal instruction, coprocessor errors, overflow) is recovered
//! locally as a CPU exception and never surfaces here. A read or write to a
//! device region with no handler at all is logged and treated as a no-op
//! (reads as 0, writes discarded) rather than raised here — it's routine on
//! real hardware for an unmapped address to simply float. What remains are
//! the handful of conditions the real hardware has no routine response to: a
//! BIOS image of the wrong size, and GPU/DMA commands this core has not (yet)
//! implemented.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Top-level error type for the emulator core.
///
/// Every variant here is a condition the real hardware would never produce
/// mid-run: a bad BIOS image at load time, or an emulator gap (a GPU opcode
/// or DMA port this core has not implemented). Per spec §7, these abort the
/// emulator with a diagnostic rather than silently mis-emulating.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// BIOS image was not exactly 512 KiB.
    #[error("incorrect BIOS size: expected {expected} bytes, got {actual} bytes")]
    IncorrectBiosSize {
        /// Required size in bytes (524,288).
        expected: usize,
        /// Actual size of the file that was loaded.
        actual: usize,
    },

    /// I/O failure while loading a BIOS image from disk.
    #[error("failed to read BIOS file: {0}")]
    BiosIo(#[from] std::io::Error),

    /// Interconnect access that can never succeed the way it was issued.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// GPU/DMA command or configuration this core has no handler for.
    #[error(transparent)]
    Unhandled(#[from] UnhandledError),
}

/// Interconnect-level access errors.
///
/// `UnalignedAccess` is recoverable: when it originates from a CPU memory
/// opcode the caller converts it into a `LoadAddressError`/
/// `StoreAddressError` CPU exception rather than propagating it further
/// (spec §7). It only escapes to the top level when raised outside of CPU
/// instruction execution (e.g. by a DMA block transfer walking RAM offsets
/// it computed itself, which should never be misaligned, but which is not
/// silently trusted either).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Access address was not a multiple of the access width.
    #[error("unaligned access: address 0x{address:08X} is not a multiple of {width}")]
    UnalignedAccess {
        /// The address that was accessed.
        address: u32,
        /// The required alignment (2 or 4 bytes).
        width: u32,
    },
}

/// Fatal "not implemented" conditions.
///
/// All of these are programming gaps in the emulator, not hardware
/// conditions — they abort the run with a diagnostic instead of guessing at
/// behavior (spec §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnhandledError {
    /// GP0 opcode with no dispatch entry.
    #[error("unhandled GP0 command: 0x{opcode:02X}")]
    UnhandledGp0 {
        /// The opcode (top byte of the command word).
        opcode: u8,
    },

    /// GP1 opcode with no dispatch entry.
    #[error("unhandled GP1 command: 0x{opcode:02X}")]
    UnhandledGp1 {
        /// The opcode (low byte of the command word).
        opcode: u8,
    },

    /// DMA port/direction combination this core does not implement.
    #[error("unhandled DMA transfer on port {port:?} direction {direction:?}")]
    UnhandledDma {
        /// The port the transfer was attempted on.
        port: crate::core::dma::Port,
        /// The transfer direction.
        direction: crate::core::dma::Direction,
    },

    /// GP0 0xE1 draw-mode write with an invalid texture depth field.
    #[error("invalid texture depth: {0}")]
    InvalidTextureDepth(u8),

    /// MTC0 wrote a nonzero value to a COP0 register this core does not
    /// model (the breakpoint/debug registers, or CAUSE).
    #[error("unhandled MTC0 write: cop0r{register} = 0x{value:08X}")]
    UnhandledCop0Write {
        /// The COP0 register index (`rd` field of the MTC0 instruction).
        register: u32,
        /// The value that was about to be written.
        value: u32,
    },

    /// COP2 (GTE) instruction or LWC2/SWC2 transfer: no GTE model exists.
    #[error("unhandled COP2 instruction: 0x{word:08X}")]
    UnhandledCop2 {
        /// The raw instruction word.
        word: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorrect_bios_size_message() {
        let err = EmulatorError::IncorrectBiosSize {
            expected: 524_288,
            actual: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("524288"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn unhandled_cop0_write_message() {
        let err = UnhandledError::UnhandledCop0Write {
            register: 3,
            value: 0xFF,
        };
        assert!(err.to_string().contains("cop0r3"));
    }

    #[test]
    fn bus_error_converts_into_emulator_error() {
        let bus = BusError::UnalignedAccess {
            address: 0x1001,
            width: 4,
        };
        let err: EmulatorError = bus.into();
        assert!(matches!(err, EmulatorError::Bus(_)));
    }
}
