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

//! BIOS ROM buffer
//!
//! A fixed-size, read-only, little-endian byte array. The interconnect
//! guarantees offsets passed here are already inside the 512 KiB window, so
//! this layer has no bounds-check errors of its own.

use crate::core::error::{EmulatorError, Result};
use std::path::Path;

/// Size of a PlayStation BIOS image in bytes (512 KiB).
pub const BIOS_SIZE: usize = 512 * 1024;

/// Immutable BIOS ROM image.
pub struct Bios {
    data: Box<[u8; BIOS_SIZE]>,
}

impl Bios {
    /// Load a BIOS image from a byte buffer already read into memory.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::IncorrectBiosSize`] if `data` is not exactly
    /// [`BIOS_SIZE`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != BIOS_SIZE {
            return Err(EmulatorError::IncorrectBiosSize {
                expected: BIOS_SIZE,
                actual: data.len(),
            });
        }

        let mut boxed = Box::new([0u8; BIOS_SIZE]);
        boxed.copy_from_slice(data);
        Ok(Self { data: boxed })
    }

    /// Load a BIOS image from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::BiosIo`] if the file cannot be read, or
    /// [`EmulatorError::IncorrectBiosSize`] if its size is not exactly
    /// [`BIOS_SIZE`] bytes.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Fetch the byte at `offset`.
    #[inline]
    pub fn load8(&self, offset: u32) -> u8 {
        self.data[offset as usize]
    }

    /// Fetch the little-endian halfword at `offset`.
    ///
    /// `offset` must be 2-byte aligned; the interconnect enforces this
    /// before routing here.
    #[inline]
    pub fn load16(&self, offset: u32) -> u16 {
        let o = offset as usize;
        u16::from_le_bytes([self.data[o], self.data[o + 1]])
    }

    /// Fetch the little-endian word at `offset`.
    ///
    /// `offset` must be 4-byte aligned; the interconnect enforces this
    /// before routing here.
    #[inline]
    pub fn load32(&self, offset: u32) -> u32 {
        let o = offset as usize;
        u32::from_le_bytes([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> Vec<u8> {
        let mut data = vec![0u8; BIOS_SIZE];
        data[0] = 0x11;
        data[1] = 0x22;
        data[2] = 0x33;
        data[3] = 0x44;
        data
    }

    #[test]
    fn rejects_wrong_size() {
        let err = Bios::from_bytes(&[0u8; 100]).unwrap_err();
        assert!(matches!(
            err,
            EmulatorError::IncorrectBiosSize {
                expected: BIOS_SIZE,
                actual: 100
            }
        ));
    }

    #[test]
    fn accepts_exact_size() {
        assert!(Bios::from_bytes(&sample_image()).is_ok());
    }

    #[test]
    fn little_endian_word_load() {
        let bios = Bios::from_bytes(&sample_image()).unwrap();
        assert_eq!(bios.load32(0), 0x4433_2211);
    }

    #[test]
    fn little_endian_halfword_load() {
        let bios = Bios::from_bytes(&sample_image()).unwrap();
        assert_eq!(bios.load16(0), 0x2211);
        assert_eq!(bios.load16(2), 0x4433);
    }

    #[test]
    fn byte_load() {
        let bios = Bios::from_bytes(&sample_image()).unwrap();
        assert_eq!(bios.load8(0), 0x11);
        assert_eq!(bios.load8(3), 0x44);
    }

    #[test]
    fn from_file_reports_size_mismatch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        file.write_all(&[0u8; 123]).unwrap();
        let err = Bios::from_file(file.path()).unwrap_err();
        assert!(matches!(err, EmulatorError::IncorrectBiosSize { .. }));
    }
}
