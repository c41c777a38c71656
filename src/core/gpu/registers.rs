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

//! GPU register enums
//!
//! Small closed sets decoded out of GP0/GP1 command words and packed back
//! into the status register. None of these carry rasterization behavior —
//! this core tracks register state only.

use crate::core::error::{Result, UnhandledError};

/// Texture color depth, GP0(0xE1) bits [8:7] and GPUSTAT bits [21:20].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDepth {
    T4Bit = 0,
    T8Bit = 1,
    T15Bit = 2,
}

impl TextureDepth {
    /// Bit pattern `3` is reserved on real hardware; this core has no
    /// defined behavior for it, so it's a fatal `InvalidTextureDepth`
    /// rather than a silent fallback (spec.md §7).
    pub fn from_bits(bits: u32) -> Result<TextureDepth> {
        match bits & 3 {
            0 => Ok(TextureDepth::T4Bit),
            1 => Ok(TextureDepth::T8Bit),
            2 => Ok(TextureDepth::T15Bit),
            _ => Err(UnhandledError::InvalidTextureDepth((bits & 3) as u8).into()),
        }
    }
}

/// Interlaced field currently being displayed, GPUSTAT bit 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Top = 1,
    Bottom = 0,
}

/// Horizontal display resolution, GP1(0x08) bits [1:0] and [6].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalRes(u8);

impl HorizontalRes {
    pub fn from_fields(hr1: u8, hr2: u8) -> HorizontalRes {
        HorizontalRes((hr2 & 1) | ((hr1 & 3) << 1))
    }

    /// The packed 3-bit field as stored in GPUSTAT bits [18:16].
    pub fn status_bits(self) -> u32 {
        self.0 as u32
    }
}

/// Vertical display resolution, GP1(0x08) bit [2].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRes {
    Y240 = 0,
    Y480 = 1,
}

/// Video timing standard, GP1(0x08) bit [3].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    Ntsc = 0,
    Pal = 1,
}

/// Display area color depth, GP1(0x08) bit [4].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDepth {
    D15Bits = 0,
    D24Bits = 1,
}

/// GP1(0x04) DMA direction, GPUSTAT bits [30:29].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    Off = 0,
    Fifo = 1,
    CpuToGp0 = 2,
    VRamToCpu = 3,
}

impl DmaDirection {
    pub fn from_bits(bits: u32) -> DmaDirection {
        match bits & 3 {
            0 => DmaDirection::Off,
            1 => DmaDirection::Fifo,
            2 => DmaDirection::CpuToGp0,
            _ => DmaDirection::VRamToCpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_depth_decodes_low_bits() {
        assert_eq!(TextureDepth::from_bits(0).unwrap(), TextureDepth::T4Bit);
        assert_eq!(TextureDepth::from_bits(1).unwrap(), TextureDepth::T8Bit);
        assert_eq!(TextureDepth::from_bits(2).unwrap(), TextureDepth::T15Bit);
    }

    #[test]
    fn texture_depth_reserved_bit_pattern_is_invalid() {
        assert!(TextureDepth::from_bits(3).is_err());
    }

    #[test]
    fn horizontal_res_packs_hr1_hr2() {
        let hr = HorizontalRes::from_fields(0b10, 1);
        assert_eq!(hr.status_bits(), 0b101);
    }

    #[test]
    fn dma_direction_decodes() {
        assert_eq!(DmaDirection::from_bits(0), DmaDirection::Off);
        assert_eq!(DmaDirection::from_bits(3), DmaDirection::VRamToCpu);
    }
}
