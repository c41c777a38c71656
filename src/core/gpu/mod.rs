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

//! GPU register and command-state model
//!
//! Tracks everything software can observe through GPUSTAT and GPUREAD:
//! drawing-mode fields, the drawing area/offset, the display configuration,
//! and the GP0 command FIFO state machine. No rasterization happens here —
//! [`RenderSink`] is the hook a frontend would use to turn GP0 draw
//! commands into pixels.

pub mod command_buffer;
pub mod registers;

use command_buffer::CommandBuffer;
use registers::{DisplayDepth, DmaDirection, Field, HorizontalRes, TextureDepth, VerticalRes, VideoMode};

use crate::core::error::{Result, UnhandledError};

/// What the GP0 FIFO is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gp0Mode {
    /// Waiting for / accumulating a draw or attribute command's words.
    Command,
    /// Streaming pixel data into (or out of) VRAM via CPU<->GP0 access.
    ImageLoad,
}

/// A sink a frontend can implement to observe draw commands and VRAM
/// transfers. The core never rasterizes; it only reports what happened.
pub trait RenderSink {
    /// A full draw command has been decoded (opcode plus its raw words).
    fn draw_command(&mut self, _opcode: u8, _words: &[u32]) {}
    /// GP0 image-load data streamed in (CPU/DMA to VRAM).
    fn vram_store(&mut self, _words: &[u32]) {}
    /// The display mode or drawing area changed.
    fn display_changed(&mut self) {}
}

/// No-op sink used when nothing is attached.
#[derive(Default)]
pub struct NullSink;
impl RenderSink for NullSink {}

pub struct Gpu {
    page_base_x: u8,
    page_base_y: u8,
    semi_transparency: u8,
    texture_depth: TextureDepth,
    dithering: bool,
    draw_to_display: bool,
    force_set_mask_bit: bool,
    preserve_masked_pixels: bool,
    field: Field,
    texture_disable: bool,
    hres: HorizontalRes,
    vres: VerticalRes,
    vmode: VideoMode,
    display_depth: DisplayDepth,
    interlaced: bool,
    display_disabled: bool,
    interrupt: bool,
    dma_direction: DmaDirection,

    rectangle_texture_x_flip: bool,
    rectangle_texture_y_flip: bool,
    texture_window_x_mask: u8,
    texture_window_y_mask: u8,
    texture_window_x_offset: u8,
    texture_window_y_offset: u8,
    drawing_area_left: u16,
    drawing_area_top: u16,
    drawing_area_right: u16,
    drawing_area_bottom: u16,
    drawing_x_offset: i16,
    drawing_y_offset: i16,
    display_vram_x_start: u16,
    display_vram_y_start: u16,
    display_horiz_start: u16,
    display_horiz_end: u16,
    display_line_start: u16,
    display_line_end: u16,

    gp0_mode: Gp0Mode,
    command_buffer: CommandBuffer,
    gp0_words_remaining: u32,
    /// `None` until the first word of a multi-word command has been seen.
    gp0_command_opcode: Option<u8>,
    /// Pixel payload accumulated while `gp0_mode` is `ImageLoad`. A real
    /// image upload (e.g. a 16x16 texture is already 128 words) blows past
    /// the 12-word command FIFO, so this is a separate growable buffer, not
    /// `command_buffer`.
    image_load_buffer: Vec<u32>,

    read_word: u32,
}

impl Gpu {
    pub fn new() -> Self {
        Self {
            page_base_x: 0,
            page_base_y: 0,
            semi_transparency: 0,
            texture_depth: TextureDepth::T4Bit,
            dithering: false,
            draw_to_display: false,
            force_set_mask_bit: false,
            preserve_masked_pixels: false,
            field: Field::Top,
            texture_disable: false,
            hres: HorizontalRes::from_fields(0, 0),
            vres: VerticalRes::Y240,
            vmode: VideoMode::Ntsc,
            display_depth: DisplayDepth::D15Bits,
            interlaced: false,
            display_disabled: true,
            interrupt: false,
            dma_direction: DmaDirection::Off,

            rectangle_texture_x_flip: false,
            rectangle_texture_y_flip: false,
            texture_window_x_mask: 0,
            texture_window_y_mask: 0,
            texture_window_x_offset: 0,
            texture_window_y_offset: 0,
            drawing_area_left: 0,
            drawing_area_top: 0,
            drawing_area_right: 0,
            drawing_area_bottom: 0,
            drawing_x_offset: 0,
            drawing_y_offset: 0,
            display_vram_x_start: 0,
            display_vram_y_start: 0,
            display_horiz_start: 0x200,
            display_horiz_end: 0xC00,
            display_line_start: 0x10,
            display_line_end: 0x100,

            gp0_mode: Gp0Mode::Command,
            command_buffer: CommandBuffer::new(),
            gp0_words_remaining: 0,
            gp0_command_opcode: None,
            image_load_buffer: Vec::new(),

            read_word: 0,
        }
    }

    /// Pack the full GPUSTAT word.
    pub fn status(&self) -> u32 {
        let mut s = 0u32;
        s |= (self.page_base_x as u32) & 0xF;
        s |= ((self.page_base_y as u32) & 1) << 4;
        s |= (self.semi_transparency as u32 & 3) << 5;
        s |= (self.texture_depth as u32) << 7;
        s |= (self.dithering as u32) << 9;
        s |= (self.draw_to_display as u32) << 10;
        s |= (self.force_set_mask_bit as u32) << 11;
        s |= (self.preserve_masked_pixels as u32) << 12;
        s |= (self.field as u32) << 13;
        s |= (self.texture_disable as u32) << 15;
        s |= self.hres.status_bits() << 16;
        s |= (self.vres as u32) << 19;
        s |= (self.vmode as u32) << 20;
        s |= (self.display_depth as u32) << 21;
        s |= (self.interlaced as u32) << 22;
        s |= (self.display_disabled as u32) << 23;
        s |= (self.interrupt as u32) << 24;

        s |= 1 << 26; // ready to receive command word
        s |= 1 << 27; // ready to send VRAM to CPU
        s |= 1 << 28; // ready to receive DMA block

        // Bit 25 (DMA/data request) depends on the current DMA direction: it
        // mirrors the FIFO-ready, GP0-ready, or VRAM-ready bit according to
        // which transfer the CPU has configured. Read after the always-ready
        // bits above are set, since CpuToGp0/VRamToCpu mirror those bits.
        let dma_request = match self.dma_direction {
            DmaDirection::Off => false,
            DmaDirection::Fifo => true,
            DmaDirection::CpuToGp0 => (s >> 28) & 1 != 0,
            DmaDirection::VRamToCpu => (s >> 27) & 1 != 0,
        };
        s |= (dma_request as u32) << 25;

        s |= (self.dma_direction as u32) << 29;
        s |= 0 << 31; // odd/even line, not modeled

        s
    }

    /// GPUREAD: the last word latched by an image-store or info query.
    pub fn read(&self) -> u32 {
        self.read_word
    }

    /// Whether the DMA controller should treat this port as ready, per the
    /// configured DMA direction (mirrors GPUSTAT bit 25).
    pub fn dma_ready(&self) -> bool {
        (self.status() >> 25) & 1 != 0
    }

    pub fn dma_direction(&self) -> DmaDirection {
        self.dma_direction
    }

    /// Dispatch one GP0 command word, with `sink` told about completed
    /// commands and VRAM writes.
    pub fn gp0(&mut self, word: u32, sink: &mut dyn RenderSink) -> Result<()> {
        match self.gp0_mode {
            Gp0Mode::Command => self.gp0_command_word(word, sink),
            Gp0Mode::ImageLoad => {
                self.image_load_buffer.push(word);
                self.gp0_words_remaining -= 1;
                if self.gp0_words_remaining == 0 {
                    sink.vram_store(&self.image_load_buffer);
                    self.image_load_buffer.clear();
                    self.gp0_mode = Gp0Mode::Command;
                }
                Ok(())
            }
        }
    }

    fn gp0_command_word(&mut self, word: u32, sink: &mut dyn RenderSink) -> Result<()> {
        if self.command_buffer.is_empty() {
            let opcode = (word >> 24) as u8;
            let len = gp0_word_count(opcode)?;
            self.gp0_command_opcode = Some(opcode);
            if len == 1 {
                self.command_buffer.push(word);
                self.run_gp0_command(sink)?;
                self.command_buffer.clear();
                self.gp0_command_opcode = None;
                return Ok(());
            }
            self.gp0_words_remaining = len - 1;
            self.command_buffer.push(word);
            return Ok(());
        }

        self.command_buffer.push(word);
        self.gp0_words_remaining -= 1;
        if self.gp0_words_remaining == 0 {
            self.run_gp0_command(sink)?;
            self.command_buffer.clear();
            self.gp0_command_opcode = None;
        }
        Ok(())
    }

    fn run_gp0_command(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        let opcode = self.gp0_command_opcode.expect("opcode set before dispatch");
        match opcode {
            0x00 => {} // NOP
            0x01 => {} // clear texture cache
            0x28 | 0x2C | 0x30 | 0x38 => {
                let words = (0..self.command_buffer.len())
                    .map(|i| self.command_buffer[i])
                    .collect::<Vec<_>>();
                sink.draw_command(opcode, &words);
            }
            0xA0 => {
                // image load: word 1 is (y<<16|x), word 2 is (h<<16|w); the
                // remaining words are pixel data, word count per hardware's
                // (w*h rounded up to an even number of 16-bit pixels) / 2.
                let resolution = self.command_buffer[2];
                let width = resolution & 0xFFFF;
                let height = resolution >> 16;
                let pixels = width * height;
                let words = (pixels + 1) / 2;
                self.command_buffer.clear();
                if words == 0 {
                    self.gp0_mode = Gp0Mode::Command;
                } else {
                    self.gp0_words_remaining = words;
                    self.gp0_mode = Gp0Mode::ImageLoad;
                }
                return Ok(());
            }
            0xC0 => {
                // image store: nothing to stream in, GPUREAD will serve data.
                self.read_word = 0;
            }
            0xE1 => {
                let v = self.command_buffer[0];
                self.page_base_x = (v & 0xF) as u8;
                self.page_base_y = ((v >> 4) & 1) as u8;
                self.semi_transparency = ((v >> 5) & 3) as u8;
                self.texture_depth = TextureDepth::from_bits(v >> 7)?;
                self.dithering = (v >> 9) & 1 != 0;
                self.draw_to_display = (v >> 10) & 1 != 0;
                self.texture_disable = (v >> 11) & 1 != 0;
                self.rectangle_texture_x_flip = (v >> 12) & 1 != 0;
                self.rectangle_texture_y_flip = (v >> 13) & 1 != 0;
            }
            0xE2 => {
                let v = self.command_buffer[0];
                self.texture_window_x_mask = (v & 0x1F) as u8;
                self.texture_window_y_mask = ((v >> 5) & 0x1F) as u8;
                self.texture_window_x_offset = ((v >> 10) & 0x1F) as u8;
                self.texture_window_y_offset = ((v >> 15) & 0x1F) as u8;
            }
            0xE3 => {
                let v = self.command_buffer[0];
                self.drawing_area_left = (v & 0x3FF) as u16;
                self.drawing_area_top = ((v >> 10) & 0x3FF) as u16;
            }
            0xE4 => {
                let v = self.command_buffer[0];
                self.drawing_area_right = (v & 0x3FF) as u16;
                self.drawing_area_bottom = ((v >> 10) & 0x3FF) as u16;
            }
            0xE5 => {
                let v = self.command_buffer[0];
                self.drawing_x_offset = sign_extend_11(v & 0x7FF);
                self.drawing_y_offset = sign_extend_11((v >> 11) & 0x7FF);
            }
            0xE6 => {
                let v = self.command_buffer[0];
                self.force_set_mask_bit = v & 1 != 0;
                self.preserve_masked_pixels = (v >> 1) & 1 != 0;
            }
            _ => return Err(UnhandledError::UnhandledGp0 { opcode }.into()),
        }
        Ok(())
    }

    /// Dispatch one GP1 display-control command.
    pub fn gp1(&mut self, word: u32, sink: &mut dyn RenderSink) -> Result<()> {
        let opcode = (word >> 24) as u8;
        match opcode {
            0x00 => self.reset(),
            0x01 => {
                self.command_buffer.clear();
                self.gp0_mode = Gp0Mode::Command;
                self.gp0_command_opcode = None;
            }
            0x02 => self.interrupt = false,
            0x03 => self.display_disabled = word & 1 != 0,
            0x04 => self.dma_direction = DmaDirection::from_bits(word),
            0x05 => {
                self.display_vram_x_start = (word & 0x3FE) as u16;
                self.display_vram_y_start = ((word >> 10) & 0x1FF) as u16;
            }
            0x06 => {
                self.display_horiz_start = (word & 0xFFF) as u16;
                self.display_horiz_end = ((word >> 12) & 0xFFF) as u16;
            }
            0x07 => {
                self.display_line_start = (word & 0x3FF) as u16;
                self.display_line_end = ((word >> 10) & 0x3FF) as u16;
            }
            0x08 => {
                if word & 0x80 != 0 {
                    return Err(UnhandledError::UnhandledGp1 { opcode }.into());
                }
                self.hres = HorizontalRes::from_fields((word & 3) as u8, ((word >> 6) & 1) as u8);
                self.vres = if (word >> 2) & 1 != 0 { VerticalRes::Y480 } else { VerticalRes::Y240 };
                self.vmode = if (word >> 3) & 1 != 0 { VideoMode::Pal } else { VideoMode::Ntsc };
                self.display_depth = if (word >> 4) & 1 != 0 { DisplayDepth::D24Bits } else { DisplayDepth::D15Bits };
                self.interlaced = (word >> 5) & 1 != 0;
                sink.display_changed();
            }
            0x10 => {
                // GPU info query: only a handful of sub-indices are wired on
                // real hardware; unimplemented ones simply leave GPUREAD
                // unchanged.
                match word & 0xF {
                    2 => self.read_word = ((self.texture_window_y_offset as u32) << 15)
                        | ((self.texture_window_x_offset as u32) << 10)
                        | ((self.texture_window_y_mask as u32) << 5)
                        | (self.texture_window_x_mask as u32),
                    3 => self.read_word = ((self.drawing_area_top as u32) << 10) | self.drawing_area_left as u32,
                    4 => self.read_word = ((self.drawing_area_bottom as u32) << 10) | self.drawing_area_right as u32,
                    _ => {}
                }
            }
            _ => return Err(UnhandledError::UnhandledGp1 { opcode }.into()),
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Gpu::new();
    }
}

impl Default for Gpu {
    fn default() -> Self {
        Self::new()
    }
}

fn sign_extend_11(v: u32) -> i16 {
    ((v << 21) as i32 >> 21) as i16
}

/// Number of 32-bit words a GP0 command occupies, including its opcode word.
fn gp0_word_count(opcode: u8) -> Result<u32> {
    Ok(match opcode {
        0x00 => 1,
        0x01 => 1,
        0x28 => 5,
        0x2C => 9,
        0x30 => 6,
        0x38 => 8,
        0xA0 => 3,
        0xC0 => 3,
        0xE1..=0xE6 => 1,
        _ => return Err(UnhandledError::UnhandledGp0 { opcode }.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state_matches_power_on() {
        let gpu = Gpu::new();
        assert!(gpu.display_disabled);
        assert_eq!(gpu.dma_direction, DmaDirection::Off);
    }

    #[test]
    fn draw_mode_then_status_reflects_fields() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        // page_base_x=5, page_base_y=1, semi=2, depth=T15Bit(2), dithering
        let v = 5 | (1 << 4) | (2 << 5) | (2 << 7) | (1 << 9);
        gpu.gp0(0xE100_0000 | v, &mut sink).unwrap();
        let status = gpu.status();
        assert_eq!(status & 0xF, 5);
        assert_eq!((status >> 4) & 1, 1);
        assert_eq!((status >> 5) & 3, 2);
        assert_eq!((status >> 7) & 3, 2);
        assert_eq!((status >> 9) & 1, 1);
    }

    #[test]
    fn drawing_area_words_update_fields() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        gpu.gp0(0xE300_0000 | 10 | (20 << 10), &mut sink).unwrap();
        assert_eq!(gpu.drawing_area_left, 10);
        assert_eq!(gpu.drawing_area_top, 20);
        gpu.gp0(0xE400_0000 | 30 | (40 << 10), &mut sink).unwrap();
        assert_eq!(gpu.drawing_area_right, 30);
        assert_eq!(gpu.drawing_area_bottom, 40);
    }

    #[test]
    fn drawing_offset_sign_extends() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        // x = -1 (0x7FF), y = 5
        let v = 0x7FF | (5 << 11);
        gpu.gp0(0xE500_0000 | v, &mut sink).unwrap();
        assert_eq!(gpu.drawing_x_offset, -1);
        assert_eq!(gpu.drawing_y_offset, 5);
    }

    #[test]
    fn monochrome_quad_waits_for_all_words_then_fires_sink() {
        struct Counting(u32);
        impl RenderSink for Counting {
            fn draw_command(&mut self, opcode: u8, words: &[u32]) {
                assert_eq!(opcode, 0x28);
                assert_eq!(words.len(), 5);
                self.0 += 1;
            }
        }
        let mut gpu = Gpu::new();
        let mut sink = Counting(0);
        gpu.gp0(0x2800_0000, &mut sink).unwrap();
        for _ in 0..3 {
            assert_eq!(sink.0, 0);
            gpu.gp0(0, &mut sink).unwrap();
        }
        gpu.gp0(0, &mut sink).unwrap();
        assert_eq!(sink.0, 1);
    }

    #[test]
    fn gp1_reset_restores_power_on_state() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        gpu.gp0(0xE300_0000 | 5, &mut sink).unwrap();
        assert_eq!(gpu.drawing_area_left, 5);
        gpu.gp1(0x0000_0000, &mut sink).unwrap();
        assert_eq!(gpu.drawing_area_left, 0);
    }

    #[test]
    fn gp1_dma_direction_updates_status() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        gpu.gp1(0x0400_0002, &mut sink).unwrap();
        assert_eq!(gpu.dma_direction(), DmaDirection::CpuToGp0);
        assert_eq!((gpu.status() >> 29) & 3, 2);
    }

    #[test]
    fn unhandled_gp0_opcode_is_reported() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        let err = gpu.gp0(0xFF00_0000, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::EmulatorError::Unhandled(UnhandledError::UnhandledGp0 { opcode: 0xFF })
        ));
    }

    #[test]
    fn draw_mode_reserved_texture_depth_is_reported() {
        let mut gpu = Gpu::new();
        let mut sink = NullSink;
        let err = gpu.gp0(0xE100_0180, &mut sink).unwrap_err(); // texture depth bits = 3
        assert!(matches!(
            err,
            crate::core::error::EmulatorError::Unhandled(UnhandledError::InvalidTextureDepth(3))
        ));
    }
}
