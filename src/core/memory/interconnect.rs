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

//! System interconnect
//!
//! Owns every addressable device (BIOS, RAM, DMA, GPU) and routes loads and
//! stores to them by region. This is also where DMA transfers actually run:
//! the interconnect is the one place that can borrow [`Ram`] and [`Gpu`] at
//! the same time, so channel activation (triggered here, from a DMA register
//! write) drives the transfer loop directly instead of going back through
//! the DMA controller.

use super::bios::Bios;
use super::ram::Ram;
use super::region;
use crate::core::dma::{Direction, Dma, Port, Step, Sync};
use crate::core::error::{BusError, Result, UnhandledError};
use crate::core::gpu::{Gpu, NullSink, RenderSink};

/// Everything the CPU's memory opcodes and DMA engine can see.
pub struct Interconnect {
    bios: Bios,
    ram: Ram,
    dma: Dma,
    gpu: Gpu,
    /// I_STAT / I_MASK: tracked as plain registers. Nothing in this core
    /// drives CPU interrupts off of them; they exist so software probing
    /// IRQ_CONTROL during boot sees sane values instead of an unhandled trap.
    irq_status: u16,
    irq_mask: u16,
    render_sink: Box<dyn RenderSink>,
}

impl Interconnect {
    pub fn new(bios: Bios) -> Self {
        Self {
            bios,
            ram: Ram::new(),
            dma: Dma::new(),
            gpu: Gpu::new(),
            irq_status: 0,
            irq_mask: 0,
            render_sink: Box::new(NullSink),
        }
    }

    pub fn with_render_sink(bios: Bios, sink: Box<dyn RenderSink>) -> Self {
        let mut ic = Self::new(bios);
        ic.render_sink = sink;
        ic
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn dma(&self) -> &Dma {
        &self.dma
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    // -- loads -------------------------------------------------------

    pub fn load32(&mut self, addr: u32) -> Result<u32> {
        if addr % 4 != 0 {
            return Err(BusError::UnalignedAccess { address: addr, width: 4 }.into());
        }
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            return Ok(self.ram.load32(off));
        }
        if let Some(off) = region::BIOS.contains(masked) {
            return Ok(self.bios.load32(off));
        }
        if let Some(off) = region::DMA.contains(masked) {
            return Ok(self.dma_read(off));
        }
        if let Some(off) = region::GPU.contains(masked) {
            return Ok(match off {
                0 => self.gpu.read(),
                4 => self.gpu.status(),
                _ => 0,
            });
        }
        if let Some(off) = region::IRQ_CONTROL.contains(masked) {
            return Ok(match off {
                0 => self.irq_status as u32,
                4 => self.irq_mask as u32,
                _ => 0,
            });
        }
        if region::MEM_CONTROL.contains(masked).is_some()
            || region::RAM_SIZE.contains(masked).is_some()
            || region::TIMERS.contains(masked).is_some()
            || region::SPU.contains(masked).is_some()
            || region::EXPANSION_1.contains(masked).is_some()
            || region::EXPANSION_2.contains(masked).is_some()
        {
            log::debug!("load32 from unmodeled region at 0x{:08X}", addr);
            return Ok(0);
        }
        if region::CACHE_CONTROL.contains(addr).is_some() {
            log::debug!("load32 from cache control at 0x{:08X}", addr);
            return Ok(0);
        }

        log::warn!("load32 from unhandled MMIO address 0x{:08X}", addr);
        Ok(0)
    }

    pub fn load16(&mut self, addr: u32) -> Result<u16> {
        if addr % 2 != 0 {
            return Err(BusError::UnalignedAccess { address: addr, width: 2 }.into());
        }
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            return Ok(self.ram.load16(off));
        }
        if let Some(off) = region::BIOS.contains(masked) {
            return Ok(self.bios.load16(off));
        }
        if let Some(off) = region::IRQ_CONTROL.contains(masked) {
            return Ok(match off {
                0 => self.irq_status,
                2 => self.irq_mask,
                _ => 0,
            });
        }
        if region::SPU.contains(masked).is_some() || region::TIMERS.contains(masked).is_some() {
            log::debug!("load16 from unmodeled region at 0x{:08X}", addr);
            return Ok(0);
        }

        log::warn!("load16 from unhandled MMIO address 0x{:08X}", addr);
        Ok(0)
    }

    pub fn load8(&mut self, addr: u32) -> Result<u8> {
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            return Ok(self.ram.load8(off));
        }
        if let Some(off) = region::BIOS.contains(masked) {
            return Ok(self.bios.load8(off));
        }
        if region::EXPANSION_1.contains(masked).is_some() {
            // No expansion cartridge modeled; reads float high.
            return Ok(0xFF);
        }

        log::warn!("load8 from unhandled MMIO address 0x{:08X}", addr);
        Ok(0)
    }

    // -- stores ------------------------------------------------------

    pub fn store32(&mut self, addr: u32, val: u32) -> Result<()> {
        if addr % 4 != 0 {
            return Err(BusError::UnalignedAccess { address: addr, width: 4 }.into());
        }
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            self.ram.store32(off, val);
            return Ok(());
        }
        if region::CACHE_CONTROL.contains(addr).is_some() {
            log::debug!("store32 0x{:08X} to cache control, ignored", val);
            return Ok(());
        }
        if let Some(off) = region::MEM_CONTROL.contains(masked) {
            self.store_mem_control(off, val);
            return Ok(());
        }
        if region::RAM_SIZE.contains(masked).is_some() {
            return Ok(());
        }
        if let Some(off) = region::IRQ_CONTROL.contains(masked) {
            match off {
                0 => self.irq_status &= val as u16,
                4 => self.irq_mask = val as u16,
                _ => {}
            }
            return Ok(());
        }
        if let Some(off) = region::DMA.contains(masked) {
            return self.dma_write(off, val);
        }
        if let Some(off) = region::GPU.contains(masked) {
            match off {
                0 => self.gpu.gp0(val, self.render_sink.as_mut())?,
                4 => self.gpu.gp1(val, self.render_sink.as_mut())?,
                _ => {}
            }
            return Ok(());
        }
        if region::TIMERS.contains(masked).is_some()
            || region::SPU.contains(masked).is_some()
            || region::EXPANSION_1.contains(masked).is_some()
            || region::EXPANSION_2.contains(masked).is_some()
        {
            log::debug!("store32 0x{:08X} to unmodeled region at 0x{:08X}", val, addr);
            return Ok(());
        }

        log::warn!("store32 0x{:08X} to unhandled MMIO address 0x{:08X}", val, addr);
        Ok(())
    }

    pub fn store16(&mut self, addr: u32, val: u16) -> Result<()> {
        if addr % 2 != 0 {
            return Err(BusError::UnalignedAccess { address: addr, width: 2 }.into());
        }
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            self.ram.store16(off, val);
            return Ok(());
        }
        if let Some(off) = region::IRQ_CONTROL.contains(masked) {
            match off {
                0 => self.irq_status &= val,
                2 => self.irq_mask = val,
                _ => {}
            }
            return Ok(());
        }
        if region::SPU.contains(masked).is_some() || region::TIMERS.contains(masked).is_some() {
            log::debug!("store16 0x{:04X} to unmodeled region at 0x{:08X}", val, addr);
            return Ok(());
        }

        log::warn!("store16 0x{:04X} to unhandled MMIO address 0x{:08X}", val, addr);
        Ok(())
    }

    pub fn store8(&mut self, addr: u32, val: u8) -> Result<()> {
        let masked = region::mask(addr);

        if let Some(off) = region::RAM.contains(masked) {
            self.ram.store8(off, val);
            return Ok(());
        }
        if region::EXPANSION_2.contains(masked).is_some() {
            log::debug!("store8 0x{:02X} to expansion 2 at 0x{:08X}", val, addr);
            return Ok(());
        }

        log::warn!("store8 0x{:02X} to unhandled MMIO address 0x{:08X}", val, addr);
        Ok(())
    }

    fn store_mem_control(&mut self, offset: u32, val: u32) {
        match offset {
            0 if val != 0x1F00_0000 => {
                log::warn!("unexpected EXPANSION_1 base address 0x{:08X} written", val)
            }
            4 if val != 0x1F80_2000 => {
                log::warn!("unexpected EXPANSION_2 base address 0x{:08X} written", val)
            }
            _ => {}
        }
    }

    // -- DMA register access -----------------------------------------

    fn dma_read(&self, offset: u32) -> u32 {
        let major = (offset >> 4) & 0x7;
        let minor = offset & 0xF;

        if major == 7 {
            return match minor {
                0 => self.dma.control(),
                4 => self.dma.interrupt(),
                _ => 0,
            };
        }

        let port = match Port::from_index(major) {
            Some(p) => p,
            None => return 0,
        };
        let ch = self.dma.channel(port);
        match minor {
            0 => ch.base,
            4 => ch.block_control(),
            8 => ch.control(),
            _ => 0,
        }
    }

    fn dma_write(&mut self, offset: u32, val: u32) -> Result<()> {
        let major = (offset >> 4) & 0x7;
        let minor = offset & 0xF;

        if major == 7 {
            match minor {
                0 => self.dma.set_control(val),
                4 => self.dma.set_interrupt(val),
                _ => {}
            }
            return Ok(());
        }

        let port = match Port::from_index(major) {
            Some(p) => p,
            None => return Ok(()),
        };

        match minor {
            0 => self.dma.channel_mut(port).set_base(val),
            4 => self.dma.channel_mut(port).set_block_control(val),
            8 => {
                self.dma.channel_mut(port).set_control(val);
                if self.dma.channel(port).active() {
                    self.run_dma(port)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Execute `port`'s transfer synchronously (no cycle-accurate timing:
    /// the whole transfer completes before the triggering store returns).
    fn run_dma(&mut self, port: Port) -> Result<()> {
        match self.dma.channel(port).sync {
            Sync::LinkedList => self.run_dma_linked_list(port)?,
            Sync::Manual | Sync::Request => self.run_dma_block(port)?,
        }

        self.dma.set_channel_done(port);
        Ok(())
    }

    fn run_dma_block(&mut self, port: Port) -> Result<()> {
        let channel = *self.dma.channel(port);
        let step: i32 = match channel.step {
            Step::Increment => 4,
            Step::Decrement => -4,
        };
        let mut addr = channel.base;
        let count = channel.transfer_size().unwrap_or(0);

        for i in 0..count {
            let cur = addr & 0x1F_FFFC;

            match channel.direction {
                Direction::FromRam => match port {
                    Port::Gpu => {
                        let src_word = self.ram.load32(cur);
                        self.gpu.gp0(src_word, self.render_sink.as_mut())?;
                    }
                    _ => {
                        return Err(UnhandledError::UnhandledDma {
                            port,
                            direction: channel.direction,
                        }
                        .into())
                    }
                },
                Direction::ToRam => {
                    // OTC never reads real data: hardware synthesizes a
                    // reverse-linked ordering table, each entry pointing at
                    // the next lower address, the last one terminated with
                    // 0x00FF_FFFF.
                    let word = match port {
                        Port::Otc => {
                            if i == count - 1 {
                                0x00FF_FFFF
                            } else {
                                cur.wrapping_sub(4) & 0x1F_FFFC
                            }
                        }
                        Port::Gpu => self.gpu.read(),
                        _ => {
                            return Err(UnhandledError::UnhandledDma {
                                port,
                                direction: channel.direction,
                            }
                            .into())
                        }
                    };
                    self.ram.store32(cur, word);
                }
            }

            addr = (addr as i32).wrapping_add(step) as u32;
        }
        Ok(())
    }

    /// GPU's linked-list (VRAM polygon chain) DMA transfer. Each list node
    /// starts with a header word whose top byte is the packet length in
    /// words and whose low 24 bits point at the next node; a header with bit
    /// 23 set is the terminator.
    fn run_dma_linked_list(&mut self, port: Port) -> Result<()> {
        if port != Port::Gpu {
            return Err(UnhandledError::UnhandledDma {
                port,
                direction: self.dma.channel(port).direction,
            }
            .into());
        }

        let mut addr = self.dma.channel(port).base & 0x1F_FFFC;
        loop {
            let header = self.ram.load32(addr);
            let len = header >> 24;
            let mut cur = addr;
            for _ in 0..len {
                cur = (cur + 4) & 0x1F_FFFC;
                let word = self.ram.load32(cur);
                self.gpu.gp0(word, self.render_sink.as_mut())?;
            }

            if header & 0x0080_0000 != 0 {
                break;
            }
            addr = header & 0x1F_FFFC;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bios() -> Bios {
        Bios::from_bytes(&vec![0u8; super::super::bios::BIOS_SIZE]).unwrap()
    }

    #[test]
    fn ram_round_trip_through_kuseg_and_kseg0() {
        let mut ic = Interconnect::new(test_bios());
        ic.store32(0x0000_1000, 0xCAFEBABE).unwrap();
        assert_eq!(ic.load32(0x0000_1000).unwrap(), 0xCAFEBABE);
        assert_eq!(ic.load32(0x8000_1000).unwrap(), 0xCAFEBABE);
    }

    #[test]
    fn bios_readable_through_kseg1() {
        let mut data = vec![0u8; super::super::bios::BIOS_SIZE];
        data[0] = 0xEF;
        data[1] = 0xBE;
        data[2] = 0xAD;
        data[3] = 0xDE;
        let bios = Bios::from_bytes(&data).unwrap();
        let mut ic = Interconnect::new(bios);
        assert_eq!(ic.load32(0xBFC0_0000).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn unaligned_load32_is_rejected() {
        let mut ic = Interconnect::new(test_bios());
        let err = ic.load32(0x0000_1001).unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::EmulatorError::Bus(BusError::UnalignedAccess { address: 0x1001, width: 4 })
        ));
    }

    #[test]
    fn unhandled_region_is_logged_not_fatal() {
        let mut ic = Interconnect::new(test_bios());
        assert_eq!(ic.load8(0x1F00_2000).unwrap(), 0);
        ic.store8(0x1F00_2000, 0xAB).unwrap();
    }

    #[test]
    fn dma_control_register_round_trips() {
        let mut ic = Interconnect::new(test_bios());
        ic.store32(0x1F80_10F0, 0x1234_5678).unwrap();
        assert_eq!(ic.load32(0x1F80_10F0).unwrap(), 0x1234_5678);
    }

    #[test]
    fn otc_dma_clears_linked_list_into_ram() {
        let mut ic = Interconnect::new(test_bios());
        // base = 0x1000, block size = 4 entries, step=Decrement, Manual sync.
        ic.store32(0x1F80_10E0, 0x0000_1000).unwrap(); // MADR (port 6, offset 0x60)
        ic.store32(0x1F80_10E4, 4).unwrap(); // BCR block size
        ic.store32(0x1F80_10E8, 0x1100_0002).unwrap(); // CHCR: step=decrement, enable, trigger

        // Each entry but the last points at the next lower entry...
        assert_eq!(ic.load32(0x1000).unwrap(), 0x0000_0FFC);
        assert_eq!(ic.load32(0x0FFC).unwrap(), 0x0000_0FF8);
        assert_eq!(ic.load32(0x0FF8).unwrap(), 0x0000_0FF4);
        // ...and the last entry terminates the list.
        assert_eq!(ic.load32(0x0FF4).unwrap(), 0x00FF_FFFF);
    }

    #[test]
    fn dma_to_unimplemented_port_direction_fails() {
        let mut ic = Interconnect::new(test_bios());
        // Port Pio (index 5, block at 0x1F8010A0), FromRam/Manual: no engine
        // behind this port, so the transfer must abort rather than no-op.
        ic.store32(0x1F80_10A0, 0x0000_1000).unwrap(); // MADR
        ic.store32(0x1F80_10A4, 1).unwrap(); // BCR: block_size = 1
        let err = ic.store32(0x1F80_10A8, 0x1101_0001).unwrap_err(); // CHCR: FromRam, enable, trigger
        assert!(matches!(
            err,
            crate::core::error::EmulatorError::Unhandled(UnhandledError::UnhandledDma {
                port: Port::Pio,
                direction: Direction::FromRam,
            })
        ));
    }
}
