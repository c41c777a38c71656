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

//! psx-core CLI entry point
//!
//! Loads a BIOS image and drives the machine one CPU cycle at a time. There
//! is no windowing, audio or controller input here — this binary exists to
//! run the core standalone and watch it for diagnostic purposes.

use clap::Parser;
use psx_core::core::memory::Bios;
use psx_core::core::system::System;
use psx_core::EmulatorError;

/// Run the PSX emulated-machine core against a BIOS image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a 512 KiB PSX BIOS image.
    bios: String,

    /// Stop after this many CPU cycles instead of running forever.
    #[arg(long)]
    cycles: Option<u64>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let bios = match Bios::from_file(&args.bios) {
        Ok(bios) => bios,
        Err(EmulatorError::IncorrectBiosSize { expected, actual }) => {
            log::error!(
                "incorrect BIOS size: expected {expected} bytes, got {actual} bytes ({})",
                args.bios
            );
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("failed to load BIOS {}: {e}", args.bios);
            std::process::exit(1);
        }
    };

    log::info!("loaded BIOS from {}", args.bios);

    let mut system = System::new(bios);
    let mut cycles: u64 = 0;

    loop {
        if let Some(limit) = args.cycles {
            if cycles >= limit {
                break;
            }
        }

        if let Err(e) = system.step() {
            log::error!("fatal emulator error at cycle {cycles}: {e}");
            std::process::exit(1);
        }

        cycles += 1;
    }

    log::info!("ran {cycles} cycles");
}
