// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Extracts the esptool flasher stubs and converts them to JSON.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `espstubgen` Crate
 *
 * A library for pulling the flasher stub loaders out of esptool's
 * `stub_flasher.py` and turning them into JSON files a browser-based flasher
 * can load.
 *
 * The pipeline has four stages:
 *
 * 1. [fetcher]: Downloads the esptool source.
 * 2. [extractor]: Finds the encoded stub literal for each target.
 * 3. [decoder]: Undoes the base64 and zlib layers and parses the resulting
 *    record with the strict [literal] parser.
 * 4. [serializer]: Writes each record as `<target>.json`.
 *
 * [pipeline::generate] runs stages 2 to 4 for a whole target table.
 *
 * ## Usage Example
 *
 * ```no_run
 * use std::path::Path;
 *
 * use espstubgen::fetcher::fetch_source;
 * use espstubgen::pipeline::generate;
 * use espstubgen::targets::{ESPTOOL_URL, OUTPUT_DIR, STUB_TARGETS};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Download the source
 *     let source = fetch_source(ESPTOOL_URL)?;
 *
 *     // Extract, decode and write every stub
 *     let report = generate(&source, STUB_TARGETS, Path::new(OUTPUT_DIR))?;
 *
 *     for stub in &report.written {
 *         println!("{}: {}", stub.target, stub.path.display());
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod decoder;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod literal;
pub mod pipeline;
pub mod serializer;
pub mod stub;
pub mod targets;

pub use error::{Error, Result};
