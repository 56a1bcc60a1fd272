// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  stubgen.rs - Regenerates the JSON stub files from upstream esptool.
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

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use espstubgen::fetcher::fetch_source;
use espstubgen::pipeline::generate;
use espstubgen::targets::{ESPTOOL_URL, OUTPUT_DIR, STUB_TARGETS};

/// Downloads esptool's stub flasher source and writes each stub loader to
/// ../src/stubs/<target>.json. Set RUST_LOG to change the log level.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {}

fn main() -> ExitCode {
    let _args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = match fetch_source(ESPTOOL_URL) {
        Ok(source) => source,
        Err(error) => {
            error!("Error downloading esptool: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let report = match generate(&source, STUB_TARGETS, Path::new(OUTPUT_DIR)) {
        Ok(report) => report,
        Err(error) => {
            error!("Error generating stubs: {}", error);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Wrote {} stub(s), {} missing, {} failed",
        report.written.len(),
        report.missing.len(),
        report.failed.len()
    );

    if !report.found_any() {
        error!("No stub markers found in {}", ESPTOOL_URL);
        return ExitCode::FAILURE;
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        for failure in &report.failed {
            error!("{}: {}", failure.target, failure.error);
        }
        ExitCode::FAILURE
    }
}
