// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/pipeline.rs - Extract, decode and write every stub in one pass.
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

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::decoder::DecodedStub;
use crate::error::{Error, Result};
use crate::extractor::extract_blobs;
use crate::serializer::write_stub;
use crate::targets::TargetSpec;

/// A stub file that was written.
#[derive(Debug)]
pub struct WrittenStub {
    pub target: String,
    pub path: PathBuf,
    pub text_len: usize,
    pub data_len: usize,
}

/// A target whose stub was found but could not be decoded or written.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: String,
    pub error: Error,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<WrittenStub>,
    /// Targets whose marker was not in the source.
    pub missing: Vec<String>,
    pub failed: Vec<TargetFailure>,
}

impl Report {
    /// True if every stub that was found was also written.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// True if at least one target's marker was in the source.
    pub fn found_any(&self) -> bool {
        !self.written.is_empty() || !self.failed.is_empty()
    }
}

/// Converts every stub in `source` that belongs to one of `targets` into
/// `<out_dir>/<target>.json`.
///
/// A stub that fails to decode or write is recorded in the report and the
/// remaining targets still run. The only fatal error is failing to create
/// `out_dir`, which is not attempted when no stub was found.
pub fn generate(source: &str, targets: &[TargetSpec], out_dir: &Path) -> Result<Report> {
    let mut report = Report::default();

    info!("Extracting stubs...");
    let blobs = extract_blobs(source, targets);
    report.missing = targets
        .iter()
        .filter(|t| !blobs.iter().any(|b| b.target == t.id))
        .map(|t| t.id.to_string())
        .collect();

    if blobs.is_empty() {
        warn!("No stubs found in source");
        return Ok(report);
    }

    fs::create_dir_all(out_dir).map_err(|source| Error::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    info!("Converting stubs to JSON...");
    for blob in &blobs {
        let decoded = match DecodedStub::from_blob(blob) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!("Failed to decode {}: {}", blob.target, e);
                report.failed.push(TargetFailure {
                    target: blob.target.to_string(),
                    error: e.into(),
                });
                continue;
            }
        };

        let text_len = decoded.record.text().len();
        let data_len = decoded.record.data().len();
        info!("Processing {}", decoded.target);
        info!("Text size: {} bytes", text_len);
        info!("Data size: {} bytes", data_len);

        match write_stub(out_dir, &decoded.target, &decoded.record) {
            Ok(path) => {
                debug!("Wrote {}", path.display());
                report.written.push(WrittenStub {
                    target: decoded.target,
                    path,
                    text_len,
                    data_len,
                });
            }
            Err(e) => {
                error!("Failed to write {}: {}", decoded.target, e);
                report.failed.push(TargetFailure {
                    target: decoded.target,
                    error: e.into(),
                });
            }
        }
    }

    Ok(report)
}
