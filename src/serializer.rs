// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/serializer.rs - JSON output for decoded stubs.
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
 * # `serializer` Module
 *
 * Writes a [StubRecord] as `<target>.json`, with `text` and `data` as
 * standard base64 strings and every other field unchanged:
 *
 * ```json
 * {"entry":1074521516,"text":"CAD0Px...","text_start":1074520064,"data":"DMD8Pw...","data_start":1073605544}
 * ```
 *
 * [read_stub] reverses this, which is what a flasher does before uploading
 * the segments.
 */

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::error::WriteError;
use crate::stub::{DATA_FIELD, StubRecord, StubValue, TEXT_FIELD};

/// A stub in its JSON form. Keys keep the record's field order.
pub type OutputDocument = Map<String, Value>;

/// Path of the output file for `target` inside `out_dir`.
pub fn stub_path(out_dir: &Path, target: &str) -> PathBuf {
    out_dir.join(format!("{}.json", target))
}

/// Converts a record to its JSON form, base64-encoding the segments.
pub fn to_document(record: &StubRecord) -> OutputDocument {
    record
        .fields()
        .map(|(name, value)| {
            let value = match value {
                StubValue::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
                StubValue::Scalar(v) => v.clone(),
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Rebuilds a record from its JSON form.
pub fn from_document(document: OutputDocument) -> Result<StubRecord, WriteError> {
    let mut fields = Vec::with_capacity(document.len());
    for (name, value) in document {
        let value = if name == TEXT_FIELD || name == DATA_FIELD {
            let encoded = value
                .as_str()
                .ok_or_else(|| WriteError::Malformed(format!("`{}` is not a string", name)))?;
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|e| WriteError::Malformed(format!("`{}`: {}", name, e)))?;
            StubValue::Binary(bytes)
        } else {
            StubValue::Scalar(value)
        };
        fields.push((name, value));
    }
    StubRecord::from_fields(fields).map_err(|e| WriteError::Malformed(e.to_string()))
}

/// Writes `record` to `<out_dir>/<target>.json`, replacing any existing file.
pub fn write_stub(out_dir: &Path, target: &str, record: &StubRecord) -> Result<PathBuf, WriteError> {
    let path = stub_path(out_dir, target);
    let json = serde_json::to_string(&to_document(record))?;
    fs::write(&path, json).map_err(|source| WriteError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Reads a stub previously written by [write_stub].
pub fn read_stub(path: &Path) -> Result<StubRecord, WriteError> {
    let json = fs::read_to_string(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str(&json)? {
        Value::Object(document) => from_document(document),
        _ => Err(WriteError::Malformed("top level is not an object".to_string())),
    }
}
