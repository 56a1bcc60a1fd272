// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/targets.rs - Stub targets and their locations in esptool.
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

/// Where the stub flasher source is downloaded from.
pub const ESPTOOL_URL: &str =
    "https://raw.githubusercontent.com/espressif/esptool/master/esptool/stub_flasher.py";

/// Directory the generated `<target>.json` files are written to, relative to
/// the working directory.
pub const OUTPUT_DIR: &str = "../src/stubs";

/// The text following a target's marker. The single capture group is the
/// encoded stub literal.
pub const STUB_PATTERN: &str = r" = eval\(zlib.decompress\(base64\.b64decode\((.*?)\)\)\)";

/// A chip family and the assignment target that holds its stub in esptool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    /// Target identifier, also the output file stem (e.g. "esp32").
    pub id: &'static str,
    /// The marker that precedes the stub literal (e.g. "ESP32ROM.STUB_CODE").
    pub marker: &'static str,
}

impl TargetSpec {
    pub const fn new(id: &'static str, marker: &'static str) -> Self {
        Self { id, marker }
    }
}

/// Every stub this tool knows how to extract, in output order.
pub const STUB_TARGETS: &[TargetSpec] = &[
    TargetSpec::new("esp8266", "ESP8266ROM.STUB_CODE"),
    TargetSpec::new("esp32", "ESP32ROM.STUB_CODE"),
    TargetSpec::new("esp32s2", "ESP32S2ROM.STUB_CODE"),
    TargetSpec::new("esp32s3", "ESP32S3ROM.STUB_CODE"),
    TargetSpec::new("esp32c3", "ESP32C3ROM.STUB_CODE"),
    TargetSpec::new("esp32h2", "ESP32H2BETA2ROM.STUB_CODE"),
    TargetSpec::new("esp32c2", "ESP32C2ROM.STUB_CODE"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ids_and_markers_are_unique() {
        for (i, a) in STUB_TARGETS.iter().enumerate() {
            for b in &STUB_TARGETS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.marker, b.marker);
            }
        }
    }

    #[test]
    fn markers_name_stub_code() {
        assert!(STUB_TARGETS.iter().all(|t| t.marker.ends_with(".STUB_CODE")));
    }
}
