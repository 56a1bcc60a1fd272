// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/extractor.rs - Locates the stub literals in the esptool source.
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

use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use crate::targets::{STUB_PATTERN, TargetSpec};

/// The still-encoded stub literal found for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlob<'a> {
    pub target: &'static str,
    /// The literal text exactly as it appears in the source.
    pub token: &'a str,
}

fn stub_regex(marker: &str) -> Regex {
    let pattern = format!("{}{}", regex::escape(marker), STUB_PATTERN);
    RegexBuilder::new(&pattern)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .expect("escaped marker followed by STUB_PATTERN is a valid regex")
}

/// Finds the stub literal for each target in `source`.
///
/// Targets whose marker does not appear are skipped. If a marker appears more
/// than once, the first occurrence is used. Results are in `targets` order.
pub fn extract_blobs<'a>(source: &'a str, targets: &[TargetSpec]) -> Vec<RawBlob<'a>> {
    let mut blobs = Vec::new();
    for target in targets {
        let captures = stub_regex(target.marker).captures(source);
        match captures.and_then(|c| c.get(1)) {
            Some(token) => {
                info!("Found {}!", target.id);
                blobs.push(RawBlob {
                    target: target.id,
                    token: token.as_str(),
                });
            }
            None => debug!("No stub for {} ({})", target.id, target.marker),
        }
    }
    blobs
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGETS: &[TargetSpec] = &[
        TargetSpec::new("esp32", "ESP32ROM.STUB_CODE"),
        TargetSpec::new("esp32s2", "ESP32S2ROM.STUB_CODE"),
        TargetSpec::new("esp8266", "ESP8266ROM.STUB_CODE"),
    ];

    #[test]
    fn captures_multiline_token() {
        let source = "import zlib\n\
            ESP32ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b\"\"\"\n\
            eNqVWm1z2zYS\n\
            /ek=\n\
            \"\"\")))\n\
            \n\
            def main():\n    pass\n";
        let blobs = extract_blobs(source, TARGETS);
        assert_eq!(
            blobs,
            vec![RawBlob {
                target: "esp32",
                token: "b\"\"\"\neNqVWm1z2zYS\n/ek=\n\"\"\"",
            }]
        );
    }

    #[test]
    fn missing_markers_are_skipped() {
        let source = "ESP8266ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b'AAAA')))\n";
        let blobs = extract_blobs(source, TARGETS);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].target, "esp8266");
        assert_eq!(blobs[0].token, "b'AAAA'");
    }

    #[test]
    fn results_follow_target_order() {
        let source = "\
            ESP8266ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b'C')))\n\
            ESP32ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b'A')))\n";
        let ids: Vec<&str> = extract_blobs(source, TARGETS)
            .iter()
            .map(|b| b.target)
            .collect();
        assert_eq!(ids, ["esp32", "esp8266"]);
    }

    #[test]
    fn first_match_wins() {
        let source = "\
            ESP32ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b'first')))\n\
            ESP32ROM.STUB_CODE = eval(zlib.decompress(base64.b64decode(b'second')))\n";
        let blobs = extract_blobs(source, TARGETS);
        assert_eq!(blobs[0].token, "b'first'");
    }

    #[test]
    fn marker_is_matched_literally() {
        // An unescaped "." would let this line match ESP32ROM.STUB_CODE.
        let source = "ESP32ROMxSTUB_CODE = eval(zlib.decompress(base64.b64decode(b'A')))\n";
        assert!(extract_blobs(source, TARGETS).is_empty());
    }

    #[test]
    fn no_markers_yields_nothing() {
        assert!(extract_blobs("print('hello')\n", TARGETS).is_empty());
    }
}
