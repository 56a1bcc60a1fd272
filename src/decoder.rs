// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/decoder.rs - Decoder for the compressed stubs embedded in esptool.
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
 * # `decoder` Module
 *
 * Each stub in esptool is a bytes literal containing base64 text, which
 * decodes to a zlib stream, which inflates to a dict literal. This module
 * undoes those layers and returns a [StubRecord].
 *
 * ## Usage Example
 *
 * ```no_run
 * use espstubgen::decoder::DecodedStub;
 * use espstubgen::extractor::extract_blobs;
 * use espstubgen::targets::STUB_TARGETS;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let source = std::fs::read_to_string("stub_flasher.py")?;
 *
 *     for blob in extract_blobs(&source, STUB_TARGETS) {
 *         let decoded = DecodedStub::from_blob(&blob)?;
 *         println!("{}: {} bytes of text", decoded.target, decoded.record.text().len());
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::io::prelude::*;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use flate2::read::ZlibDecoder;

use crate::error::DecodeError;
use crate::extractor::RawBlob;
use crate::literal::{self, Literal};
use crate::stub::StubRecord;

/// Standard alphabet, padding required, non-zero trailing bits tolerated.
const BASE64: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

fn is_base64_data(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/')
}

/// Decodes standard base64 the way Python's `base64.b64decode` does by
/// default.
///
/// Bytes outside the alphabet (the line breaks inside a triple-quoted
/// literal, for example) are discarded. A `=` only counts once at least two
/// characters of a quad are in; when it completes the quad, decoding stops
/// and the rest of the input is ignored. An incomplete final quad is an
/// error.
pub fn b64decode(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut kept = Vec::with_capacity(data.len());
    let mut pads = 0;
    for &b in data {
        if b == b'=' {
            let quad_pos = kept.len() % 4;
            if quad_pos >= 2 {
                pads += 1;
                if quad_pos + pads >= 4 {
                    kept.resize(kept.len() + 4 - quad_pos, b'=');
                    break;
                }
            }
        } else if is_base64_data(b) {
            pads = 0;
            kept.push(b);
        }
    }
    Ok(BASE64.decode(kept)?)
}

/// Inflates a zlib stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut buffer = Vec::new();
    decoder
        .read_to_end(&mut buffer)
        .map_err(DecodeError::Decompress)?;
    Ok(buffer)
}

/// Evaluates `token` as a bytes (or str) literal, then base64-decodes and
/// inflates its contents.
pub fn unwrap_layer(token: &str) -> Result<Vec<u8>, DecodeError> {
    let encoded = match literal::parse(token)? {
        Literal::Bytes(b) => b,
        Literal::Str(s) => s.into_bytes(),
        other => {
            return Err(DecodeError::UnexpectedType {
                expected: "bytes",
                found: other.kind(),
            });
        }
    };
    decompress(&b64decode(&encoded)?)
}

/// Decodes an extracted stub token all the way to a [StubRecord].
pub fn decode_stub(token: &str) -> Result<StubRecord, DecodeError> {
    let inflated = unwrap_layer(token)?;
    let text = String::from_utf8(inflated)?;
    StubRecord::from_literal(literal::parse(&text)?)
}

/// A stub decoded from esptool, tagged with the target it belongs to.
#[derive(Debug)]
pub struct DecodedStub {
    pub target: String,
    pub record: StubRecord,
}

impl DecodedStub {
    pub fn from_blob(blob: &RawBlob) -> Result<Self, DecodeError> {
        let record = decode_stub(blob.token)?;
        Ok(Self {
            target: blob.target.to_string(),
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::engine::general_purpose::STANDARD;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Builds a token the way esptool stores one: a triple-quoted bytes
    /// literal with the base64 text wrapped over several lines.
    fn token_for(record_source: &str) -> String {
        let encoded = STANDARD.encode(zlib(record_source.as_bytes()));
        let wrapped: Vec<&str> = encoded
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect();
        format!("b\"\"\"\n{}\n\"\"\"", wrapped.join("\n"))
    }

    #[test]
    fn decompress_inflates() {
        let payload = b"\x00\x01\x02 stub payload \xff".repeat(50);
        assert_eq!(decompress(&zlib(&payload)).unwrap(), payload);
    }

    #[test]
    fn decompress_rejects_garbage() {
        assert!(matches!(
            decompress(b"not a zlib stream"),
            Err(DecodeError::Decompress(_))
        ));
    }

    #[test]
    fn b64decode_skips_line_breaks() {
        assert_eq!(b64decode(b"QU\nJD\n").unwrap(), b"ABC");
        assert_eq!(b64decode(b" Q Q = = ").unwrap(), b"A");
    }

    #[test]
    fn b64decode_rejects_bad_padding() {
        assert!(matches!(b64decode(b"QUJ"), Err(DecodeError::Base64(_))));
        assert!(matches!(b64decode(b"QQ="), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn b64decode_ignores_stray_padding() {
        assert_eq!(b64decode(b"QUJD=").unwrap(), b"ABC");
        assert_eq!(b64decode(b"=QU=JD").unwrap(), b"ABC");
    }

    #[test]
    fn b64decode_stops_after_padded_quad() {
        assert_eq!(b64decode(b"QQ==QUJD").unwrap(), b"A");
        assert_eq!(b64decode(b"QUI=\n!!garbage").unwrap(), b"AB");
    }

    #[test]
    fn unwrap_layer_recovers_original_bytes() {
        let payload: Vec<u8> = (0..=255).collect();
        let token = format!("b'{}'", STANDARD.encode(zlib(&payload)));
        assert_eq!(unwrap_layer(&token).unwrap(), payload);
    }

    #[test]
    fn decode_stub_multiline_token() {
        let token = token_for(
            "{'entry': 1074521516, 'text': b'\\x80\\x00\\x01', 'text_start': 1074520064, 'data': b'\\x10', 'data_start': 1073605544}",
        );
        let record = decode_stub(&token).unwrap();
        assert_eq!(record.text(), [0x80, 0x00, 0x01]);
        assert_eq!(record.data(), [0x10]);
        assert_eq!(record.entry(), Some(1074521516));
    }

    #[test]
    fn decode_stub_rejects_executable_content() {
        let token = token_for("__import__('os').system('echo pwned')");
        assert!(matches!(
            decode_stub(&token),
            Err(DecodeError::Literal(_))
        ));
    }

    #[test]
    fn decode_stub_rejects_non_bytes_token() {
        assert!(matches!(
            decode_stub("12345"),
            Err(DecodeError::UnexpectedType { found: "int", .. })
        ));
    }

    #[test]
    fn decode_stub_rejects_invalid_base64() {
        assert!(matches!(
            decode_stub("b'QUJ'"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn decode_stub_rejects_non_utf8_record() {
        let token = format!("b'{}'", STANDARD.encode(zlib(b"\xff\xfe")));
        assert!(matches!(decode_stub(&token), Err(DecodeError::Utf8(_))));
    }

    #[test]
    fn decoded_stub_keeps_target() {
        let token = token_for("{'text': b'AB', 'data': b'CD'}");
        let blob = RawBlob {
            target: "esp32",
            token: &token,
        };
        let decoded = DecodedStub::from_blob(&blob).unwrap();
        assert_eq!(decoded.target, "esp32");
        assert_eq!(decoded.record.text(), b"AB");
    }
}
