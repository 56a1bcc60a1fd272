//! Fixture builders that encode stubs the way esptool's stub_flasher.py does.

#![allow(dead_code)]

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Renders bytes as a Python bytes literal, escaping everything that is not
/// printable ASCII.
pub fn py_bytes(data: &[u8]) -> String {
    let mut out = String::from("b'");
    for &b in data {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('\'');
    out
}

/// Renders a stub dict with the usual esptool field layout.
pub fn stub_dict(text: &[u8], data: &[u8]) -> String {
    format!(
        "{{'entry': 1074521516, 'text': {}, 'text_start': 1074520064, 'data': {}, 'data_start': 1073605544}}",
        py_bytes(text),
        py_bytes(data)
    )
}

/// Compresses and base64-encodes `record_source`, wrapped in a triple-quoted
/// bytes literal.
pub fn stub_token(record_source: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(record_source.as_bytes()).unwrap();
    let encoded = STANDARD.encode(encoder.finish().unwrap());

    let lines: Vec<&str> = encoded
        .as_bytes()
        .chunks(64)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect();
    format!("b\"\"\"\n{}\n\"\"\"", lines.join("\n"))
}

/// One assignment line as it appears in stub_flasher.py.
pub fn stub_assignment(marker: &str, token: &str) -> String {
    format!(
        "{} = eval(zlib.decompress(base64.b64decode({})))\n",
        marker, token
    )
}
