// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for each stage of stub generation.
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

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The esptool source could not be downloaded.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A stub could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A stub file could not be written or read back.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures retrieving the source text.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response body from {url} is not valid UTF-8: {source}")]
    NotUtf8 {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Syntax errors from the literal parser. Offsets are byte offsets into the
/// parsed text.
#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { offset: usize, found: char },

    #[error("`{name}` at offset {offset} is not a literal")]
    NotALiteral { offset: usize, name: String },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at offset {offset}: {reason}")]
    InvalidEscape { offset: usize, reason: &'static str },

    #[error("non-ASCII character in bytes literal at offset {offset}")]
    NonAsciiBytes { offset: usize },

    #[error("cannot mix bytes and str literals at offset {offset}")]
    MixedConcatenation { offset: usize },

    #[error("invalid number literal `{text}` at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("literal nested too deeply at offset {offset}")]
    TooDeep { offset: usize },
}

/// Failures at any layer of stub decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed literal: {0}")]
    Literal(#[from] LiteralError),

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("zlib decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("decompressed stub is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("stub record key must be a string, found {found}")]
    NonStringKey { found: &'static str },

    #[error("stub record is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("field `{field}` holds an unsupported value: {reason}")]
    UnsupportedValue { field: String, reason: String },
}

/// Failures producing (or reading back) an output document.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stub document is malformed: {0}")]
    Malformed(String),
}
