// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/literal.rs - Parser for the literal values embedded in esptool.
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
 * # `literal` Module
 *
 * esptool stores each stub as Python source: a bytes literal holding the
 * compressed stub, which in turn decompresses to a dict literal. This module
 * parses that subset of Python's literal syntax and nothing more. Names other
 * than `True`, `False` and `None` are rejected, so there is no way to express
 * a call, an attribute access or any other computation.
 *
 * Supported forms:
 *
 * - bytes and str literals with `b`, `r`, `u`, `br` and `rb` prefixes, in
 *   single, double and triple quotes, with adjacent literals concatenated
 * - integers (decimal, `0x`, `0o`, `0b`) and floats, with an optional sign
 * - `True`, `False`, `None`
 * - tuples, lists and dicts of the above
 *
 * ## Usage Example
 *
 * ```
 * use espstubgen::literal::{self, Literal};
 *
 * let value = literal::parse(r"{'entry': 0x4010, 'text': b'\x01\x02'}").unwrap();
 * assert_eq!(
 *     value,
 *     Literal::Dict(vec![
 *         (Literal::Str("entry".into()), Literal::Int(0x4010)),
 *         (Literal::Str("text".into()), Literal::Bytes(vec![1, 2])),
 *     ])
 * );
 * ```
 */

use crate::error::LiteralError;

const MAX_DEPTH: usize = 64;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bytes(Vec<u8>),
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    None,
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
    /// Entries in source order. Duplicate keys are kept as written.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Short name of the value's type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Bytes(_) => "bytes",
            Literal::Str(_) => "str",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "bool",
            Literal::None => "None",
            Literal::Tuple(_) => "tuple",
            Literal::List(_) => "list",
            Literal::Dict(_) => "dict",
        }
    }
}

/// Parses `text` as a single literal expression.
///
/// Whitespace, comments and line continuations around the value are ignored.
/// Anything left over after the value is an error.
pub fn parse(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_trivia();
    if parser.pos < text.len() {
        return Err(LiteralError::TrailingInput { offset: parser.pos });
    }
    Ok(value)
}

/// Accumulates the contents of one string literal.
enum StringBuf {
    Bytes(Vec<u8>),
    Str(String),
}

impl StringBuf {
    fn push_char(&mut self, c: char, offset: usize) -> Result<(), LiteralError> {
        match self {
            StringBuf::Bytes(b) => {
                if !c.is_ascii() {
                    return Err(LiteralError::NonAsciiBytes { offset });
                }
                b.push(c as u8);
            }
            StringBuf::Str(s) => s.push(c),
        }
        Ok(())
    }

    /// Pushes the value of a numeric escape.
    fn push_code(&mut self, code: u32, offset: usize) -> Result<(), LiteralError> {
        match self {
            StringBuf::Bytes(b) => {
                let byte = u8::try_from(code).map_err(|_| LiteralError::InvalidEscape {
                    offset,
                    reason: "escape value out of range for bytes",
                })?;
                b.push(byte);
            }
            StringBuf::Str(s) => {
                let c = char::from_u32(code).ok_or(LiteralError::InvalidEscape {
                    offset,
                    reason: "escape is not a valid code point",
                })?;
                s.push(c);
            }
        }
        Ok(())
    }

    fn is_bytes(&self) -> bool {
        matches!(self, StringBuf::Bytes(_))
    }

    fn into_literal(self) -> Literal {
        match self {
            StringBuf::Bytes(b) => Literal::Bytes(b),
            StringBuf::Str(s) => Literal::Str(s),
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                offset: self.pos,
                found,
            },
            None => LiteralError::UnexpectedEof,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), LiteralError> {
        self.skip_trivia();
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skips whitespace, `#` comments and backslash line continuations.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\n' | '\r' | '\x0c') => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('\\') if self.rest().starts_with("\\\n") => self.pos += 2,
                Some('\\') if self.rest().starts_with("\\\r\n") => self.pos += 3,
                _ => break,
            }
        }
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.skip_trivia();
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep { offset: self.pos });
        }

        match self.peek() {
            None => Err(LiteralError::UnexpectedEof),
            Some('{') => self.dict(depth),
            Some('[') => {
                self.bump();
                Ok(Literal::List(self.sequence(']', depth)?))
            }
            Some('(') => self.tuple_or_group(depth),
            Some(sign @ ('+' | '-')) => {
                self.bump();
                self.skip_trivia();
                match self.peek() {
                    Some(c) if c.is_ascii_digit() || c == '.' => self.number(sign == '-'),
                    _ => Err(self.unexpected()),
                }
            }
            Some(c) if c.is_ascii_digit() => self.number(false),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.number(false)
            }
            Some(_) if self.at_string_start() => self.strings(),
            Some(c) if c.is_alphabetic() || c == '_' => self.name(),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            name => Err(LiteralError::NotALiteral {
                offset: start,
                name: name.to_string(),
            }),
        }
    }

    /// Parses the items of a list or tuple up to and including `close`.
    fn sequence(&mut self, close: char, depth: usize) -> Result<Vec<Literal>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.value(depth + 1)?);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn tuple_or_group(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Literal::Tuple(Vec::new()));
        }

        let first = self.value(depth + 1)?;
        self.skip_trivia();
        match self.peek() {
            Some(')') => {
                self.bump();
                Ok(first)
            }
            Some(',') => {
                self.bump();
                let mut items = vec![first];
                items.extend(self.sequence(')', depth)?);
                Ok(Literal::Tuple(items))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn dict(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Dict(entries));
            }
            let key = self.value(depth + 1)?;
            self.expect(':')?;
            let value = self.value(depth + 1)?;
            entries.push((key, value));

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(Literal::Dict(entries));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn number(&mut self, negative: bool) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let rest = self.rest();
        let radix = match rest.get(..2).map(|p| p.to_ascii_lowercase()).as_deref() {
            Some("0x") => 16,
            Some("0o") => 8,
            Some("0b") => 2,
            _ => 10,
        };

        if radix == 10 {
            let mut prev = '\0';
            while let Some(c) = self.peek() {
                let sign_in_exponent = matches!(c, '+' | '-') && matches!(prev, 'e' | 'E');
                if !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || sign_in_exponent) {
                    break;
                }
                prev = c;
                self.bump();
            }
        } else {
            self.pos += 2;
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                self.bump();
            }
        }

        let text = &self.src[start..self.pos];
        let invalid = || LiteralError::InvalidNumber {
            offset: start,
            text: text.to_string(),
        };

        // An underscore must sit between two digits, or directly after a
        // base prefix.
        let chars: Vec<char> = text.chars().collect();
        let is_digit = |c: &char| c.is_digit(radix);
        for (i, c) in chars.iter().enumerate() {
            if *c != '_' {
                continue;
            }
            let after_prefix = radix != 10 && i == 2;
            let prev_ok = after_prefix || (i > 0 && is_digit(&chars[i - 1]));
            let next_ok = chars.get(i + 1).is_some_and(is_digit);
            if !(prev_ok && next_ok) {
                return Err(invalid());
            }
        }
        let digits: String = text.chars().filter(|&c| c != '_').collect();

        if radix != 10 {
            let body = digits.get(2..).filter(|b| !b.is_empty()).ok_or_else(invalid)?;
            let value = i128::from_str_radix(body, radix).map_err(|_| invalid())?;
            return Ok(Literal::Int(if negative { -value } else { value }));
        }

        if digits.contains(['.', 'e', 'E']) {
            if !digits.chars().all(|c| c.is_ascii_digit() || "eE.+-".contains(c)) {
                return Err(invalid());
            }
            let value: f64 = digits.parse().map_err(|_| invalid())?;
            return Ok(Literal::Float(if negative { -value } else { value }));
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        // Python rejects leading zeros on non-zero decimal integers.
        if digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0') {
            return Err(invalid());
        }
        let value: i128 = digits.parse().map_err(|_| invalid())?;
        Ok(Literal::Int(if negative { -value } else { value }))
    }

    /// Length of a string prefix at the current position, if a string
    /// literal starts here.
    fn string_prefix_len(&self) -> Option<usize> {
        let rest = self.rest();
        let prefix_len = rest
            .chars()
            .take(2)
            .take_while(|c| c.is_ascii_alphabetic())
            .count();
        let prefix = rest[..prefix_len].to_ascii_lowercase();
        let quote_follows = |len: usize| matches!(rest[len..].chars().next(), Some('\'' | '"'));

        // Try the longest prefix first, then the single letter.
        for len in (0..=prefix_len).rev() {
            if matches!(&prefix[..len], "" | "b" | "r" | "u" | "br" | "rb") && quote_follows(len)
            {
                return Some(len);
            }
        }
        None
    }

    fn at_string_start(&self) -> bool {
        self.string_prefix_len().is_some()
    }

    /// Parses one or more adjacent string literals and concatenates them.
    fn strings(&mut self) -> Result<Literal, LiteralError> {
        let mut buf: Option<StringBuf> = None;
        loop {
            let offset = self.pos;
            let piece = self.string_literal()?;
            buf = Some(match (buf, piece) {
                (None, piece) => piece,
                (Some(StringBuf::Bytes(mut a)), StringBuf::Bytes(b)) => {
                    a.extend(b);
                    StringBuf::Bytes(a)
                }
                (Some(StringBuf::Str(mut a)), StringBuf::Str(b)) => {
                    a.push_str(&b);
                    StringBuf::Str(a)
                }
                _ => return Err(LiteralError::MixedConcatenation { offset }),
            });

            self.skip_trivia();
            if !self.at_string_start() {
                break;
            }
        }
        buf.map(StringBuf::into_literal)
            .ok_or(LiteralError::UnexpectedEof)
    }

    fn string_literal(&mut self) -> Result<StringBuf, LiteralError> {
        let start = self.pos;
        let prefix_len = self.string_prefix_len().ok_or_else(|| self.unexpected())?;
        let prefix = self.src[start..start + prefix_len].to_ascii_lowercase();
        self.pos += prefix_len;

        let raw = prefix.contains('r');
        let mut buf = if prefix.contains('b') {
            StringBuf::Bytes(Vec::new())
        } else {
            StringBuf::Str(String::new())
        };

        let quote = self.bump().ok_or(LiteralError::UnexpectedEof)?;
        let pair = quote.to_string().repeat(2);
        let is_triple = self.rest().starts_with(&pair);
        if is_triple {
            self.pos += 2;
        }

        let unterminated = || LiteralError::UnterminatedString { offset: start };
        loop {
            let offset = self.pos;
            let c = self.bump().ok_or_else(unterminated)?;
            match c {
                c if c == quote => {
                    if !is_triple {
                        return Ok(buf);
                    }
                    if self.rest().starts_with(&pair) {
                        self.pos += 2;
                        return Ok(buf);
                    }
                    buf.push_char(c, offset)?;
                }
                '\n' | '\r' if !is_triple => return Err(unterminated()),
                '\\' if raw => {
                    // A raw backslash still protects the next character.
                    buf.push_char('\\', offset)?;
                    let next_offset = self.pos;
                    let next = self.bump().ok_or_else(unterminated)?;
                    buf.push_char(next, next_offset)?;
                }
                '\\' => self.escape(&mut buf, offset)?,
                c => buf.push_char(c, offset)?,
            }
        }
    }

    /// Handles the escape sequence following a backslash at `offset`.
    fn escape(&mut self, buf: &mut StringBuf, offset: usize) -> Result<(), LiteralError> {
        let c = self.bump().ok_or(LiteralError::UnexpectedEof)?;
        let simple = match c {
            '\n' => return Ok(()),
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
                return Ok(());
            }
            '\\' | '\'' | '"' => Some(c as u32),
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'n' => Some(0x0a),
            'r' => Some(0x0d),
            't' => Some(0x09),
            'v' => Some(0x0b),
            _ => None,
        };
        if let Some(code) = simple {
            return buf.push_code(code, offset);
        }

        match c {
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                buf.push_code(code, offset)
            }
            'x' => {
                let code = self.hex_digits(2, offset, "truncated \\xXX escape")?;
                buf.push_code(code, offset)
            }
            'u' if !buf.is_bytes() => {
                let code = self.hex_digits(4, offset, "truncated \\uXXXX escape")?;
                buf.push_code(code, offset)
            }
            'U' if !buf.is_bytes() => {
                let code = self.hex_digits(8, offset, "truncated \\UXXXXXXXX escape")?;
                buf.push_code(code, offset)
            }
            'N' if !buf.is_bytes() => Err(LiteralError::InvalidEscape {
                offset,
                reason: "named unicode escapes are not supported",
            }),
            other => {
                // Unknown escapes are kept verbatim, backslash included.
                buf.push_char('\\', offset)?;
                buf.push_char(other, offset + 1)
            }
        }
    }

    fn hex_digits(
        &mut self,
        count: usize,
        offset: usize,
        reason: &'static str,
    ) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|d| d.to_digit(16))
                .ok_or(LiteralError::InvalidEscape { offset, reason })?;
            code = code * 16 + digit;
            self.bump();
        }
        Ok(code)
    }
}
