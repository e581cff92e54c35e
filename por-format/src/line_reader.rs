// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The line-framed reader: a byte-granular [`std::io::Read`] wrapper that enforces a fixed
//! logical line width, pads short physical lines transparently, drops carriage returns, and
//! translates every byte through a [`TranslationTable`].

use std::io::{BufRead, BufReader, Read};

use log::warn;
use por_core::errors::{Position, PorError, Result};
use por_core::number::{NumberParser, Precision, Status};
use por_core::radix::RadixTable;
use por_core::translation::TranslationTable;

/// The canonical symbol used to pad short physical lines.
const CANONICAL_SPACE: u8 = b' ';
/// The sysmiss marker byte.
const SYSMISS: u8 = b'*';
/// The numeric/string-length separator byte.
const NUMBER_SEPARATOR: u8 = b'/';

/// Line-framed reader configuration.
#[derive(Clone, Debug)]
pub struct LineReaderConfig {
    pub line_length: u64,
    pub allow_longer_lines: bool,
    pub max_string_length: u32,
    pub allow_longer_strings: bool,
    pub istream_buffer_size: usize,
}

impl Default for LineReaderConfig {
    fn default() -> LineReaderConfig {
        LineReaderConfig {
            line_length: 80,
            allow_longer_lines: false,
            max_string_length: 255,
            allow_longer_strings: false,
            istream_buffer_size: 16 * 1024,
        }
    }
}

/// A byte-granular reader over a Portable file's line-framed, translated byte stream.
pub struct LineReader<R: Read> {
    inner: BufReader<R>,
    translation: TranslationTable,
    config: LineReaderConfig,
    line: u64,
    column: u64,
    offset: u64,
    pending_lf: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, translation: TranslationTable, config: LineReaderConfig) -> LineReader<R> {
        LineReader {
            inner: BufReader::with_capacity(config.istream_buffer_size, inner),
            translation,
            config,
            line: 0,
            column: 0,
            offset: 0,
            pending_lf: false,
        }
    }

    pub fn position(&self) -> Position {
        Position { line: self.line, column: self.column, offset: self.offset }
    }

    fn pull_raw(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            let n = self.inner.read(&mut byte)?;
            if n == 0 {
                return Ok(None);
            }
            if byte[0] == b'\r' {
                continue;
            }
            return Ok(Some(byte[0]));
        }
    }

    /// Reads and translates the next byte, transparently padding short lines with the canonical
    /// space symbol and dropping carriage returns. Returns `Ok(None)` at end-of-stream.
    pub fn read(&mut self) -> Result<Option<u8>> {
        loop {
            if self.pending_lf {
                if self.column < self.config.line_length {
                    self.column += 1;
                    return Ok(Some(CANONICAL_SPACE));
                }
                self.line += 1;
                self.column = 0;
                self.pending_lf = false;
                continue;
            }

            let byte = match self.pull_raw()? {
                Some(b) => b,
                None => return Ok(None),
            };

            if byte == b'\n' {
                self.pending_lf = true;
                continue;
            }

            self.column += 1;
            if self.column > self.config.line_length && !self.config.allow_longer_lines {
                return Err(PorError::LineTooLong { position: self.position() });
            }
            self.offset += 1;
            return Ok(Some(self.translation.decode(byte)));
        }
    }

    fn read_required(&mut self) -> Result<u8> {
        self.read()?.ok_or(PorError::UnexpectedEof)
    }

    /// Reads exactly `len` raw (translated) bytes into `out`, failing with `UnexpectedEof` if the
    /// stream ends first.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.read_required()?;
        }
        Ok(())
    }

    /// Skips spaces, feeds digits to an integer-only instance of the number parser up to the
    /// number separator, and checks the result is a non-negative value representable in 32 bits.
    pub fn read_unsigned_int(&mut self, radix: &RadixTable) -> Result<u32> {
        let mut byte = self.read_required()?;
        while byte == CANONICAL_SPACE {
            byte = self.read_required()?;
        }

        if byte == SYSMISS {
            return Err(PorError::UnexpectedSysmiss { position: Some(self.position()) });
        }

        let mut parser = NumberParser::new(radix, Precision::Fast);
        loop {
            if byte == NUMBER_SEPARATOR {
                if parser.consume(None) != Status::Accepted {
                    return Err(parser.result().unwrap_err());
                }
                break;
            }
            match parser.consume(Some(byte)) {
                Status::Unfinished => {}
                Status::Accepted => {
                    warn!("unsigned int terminated without a number separator");
                    break;
                }
                Status::Rejected => return Err(parser.result().unwrap_err()),
            }
            byte = self.read_required()?;
        }

        let value = parser.result()?;
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(PorError::Syntax {
                message: "expected a non-negative 32-bit integer".into(),
                position: Some(self.position()),
            });
        }
        Ok(value as u32)
    }

    /// Reads a length-prefixed string cell: an unsigned integer length, a separator, then exactly
    /// that many raw bytes, returned untranslated-to-text (text encoding is a collaborator left
    /// to the caller).
    pub fn read_string(&mut self, radix: &RadixTable) -> Result<Vec<u8>> {
        let len = self.read_unsigned_int(radix)?;
        if len > self.config.max_string_length {
            if self.config.allow_longer_strings {
                let mut buf = vec![0u8; len as usize];
                self.read_bytes(&mut buf)?;
                return Ok(buf);
            }
            return Err(PorError::StringTooLong { requested: len, max: self.config.max_string_length });
        }
        let mut buf = vec![0u8; len as usize];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(
            Cursor::new(data.to_vec()),
            TranslationTable::default(),
            LineReaderConfig { line_length: 8, ..Default::default() },
        )
    }

    #[test]
    fn short_line_is_padded_to_line_length() {
        let mut r = reader(b"12\n");
        assert_eq!(r.read().unwrap(), Some(b'1'));
        assert_eq!(r.read().unwrap(), Some(b'2'));
        for _ in 0..6 {
            assert_eq!(r.read().unwrap(), Some(b' '));
        }
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn carriage_returns_are_dropped() {
        let mut r = reader(b"1\r2\r\n");
        assert_eq!(r.read().unwrap(), Some(b'1'));
        assert_eq!(r.read().unwrap(), Some(b'2'));
    }

    #[test]
    fn line_overflow_raises_at_byte_past_limit() {
        let mut r = reader(b"123456789");
        for _ in 0..8 {
            r.read().unwrap();
        }
        assert!(matches!(r.read(), Err(PorError::LineTooLong { .. })));
    }

    #[test]
    fn read_unsigned_int_stops_at_separator() {
        let radix = RadixTable::new(POR_BASE, None).unwrap();
        let mut r = reader(b"12/rest");
        assert_eq!(r.read_unsigned_int(&radix).unwrap(), 2 + 1 * 30);
    }
}
