// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The line-framed writer: the mirror image of [`crate::line_reader::LineReader`]. Translates
//! every byte through an [`TranslationTable`], tracks logical column/line position, and inserts
//! end-of-line markers automatically at the configured line width.

use std::io::Write;

use por_core::errors::Result;
use por_core::number::NumberFormatter;
use por_core::radix::RadixTable;
use por_core::translation::TranslationTable;

const NUMBER_SEPARATOR: u8 = b'/';
const SYSMISS: u8 = b'*';
const EOF_MARKER: u8 = b'Z';

/// The end-of-line style a writer emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EolStyle {
    Lf,
    CrLf,
}

impl Default for EolStyle {
    fn default() -> EolStyle {
        EolStyle::CrLf
    }
}

/// Line-framed writer configuration.
#[derive(Clone, Debug)]
pub struct LineWriterConfig {
    pub line_length: u64,
    pub eol_style: EolStyle,
    pub max_string_length: u32,
    pub truncate_long_strings: bool,
}

impl Default for LineWriterConfig {
    fn default() -> LineWriterConfig {
        LineWriterConfig {
            line_length: 80,
            eol_style: EolStyle::default(),
            max_string_length: 255,
            truncate_long_strings: false,
        }
    }
}

/// A byte-granular writer that produces a Portable file's line-framed, translated byte stream.
pub struct LineWriter<W: Write> {
    inner: W,
    translation: TranslationTable,
    config: LineWriterConfig,
    line: u64,
    column: u64,
}

impl<W: Write> LineWriter<W> {
    pub fn new(inner: W, translation: TranslationTable, config: LineWriterConfig) -> LineWriter<W> {
        LineWriter { inner, translation, config, line: 0, column: 0 }
    }

    /// Writes one canonical byte, translating it and emitting an EOL once the configured line
    /// width is reached.
    pub fn write(&mut self, byte: u8) -> Result<()> {
        let translated = self.translation.encode(byte);
        self.inner.write_all(&[translated])?;
        self.column += 1;
        if self.column == self.config.line_length {
            match self.config.eol_style {
                EolStyle::Lf => self.inner.write_all(b"\n")?,
                EolStyle::CrLf => self.inner.write_all(b"\r\n")?,
            }
            self.column = 0;
            self.line += 1;
        }
        Ok(())
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.write(b)?;
        }
        Ok(())
    }

    /// Serialises `v` via the number formatter and writes the digits followed by the number
    /// separator.
    pub fn write_int(&mut self, radix: &RadixTable, v: i64) -> Result<()> {
        let formatter = NumberFormatter::new(radix);
        let mut digits = Vec::new();
        formatter.format_int(v, &mut digits);
        self.write_all(&digits)?;
        self.write(NUMBER_SEPARATOR)
    }

    /// As [`LineWriter::write_int`], but for a `double` via `format_double`.
    pub fn write_double(&mut self, formatter: &NumberFormatter<'_>, v: f64) -> Result<()> {
        let digits = formatter.format_double(v)?;
        self.write_all(&digits)?;
        self.write(NUMBER_SEPARATOR)
    }

    /// Writes `text` reformatted to the formatter's configured precision.
    pub fn write_reformatted_number(
        &mut self,
        formatter: &NumberFormatter<'_>,
        text: &[u8],
        new_precision: usize,
    ) -> Result<()> {
        let digits = formatter.reformat(text, new_precision)?;
        self.write_all(&digits)?;
        self.write(NUMBER_SEPARATOR)
    }

    /// Encodes `s` through the configured text encoding (here, raw bytes — encoding is a
    /// pluggable collaborator left to the caller), enforces `max_string_length`, and writes the
    /// length-prefixed string.
    pub fn write_string(&mut self, radix: &RadixTable, s: &[u8]) -> Result<()> {
        let bytes = if s.len() > self.config.max_string_length as usize {
            if !self.config.truncate_long_strings {
                return Err(por_core::errors::PorError::StringTooLong {
                    requested: s.len() as u32,
                    max: self.config.max_string_length,
                });
            }
            &s[..self.config.max_string_length as usize]
        }
        else {
            s
        };
        self.write_int(radix, bytes.len() as i64)?;
        self.write_all(bytes)
    }

    /// Writes the `*` sysmiss marker followed by `sep` (conventionally `.`).
    pub fn write_sysmiss(&mut self, sep: u8) -> Result<()> {
        self.write(SYSMISS)?;
        self.write(sep)
    }

    /// Writes the end-of-data `Z` marker, padding the remainder of the current line with `Z`
    /// bytes if the column is non-zero.
    pub fn write_eof_markers(&mut self) -> Result<()> {
        self.write(EOF_MARKER)?;
        while self.column != 0 {
            self.write(EOF_MARKER)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;

    fn radix() -> RadixTable {
        RadixTable::new(POR_BASE, None).unwrap()
    }

    #[test]
    fn write_int_emits_digits_and_separator() {
        let radix = radix();
        let mut buf = Vec::new();
        let mut w = LineWriter::new(
            &mut buf,
            TranslationTable::default(),
            LineWriterConfig { line_length: 80, ..Default::default() },
        );
        w.write_int(&radix, 29).unwrap();
        assert_eq!(&buf[..2], b"T/");
    }

    #[test]
    fn write_eof_markers_pads_to_line_length() {
        let radix = radix();
        let _ = &radix;
        let mut buf = Vec::new();
        let mut w = LineWriter::new(
            &mut buf,
            TranslationTable::default(),
            LineWriterConfig { line_length: 4, ..Default::default() },
        );
        w.write(b'1').unwrap();
        w.write_eof_markers().unwrap();
        assert_eq!(&buf[..4], b"1ZZZ");
    }

    #[test]
    fn line_wraps_at_configured_width() {
        let mut buf = Vec::new();
        let mut w = LineWriter::new(
            &mut buf,
            TranslationTable::default(),
            LineWriterConfig { line_length: 2, eol_style: EolStyle::Lf, ..Default::default() },
        );
        w.write(b'a').unwrap();
        w.write(b'b').unwrap();
        w.write(b'c').unwrap();
        assert_eq!(&buf, b"ab\nc");
    }
}
