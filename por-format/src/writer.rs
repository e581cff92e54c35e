// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wires the number formatter (C) and line-framed writer (F) to the matrix emitter (H): the
//! write-path mirror of [`crate::reader::MatrixReader`].

use std::io::Write;

use por_core::errors::Result;
use por_core::number::NumberFormatter;
use por_core::radix::RadixTable;
use por_core::translation::TranslationTable;

use crate::line_writer::{LineWriter, LineWriterConfig};
use crate::matrix::emitter::MatrixEmitter;
use crate::matrix::Cell;

/// Serialises an in-memory matrix to a line-framed, translated byte stream.
pub struct MatrixWriter<W: Write> {
    writer: LineWriter<W>,
}

impl<W: Write> MatrixWriter<W> {
    pub fn new(sink: W, translation: TranslationTable, config: LineWriterConfig) -> MatrixWriter<W> {
        MatrixWriter { writer: LineWriter::new(sink, translation, config) }
    }

    pub fn write_matrix(&mut self, radix: &RadixTable, precision: usize, rows: &[Vec<Cell>]) -> Result<()> {
        let formatter = NumberFormatter::new(radix).with_precision(precision);
        let mut emitter = MatrixEmitter::new(radix, &formatter, &mut self.writer);
        emitter.emit_matrix(rows)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;

    #[test]
    fn writes_a_small_matrix() {
        let radix = RadixTable::new(POR_BASE, None).unwrap();
        let mut writer = MatrixWriter::new(Vec::new(), TranslationTable::default(), LineWriterConfig::default());
        writer
            .write_matrix(&radix, 11, &[vec![Cell::Numeric(1.0), Cell::Numeric(2.0)]])
            .unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[..4], b"1/2/");
    }
}
