// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The matrix emitter: the mirror image of [`crate::matrix::parser::MatrixParser`]. Drives the
//! line-framed writer (F) and number formatter (C) to serialise a stream of typed cells.

use std::io::Write;

use por_core::errors::Result;
use por_core::number::NumberFormatter;
use por_core::radix::RadixTable;

use crate::line_writer::LineWriter;
use crate::matrix::Cell;

const SYSMISS_SEPARATOR: u8 = b'.';

/// Serialises a matrix as a sequence of typed cells through a [`LineWriter`] and a
/// [`NumberFormatter`].
pub struct MatrixEmitter<'a, 'f, W: Write> {
    radix: &'a RadixTable,
    formatter: &'f NumberFormatter<'a>,
    writer: &'f mut LineWriter<W>,
}

impl<'a, 'f, W: Write> MatrixEmitter<'a, 'f, W> {
    pub fn new(
        radix: &'a RadixTable,
        formatter: &'f NumberFormatter<'a>,
        writer: &'f mut LineWriter<W>,
    ) -> MatrixEmitter<'a, 'f, W> {
        MatrixEmitter { radix, formatter, writer }
    }

    pub fn begin_matrix(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn begin_row(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn numeric(&mut self, v: f64) -> Result<()> {
        self.writer.write_double(self.formatter, v)
    }

    pub fn sysmiss(&mut self) -> Result<()> {
        self.writer.write_sysmiss(SYSMISS_SEPARATOR)
    }

    pub fn string(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_string(self.radix, bytes)
    }

    pub fn end_row(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn end_matrix(&mut self) -> Result<()> {
        self.writer.write_eof_markers()
    }

    /// Drives the emitter over a plain in-memory sequence of rows, each a sequence of cells.
    pub fn emit_matrix(&mut self, rows: &[Vec<Cell>]) -> Result<()> {
        self.begin_matrix()?;
        for row in rows {
            self.begin_row()?;
            for cell in row {
                match cell {
                    Cell::Numeric(v) => self.numeric(*v)?,
                    Cell::Sysmiss => self.sysmiss()?,
                    Cell::String(bytes) => self.string(bytes)?,
                }
            }
            self.end_row()?;
        }
        self.end_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;
    use por_core::translation::TranslationTable;

    use crate::line_writer::LineWriterConfig;

    #[test]
    fn emit_matrix_round_trips_through_the_matrix_parser() {
        use crate::matrix::parser::{MatrixParser, MatrixParserConfig, Status};
        use crate::matrix::{ColumnType, MatrixVisitor};
        use por_core::number::Precision;

        let radix = RadixTable::new(POR_BASE, None).unwrap();
        let formatter = NumberFormatter::new(&radix).with_precision(11);

        let mut buf = Vec::new();
        {
            let mut writer =
                LineWriter::new(&mut buf, TranslationTable::default(), LineWriterConfig::default());
            let mut emitter = MatrixEmitter::new(&radix, &formatter, &mut writer);
            emitter
                .emit_matrix(&[
                    vec![Cell::Numeric(1.0), Cell::Numeric(2.0)],
                    vec![Cell::Numeric(3.0), Cell::Numeric(4.0)],
                ])
                .unwrap();
        }

        #[derive(Default)]
        struct Recorder {
            cells: Vec<Cell>,
        }
        impl MatrixVisitor for Recorder {
            fn numeric(&mut self, value: f64) {
                self.cells.push(Cell::Numeric(value));
            }
            fn sysmiss(&mut self) {
                self.cells.push(Cell::Sysmiss);
            }
            fn string(&mut self, bytes: &[u8]) {
                self.cells.push(Cell::String(bytes.to_vec()));
            }
        }

        let config = MatrixParserConfig {
            types: vec![ColumnType::Numeric, ColumnType::Numeric],
            start_column: 0,
            row_width: 80,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        let mut status = Status::Unfinished;
        for &b in &buf {
            status = parser.consume(b).unwrap();
            if status == Status::Accepted {
                break;
            }
        }
        assert_eq!(status, Status::Accepted);
        let recorder = parser.into_visitor();
        assert_eq!(
            recorder.cells,
            vec![
                Cell::Numeric(1.0),
                Cell::Numeric(2.0),
                Cell::Numeric(3.0),
                Cell::Numeric(4.0),
            ]
        );
    }
}
