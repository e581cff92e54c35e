// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wires the line-framed reader (E) to the matrix parser (G): the read-path data flow described
//! for the data-matrix engine. Header/variable-record parsing is an external collaborator and is
//! not handled here — callers position the underlying stream at the first matrix byte themselves.

use std::io::Read;

use por_core::errors::Result;
use por_core::radix::RadixTable;
use por_core::translation::TranslationTable;

use crate::line_reader::{LineReader, LineReaderConfig};
use crate::matrix::parser::{MatrixParser, MatrixParserConfig, Status};
use crate::matrix::MatrixVisitor;

/// Drains a line-framed byte stream through the matrix parser until it accepts (the `Z`
/// end-of-data marker) or rejects.
pub struct MatrixReader<'a, R: Read, V: MatrixVisitor> {
    line_reader: LineReader<R>,
    matrix_parser: MatrixParser<'a, V>,
}

impl<'a, R: Read, V: MatrixVisitor> MatrixReader<'a, R, V> {
    pub fn new(
        source: R,
        translation: TranslationTable,
        line_config: LineReaderConfig,
        radix: &'a RadixTable,
        matrix_config: MatrixParserConfig,
        visitor: V,
    ) -> MatrixReader<'a, R, V> {
        MatrixReader {
            line_reader: LineReader::new(source, translation, line_config),
            matrix_parser: MatrixParser::new(radix, matrix_config, visitor),
        }
    }

    /// Runs the matrix parser to completion, returning the dimensions discovered and the
    /// original visitor for inspection.
    pub fn run(mut self) -> Result<(u64, V)> {
        loop {
            let byte = match self.line_reader.read()? {
                Some(b) => b,
                None => break,
            };
            if self.matrix_parser.consume(byte)? == Status::Accepted {
                break;
            }
        }
        let ydim = self.matrix_parser.ydim().unwrap_or(0);
        Ok((ydim, self.matrix_parser.into_visitor()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;
    use std::io::Cursor;

    use crate::matrix::{Cell, ColumnType};
    use por_core::number::Precision;

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

    #[test]
    fn reads_a_small_matrix_end_to_end() {
        let radix = RadixTable::new(POR_BASE, None).unwrap();
        let reader = MatrixReader::new(
            Cursor::new(b"1/2/3/4/Z".to_vec()),
            TranslationTable::default(),
            LineReaderConfig { line_length: 80, ..Default::default() },
            &radix,
            MatrixParserConfig {
                types: vec![ColumnType::Numeric, ColumnType::Numeric],
                start_column: 0,
                row_width: 80,
                precision: Precision::Fast,
            },
            Recorder::default(),
        );
        let (ydim, recorder) = reader.run().unwrap();
        assert_eq!(ydim, 2);
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
