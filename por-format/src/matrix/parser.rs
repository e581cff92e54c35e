// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The push-driven matrix parser: feeds a stream of already line-framed, translated bytes
//! through a cell/row state machine, delegating mantissa digits to the number parser (B) and
//! dispatching typed cell events to a [`MatrixVisitor`].

use log::debug;
use por_core::errors::{PorError, Result};
use por_core::number::{NumberParser, Precision, Status as NumberStatus};
use por_core::radix::RadixTable;

use crate::matrix::{ColumnType, MatrixVisitor};

const SYSMISS: u8 = b'*';
const NUMBER_SEPARATOR: u8 = b'/';
const EOF_MARKER: u8 = b'Z';
const CANONICAL_SPACE: u8 = b' ';

/// Outcome of feeding one byte to [`MatrixParser::consume`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Unfinished,
    Accepted,
    Rejected,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    NewRow,
    NewColumn,
    NumericEmpty,
    NumericUnempty,
    NumericReady,
    SysmissDummy,
    SysmissReady,
    StrlenReady,
    StringContents,
    StringReady,
    NextColumn,
    NextRow,
    Accept,
    Error,
}

/// Per-instance matrix parser configuration.
#[derive(Clone, Debug)]
pub struct MatrixParserConfig {
    /// One entry per column, `xdim = types.len()`.
    pub types: Vec<ColumnType>,
    /// The column the matrix begins at (non-zero if resuming mid-line).
    pub start_column: u64,
    /// The logical row width in columns the inner reader pads up to on LF.
    pub row_width: u64,
    pub precision: Precision,
}

/// A push-driven cell/row state machine over an already line-framed, translated byte stream.
pub struct MatrixParser<'a, V: MatrixVisitor> {
    radix: &'a RadixTable,
    config: MatrixParserConfig,
    visitor: V,
    state: State,
    number: NumberParser<'a>,
    x: usize,
    y: u64,
    ydim: Option<u64>,
    column: u64,
    vbuffer: Vec<u8>,
    vbase: usize,
    string_len: u32,
    saw_digit: bool,
}

impl<'a, V: MatrixVisitor> MatrixParser<'a, V> {
    pub fn new(radix: &'a RadixTable, config: MatrixParserConfig, mut visitor: V) -> MatrixParser<'a, V> {
        visitor.begin_matrix();
        let precision = config.precision;
        let column = config.start_column;
        MatrixParser {
            radix,
            config,
            visitor,
            state: State::NewRow,
            number: NumberParser::new(radix, precision),
            x: 0,
            y: 0,
            ydim: None,
            column,
            vbuffer: Vec::new(),
            vbase: 0,
            string_len: 0,
            saw_digit: false,
        }
    }

    pub fn ydim(&self) -> Option<u64> {
        self.ydim
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    fn column_type(&self) -> ColumnType {
        self.config.types[self.x]
    }

    /// Feeds one already-translated byte to the matrix. `\n` drives row padding up to
    /// `row_width`; `\r` is discarded; everything else drives the inner cell state machine.
    pub fn consume(&mut self, byte: u8) -> Result<Status> {
        if byte == b'\r' {
            return Ok(self.terminal_status());
        }
        if byte == b'\n' {
            while self.column < self.config.row_width {
                self.eat(Some(CANONICAL_SPACE))?;
                self.column += 1;
            }
            self.column = 0;
            return Ok(self.terminal_status());
        }
        self.eat(Some(byte))?;
        self.column += 1;
        Ok(self.terminal_status())
    }

    fn terminal_status(&self) -> Status {
        match self.state {
            State::Accept => Status::Accepted,
            State::Error => Status::Rejected,
            _ => Status::Unfinished,
        }
    }

    fn reject(&mut self, err: PorError) -> Result<()> {
        self.state = State::Error;
        Err(err)
    }

    /// Runs the fixed-point loop of ε-transitions a single input byte can drive.
    fn eat(&mut self, byte: Option<u8>) -> Result<()> {
        loop {
            match self.state {
                State::NewRow => {
                    let b = byte.expect("NewRow always has a byte");
                    if b == EOF_MARKER {
                        self.ydim = Some(self.y);
                        self.state = State::Accept;
                        debug!("end-of-data marker at row {}", self.y);
                        self.visitor.end_matrix();
                        return Ok(());
                    }
                    self.visitor.begin_row();
                    self.state = State::NewColumn;
                    continue;
                }
                State::NewColumn => {
                    self.number.reset();
                    self.vbuffer.clear();
                    self.vbase = 0;
                    self.saw_digit = false;
                    self.state = State::NumericEmpty;
                    continue;
                }
                State::NumericEmpty => {
                    let b = byte.expect("NumericEmpty always has a byte");
                    if b == CANONICAL_SPACE {
                        return Ok(());
                    }
                    if b == SYSMISS {
                        if self.column_type() == ColumnType::String {
                            return self.reject(PorError::Syntax {
                                message: "sysmiss marker in a string column".into(),
                                position: None,
                            });
                        }
                        self.state = State::SysmissDummy;
                        return Ok(());
                    }
                    if b == NUMBER_SEPARATOR {
                        return self.reject(PorError::Syntax {
                            message: "number separator with no digits".into(),
                            position: None,
                        });
                    }
                    self.state = State::NumericUnempty;
                    continue;
                }
                State::NumericUnempty => {
                    let b = byte.expect("NumericUnempty always has a byte");
                    if b == NUMBER_SEPARATOR {
                        self.state = match self.column_type() {
                            ColumnType::Numeric => State::NumericReady,
                            ColumnType::String => State::StrlenReady,
                        };
                        return Ok(());
                    }
                    self.vbuffer.push(b);
                    self.saw_digit = true;
                    match self.number.consume(Some(b)) {
                        NumberStatus::Unfinished => return Ok(()),
                        NumberStatus::Accepted => return Ok(()),
                        NumberStatus::Rejected => {
                            let err = self.number.result().unwrap_err();
                            return self.reject(err);
                        }
                    }
                }
                State::NumericReady => {
                    match self.number.consume(None) {
                        NumberStatus::Accepted => {
                            let v = self.number.result().unwrap();
                            self.visitor.numeric(v);
                            self.state = State::NextColumn;
                        }
                        NumberStatus::Rejected => {
                            let err = self.number.result().unwrap_err();
                            match err {
                                PorError::Overflow { .. } | PorError::Underflow { .. } => {
                                    self.visitor.sysmiss();
                                    self.state = State::NextColumn;
                                }
                                other => return self.reject(other),
                            }
                        }
                        NumberStatus::Unfinished => {
                            return self.reject(PorError::Internal(
                                "number parser did not terminate on eof signal",
                            ));
                        }
                    }
                    continue;
                }
                State::SysmissDummy => {
                    // Consume exactly one arbitrary byte (conventionally `.`) after the `*`.
                    self.state = State::SysmissReady;
                    return Ok(());
                }
                State::SysmissReady => {
                    let b = byte.expect("SysmissReady always has a byte");
                    if b != NUMBER_SEPARATOR {
                        return self.reject(PorError::Syntax {
                            message: "sysmiss marker not followed by a separator".into(),
                            position: None,
                        });
                    }
                    self.visitor.sysmiss();
                    self.state = State::NextColumn;
                    return Ok(());
                }
                State::StrlenReady => {
                    if !self.saw_digit {
                        return self.reject(PorError::Syntax {
                            message: "string length cell has no digits".into(),
                            position: None,
                        });
                    }
                    match self.number.consume(None) {
                        NumberStatus::Accepted => {
                            let v = self.number.result().unwrap();
                            if v < 0.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
                                return self.reject(PorError::Syntax {
                                    message: "string length is not a valid non-negative integer".into(),
                                    position: None,
                                });
                            }
                            let len = v as u32;
                            if len == 0 || len > 255 {
                                return self.reject(PorError::StringTooLong { requested: len, max: 255 });
                            }
                            self.string_len = len;
                            self.vbase = self.vbuffer.len();
                            self.state = State::StringContents;
                        }
                        NumberStatus::Rejected => {
                            let err = self.number.result().unwrap_err();
                            return self.reject(err);
                        }
                        NumberStatus::Unfinished => {
                            return self.reject(PorError::Internal(
                                "number parser did not terminate on eof signal",
                            ));
                        }
                    }
                    continue;
                }
                State::StringContents => {
                    let b = byte.expect("StringContents always has a byte");
                    self.vbuffer.push(b);
                    if (self.vbuffer.len() - self.vbase) as u32 == self.string_len {
                        self.state = State::StringReady;
                    }
                    return Ok(());
                }
                State::StringReady => {
                    let payload = &self.vbuffer[self.vbase..];
                    self.visitor.string(payload);
                    self.state = State::NextColumn;
                    continue;
                }
                State::NextColumn => {
                    self.x += 1;
                    if self.x == self.config.types.len() {
                        self.state = State::NextRow;
                    }
                    else {
                        self.state = State::NewColumn;
                    }
                    continue;
                }
                State::NextRow => {
                    self.visitor.end_row();
                    self.y += 1;
                    self.x = 0;
                    self.state = State::NewRow;
                    continue;
                }
                State::Accept => return Ok(()),
                State::Error => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use por_core::radix::POR_BASE;

    #[derive(Default)]
    struct Recorder {
        cells: Vec<super::super::Cell>,
        rows: usize,
    }

    impl MatrixVisitor for Recorder {
        fn numeric(&mut self, value: f64) {
            self.cells.push(super::super::Cell::Numeric(value));
        }
        fn sysmiss(&mut self) {
            self.cells.push(super::super::Cell::Sysmiss);
        }
        fn string(&mut self, bytes: &[u8]) {
            self.cells.push(super::super::Cell::String(bytes.to_vec()));
        }
        fn end_row(&mut self) {
            self.rows += 1;
        }
    }

    fn radix() -> RadixTable {
        RadixTable::new(POR_BASE, None).unwrap()
    }

    fn feed(parser: &mut MatrixParser<'_, Recorder>, text: &[u8]) -> Result<Status> {
        let mut last = Status::Unfinished;
        for &b in text {
            last = parser.consume(b)?;
        }
        Ok(last)
    }

    #[test]
    fn matrix_end_emits_two_rows_of_two_numeric_cells() {
        let radix = radix();
        let config = MatrixParserConfig {
            types: vec![ColumnType::Numeric, ColumnType::Numeric],
            start_column: 0,
            row_width: 8,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        let status = feed(&mut parser, b"1/2/3/4/Z").unwrap();
        assert_eq!(status, Status::Accepted);
        assert_eq!(parser.ydim(), Some(2));
        let recorder = parser.into_visitor();
        assert_eq!(recorder.rows, 2);
        assert_eq!(
            recorder.cells,
            vec![
                super::super::Cell::Numeric(1.0),
                super::super::Cell::Numeric(2.0),
                super::super::Cell::Numeric(3.0),
                super::super::Cell::Numeric(4.0),
            ]
        );
    }

    #[test]
    fn sysmiss_in_numeric_column_is_emitted() {
        let radix = radix();
        let config = MatrixParserConfig {
            types: vec![ColumnType::Numeric],
            start_column: 0,
            row_width: 4,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        feed(&mut parser, b"*./Z").unwrap();
        let recorder = parser.into_visitor();
        assert_eq!(recorder.cells, vec![super::super::Cell::Sysmiss]);
    }

    #[test]
    fn sysmiss_in_string_column_is_a_syntax_error() {
        let radix = radix();
        let config = MatrixParserConfig {
            types: vec![ColumnType::String],
            start_column: 0,
            row_width: 4,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        assert!(feed(&mut parser, b"*.").is_err());
    }

    #[test]
    fn string_cell_is_emitted_with_its_payload() {
        let radix = radix();
        let config = MatrixParserConfig {
            types: vec![ColumnType::String],
            start_column: 0,
            row_width: 8,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        feed(&mut parser, b"5/ABCDEZ").unwrap();
        let recorder = parser.into_visitor();
        assert_eq!(recorder.cells, vec![super::super::Cell::String(b"ABCDE".to_vec())]);
    }

    #[test]
    fn short_line_padding_produces_same_matrix_as_full_width_line() {
        let radix = radix();
        let config = MatrixParserConfig {
            types: vec![ColumnType::Numeric, ColumnType::Numeric],
            start_column: 0,
            row_width: 80,
            precision: Precision::Fast,
        };
        let mut parser = MatrixParser::new(&radix, config, Recorder::default());
        feed(&mut parser, b"1/2/\n3/4/Z").unwrap();
        let recorder = parser.into_visitor();
        assert_eq!(
            recorder.cells,
            vec![
                super::super::Cell::Numeric(1.0),
                super::super::Cell::Numeric(2.0),
                super::super::Cell::Numeric(3.0),
                super::super::Cell::Numeric(4.0),
            ]
        );
    }
}
