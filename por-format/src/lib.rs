// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all por-rs crates. Please see clippy.toml for their
// justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! `por-format` layers the line-framed reader/writer (E/F) and the data-matrix parser/emitter
//! (G/H) on top of `por-core`'s radix, numeric, and translation primitives. Together they turn a
//! byte stream into a stream of typed matrix cell events, and back.

pub mod line_reader;
pub mod line_writer;
pub mod matrix;
pub mod reader;
pub mod writer;

pub use line_reader::{LineReader, LineReaderConfig};
pub use line_writer::{EolStyle, LineWriter, LineWriterConfig};
pub use matrix::{Cell, ColumnType, MatrixVisitor};
pub use reader::MatrixReader;
pub use writer::MatrixWriter;
