// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `por-core` holds the arbitrary-radix numeric codec (the [`radix`] system and the [`number`]
//! parser/formatter pair), the 256-entry [`translation`] table, the chunked [`store`], and the
//! shared [`errors`] type. These are the pieces the line-framed reader/writer and the matrix
//! parser/emitter in `por-format` build on.

pub mod errors;
pub mod number;
pub mod radix;
pub mod store;
pub mod translation;

pub use errors::{PorError, Result};
pub use radix::RadixTable;
pub use translation::TranslationTable;
