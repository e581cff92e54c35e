// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `number` module holds the arbitrary-radix numeric codec: a push-driven parser
//! ([`parser`]) that turns a digit string into a `double`, a formatter ([`formatter`]) that does
//! the reverse, and the [`context`] abstraction shared between the `double`-only and
//! arbitrary-precision accumulation modes.

pub mod context;
pub mod formatter;
pub mod parser;

pub use context::Precision;
pub use formatter::NumberFormatter;
pub use parser::{NumberParser, Status};
