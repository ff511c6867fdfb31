// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Failure to decode the textual form of a geometry value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input did not have the expected number of comma separated fields.
    #[error("expected {expected} comma separated values, found {found}")]
    FieldCount {
        /// Number of fields the format requires.
        expected: usize,
        /// Number of fields present in the input.
        found: usize,
    },
    /// A field was not a finite number.
    #[error("`{0}` is not a finite number")]
    NotANumber(String),
}
