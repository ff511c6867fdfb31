// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::ToString;
use alloc::vec::Vec;
use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::ParseError;

/// Tolerance used by [`is_zero`] and [`is_one`].
pub(crate) const EPSILON: f64 = 1e-6;

/// Convert degrees to radians.
pub fn deg2rad(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Convert radians to degrees.
pub fn rad2deg(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// True if `value` is within `1e-6` of zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// True if `value` is within `1e-6` of one.
pub fn is_one(value: f64) -> bool {
    (value - 1.0).abs() < EPSILON
}

/// Split `text` on commas and parse exactly `N` finite numbers.
pub(crate) fn parse_fields<const N: usize>(text: &str) -> Result<[f64; N], ParseError> {
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != N {
        return Err(ParseError::FieldCount {
            expected: N,
            found: fields.len(),
        });
    }
    let mut out = [0.0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        let trimmed = field.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => *slot = v,
            _ => return Err(ParseError::NotANumber(trimmed.to_string())),
        }
    }
    Ok(out)
}
