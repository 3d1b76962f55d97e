// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons.
//!
//! Re-exports the `approx` assertion macros used when comparing rendered
//! audio samples and geo-coordinates, where `assert_eq!` is too strict.

pub use approx::{assert_abs_diff_eq, assert_relative_eq};

/// Default epsilon for f32 sample comparisons.
pub const F32_EPSILON: f32 = 1e-6;

/// Default epsilon for f64 coordinate comparisons.
pub const F64_EPSILON: f64 = 1e-10;
