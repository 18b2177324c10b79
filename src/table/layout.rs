//! Byte offsets of the published table fields.
//!
//! Device kernels index the table by these offsets, so field order and array
//! sizes must change together with the consumers.

use super::GaussTable;
use std::mem::{offset_of, size_of};

/// Total size of the published table in bytes.
pub const TABLE_BYTES: usize = size_of::<GaussTable>();

/// Offset of `required_filter_stages` (`i32`).
pub const REQUIRED_FILTER_STAGES: usize = offset_of!(GaussTable, required_filter_stages);

/// Offset of the incremental filter table (`f32[GAUSS_ALIGN * GAUSS_LEVELS]`).
pub const INCREMENTAL_FILTER: usize = offset_of!(GaussTable, incremental_filter);

/// Offset of the from-level-1 filter table (`f32[GAUSS_ALIGN * GAUSS_LEVELS]`).
#[cfg(feature = "absolute-sigma")]
pub const FROM_LEVEL_1: usize = offset_of!(GaussTable, from_lvl_1);

/// Offset of the absolute sigmas (`f32[GAUSS_LEVELS]`).
#[cfg(feature = "absolute-sigma")]
pub const ABS_SIGMA: usize = offset_of!(GaussTable, abs_sigma);

/// Offset of the incremental sigmas (`f32[GAUSS_LEVELS]`).
pub const SIGMA: usize = offset_of!(GaussTable, sigma);

/// Offset of `initial_sigma` (`f32`).
pub const INITIAL_SIGMA: usize = offset_of!(GaussTable, initial_sigma);

/// Offset of the incremental spans (`i32[GAUSS_LEVELS]`).
pub const SPAN: usize = offset_of!(GaussTable, span);

/// Offset of the absolute spans (`i32[GAUSS_LEVELS]`).
#[cfg(feature = "absolute-sigma")]
pub const ABS_SPAN: usize = offset_of!(GaussTable, abs_span);
