//! Low-level building blocks for driving the table builder by hand.
//!
//! Most users should call [`init_filter`](crate::init_filter) or
//! [`build_table`](crate::build_table). These exports allow filling a table
//! level by level, for example to inspect intermediate states.

#[cfg(feature = "absolute-sigma")]
pub use crate::builder::AbsoluteSigma;
pub use crate::builder::{BuildState, GaussTableBuilder};
pub use crate::span::{
    OpenCvSpan, SpanPolicy, VlFeatSpan, OPENCV_SIGMA_FACTOR, VLFEAT_WINDOW_FACTOR,
};
pub use crate::table::layout;
pub use crate::table::{MAX_LEVEL_COUNT, MAX_SPAN};
