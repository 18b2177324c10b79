//! Gausstable precomputes the 1-D Gaussian kernels of a SIFT-style
//! scale-space octave.
//!
//! For every level of an octave it picks the blur (sigma), the kernel
//! truncation radius (span) and the normalized coefficients, and publishes
//! them in a fixed-layout read-only table for the convolution kernels. Two
//! span conventions are supported (VLFeat and OpenCV). With the
//! `absolute-sigma` feature the table also carries kernels that blur level 1
//! directly into each later level.

pub mod builder;
pub mod config;
mod init;
pub mod lowlevel;
pub mod publish;
pub mod span;
pub mod table;
mod trace;
pub mod util;

pub use builder::GaussTableBuilder;
pub use config::{GaussConfig, DEFAULT_INITIAL_BLUR, DEFAULT_LEVELS, DEFAULT_SIGMA0};
pub use init::{build_table, init_filter, init_filter_with};
pub use publish::{PublishedTable, TablePublisher};
pub use span::SpanMode;
pub use table::{GaussTable, GAUSS_ALIGN, GAUSS_LEVELS};
pub use util::math::octave_sigma;
pub use util::{GaussError, GaussResult};
