//! Kernel truncation policies.
//!
//! A span policy maps a Gaussian sigma to the half-width (radius) of its
//! truncated discrete kernel. Two conventions are supported, each pinned to
//! the default of the library it comes from. They are not interchangeable:
//! for the same sigma they generally disagree.

use crate::util::math::is_valid_sigma;
use crate::util::{GaussError, GaussResult};

/// Maps a sigma to a kernel radius.
pub trait SpanPolicy {
    /// Returns the truncation radius for `sigma`.
    ///
    /// Callers must pass a positive, finite sigma.
    fn radius(sigma: f32) -> usize;
}

/// Multiple of sigma used by VLFeat to size its smoothing window.
pub const VLFEAT_WINDOW_FACTOR: f32 = 4.0;

/// Sigma multiple OpenCV uses for the default kernel size of 8-bit images.
pub const OPENCV_SIGMA_FACTOR: f32 = 3.0;

/// VLFeat convention: `radius = max(ceil(4 * sigma), 1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VlFeatSpan;

impl SpanPolicy for VlFeatSpan {
    fn radius(sigma: f32) -> usize {
        ((VLFEAT_WINDOW_FACTOR * sigma).ceil() as usize).max(1)
    }
}

/// OpenCV convention: `ksize = cvRound(sigma * 3 * 2 + 1) | 1`, `radius = ksize / 2`.
///
/// `cvRound` rounds half to even.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenCvSpan;

impl SpanPolicy for OpenCvSpan {
    fn radius(sigma: f32) -> usize {
        let ksize = (sigma * OPENCV_SIGMA_FACTOR * 2.0 + 1.0).round_ties_even() as usize | 1;
        ksize / 2
    }
}

/// Selects the span policy used by a builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpanMode {
    /// VLFeat-style window sizing.
    #[default]
    VlFeat,
    /// OpenCV-style kernel sizing.
    OpenCv,
}

impl SpanMode {
    /// Returns the kernel radius for `sigma` under this policy.
    pub fn radius(self, sigma: f32) -> GaussResult<usize> {
        if !is_valid_sigma(sigma) {
            return Err(GaussError::NonPositiveSigma { sigma });
        }
        Ok(match self {
            SpanMode::VlFeat => VlFeatSpan::radius(sigma),
            SpanMode::OpenCv => OpenCvSpan::radius(sigma),
        })
    }

    /// Short lowercase name, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            SpanMode::VlFeat => "vlfeat",
            SpanMode::OpenCv => "opencv",
        }
    }
}

impl std::fmt::Display for SpanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpanMode {
    type Err = GaussError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vlfeat" => Ok(SpanMode::VlFeat),
            "opencv" => Ok(SpanMode::OpenCv),
            _ => Err(GaussError::InvalidInput("span mode must be vlfeat or opencv")),
        }
    }
}
