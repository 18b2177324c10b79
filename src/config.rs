//! Scale-space configuration consumed by the table builder.

use crate::span::SpanMode;
use crate::util::{GaussError, GaussResult};

/// Base sigma of an octave used by Lowe's SIFT.
pub const DEFAULT_SIGMA0: f32 = 1.6;

/// Default number of levels per octave.
pub const DEFAULT_LEVELS: usize = 3;

/// Blur assumed to be present in a camera image.
pub const DEFAULT_INITIAL_BLUR: f32 = 0.5;

/// Settings that shape the Gaussian tables of an octave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussConfig {
    /// Policy used to pick kernel radii.
    pub span_mode: SpanMode,
    /// Blur assumed to be present in the input image. Zero means none.
    pub initial_blur: f32,
}

impl Default for GaussConfig {
    fn default() -> Self {
        Self {
            span_mode: SpanMode::default(),
            initial_blur: DEFAULT_INITIAL_BLUR,
        }
    }
}

impl GaussConfig {
    /// Returns a copy with a different span policy.
    pub fn with_span_mode(mut self, span_mode: SpanMode) -> Self {
        self.span_mode = span_mode;
        self
    }

    /// Returns a copy with a different assumed input blur.
    pub fn with_initial_blur(mut self, initial_blur: f32) -> Self {
        self.initial_blur = initial_blur;
        self
    }

    /// Returns true when the input image is assumed to be blurred already.
    pub fn has_initial_blur(&self) -> bool {
        self.initial_blur != 0.0
    }

    /// Checks the configuration against a base sigma.
    pub fn validate(&self, sigma0: f32) -> GaussResult<()> {
        if !sigma0.is_finite() || sigma0 <= 0.0 {
            return Err(GaussError::NonPositiveSigma { sigma: sigma0 });
        }
        if !self.initial_blur.is_finite() || self.initial_blur < 0.0 {
            return Err(GaussError::InvalidInput(
                "initial blur must be finite and non-negative",
            ));
        }
        if self.initial_blur >= sigma0 {
            return Err(GaussError::InitialBlurTooLarge {
                initial_blur: self.initial_blur,
                sigma0,
            });
        }
        Ok(())
    }

    /// Blur still needed to bring the input up to `sigma0`.
    pub(crate) fn initial_sigma(&self, sigma0: f32) -> f32 {
        if self.has_initial_blur() {
            crate::util::math::blur_difference(f64::from(sigma0), f64::from(self.initial_blur))
                as f32
        } else {
            sigma0
        }
    }
}
