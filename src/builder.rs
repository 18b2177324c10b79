//! Level-by-level construction of a [`GaussTable`].
//!
//! A builder walks through `Uninitialized -> Cleared -> Building -> Built`.
//! Table-mutating calls are only accepted from `Cleared` or from `Building`
//! at the next level in sequence; anything else is reported as an error and
//! leaves the table untouched.

use crate::config::GaussConfig;
use crate::span::SpanMode;
use crate::table::{GaussTable, GAUSS_ALIGN, GAUSS_LEVELS, MAX_LEVEL_COUNT, MAX_SPAN};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{blur_difference, gaussian_half_row, is_valid_sigma, octave_sigma};
use crate::util::{GaussError, GaussResult};

/// Lifecycle of a [`GaussTableBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    /// Created but never cleared.
    Uninitialized,
    /// Every field is zero and level 0 is next.
    Cleared,
    /// Levels below `next_level` are filled.
    Building { next_level: usize },
    /// The table has been finished and handed out.
    Built,
}

/// Kernel that blurs level 1 directly into a later level.
///
/// Only available with the `absolute-sigma` feature. Blurring from level 1
/// avoids the rounding error that compounds along a chain of incremental
/// convolutions.
#[cfg(feature = "absolute-sigma")]
pub trait AbsoluteSigma {
    /// Fills the from-level-1 row, `abs_span` and `abs_sigma` of `level`.
    ///
    /// Levels start at 2 and must follow the incremental entry of the same
    /// level.
    fn compute_absolute_entry(
        &mut self,
        level: usize,
        radius: usize,
        sigma: f32,
    ) -> GaussResult<()>;
}

/// Computes the Gaussian table of one octave configuration.
pub struct GaussTableBuilder {
    table: Box<GaussTable>,
    span_mode: SpanMode,
    state: BuildState,
    #[cfg(feature = "absolute-sigma")]
    next_abs_level: usize,
}

impl Default for GaussTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussTableBuilder {
    /// Creates an uninitialized builder using the default span policy.
    pub fn new() -> Self {
        Self {
            table: Box::new(GaussTable::zeroed()),
            span_mode: SpanMode::default(),
            state: BuildState::Uninitialized,
            #[cfg(feature = "absolute-sigma")]
            next_abs_level: FIRST_ABSOLUTE_LEVEL,
        }
    }

    /// Resets every field of the table to zero.
    pub fn clear(&mut self) {
        *self.table = GaussTable::zeroed();
        self.state = BuildState::Cleared;
        #[cfg(feature = "absolute-sigma")]
        {
            self.next_abs_level = FIRST_ABSOLUTE_LEVEL;
        }
    }

    /// Selects the span policy for subsequent span queries.
    ///
    /// Levels that are already filled keep their radii.
    pub fn set_span_mode(&mut self, mode: SpanMode) {
        self.span_mode = mode;
    }

    /// Returns the active span policy.
    pub fn span_mode(&self) -> SpanMode {
        self.span_mode
    }

    /// Returns the kernel radius for `sigma` under the active policy.
    pub fn get_span(&self, sigma: f32) -> GaussResult<usize> {
        self.span_mode.radius(sigma)
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Returns the table as filled so far.
    pub fn table(&self) -> &GaussTable {
        &self.table
    }

    /// Fills the incremental row, span and sigma of `level`.
    ///
    /// The row samples a Gaussian of `sigma` at offsets `0..=radius` and is
    /// normalized over the full symmetric kernel. Row 0 is the blur applied to
    /// the input image, so level 0 also sets `initial_sigma`.
    pub fn compute_incremental_entry(
        &mut self,
        level: usize,
        radius: usize,
        sigma: f32,
    ) -> GaussResult<()> {
        check_level(level)?;
        let expected = match self.state {
            BuildState::Cleared => 0,
            BuildState::Building { next_level } => next_level,
            state => {
                return Err(GaussError::InvalidState {
                    state,
                    op: "compute an incremental entry",
                })
            }
        };
        if level != expected {
            return Err(GaussError::LevelOrder {
                expected,
                got: level,
            });
        }
        check_entry(level, radius, sigma)?;

        gaussian_half_row(self.table.incremental_row_mut(level), radius, sigma);
        self.table.span[level] = radius as i32;
        self.table.sigma[level] = sigma;
        if level == 0 {
            self.table.initial_sigma = sigma;
        }
        self.state = BuildState::Building {
            next_level: level + 1,
        };
        trace_event!("incremental_entry", level = level, sigma = sigma, span = radius);
        Ok(())
    }

    /// Completes the table and returns a copy of it.
    ///
    /// `required_filter_stages` is set to the number of filled levels. At
    /// least levels 0 and 1 must be filled, and with `absolute-sigma` every
    /// filled level from 2 on needs its absolute entry.
    pub fn finish(&mut self) -> GaussResult<GaussTable> {
        let BuildState::Building { next_level } = self.state else {
            return Err(GaussError::InvalidState {
                state: self.state,
                op: "finish",
            });
        };
        if next_level < MIN_FINISHED_LEVELS {
            return Err(GaussError::InvalidState {
                state: self.state,
                op: "finish before level 1 is filled",
            });
        }
        #[cfg(feature = "absolute-sigma")]
        {
            if self.next_abs_level != next_level {
                return Err(GaussError::InvalidState {
                    state: self.state,
                    op: "finish with missing absolute entries",
                });
            }
        }
        self.table.required_filter_stages = next_level as i32;
        self.state = BuildState::Built;
        Ok(*self.table)
    }

    /// Builds the complete table for one octave configuration.
    ///
    /// Every sigma and radius is validated before the table is touched, so a
    /// rejected configuration leaves the builder as it was. On success the
    /// builder is `Built` and holds the returned table.
    pub fn build(
        &mut self,
        config: &GaussConfig,
        sigma0: f32,
        levels: usize,
    ) -> GaussResult<GaussTable> {
        let _span = trace_span!(
            "build_gauss_table",
            sigma0 = sigma0,
            levels = levels,
            span_mode = config.span_mode.as_str()
        )
        .entered();

        let plan = OctavePlan::new(config, sigma0, levels)?;

        self.clear();
        self.set_span_mode(config.span_mode);
        for entry in &plan.incremental {
            self.compute_incremental_entry(entry.level, entry.radius, entry.sigma)?;
            #[cfg(feature = "absolute-sigma")]
            {
                if let Some(abs) = plan.absolute.iter().find(|abs| abs.level == entry.level) {
                    self.compute_absolute_entry(abs.level, abs.radius, abs.sigma)?;
                }
            }
        }
        self.finish()
    }
}

/// Level 1 is the absolute reference, so a table covers at least levels 0 and 1.
const MIN_FINISHED_LEVELS: usize = 2;

#[cfg(feature = "absolute-sigma")]
const FIRST_ABSOLUTE_LEVEL: usize = MIN_FINISHED_LEVELS;

#[cfg(feature = "absolute-sigma")]
impl AbsoluteSigma for GaussTableBuilder {
    fn compute_absolute_entry(
        &mut self,
        level: usize,
        radius: usize,
        sigma: f32,
    ) -> GaussResult<()> {
        check_level(level)?;
        let BuildState::Building { next_level } = self.state else {
            return Err(GaussError::InvalidState {
                state: self.state,
                op: "compute an absolute entry",
            });
        };
        if level != self.next_abs_level {
            return Err(GaussError::LevelOrder {
                expected: self.next_abs_level,
                got: level,
            });
        }
        if level >= next_level {
            return Err(GaussError::InvalidState {
                state: self.state,
                op: "compute an absolute entry before its incremental entry",
            });
        }
        check_entry(level, radius, sigma)?;

        gaussian_half_row(self.table.from_level1_row_mut(level), radius, sigma);
        self.table.abs_span[level] = radius as i32;
        self.table.abs_sigma[level] = sigma;
        self.next_abs_level = level + 1;
        trace_event!("absolute_entry", level = level, sigma = sigma, span = radius);
        Ok(())
    }
}

/// Checks a level count against the table capacity.
pub(crate) fn check_level_count(levels: usize) -> GaussResult<()> {
    if levels == 0 {
        return Err(GaussError::InvalidLevelCount { levels });
    }
    if levels > MAX_LEVEL_COUNT {
        return Err(GaussError::TooManyLevels {
            levels,
            max: MAX_LEVEL_COUNT,
        });
    }
    Ok(())
}

fn check_level(level: usize) -> GaussResult<()> {
    if level >= GAUSS_LEVELS {
        return Err(GaussError::LevelOutOfRange {
            level,
            max: GAUSS_LEVELS - 1,
        });
    }
    Ok(())
}

fn check_entry(level: usize, radius: usize, sigma: f32) -> GaussResult<()> {
    if !is_valid_sigma(sigma) {
        return Err(GaussError::NonPositiveSigma { sigma });
    }
    if radius > MAX_SPAN {
        return Err(GaussError::SpanTooWide {
            level,
            radius,
            capacity: GAUSS_ALIGN,
        });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
struct PlannedEntry {
    level: usize,
    radius: usize,
    sigma: f32,
}

/// Every sigma and radius of an octave, computed up front.
struct OctavePlan {
    incremental: Vec<PlannedEntry>,
    #[cfg(feature = "absolute-sigma")]
    absolute: Vec<PlannedEntry>,
}

impl OctavePlan {
    fn new(config: &GaussConfig, sigma0: f32, levels: usize) -> GaussResult<Self> {
        check_level_count(levels)?;
        config.validate(sigma0)?;

        let mode = config.span_mode;
        let planned = |level: usize, sigma: f64| -> GaussResult<PlannedEntry> {
            let sigma = sigma as f32;
            let radius = mode.radius(sigma)?;
            check_entry(level, radius, sigma)?;
            Ok(PlannedEntry {
                level,
                radius,
                sigma,
            })
        };

        // Row 0 carries the remaining blur up to sigma0, or sigma0 itself
        // when the input is assumed to be sharp.
        let initial_sigma = config.initial_sigma(sigma0);
        let last_level = levels + 2;
        let mut incremental = Vec::with_capacity(last_level + 1);
        incremental.push(planned(0, f64::from(initial_sigma))?);
        for level in 1..=last_level {
            let prev = octave_sigma(sigma0, level - 1, levels);
            let target = octave_sigma(sigma0, level, levels);
            incremental.push(planned(level, blur_difference(target, prev))?);
        }

        #[cfg(feature = "absolute-sigma")]
        let absolute = {
            let reference = octave_sigma(sigma0, 1, levels);
            (FIRST_ABSOLUTE_LEVEL..=last_level)
                .map(|level| {
                    let target = octave_sigma(sigma0, level, levels);
                    planned(level, blur_difference(target, reference))
                })
                .collect::<GaussResult<Vec<_>>>()?
        };

        Ok(Self {
            incremental,
            #[cfg(feature = "absolute-sigma")]
            absolute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildState, GaussTableBuilder};
    use crate::config::GaussConfig;
    use crate::span::SpanMode;
    use crate::table::{GAUSS_ALIGN, GAUSS_LEVELS, MAX_LEVEL_COUNT};
    use crate::util::GaussError;

    #[test]
    fn mutation_requires_clear() {
        let mut builder = GaussTableBuilder::new();
        assert_eq!(builder.state(), BuildState::Uninitialized);
        let err = builder.compute_incremental_entry(0, 4, 1.0).unwrap_err();
        assert_eq!(
            err,
            GaussError::InvalidState {
                state: BuildState::Uninitialized,
                op: "compute an incremental entry",
            }
        );
        assert!(builder.table().is_zeroed());
    }

    #[test]
    fn levels_must_be_filled_in_order() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        assert_eq!(
            builder.compute_incremental_entry(1, 4, 1.0),
            Err(GaussError::LevelOrder {
                expected: 0,
                got: 1
            })
        );

        builder.compute_incremental_entry(0, 4, 1.0).unwrap();
        assert_eq!(builder.state(), BuildState::Building { next_level: 1 });
        assert_eq!(
            builder.compute_incremental_entry(0, 4, 1.1),
            Err(GaussError::LevelOrder {
                expected: 1,
                got: 0
            })
        );
        assert_eq!(builder.table().sigma(0), Some(1.0));
    }

    #[test]
    fn too_wide_span_leaves_row_untouched() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        let err = builder
            .compute_incremental_entry(0, GAUSS_ALIGN, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            GaussError::SpanTooWide {
                level: 0,
                radius: GAUSS_ALIGN,
                capacity: GAUSS_ALIGN,
            }
        );
        assert_eq!(builder.state(), BuildState::Cleared);
        assert!(builder.table().is_zeroed());
    }

    #[test]
    fn non_positive_sigma_is_rejected() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        assert_eq!(
            builder.compute_incremental_entry(0, 3, -1.0),
            Err(GaussError::NonPositiveSigma { sigma: -1.0 })
        );
        assert!(builder.get_span(0.0).is_err());
    }

    #[test]
    fn level_beyond_capacity_is_out_of_range() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        assert_eq!(
            builder.compute_incremental_entry(GAUSS_LEVELS, 3, 1.0),
            Err(GaussError::LevelOutOfRange {
                level: GAUSS_LEVELS,
                max: GAUSS_LEVELS - 1,
            })
        );
    }

    fn fill_levels(builder: &mut GaussTableBuilder, levels: std::ops::Range<usize>) {
        for level in levels {
            builder.compute_incremental_entry(level, 3, 1.0).unwrap();
            #[cfg(feature = "absolute-sigma")]
            {
                use super::AbsoluteSigma;
                if level >= 2 {
                    builder.compute_absolute_entry(level, 4, 1.5).unwrap();
                }
            }
        }
    }

    #[test]
    fn finish_counts_filled_levels() {
        let mut builder = GaussTableBuilder::new();
        assert!(builder.finish().is_err());
        builder.clear();
        fill_levels(&mut builder, 0..4);
        let table = builder.finish().unwrap();
        assert_eq!(table.required_filter_stages(), 4);
        assert_eq!(builder.state(), BuildState::Built);
        assert!(builder.compute_incremental_entry(4, 3, 1.0).is_err());
    }

    #[test]
    fn level_zero_sets_initial_sigma() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        builder.compute_incremental_entry(0, 7, 1.52).unwrap();
        assert_eq!(builder.table().initial_sigma(), 1.52);
        assert_eq!(builder.table().sigma(0), Some(1.52));
    }

    #[test]
    fn partial_build_cannot_finish() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        builder.compute_incremental_entry(0, 7, 1.52).unwrap();
        assert_eq!(
            builder.finish(),
            Err(GaussError::InvalidState {
                state: BuildState::Building { next_level: 1 },
                op: "finish before level 1 is filled",
            })
        );
        assert_eq!(builder.state(), BuildState::Building { next_level: 1 });

        builder.compute_incremental_entry(1, 5, 1.2).unwrap();
        let table = builder.finish().unwrap();
        assert_eq!(table.required_filter_stages(), 2);
        assert_eq!(table.initial_sigma(), table.sigma(0).unwrap());
    }

    #[cfg(feature = "absolute-sigma")]
    #[test]
    fn missing_absolute_entry_blocks_finish() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        fill_levels(&mut builder, 0..3);
        builder.compute_incremental_entry(3, 3, 1.0).unwrap();
        assert_eq!(
            builder.finish(),
            Err(GaussError::InvalidState {
                state: BuildState::Building { next_level: 4 },
                op: "finish with missing absolute entries",
            })
        );
        assert_ne!(builder.state(), BuildState::Built);
        assert_eq!(builder.table().required_filter_stages(), 0);
    }

    #[test]
    fn span_mode_switch_keeps_built_levels() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        let radius = builder.get_span(1.2).unwrap();
        builder.compute_incremental_entry(0, radius, 1.2).unwrap();
        builder.set_span_mode(SpanMode::OpenCv);
        assert_eq!(builder.span_mode(), SpanMode::OpenCv);
        assert_eq!(builder.table().span(0), Some(5));
        assert_eq!(builder.get_span(1.2).unwrap(), 4);
    }

    #[test]
    fn rejected_level_count_leaves_builder_untouched() {
        let mut builder = GaussTableBuilder::new();
        builder.clear();
        let err = builder
            .build(&GaussConfig::default(), 1.6, MAX_LEVEL_COUNT + 1)
            .unwrap_err();
        assert_eq!(
            err,
            GaussError::TooManyLevels {
                levels: MAX_LEVEL_COUNT + 1,
                max: MAX_LEVEL_COUNT,
            }
        );
        assert_eq!(builder.state(), BuildState::Cleared);
        assert!(builder.table().is_zeroed());
    }

    #[test]
    fn build_fills_levels_zero_through_levels_plus_two() {
        let mut builder = GaussTableBuilder::new();
        let table = builder.build(&GaussConfig::default(), 1.6, 3).unwrap();
        assert_eq!(table.required_filter_stages(), 6);
        for level in 0..=5 {
            assert!(table.sigma(level).unwrap() > 0.0);
            assert!(table.span(level).unwrap() > 0);
        }
        assert_eq!(table.sigma(6), Some(0.0));
        assert_eq!(table.span(6), Some(0));
    }

    #[cfg(feature = "absolute-sigma")]
    #[test]
    fn absolute_entries_start_at_level_two() {
        use super::AbsoluteSigma;

        let mut builder = GaussTableBuilder::new();
        builder.clear();
        builder.compute_incremental_entry(0, 3, 1.0).unwrap();
        builder.compute_incremental_entry(1, 3, 1.0).unwrap();
        assert_eq!(
            builder.compute_absolute_entry(1, 3, 1.0),
            Err(GaussError::LevelOrder {
                expected: 2,
                got: 1
            })
        );
        assert!(builder.compute_absolute_entry(2, 3, 1.0).is_err());

        builder.compute_incremental_entry(2, 3, 1.0).unwrap();
        builder.compute_absolute_entry(2, 4, 1.1).unwrap();
        assert_eq!(builder.table().abs_span(2), Some(4));
        assert_eq!(builder.table().abs_sigma(1), Some(0.0));
    }
}
