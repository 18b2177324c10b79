//! The per-octave Gaussian table and its fixed binary layout.
//!
//! `GaussTable` is laid out exactly as the device-side convolution kernels
//! expect it: `#[repr(C)]`, no padding, 32-bit fields only. Every filter table
//! holds `GAUSS_LEVELS` rows of `GAUSS_ALIGN` coefficients. Rows are
//! half-sided: index 0 is the centre tap and index `i` is the tap applied at
//! offsets `+i` and `-i`.
//!
//! Row 0 of the incremental table is special. With a non-zero assumed input
//! blur it holds the remaining blur needed to reach sigma0; with zero input
//! blur it holds the sigma0 filter itself. In the absolute table rows 0 and 1
//! are always zero because level 1 is the reference every other level is
//! blurred from.

use std::fmt;

pub mod layout;

/// Coefficients reserved per table row.
pub const GAUSS_ALIGN: usize = 32;

/// Rows reserved per table (levels `0..GAUSS_LEVELS`).
pub const GAUSS_LEVELS: usize = 21;

/// Largest kernel radius that fits a half-sided row.
pub const MAX_SPAN: usize = GAUSS_ALIGN - 1;

/// Largest octave level count: a build fills levels `0..=levels + 2`.
pub const MAX_LEVEL_COUNT: usize = GAUSS_LEVELS - 3;

const FILTER_LEN: usize = GAUSS_ALIGN * GAUSS_LEVELS;

/// Gaussian filter tables for every level of one octave.
///
/// Tables are produced by [`GaussTableBuilder`](crate::builder::GaussTableBuilder)
/// and are read-only afterwards.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GaussTable {
    pub(crate) required_filter_stages: i32,
    pub(crate) incremental_filter: [f32; FILTER_LEN],
    #[cfg(feature = "absolute-sigma")]
    pub(crate) from_lvl_1: [f32; FILTER_LEN],
    #[cfg(feature = "absolute-sigma")]
    pub(crate) abs_sigma: [f32; GAUSS_LEVELS],
    pub(crate) sigma: [f32; GAUSS_LEVELS],
    pub(crate) initial_sigma: f32,
    pub(crate) span: [i32; GAUSS_LEVELS],
    #[cfg(feature = "absolute-sigma")]
    pub(crate) abs_span: [i32; GAUSS_LEVELS],
}

impl GaussTable {
    /// Returns a table with every field set to zero.
    pub fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }

    /// Number of incremental convolutions a consumer chains to produce every
    /// level, counting the level-0 stage.
    pub fn required_filter_stages(&self) -> usize {
        self.required_filter_stages.max(0) as usize
    }

    /// Blur applied to the input image to produce level 0.
    pub fn initial_sigma(&self) -> f32 {
        self.initial_sigma
    }

    /// Sigma the incremental row of `level` was built with.
    pub fn sigma(&self, level: usize) -> Option<f32> {
        self.sigma.get(level).copied()
    }

    /// Radius of the incremental kernel of `level`.
    pub fn span(&self, level: usize) -> Option<usize> {
        self.span.get(level).map(|&s| s.max(0) as usize)
    }

    /// The half-sided incremental row of `level` (`GAUSS_ALIGN` values).
    pub fn incremental_row(&self, level: usize) -> Option<&[f32]> {
        row(&self.incremental_filter, level)
    }

    /// The incremental kernel of `level` expanded to `2 * span + 1` taps.
    pub fn incremental_kernel(&self, level: usize) -> Option<Vec<f32>> {
        Some(expand(self.incremental_row(level)?, self.span(level)?))
    }

    /// Returns the raw bytes of the table in its published layout.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Returns true when every field of the table is zero.
    pub fn is_zeroed(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }

    pub(crate) fn incremental_row_mut(&mut self, level: usize) -> &mut [f32] {
        let start = level * GAUSS_ALIGN;
        &mut self.incremental_filter[start..start + GAUSS_ALIGN]
    }
}

#[cfg(feature = "absolute-sigma")]
impl GaussTable {
    /// Blur that takes level 1 directly to `level`. Zero for levels 0 and 1.
    pub fn abs_sigma(&self, level: usize) -> Option<f32> {
        self.abs_sigma.get(level).copied()
    }

    /// Radius of the from-level-1 kernel of `level`.
    pub fn abs_span(&self, level: usize) -> Option<usize> {
        self.abs_span.get(level).map(|&s| s.max(0) as usize)
    }

    /// The half-sided from-level-1 row of `level` (`GAUSS_ALIGN` values).
    pub fn from_level1_row(&self, level: usize) -> Option<&[f32]> {
        row(&self.from_lvl_1, level)
    }

    /// The from-level-1 kernel of `level` expanded to `2 * abs_span + 1` taps.
    pub fn from_level1_kernel(&self, level: usize) -> Option<Vec<f32>> {
        Some(expand(self.from_level1_row(level)?, self.abs_span(level)?))
    }

    pub(crate) fn from_level1_row_mut(&mut self, level: usize) -> &mut [f32] {
        let start = level * GAUSS_ALIGN;
        &mut self.from_lvl_1[start..start + GAUSS_ALIGN]
    }
}

impl Default for GaussTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

fn row(filter: &[f32; FILTER_LEN], level: usize) -> Option<&[f32]> {
    if level >= GAUSS_LEVELS {
        return None;
    }
    let start = level * GAUSS_ALIGN;
    filter.get(start..start + GAUSS_ALIGN)
}

fn expand(half: &[f32], radius: usize) -> Vec<f32> {
    let radius = radius.min(half.len().saturating_sub(1));
    let mut taps = Vec::with_capacity(2 * radius + 1);
    taps.extend(half[1..=radius].iter().rev());
    taps.extend_from_slice(&half[..=radius]);
    taps
}

impl fmt::Debug for GaussTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels = self.required_filter_stages().min(GAUSS_LEVELS);
        let mut dbg = f.debug_struct("GaussTable");
        dbg.field("required_filter_stages", &self.required_filter_stages)
            .field("initial_sigma", &self.initial_sigma)
            .field("sigma", &&self.sigma[..levels])
            .field("span", &&self.span[..levels]);
        #[cfg(feature = "absolute-sigma")]
        {
            dbg.field("abs_sigma", &&self.abs_sigma[..levels])
                .field("abs_span", &&self.abs_span[..levels]);
        }
        dbg.finish_non_exhaustive()
    }
}

/// Human-readable dump of every populated level.
impl fmt::Display for GaussTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels = self.required_filter_stages().min(GAUSS_LEVELS);
        writeln!(f, "initial sigma: {:.6}", self.initial_sigma)?;
        writeln!(f, "required filter stages: {}", self.required_filter_stages)?;
        writeln!(f, "incremental filters:")?;
        for level in 0..levels {
            write_row(
                f,
                level,
                self.sigma[level],
                self.span[level],
                &self.incremental_filter[level * GAUSS_ALIGN..(level + 1) * GAUSS_ALIGN],
            )?;
        }
        #[cfg(feature = "absolute-sigma")]
        {
            writeln!(f, "from-level-1 filters:")?;
            for level in 0..levels {
                write_row(
                    f,
                    level,
                    self.abs_sigma[level],
                    self.abs_span[level],
                    &self.from_lvl_1[level * GAUSS_ALIGN..(level + 1) * GAUSS_ALIGN],
                )?;
            }
        }
        Ok(())
    }
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    level: usize,
    sigma: f32,
    span: i32,
    row: &[f32],
) -> fmt::Result {
    write!(f, "  level {level:2}  sigma {sigma:9.6}  span {span:2} |")?;
    let taps = (span.max(0) as usize + 1).min(row.len());
    if span > 0 {
        for value in &row[..taps] {
            write!(f, " {value:.6}")?;
        }
    }
    writeln!(f)
}
