//! Table initialization entry points.

use crate::builder::GaussTableBuilder;
use crate::config::GaussConfig;
use crate::publish::{PublishedTable, TablePublisher};
use crate::table::GaussTable;
use crate::util::GaussResult;

/// Builds the Gaussian table for one octave configuration without publishing it.
pub fn build_table(config: &GaussConfig, sigma0: f32, levels: usize) -> GaussResult<GaussTable> {
    GaussTableBuilder::new().build(config, sigma0, levels)
}

/// Builds the table and publishes it to the process-wide slot.
///
/// On error nothing is published and the previously active table, if any,
/// stays in place. All in-flight consumers of the previous table must have
/// completed before this is called.
pub fn init_filter(
    config: &GaussConfig,
    sigma0: f32,
    levels: usize,
) -> GaussResult<PublishedTable> {
    init_filter_with(TablePublisher::global(), config, sigma0, levels)
}

/// Builds the table and publishes it to `publisher`.
pub fn init_filter_with(
    publisher: &TablePublisher,
    config: &GaussConfig,
    sigma0: f32,
    levels: usize,
) -> GaussResult<PublishedTable> {
    let table = build_table(config, sigma0, levels)?;
    Ok(publisher.publish(table))
}
