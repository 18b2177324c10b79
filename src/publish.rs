//! Process-wide slot holding the published Gaussian table.
//!
//! The slot has a single writer (table initialization) and many readers (the
//! convolution kernels). Publishing swaps in a new `Arc<GaussTable>` and
//! bumps the epoch. CPU readers keep the snapshot they took, so they never see
//! coefficients from two configurations.
//!
//! Device consumers are different: once a table has been copied into device
//! constant memory, republishing overwrites it in place. Callers must wait for
//! every in-flight consumer of the current epoch to complete before they
//! publish again. This module does not enforce that.

use crate::table::GaussTable;
use crate::trace::{trace_event, trace_span};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A table together with the epoch it was published in.
#[derive(Clone, Debug)]
pub struct PublishedTable {
    epoch: u64,
    table: Arc<GaussTable>,
}

impl PublishedTable {
    /// Publication counter; the first table published gets epoch 1.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the published table.
    pub fn table(&self) -> &GaussTable {
        &self.table
    }

    /// Returns a shared handle to the published table.
    pub fn shared(&self) -> Arc<GaussTable> {
        Arc::clone(&self.table)
    }
}

impl std::ops::Deref for PublishedTable {
    type Target = GaussTable;

    fn deref(&self) -> &GaussTable {
        &self.table
    }
}

/// Single-writer slot for the active table.
pub struct TablePublisher {
    slot: RwLock<Option<PublishedTable>>,
    epoch: AtomicU64,
}

static DEVICE_TABLE: TablePublisher = TablePublisher::new();

impl Default for TablePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePublisher {
    /// Creates an empty publisher.
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// The process-wide publisher read by the convolution kernels.
    pub fn global() -> &'static TablePublisher {
        &DEVICE_TABLE
    }

    /// Replaces the active table and returns the new publication.
    pub fn publish(&self, table: GaussTable) -> PublishedTable {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let _span = trace_span!("publish_table", epoch = epoch).entered();
        let published = PublishedTable {
            epoch,
            table: Arc::new(table),
        };
        if let Some(previous) = slot.replace(published.clone()) {
            trace_event!("table_replaced", previous_epoch = previous.epoch);
        }
        published
    }

    /// Returns the active table, if any.
    pub fn current(&self) -> Option<PublishedTable> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of tables published so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Removes the active table. The epoch counter is kept.
    pub fn teardown(&self) -> Option<PublishedTable> {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
