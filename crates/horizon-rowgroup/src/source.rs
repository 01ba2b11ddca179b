//! Source collection updates.
//!
//! The flattener owns its source collection. Changes made through the
//! flattener rebuild the row sequence once per call; changes made in bulk go
//! through one of two coalescing paths:
//!
//! - [`SourceBatch`]: a guard with mutable access to the collection. The
//!   rebuild happens once, when the guard drops.
//! - [`SourceQueue`]: a cloneable, `Send` handle for background loaders.
//!   Updates wait in a channel until the owner calls
//!   [`apply_pending_updates`](crate::GroupedRowFlattener::apply_pending_updates),
//!   which applies all of them and rebuilds once.
//!
//! # Example
//!
//! ```
//! use horizon_rowgroup::{FieldMap, GroupedRowFlattener};
//!
//! let mut flattener = GroupedRowFlattener::<FieldMap>::new();
//! let queue = flattener.update_queue();
//!
//! std::thread::spawn(move || {
//!     for i in 0..3 {
//!         queue.push(FieldMap::new().with("Id", i));
//!     }
//! })
//! .join()
//! .unwrap();
//!
//! assert!(flattener.is_empty());
//! assert_eq!(flattener.apply_pending_updates(), 3);
//! assert_eq!(flattener.len(), 3);
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_channel::Sender;
use horizon_rowgroup_core::rowgroup_warn;

use crate::flattener::GroupedRowFlattener;
use crate::record::FieldAccessor;

/// A change to the source collection.
pub enum SourceUpdate<R> {
    /// Append one record.
    Push(Arc<R>),
    /// Append several records.
    Extend(Vec<Arc<R>>),
    /// Replace the whole collection.
    Replace(Vec<Arc<R>>),
    /// Remove a record, matched by identity.
    Remove(Arc<R>),
    /// Remove every record.
    Clear,
}

impl<R> SourceUpdate<R> {
    /// Applies this update to a collection.
    pub fn apply(self, source: &mut Vec<Arc<R>>) {
        match self {
            SourceUpdate::Push(record) => source.push(record),
            SourceUpdate::Extend(records) => source.extend(records),
            SourceUpdate::Replace(records) => *source = records,
            SourceUpdate::Remove(record) => source.retain(|r| !Arc::ptr_eq(r, &record)),
            SourceUpdate::Clear => source.clear(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SourceUpdate::Push(_) => "push",
            SourceUpdate::Extend(_) => "extend",
            SourceUpdate::Replace(_) => "replace",
            SourceUpdate::Remove(_) => "remove",
            SourceUpdate::Clear => "clear",
        }
    }
}

/// A handle for queueing source updates from any thread.
///
/// Obtained from [`GroupedRowFlattener::update_queue`]. Sending never
/// blocks. Once the flattener is dropped, updates are discarded.
pub struct SourceQueue<R> {
    sender: Sender<SourceUpdate<R>>,
}

impl<R> Clone for SourceQueue<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<R> SourceQueue<R> {
    pub(crate) fn new(sender: Sender<SourceUpdate<R>>) -> Self {
        Self { sender }
    }

    /// Queues an update. Returns `false` if the flattener is gone.
    pub fn send(&self, update: SourceUpdate<R>) -> bool {
        let kind = update.name();
        match self.sender.send(update) {
            Ok(()) => true,
            Err(_) => {
                rowgroup_warn!(kind, "source update dropped, flattener is gone");
                false
            }
        }
    }

    /// Queues appending a record.
    pub fn push(&self, record: impl Into<Arc<R>>) -> bool {
        self.send(SourceUpdate::Push(record.into()))
    }

    /// Queues appending several records.
    pub fn extend<I>(&self, records: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        self.send(SourceUpdate::Extend(records.into_iter().map(Into::into).collect()))
    }

    /// Queues replacing the whole collection.
    pub fn replace<I>(&self, records: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        self.send(SourceUpdate::Replace(records.into_iter().map(Into::into).collect()))
    }

    /// Queues removing a record.
    pub fn remove(&self, record: Arc<R>) -> bool {
        self.send(SourceUpdate::Remove(record))
    }

    /// Queues removing every record.
    pub fn clear(&self) -> bool {
        self.send(SourceUpdate::Clear)
    }

    /// Returns the number of updates waiting to be applied.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

/// Mutable access to a flattener's source collection.
///
/// Returned by [`GroupedRowFlattener::batch`]. The row sequence is rebuilt
/// once when the guard drops, however many changes were made.
pub struct SourceBatch<'a, R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    flattener: &'a mut GroupedRowFlattener<R>,
}

impl<'a, R> SourceBatch<'a, R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    pub(crate) fn new(flattener: &'a mut GroupedRowFlattener<R>) -> Self {
        Self { flattener }
    }
}

impl<R> Deref for SourceBatch<'_, R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    type Target = Vec<Arc<R>>;

    fn deref(&self) -> &Self::Target {
        self.flattener.source_vec()
    }
}

impl<R> DerefMut for SourceBatch<'_, R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.flattener.source_vec_mut()
    }
}

impl<R> Drop for SourceBatch<'_, R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.flattener.rebuild();
    }
}
