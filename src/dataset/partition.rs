//! Dataset partitions (splits such as `train` or `val`).

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use super::ids::ClassId;
use super::model::{DatasetAnnotation, DatasetClass, DatasetImage};
use crate::error::OdConvertError;

/// Classes keyed by id.
pub type ClassMap = BTreeMap<ClassId, Arc<DatasetClass>>;

/// A named split of a dataset.
///
/// Implementations compute each collection on first access and return the
/// same cached value on every later call. Parsing a partition is not cheap,
/// and callers such as `stats()` and the writers ask for the same
/// collections repeatedly.
pub trait DatasetPartition: Send + Sync {
    /// Unique name of this split within its dataset.
    fn name(&self) -> &str;

    /// Classes declared by this partition.
    fn classes(&self) -> Result<&ClassMap, OdConvertError>;

    /// Images in source order.
    fn images(&self) -> Result<&[DatasetImage], OdConvertError>;

    /// Annotations in source order.
    fn annotations(&self) -> Result<&[DatasetAnnotation], OdConvertError>;

    /// Returns `(image_count, annotation_count)`.
    fn stats(&self) -> Result<(usize, usize), OdConvertError> {
        Ok((self.images()?.len(), self.annotations()?.len()))
    }
}

/// A compute-once slot for a partition collection.
///
/// Backed by [`OnceLock`], so concurrent first calls still store exactly one
/// value. A failed initialisation stores nothing and is retried by the next
/// caller.
#[derive(Debug)]
pub struct Cached<T> {
    label: &'static str,
    cell: OnceLock<T>,
}

impl<T> Cached<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            cell: OnceLock::new(),
        }
    }

    /// Returns the cached value, computing it with `init` on first use.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&T, OdConvertError>
    where
        F: FnOnce() -> Result<T, OdConvertError>,
    {
        if let Some(value) = self.cell.get() {
            log::debug!("using cached {}", self.label);
            return Ok(value);
        }
        let value = init()?;
        Ok(self.cell.get_or_init(|| value))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// A partition assembled in memory rather than parsed from disk.
///
/// Useful for building datasets programmatically and for exercising
/// writers without a source format.
#[derive(Debug)]
pub struct MemoryPartition {
    name: String,
    classes: ClassMap,
    images: Vec<DatasetImage>,
    annotations: Vec<DatasetAnnotation>,
}

impl MemoryPartition {
    pub fn new(
        name: impl Into<String>,
        classes: impl IntoIterator<Item = Arc<DatasetClass>>,
        images: Vec<DatasetImage>,
        annotations: Vec<DatasetAnnotation>,
    ) -> Self {
        Self {
            name: name.into(),
            classes: classes.into_iter().map(|cls| (cls.id(), cls)).collect(),
            images,
            annotations,
        }
    }
}

impl DatasetPartition for MemoryPartition {
    fn name(&self) -> &str {
        &self.name
    }

    fn classes(&self) -> Result<&ClassMap, OdConvertError> {
        Ok(&self.classes)
    }

    fn images(&self) -> Result<&[DatasetImage], OdConvertError> {
        Ok(&self.images)
    }

    fn annotations(&self) -> Result<&[DatasetAnnotation], OdConvertError> {
        Ok(&self.annotations)
    }
}
