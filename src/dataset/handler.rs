//! Dataset handler: the partitions of one dataset plus its class list.

use std::collections::btree_map::Entry;
use std::collections::HashSet;
use std::sync::Arc;

use super::ids::ClassId;
use super::model::{DatasetClass, DatasetType};
use super::partition::{ClassMap, DatasetPartition};
use crate::error::OdConvertError;

/// A whole dataset: ordered, uniquely named partitions and the dataset-wide
/// class mapping.
///
/// The class mapping is the union of every partition's classes. Construction
/// fails if two partitions disagree on the name behind a class id, so a
/// handler never silently prefers one partition's view.
pub struct DatasetHandler {
    dataset_type: DatasetType,
    classes: ClassMap,
    partitions: Vec<Box<dyn DatasetPartition>>,
}

impl DatasetHandler {
    /// Builds a handler and reconciles the class lists of all partitions.
    ///
    /// # Errors
    /// - `NoPartitions` if `partitions` is empty (reported against `origin`)
    /// - `DuplicatePartition` if two partitions share a name
    /// - `ClassConflict` if a class id maps to different names
    /// - `MissingClasses` if no partition declares any class
    /// - any error raised while a partition computes its classes
    pub fn new(
        dataset_type: DatasetType,
        origin: impl Into<std::path::PathBuf>,
        partitions: Vec<Box<dyn DatasetPartition>>,
    ) -> Result<Self, OdConvertError> {
        if partitions.is_empty() {
            return Err(OdConvertError::NoPartitions {
                path: origin.into(),
            });
        }

        let mut names = HashSet::new();
        for partition in &partitions {
            if !names.insert(partition.name()) {
                return Err(OdConvertError::DuplicatePartition {
                    name: partition.name().to_string(),
                });
            }
        }

        let classes = reconcile_classes(&partitions)?;
        if classes.is_empty() {
            return Err(OdConvertError::MissingClasses);
        }

        Ok(Self {
            dataset_type,
            classes,
            partitions,
        })
    }

    /// The on-disk format this dataset was read from.
    pub fn dataset_type(&self) -> DatasetType {
        self.dataset_type
    }

    /// All classes, ordered by id.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = &Arc<DatasetClass>> {
        self.classes.values()
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.classes
    }

    pub fn class(&self, id: ClassId) -> Option<&Arc<DatasetClass>> {
        self.classes.get(&id)
    }

    /// Partitions in the order they were discovered.
    pub fn partitions(&self) -> &[Box<dyn DatasetPartition>] {
        &self.partitions
    }

    pub fn partition(&self, name: &str) -> Option<&dyn DatasetPartition> {
        self.partitions
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }
}

impl std::fmt::Debug for DatasetHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetHandler")
            .field("dataset_type", &self.dataset_type)
            .field("classes", &self.classes.len())
            .field(
                "partitions",
                &self.partitions.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn reconcile_classes(partitions: &[Box<dyn DatasetPartition>]) -> Result<ClassMap, OdConvertError> {
    let mut merged = ClassMap::new();

    for partition in partitions {
        for (id, cls) in partition.classes()? {
            match merged.entry(*id) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(cls));
                }
                Entry::Occupied(existing) => {
                    if existing.get().name() != cls.name() {
                        return Err(OdConvertError::ClassConflict {
                            id: *id,
                            existing: existing.get().name().to_string(),
                            conflicting: cls.name().to_string(),
                            partition: partition.name().to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(merged)
}
