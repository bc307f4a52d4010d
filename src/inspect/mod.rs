//! Dataset inspection.
//!
//! Summarizes a dataset without converting it: its classes and, for each
//! partition, how many images and annotations it holds. Only the handler's
//! class list and each partition's `stats()` are consulted, so inspecting a
//! lazily-read dataset parses each partition once and nothing more.

mod report;

pub use report::{ClassEntry, InspectReport, PartitionStats};

use std::path::Path;

use crate::dataset::io_coco::{read_coco_dir_with, CocoReadOptions};
use crate::dataset::DatasetHandler;
use crate::error::OdConvertError;

/// Inspect a dataset and produce a report.
pub fn inspect_dataset(handler: &DatasetHandler) -> Result<InspectReport, OdConvertError> {
    let classes = handler
        .classes()
        .map(|cls| ClassEntry {
            id: cls.id().as_u64(),
            name: cls.name().to_string(),
        })
        .collect();

    let mut partitions = Vec::with_capacity(handler.partitions().len());
    for partition in handler.partitions() {
        let (images, annotations) = partition.stats()?;
        partitions.push(PartitionStats {
            name: partition.name().to_string(),
            images,
            annotations,
        });
    }

    Ok(InspectReport {
        dataset_type: handler.dataset_type().to_string(),
        classes,
        partitions,
    })
}

/// Reads the COCO dataset at `path` and inspects it.
///
/// Fails with [`OdConvertError::InvalidInput`] if `path` is not an existing
/// directory.
pub fn inspect_path(path: &Path, opts: &CocoReadOptions) -> Result<InspectReport, OdConvertError> {
    if !path.is_dir() {
        return Err(OdConvertError::InvalidInput {
            path: path.to_path_buf(),
            message: "not an existing directory".to_string(),
        });
    }
    let handler = read_coco_dir_with(path, opts)?;
    inspect_dataset(&handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{
        BoundingBox, DatasetAnnotation, DatasetClass, DatasetImage, DatasetPartition, DatasetType,
        ImageId, MemoryPartition,
    };
    use std::sync::Arc;

    fn make_test_dataset() -> DatasetHandler {
        let person = Arc::new(DatasetClass::new(1u64, "person"));
        let car = Arc::new(DatasetClass::new(2u64, "car"));
        let bbox = || BoundingBox::from_min_max(10.0, 10.0, 100.0, 100.0);

        let train = MemoryPartition::new(
            "train",
            [person.clone(), car.clone()],
            vec![
                DatasetImage::new(Some(ImageId(1)), "img1.jpg"),
                DatasetImage::new(Some(ImageId(2)), "img2.jpg"),
            ],
            vec![
                DatasetAnnotation::new(None, ImageId(1), person.clone(), bbox(), 0),
                DatasetAnnotation::new(None, ImageId(1), car.clone(), bbox(), 0),
                DatasetAnnotation::new(None, ImageId(2), car, bbox(), 0),
            ],
        );
        let val = MemoryPartition::new(
            "val",
            [person],
            vec![DatasetImage::new(Some(ImageId(1)), "img3.jpg")],
            vec![],
        );

        let partitions: Vec<Box<dyn DatasetPartition>> = vec![Box::new(train), Box::new(val)];
        DatasetHandler::new(DatasetType::Coco, "data", partitions).expect("handler")
    }

    #[test]
    fn test_counts_per_partition() {
        let report = inspect_dataset(&make_test_dataset()).expect("inspect");

        assert_eq!(report.dataset_type, "coco");
        assert_eq!(
            report.partitions,
            vec![
                PartitionStats {
                    name: "train".into(),
                    images: 2,
                    annotations: 3
                },
                PartitionStats {
                    name: "val".into(),
                    images: 1,
                    annotations: 0
                },
            ]
        );
        assert_eq!(report.total_images(), 3);
        assert_eq!(report.total_annotations(), 3);
    }

    #[test]
    fn test_classes_in_id_order() {
        let report = inspect_dataset(&make_test_dataset()).expect("inspect");
        let names: Vec<&str> = report.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["person", "car"]);
    }

    #[test]
    fn test_display_output() {
        let report = inspect_dataset(&make_test_dataset()).expect("inspect");
        let output = format!("{}", report);

        assert!(output.contains("Dataset Inspection Report"));
        assert!(output.contains("Classes (2)"));
        assert!(output.contains("person"));
        assert!(output.contains("Partitions (2)"));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = inspect_path(&temp.path().join("missing"), &CocoReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, OdConvertError::InvalidInput { .. }));
    }
}
