use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::{ClassId, DatasetType, ImageId};

/// The main error type for odconvert operations.
#[derive(Debug, Error)]
pub enum OdConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No partitions found in dataset at {path}")]
    NoPartitions { path: PathBuf },

    #[error("No classes found in dataset")]
    MissingClasses,

    #[error(
        "Class {id} is named '{existing}' in one partition but '{conflicting}' in partition '{partition}'"
    )]
    ClassConflict {
        id: ClassId,
        existing: String,
        conflicting: String,
        partition: String,
    },

    #[error("Partition name '{name}' is used more than once")]
    DuplicatePartition { name: String },

    #[error("Invalid input path {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("Annotation references unknown class {class_id} in {path}")]
    UnknownClass { class_id: ClassId, path: PathBuf },

    #[error("Annotation references unknown image {image_id} in {path}")]
    UnknownImage { image_id: ImageId, path: PathBuf },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Image id {image_id} appears more than once in {path}")]
    DuplicateImageId { image_id: ImageId, path: PathBuf },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Image {path} has unusable dimensions {width}x{height}")]
    InvalidImageSize {
        path: PathBuf,
        width: u64,
        height: u64,
    },

    #[error("Failed to write data.yaml to {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Dataset is already in the target format ({0})")]
    AlreadyInTargetFormat(DatasetType),

    #[error("Dataset failed additional checks for {0} output")]
    AdditionalChecksFailed(DatasetType),

    #[error("Output directory {path} already contains files (use --overwrite to replace them)")]
    OutputNotEmpty { path: PathBuf },

    #[error("Output path {path} exists and is not a directory")]
    OutputNotDirectory { path: PathBuf },

    #[error("Partition name '{name}' cannot be used in the output: {reason}")]
    UnusablePartitionName { name: String, reason: &'static str },
}

/// Coarse classification of [`OdConvertError`] variants.
///
/// Callers that only need to react to the category of a failure (e.g. map it
/// to an exit code) can match on this instead of every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The dataset as a whole is unusable (no partitions, no classes, conflicts).
    Configuration,
    /// An annotation references a class or image that does not exist.
    Lookup,
    /// Input data is malformed.
    Format,
    /// A conversion was refused before anything was written.
    Precondition,
    /// Filesystem access failed.
    Io,
}

impl OdConvertError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OdConvertError::NoPartitions { .. }
            | OdConvertError::MissingClasses
            | OdConvertError::ClassConflict { .. }
            | OdConvertError::DuplicatePartition { .. }
            | OdConvertError::InvalidInput { .. } => ErrorKind::Configuration,
            OdConvertError::UnknownClass { .. } | OdConvertError::UnknownImage { .. } => {
                ErrorKind::Lookup
            }
            OdConvertError::CocoJsonParse { .. }
            | OdConvertError::DuplicateImageId { .. }
            | OdConvertError::ImageDimensionRead { .. }
            | OdConvertError::InvalidImageSize { .. }
            | OdConvertError::DataYamlWrite { .. }
            | OdConvertError::UnsupportedFormat(_) => ErrorKind::Format,
            OdConvertError::AlreadyInTargetFormat(_)
            | OdConvertError::AdditionalChecksFailed(_)
            | OdConvertError::OutputNotEmpty { .. }
            | OdConvertError::OutputNotDirectory { .. }
            | OdConvertError::UnusablePartitionName { .. } => ErrorKind::Precondition,
            OdConvertError::Io(_) => ErrorKind::Io,
        }
    }
}
