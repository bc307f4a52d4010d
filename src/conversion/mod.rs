//! Conversion orchestration.
//!
//! A target format plugs in by implementing [`FormatWriter`]. The order in
//! which its extension points run is fixed by [`DatasetConverter`]:
//!
//! 1. `setup` (when the converter is built)
//! 2. the format-identity check, then `additional_checks`
//! 3. `convert_partition` for each partition, in handler order
//! 4. `finish`
//!
//! Nothing is written unless both checks pass. A failure in step 3 stops the
//! run; partitions converted before it stay on disk.

pub mod report;

pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, PartitionSummary,
};

use std::path::Path;

use crate::dataset::io_yolo::{YoloWriteOptions, YoloWriter};
use crate::dataset::{DatasetHandler, DatasetPartition, DatasetType};
use crate::error::OdConvertError;

/// Extension points of a target format.
pub trait FormatWriter {
    /// The format this writer produces.
    fn target(&self) -> DatasetType;

    /// Root directory the writer emits into.
    fn output_root(&self) -> &Path;

    /// Prepares writer state. Must not touch the filesystem.
    fn setup(&mut self, _handler: &DatasetHandler) -> Result<(), OdConvertError> {
        Ok(())
    }

    /// Format-specific preconditions, checked before anything is written.
    ///
    /// Returning `Ok(false)` refuses the conversion; returning an error
    /// refuses it with a more specific reason.
    fn additional_checks(&self, handler: &DatasetHandler) -> Result<bool, OdConvertError>;

    /// Writes one partition.
    fn convert_partition(
        &mut self,
        partition: &dyn DatasetPartition,
        handler: &DatasetHandler,
        report: &mut ConversionReport,
    ) -> Result<PartitionSummary, OdConvertError>;

    /// Runs once after every partition was written.
    fn finish(
        &mut self,
        _handler: &DatasetHandler,
        _report: &mut ConversionReport,
    ) -> Result<(), OdConvertError> {
        Ok(())
    }
}

/// Drives a [`FormatWriter`] over a dataset.
pub struct DatasetConverter<'a, W: FormatWriter> {
    handler: &'a DatasetHandler,
    writer: W,
}

impl<'a, W: FormatWriter> DatasetConverter<'a, W> {
    /// Binds a writer to a dataset and runs the writer's `setup`.
    pub fn new(handler: &'a DatasetHandler, mut writer: W) -> Result<Self, OdConvertError> {
        writer.setup(handler)?;
        Ok(Self { handler, writer })
    }

    pub fn target(&self) -> DatasetType {
        self.writer.target()
    }

    /// Refuses conversions into the dataset's own format and conversions the
    /// writer's additional checks reject.
    pub fn perform_checks(&self) -> Result<(), OdConvertError> {
        let target = self.writer.target();
        if self.handler.dataset_type() == target {
            return Err(OdConvertError::AlreadyInTargetFormat(target));
        }
        if !self.writer.additional_checks(self.handler)? {
            return Err(OdConvertError::AdditionalChecksFailed(target));
        }
        Ok(())
    }

    /// Checks preconditions, then converts every partition.
    pub fn convert(mut self) -> Result<ConversionReport, OdConvertError> {
        self.perform_checks()?;

        let target = self.writer.target();
        let mut report = ConversionReport::new(
            self.handler.dataset_type().name(),
            target.name(),
            self.writer.output_root(),
        );

        for partition in self.handler.partitions() {
            log::info!(
                "Converting {} partition into {} format",
                partition.name(),
                target
            );
            let summary =
                self.writer
                    .convert_partition(partition.as_ref(), self.handler, &mut report)?;
            report.partitions.push(summary);
        }

        self.writer.finish(self.handler, &mut report)?;
        Ok(report)
    }

    /// Gives the writer back, e.g. to inspect state after `perform_checks`.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Converts `handler` into a YOLO directory at `output`.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use odconvert::conversion::convert_to_yolo;
/// use odconvert::dataset::io_coco::read_coco_dir;
/// use odconvert::dataset::io_yolo::YoloWriteOptions;
///
/// let dataset = read_coco_dir(Path::new("datasets/coco"))?;
/// let opts = YoloWriteOptions::default();
/// let report = convert_to_yolo(&dataset, Path::new("datasets/yolo"), &opts)?;
/// print!("{report}");
/// # Ok::<(), odconvert::OdConvertError>(())
/// ```
pub fn convert_to_yolo(
    handler: &DatasetHandler,
    output: &Path,
    opts: &YoloWriteOptions,
) -> Result<ConversionReport, OdConvertError> {
    DatasetConverter::new(handler, YoloWriter::new(output, opts.clone()))?.convert()
}
