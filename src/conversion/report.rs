//! Conversion report types.
//!
//! A [`ConversionReport`] records what a conversion run wrote per partition
//! and any notes about data the target format cannot represent faithfully.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The outcome of a conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source format name.
    pub from: String,
    /// Target format name.
    pub to: String,
    /// Root directory the output was written to.
    pub output: PathBuf,
    /// One summary per converted partition, in conversion order.
    pub partitions: Vec<PartitionSummary>,
    /// Notes and warnings collected while converting.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a conversion between formats.
    pub fn new(from: impl Into<String>, to: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Total label lines written across all partitions.
    pub fn total_annotations(&self) -> usize {
        self.partitions.iter().map(|p| p.annotations).sum()
    }

    /// Total label files written across all partitions.
    pub fn total_label_files(&self) -> usize {
        self.partitions.iter().map(|p| p.label_files).sum()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} -> {} into {}",
            self.from,
            self.to,
            self.output.display()
        )?;

        for p in &self.partitions {
            writeln!(
                f,
                "  {}: {} images, {} label files ({} empty), {} annotations",
                p.name, p.images, p.label_files, p.empty_label_files, p.annotations
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// What was written for one partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    pub name: String,
    pub images: usize,
    pub label_files: usize,
    pub empty_label_files: usize,
    pub annotations: usize,
}

/// A single note or warning raised during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    /// Partition the issue was raised for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (output may not match the source).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            partition: None,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            partition: None,
            message: message.into(),
        }
    }

    /// Attach the partition the issue belongs to.
    pub fn in_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }
}

impl fmt::Display for ConversionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.partition {
            Some(partition) => write!(f, "[{}] {}", partition, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    Warning,
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// Boxes that extend past the image edge are written unclipped.
    BoxOutsideImage,
    /// Crowd annotations are written as ordinary boxes.
    CrowdAnnotationsPassedThrough,
    /// Images without annotations get an empty label file.
    EmptyLabelFiles,
    /// Image files are referenced, not copied.
    ImagesNotCopied,
    /// Class ids are written verbatim, not re-indexed.
    ClassIdsVerbatim,
    /// Images sharing a file name within a partition; only the first is copied.
    ImageNameCollision,
}
