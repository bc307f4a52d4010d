//! Ultralytics-style YOLO writer.
//!
//! Output layout, one subtree per partition:
//!
//! ```text
//! output/
//!   data.yaml
//!   images/<partition>/        (created; images copied only on request)
//!   labels/<partition>/<image-id>.txt
//! ```
//!
//! Each label line is `<class-id> <x_center> <y_center> <width> <height>`
//! with coordinates normalized by the image's pixel size. Every image gets a
//! label file, including images without annotations (empty file).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::{
    DatasetAnnotation, DatasetHandler, DatasetImage, DatasetPartition, DatasetType, ImageId,
};
use crate::conversion::{
    ConversionIssue, ConversionIssueCode, ConversionReport, FormatWriter, PartitionSummary,
};
use crate::error::OdConvertError;

const LABEL_EXTENSION: &str = "txt";

/// Top-level `data.yaml` keys a split entry must not shadow.
const DATA_YAML_KEYS: [&str; 2] = ["path", "names"];

/// Options for writing a YOLO dataset.
#[derive(Clone, Debug, Default)]
pub struct YoloWriteOptions {
    /// Copy source images into `images/<partition>/`.
    pub copy_images: bool,
    /// Allow writing into partitions whose label directory already has files.
    pub overwrite: bool,
}

/// Writes a dataset as a YOLO directory tree.
#[derive(Debug)]
pub struct YoloWriter {
    root: PathBuf,
    opts: YoloWriteOptions,
    class_names: BTreeMap<u64, String>,
    written: Vec<String>,
}

impl YoloWriter {
    pub fn new(root: impl Into<PathBuf>, opts: YoloWriteOptions) -> Self {
        Self {
            root: root.into(),
            opts,
            class_names: BTreeMap::new(),
            written: Vec::new(),
        }
    }

    fn images_dir(&self, partition: &str) -> PathBuf {
        self.root.join("images").join(partition)
    }

    fn labels_dir(&self, partition: &str) -> PathBuf {
        self.root.join("labels").join(partition)
    }
}

impl FormatWriter for YoloWriter {
    fn target(&self) -> DatasetType {
        DatasetType::Yolo
    }

    fn output_root(&self) -> &Path {
        &self.root
    }

    fn setup(&mut self, handler: &DatasetHandler) -> Result<(), OdConvertError> {
        self.class_names = handler
            .classes()
            .map(|cls| (cls.id().as_u64(), cls.name().to_string()))
            .collect();
        Ok(())
    }

    fn additional_checks(&self, handler: &DatasetHandler) -> Result<bool, OdConvertError> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(OdConvertError::OutputNotDirectory {
                path: self.root.clone(),
            });
        }

        for partition in handler.partitions() {
            check_partition_name(partition.name())?;
        }

        if !self.opts.overwrite {
            for partition in handler.partitions() {
                let labels_dir = self.labels_dir(partition.name());
                if dir_has_entries(&labels_dir)? {
                    return Err(OdConvertError::OutputNotEmpty { path: labels_dir });
                }
            }
        }

        Ok(true)
    }

    fn convert_partition(
        &mut self,
        partition: &dyn DatasetPartition,
        _handler: &DatasetHandler,
        report: &mut ConversionReport,
    ) -> Result<PartitionSummary, OdConvertError> {
        let name = partition.name();

        // Everything that can fail on bad input happens before the first write.
        let rendered = render_partition(partition)?;

        let images_dir = self.images_dir(name);
        let labels_dir = self.labels_dir(name);
        fs::create_dir_all(&images_dir)?;
        fs::create_dir_all(&labels_dir)?;

        for label in &rendered.labels {
            let path = labels_dir.join(format!("{}.{}", label.stem, LABEL_EXTENSION));
            log::debug!("writing {} ({} lines)", path.display(), label.lines);
            fs::write(&path, &label.contents)?;
        }

        if self.opts.copy_images {
            let collisions = copy_images(partition.images()?, &images_dir)?;
            if !collisions.is_empty() {
                log::warn!(
                    "{} image(s) in partition '{}' share a file name with an earlier image",
                    collisions.len(),
                    name
                );
                report.add(
                    ConversionIssue::warning(
                        ConversionIssueCode::ImageNameCollision,
                        format!(
                            "not copied, file name already taken in images/{}: {}",
                            name,
                            collisions.join(", ")
                        ),
                    )
                    .in_partition(name),
                );
            }
        }

        if rendered.crowd > 0 {
            report.add(
                ConversionIssue::info(
                    ConversionIssueCode::CrowdAnnotationsPassedThrough,
                    format!(
                        "{} crowd annotation(s) written as regular boxes",
                        rendered.crowd
                    ),
                )
                .in_partition(name),
            );
        }

        if rendered.out_of_bounds > 0 {
            log::warn!(
                "{} box(es) in partition '{}' extend outside their image",
                rendered.out_of_bounds,
                name
            );
            report.add(
                ConversionIssue::warning(
                    ConversionIssueCode::BoxOutsideImage,
                    format!(
                        "{} box(es) extend outside their image and were written unclipped",
                        rendered.out_of_bounds
                    ),
                )
                .in_partition(name),
            );
        }

        let empty = rendered.labels.iter().filter(|l| l.lines == 0).count();
        if empty > 0 {
            report.add(
                ConversionIssue::info(
                    ConversionIssueCode::EmptyLabelFiles,
                    format!("{} image(s) without annotations got an empty label file", empty),
                )
                .in_partition(name),
            );
        }

        self.written.push(name.to_string());

        Ok(PartitionSummary {
            name: name.to_string(),
            images: partition.images()?.len(),
            label_files: rendered.labels.len(),
            empty_label_files: empty,
            annotations: rendered.labels.iter().map(|l| l.lines).sum(),
        })
    }

    fn finish(
        &mut self,
        _handler: &DatasetHandler,
        report: &mut ConversionReport,
    ) -> Result<(), OdConvertError> {
        write_data_yaml(&self.root, &self.written, &self.class_names)?;

        if !self.opts.copy_images {
            report.add(ConversionIssue::info(
                ConversionIssueCode::ImagesNotCopied,
                "image files are referenced, not copied, into images/<partition>/",
            ));
        }

        let contiguous = self
            .class_names
            .keys()
            .enumerate()
            .all(|(idx, id)| idx as u64 == *id);
        if !contiguous {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::ClassIdsVerbatim,
                "class ids are written verbatim and do not form a 0-based contiguous range",
            ));
        }

        Ok(())
    }
}

struct RenderedLabel {
    stem: String,
    contents: String,
    lines: usize,
}

struct RenderedPartition {
    labels: Vec<RenderedLabel>,
    crowd: usize,
    out_of_bounds: usize,
}

/// Groups annotations by image and formats every label file in memory.
fn render_partition(partition: &dyn DatasetPartition) -> Result<RenderedPartition, OdConvertError> {
    let images = partition.images()?;
    let annotations = partition.annotations()?;

    // Seed with every image so images without annotations still get a file.
    let mut grouped: BTreeMap<ImageId, Vec<&DatasetAnnotation>> = BTreeMap::new();
    let mut by_id: HashMap<ImageId, &DatasetImage> = HashMap::new();
    let mut without_id: Vec<&DatasetImage> = Vec::new();
    for image in images {
        match image.id() {
            Some(id) => {
                grouped.insert(id, Vec::new());
                by_id.insert(id, image);
            }
            None => without_id.push(image),
        }
    }

    for ann in annotations {
        grouped
            .get_mut(&ann.image_id())
            .ok_or_else(|| OdConvertError::UnknownImage {
                image_id: ann.image_id(),
                path: PathBuf::from(partition.name()),
            })?
            .push(ann);
    }

    let mut rendered = RenderedPartition {
        labels: Vec::with_capacity(images.len()),
        crowd: 0,
        out_of_bounds: 0,
    };

    for (image_id, anns) in grouped {
        let mut contents = String::new();
        if !anns.is_empty() {
            let image = by_id[&image_id];
            let (width, height) = image_size(image)?;
            for ann in &anns {
                if ann.is_crowd() {
                    rendered.crowd += 1;
                }
                if !ann.bbox().fits_within(width, height) {
                    rendered.out_of_bounds += 1;
                }
                let norm = ann.bbox().to_normalized(width, height);
                // Writing into a String cannot fail.
                let _ = writeln!(
                    contents,
                    "{} {:.6} {:.6} {:.6} {:.6}",
                    ann.cls().id(),
                    norm.x_center(),
                    norm.y_center(),
                    norm.width(),
                    norm.height()
                );
            }
        }
        rendered.labels.push(RenderedLabel {
            stem: image_id.to_string(),
            contents,
            lines: anns.len(),
        });
    }

    for image in without_id {
        rendered.labels.push(RenderedLabel {
            stem: file_stem(image.path()),
            contents: String::new(),
            lines: 0,
        });
    }

    Ok(rendered)
}

/// Pixel size of an image: declared size first, else read from the file header.
fn image_size(image: &DatasetImage) -> Result<(f64, f64), OdConvertError> {
    let (width, height) = match image.size() {
        Some((w, h)) => (w as u64, h as u64),
        None => {
            let size = imagesize::size(image.path()).map_err(|source| {
                OdConvertError::ImageDimensionRead {
                    path: image.path().to_path_buf(),
                    source,
                }
            })?;
            (size.width as u64, size.height as u64)
        }
    };

    if width == 0 || height == 0 {
        return Err(OdConvertError::InvalidImageSize {
            path: image.path().to_path_buf(),
            width,
            height,
        });
    }

    Ok((width as f64, height as f64))
}

/// Copies every image into `images_dir` under its file name.
///
/// Returns the file names skipped because an earlier image of the partition
/// already claimed them. An image that already sits at its destination (the
/// output root is the dataset root) is left alone.
fn copy_images(images: &[DatasetImage], images_dir: &Path) -> Result<Vec<String>, OdConvertError> {
    let mut taken = HashSet::new();
    let mut collisions = Vec::new();

    for image in images {
        let Some(file_name) = image.path().file_name() else {
            return Err(OdConvertError::InvalidInput {
                path: image.path().to_path_buf(),
                message: "image path has no file name".to_string(),
            });
        };
        if !taken.insert(file_name.to_os_string()) {
            collisions.push(file_name.to_string_lossy().into_owned());
            continue;
        }

        let dest = images_dir.join(file_name);
        if is_same_file(image.path(), &dest)? {
            log::debug!("{} is already in place", dest.display());
            continue;
        }
        fs::copy(image.path(), &dest)?;
    }

    Ok(collisions)
}

/// Copying a file onto itself truncates it, so compare resolved paths first.
fn is_same_file(src: &Path, dest: &Path) -> Result<bool, OdConvertError> {
    if !dest.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(src)? == fs::canonicalize(dest)?)
}

/// A partition name becomes a directory under `images/` and `labels/` and a
/// key in `data.yaml`.
fn check_partition_name(name: &str) -> Result<(), OdConvertError> {
    let mut components = Path::new(name).components();
    let single_dir = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_dir {
        return Err(OdConvertError::UnusablePartitionName {
            name: name.to_string(),
            reason: "not a single directory name",
        });
    }
    if DATA_YAML_KEYS.contains(&name) {
        return Err(OdConvertError::UnusablePartitionName {
            name: name.to_string(),
            reason: "collides with a data.yaml key",
        });
    }
    Ok(())
}

fn dir_has_entries(path: &Path) -> Result<bool, OdConvertError> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_some())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct DataYaml<'a> {
    path: String,
    #[serde(flatten)]
    splits: BTreeMap<&'a str, String>,
    names: &'a BTreeMap<u64, String>,
}

fn write_data_yaml(
    root: &Path,
    partitions: &[String],
    class_names: &BTreeMap<u64, String>,
) -> Result<(), OdConvertError> {
    let data = DataYaml {
        path: root.display().to_string(),
        splits: partitions
            .iter()
            .map(|name| (name.as_str(), format!("images/{}", name)))
            .collect(),
        names: class_names,
    };

    let path = root.join("data.yaml");
    let yaml = serde_yaml::to_string(&data).map_err(|source| OdConvertError::DataYamlWrite {
        path: path.clone(),
        source,
    })?;
    fs::create_dir_all(root)?;
    fs::write(&path, yaml)?;
    Ok(())
}
