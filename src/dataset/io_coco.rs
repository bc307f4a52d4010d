//! COCO JSON dataset reader.
//!
//! A COCO dataset directory holds one annotation file per split under
//! `annotations/` and the image files under `images/`:
//!
//! ```text
//! dataset/
//!   annotations/
//!     instances_train.json
//!     instances_val.json
//!   images/
//!     000001.jpg
//!     ...
//! ```
//!
//! Each JSON file becomes one [`CocoPartition`]. The JSON document is parsed
//! eagerly when the partition is opened; classes, images and annotations are
//! then built lazily from it and cached.
//!
//! # Bounding boxes
//!
//! COCO stores boxes as `[x_min, y_min, width, height]`. The default
//! [`BoxConvention::CornerSize`] reads them that way. [`BoxConvention::Center`]
//! treats the array as `[x_center, y_center, width, height]` for datasets
//! exported by tools that got this wrong.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rand::RngExt;
use serde::Deserialize;
use walkdir::WalkDir;

use super::handler::DatasetHandler;
use super::ids::{AnnotationId, ClassId, ImageId};
use super::model::{DatasetAnnotation, DatasetClass, DatasetImage, DatasetType};
use super::partition::{Cached, ClassMap, DatasetPartition};
use super::BoundingBox;
use crate::error::OdConvertError;

const ANNOTATIONS_DIR: &str = "annotations";
const IMAGES_DIR: &str = "images";

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

#[derive(Debug, Deserialize)]
struct CocoFile {
    categories: Vec<CocoCategory>,
    images: Vec<CocoImage>,
    annotations: Vec<CocoAnnotation>,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,

    #[serde(default)]
    width: Option<u32>,

    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    #[serde(default)]
    id: Option<u64>,
    image_id: u64,
    category_id: u64,
    bbox: [f64; 4],

    #[serde(default)]
    iscrowd: Option<u8>,
}

// ============================================================================
// Options
// ============================================================================

/// How the 4-element `bbox` array of an annotation is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoxConvention {
    /// `[x_min, y_min, width, height]`, the COCO convention.
    #[default]
    CornerSize,
    /// `[x_center, y_center, width, height]`.
    Center,
}

/// Options for reading a COCO dataset.
#[derive(Clone, Debug, Default)]
pub struct CocoReadOptions {
    pub bbox_convention: BoxConvention,
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a COCO dataset directory with default options.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use odconvert::dataset::io_coco::read_coco_dir;
///
/// let dataset = read_coco_dir(Path::new("datasets/coco"))?;
/// for partition in dataset.partitions() {
///     let (images, annotations) = partition.stats()?;
///     println!("{}: {images} images, {annotations} annotations", partition.name());
/// }
/// # Ok::<(), odconvert::OdConvertError>(())
/// ```
pub fn read_coco_dir(path: &Path) -> Result<DatasetHandler, OdConvertError> {
    read_coco_dir_with(path, &CocoReadOptions::default())
}

/// Reads a COCO dataset directory.
///
/// # Errors
/// - `InvalidInput` if `path` is not a directory
/// - `NoPartitions` if `annotations/` is missing or holds no `.json` file
/// - `CocoJsonParse` if an annotation file is malformed
/// - any error from [`DatasetHandler::new`]
pub fn read_coco_dir_with(
    path: &Path,
    opts: &CocoReadOptions,
) -> Result<DatasetHandler, OdConvertError> {
    if !path.is_dir() {
        return Err(OdConvertError::InvalidInput {
            path: path.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut partitions: Vec<Box<dyn DatasetPartition>> = Vec::new();
    for annotation_file in find_annotation_files(path)? {
        let name = partition_name(&annotation_file);
        let image_dir = resolve_image_dir(path, &name);
        log::debug!(
            "found partition '{}' ({})",
            name,
            annotation_file.display()
        );
        partitions.push(Box::new(CocoPartition::open(
            name,
            image_dir,
            &annotation_file,
            opts.clone(),
        )?));
    }

    DatasetHandler::new(DatasetType::Coco, path, partitions)
}

/// One split of a COCO dataset, backed by a single annotation file.
pub struct CocoPartition {
    name: String,
    image_dir: PathBuf,
    annotation_file: PathBuf,
    opts: CocoReadOptions,
    raw: CocoFile,
    classes: Cached<ClassMap>,
    images: Cached<ImageIndex>,
    annotations: Cached<Vec<DatasetAnnotation>>,
}

struct ImageIndex {
    images: Vec<DatasetImage>,
    by_id: HashMap<ImageId, usize>,
}

impl CocoPartition {
    /// Opens and parses an annotation file.
    pub fn open(
        name: impl Into<String>,
        image_dir: impl Into<PathBuf>,
        annotation_file: &Path,
        opts: CocoReadOptions,
    ) -> Result<Self, OdConvertError> {
        let file = File::open(annotation_file)?;
        let raw: CocoFile = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            OdConvertError::CocoJsonParse {
                path: annotation_file.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::from_raw(name, image_dir, annotation_file, opts, raw))
    }

    /// Parses a partition from a JSON string.
    ///
    /// Useful for testing without file I/O.
    pub fn from_json_str(
        name: impl Into<String>,
        image_dir: impl Into<PathBuf>,
        json: &str,
    ) -> Result<Self, OdConvertError> {
        Self::from_json_slice(name, image_dir, json.as_bytes())
    }

    /// Parses a partition from raw JSON bytes.
    pub fn from_json_slice(
        name: impl Into<String>,
        image_dir: impl Into<PathBuf>,
        bytes: &[u8],
    ) -> Result<Self, OdConvertError> {
        let raw: CocoFile =
            serde_json::from_slice(bytes).map_err(|source| OdConvertError::CocoJsonParse {
                path: PathBuf::from("<memory>"),
                source,
            })?;
        Ok(Self::from_raw(
            name,
            image_dir,
            Path::new("<memory>"),
            CocoReadOptions::default(),
            raw,
        ))
    }

    /// Replaces the read options. Collections already computed are kept.
    pub fn with_options(mut self, opts: CocoReadOptions) -> Self {
        self.opts = opts;
        self
    }

    fn from_raw(
        name: impl Into<String>,
        image_dir: impl Into<PathBuf>,
        annotation_file: &Path,
        opts: CocoReadOptions,
        raw: CocoFile,
    ) -> Self {
        Self {
            name: name.into(),
            image_dir: image_dir.into(),
            annotation_file: annotation_file.to_path_buf(),
            opts,
            raw,
            classes: Cached::new("classes"),
            images: Cached::new("images"),
            annotations: Cached::new("annotations"),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn annotation_file(&self) -> &Path {
        &self.annotation_file
    }

    /// Looks up a class by id.
    pub fn class(&self, id: ClassId) -> Result<Option<&Arc<DatasetClass>>, OdConvertError> {
        Ok(self.classes()?.get(&id))
    }

    /// Looks up an image by id.
    pub fn image(&self, id: ImageId) -> Result<Option<&DatasetImage>, OdConvertError> {
        let index = self.image_index()?;
        Ok(index.by_id.get(&id).map(|&pos| &index.images[pos]))
    }

    fn image_index(&self) -> Result<&ImageIndex, OdConvertError> {
        self.images.get_or_try_init(|| self.build_images())
    }

    fn build_classes(&self) -> Result<ClassMap, OdConvertError> {
        let mut classes = ClassMap::new();
        for category in &self.raw.categories {
            let id = ClassId::new(category.id);
            if let Some(existing) = classes.get(&id) {
                if existing.name() != category.name {
                    return Err(OdConvertError::ClassConflict {
                        id,
                        existing: existing.name().to_string(),
                        conflicting: category.name.clone(),
                        partition: self.name.clone(),
                    });
                }
                continue;
            }
            // Supercategories are not resolved into parents.
            classes.insert(id, Arc::new(DatasetClass::new(id, category.name.clone())));
        }
        Ok(classes)
    }

    fn build_images(&self) -> Result<ImageIndex, OdConvertError> {
        let mut images = Vec::with_capacity(self.raw.images.len());
        let mut by_id = HashMap::with_capacity(self.raw.images.len());

        for record in &self.raw.images {
            let id = ImageId::new(record.id);
            if by_id.insert(id, images.len()).is_some() {
                return Err(OdConvertError::DuplicateImageId {
                    image_id: id,
                    path: self.annotation_file.clone(),
                });
            }

            let mut image = DatasetImage::new(Some(id), self.image_dir.join(&record.file_name));
            if let (Some(width), Some(height)) = (record.width, record.height) {
                image = image.with_size(width, height);
            }
            images.push(image);
        }

        Ok(ImageIndex { images, by_id })
    }

    fn build_annotations(&self) -> Result<Vec<DatasetAnnotation>, OdConvertError> {
        let classes = self.classes()?;
        let images = self.image_index()?;

        self.raw
            .annotations
            .iter()
            .map(|record| {
                let class_id = ClassId::new(record.category_id);
                let cls = classes
                    .get(&class_id)
                    .ok_or_else(|| OdConvertError::UnknownClass {
                        class_id,
                        path: self.annotation_file.clone(),
                    })?;

                let image_id = ImageId::new(record.image_id);
                if !images.by_id.contains_key(&image_id) {
                    return Err(OdConvertError::UnknownImage {
                        image_id,
                        path: self.annotation_file.clone(),
                    });
                }

                let [a, b, c, d] = record.bbox;
                let bbox = match self.opts.bbox_convention {
                    BoxConvention::CornerSize => BoundingBox::from_min_max(a, b, a + c, b + d),
                    BoxConvention::Center => BoundingBox::from_center(a, b, c, d),
                };

                Ok(DatasetAnnotation::new(
                    record.id.map(AnnotationId::new),
                    image_id,
                    Arc::clone(cls),
                    bbox,
                    record.iscrowd.unwrap_or(0),
                ))
            })
            .collect()
    }
}

impl DatasetPartition for CocoPartition {
    fn name(&self) -> &str {
        &self.name
    }

    fn classes(&self) -> Result<&ClassMap, OdConvertError> {
        self.classes.get_or_try_init(|| self.build_classes())
    }

    fn images(&self) -> Result<&[DatasetImage], OdConvertError> {
        Ok(&self.image_index()?.images)
    }

    fn annotations(&self) -> Result<&[DatasetAnnotation], OdConvertError> {
        self.annotations
            .get_or_try_init(|| self.build_annotations())
            .map(Vec::as_slice)
    }
}

/// Fuzz-only entrypoint: parse bytes and force every lazy collection.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_partition(bytes: &[u8]) -> Result<(), OdConvertError> {
    let partition = CocoPartition::from_json_slice("fuzz", "images", bytes)?;
    partition.stats()?;
    Ok(())
}

// ============================================================================
// Layout helpers
// ============================================================================

fn find_annotation_files(root: &Path) -> Result<Vec<PathBuf>, OdConvertError> {
    let annotations_dir = root.join(ANNOTATIONS_DIR);
    if !annotations_dir.is_dir() {
        return Err(OdConvertError::NoPartitions {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&annotations_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| {
            OdConvertError::Io(source.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!(
                    "failed while traversing {}",
                    annotations_dir.display()
                ))
            }))
        })?;

        let is_json = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Derives a partition name from an annotation file name.
///
/// Takes the part of the stem after the last `_`; falls back to a random
/// `unknown-xxxxxxxx` name when that part is empty or is not a plain
/// directory name (`.`, `..`).
fn partition_name(annotation_file: &Path) -> String {
    let stem = annotation_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.rsplit('_').next() {
        Some(name) if is_plain_dir_name(name) => name.to_string(),
        _ => format!("unknown-{:08x}", rand::rng().random::<u32>()),
    }
}

fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

fn resolve_image_dir(root: &Path, partition: &str) -> PathBuf {
    let per_partition = root.join(IMAGES_DIR).join(partition);
    if per_partition.is_dir() {
        per_partition
    } else {
        root.join(IMAGES_DIR)
    }
}

/// Returns true if `path` looks like a COCO dataset directory.
pub(crate) fn is_coco_layout(path: &Path) -> bool {
    fs::read_dir(path.join(ANNOTATIONS_DIR))
        .map(|entries| {
            entries.filter_map(Result::ok).any(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
