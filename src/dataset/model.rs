//! Entity types shared by every reader and writer.
//!
//! All entities are immutable once built. Classes are shared between
//! annotations through `Arc`, so a partition can hand out annotations that
//! point at its class list without cloning names around.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::bbox::{BoundingBox, Pixel};
use super::ids::{AnnotationId, ClassId, ImageId};
use crate::error::OdConvertError;

/// A class (category) in the dataset taxonomy.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetClass {
    id: ClassId,
    name: String,
    parent: Option<Arc<DatasetClass>>,
}

impl DatasetClass {
    /// Creates a top-level class.
    pub fn new(id: impl Into<ClassId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a class nested under `parent`.
    pub fn with_parent(
        id: impl Into<ClassId>,
        name: impl Into<String>,
        parent: Arc<DatasetClass>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: Some(parent),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<DatasetClass>> {
        self.parent.as_ref()
    }
}

/// A source image file.
///
/// Images do not own their annotations; annotations point back at the image
/// through [`DatasetAnnotation::image_id`].
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetImage {
    id: Option<ImageId>,
    path: PathBuf,
    size: Option<(u32, u32)>,
}

impl DatasetImage {
    pub fn new(id: Option<ImageId>, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            size: None,
        }
    }

    /// Records the pixel dimensions declared by the source format.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn id(&self) -> Option<ImageId> {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared `(width, height)` in pixels, if the source provided it.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

/// One labelled object instance on one image.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetAnnotation {
    id: Option<AnnotationId>,
    image_id: ImageId,
    cls: Arc<DatasetClass>,
    bbox: BoundingBox<Pixel>,
    iscrowd: u8,
}

impl DatasetAnnotation {
    pub fn new(
        id: Option<AnnotationId>,
        image_id: ImageId,
        cls: Arc<DatasetClass>,
        bbox: BoundingBox<Pixel>,
        iscrowd: u8,
    ) -> Self {
        Self {
            id,
            image_id,
            cls,
            bbox,
            iscrowd,
        }
    }

    pub fn id(&self) -> Option<AnnotationId> {
        self.id
    }

    pub fn image_id(&self) -> ImageId {
        self.image_id
    }

    pub fn cls(&self) -> &Arc<DatasetClass> {
        &self.cls
    }

    pub fn bbox(&self) -> &BoundingBox<Pixel> {
        &self.bbox
    }

    /// COCO crowd flag; non-zero marks a group of indistinct instances.
    pub fn iscrowd(&self) -> u8 {
        self.iscrowd
    }

    pub fn is_crowd(&self) -> bool {
        self.iscrowd != 0
    }
}

/// On-disk dataset formats known to odconvert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetType {
    Coco,
    Yolo,
}

impl DatasetType {
    /// Lowercase name used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            DatasetType::Coco => "coco",
            DatasetType::Yolo => "yolo",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetType {
    type Err = OdConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coco" | "coco-json" => Ok(DatasetType::Coco),
            "yolo" | "ultralytics" => Ok(DatasetType::Yolo),
            other => Err(OdConvertError::UnsupportedFormat(format!(
                "'{}' (supported: coco, yolo)",
                other
            ))),
        }
    }
}
