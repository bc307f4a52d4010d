//! Dataset layout detection.
//!
//! Sniffs a directory's layout to guess which format it holds. Only the
//! directory structure is looked at; no annotation file is parsed.

use std::path::Path;

use crate::dataset::io_coco::is_coco_layout;
use crate::dataset::DatasetType;

/// Guesses the dataset type stored at `path`.
///
/// - `annotations/` holding at least one `.json` file: COCO
/// - both `labels/` and `images/` directories: YOLO
///
/// COCO wins when both layouts are present. Returns `None` for anything
/// else, including paths that do not exist.
pub fn detect_type(path: &Path) -> Option<DatasetType> {
    if !path.is_dir() {
        return None;
    }

    if is_coco_layout(path) {
        log::debug!("{} has a COCO layout", path.display());
        return Some(DatasetType::Coco);
    }

    if path.join("labels").is_dir() && path.join("images").is_dir() {
        log::debug!("{} has a YOLO layout", path.display());
        return Some(DatasetType::Yolo);
    }

    None
}
