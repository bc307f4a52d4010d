//! In-memory dataset model for odconvert.
//!
//! Every reader turns its on-disk format into [`DatasetPartition`]s grouped
//! under a [`DatasetHandler`]; every writer consumes a handler. The model is
//! deliberately small:
//!
//! - [`DatasetClass`]: an entry of the class taxonomy
//! - [`DatasetImage`]: an image file, optionally with declared pixel size
//! - [`DatasetAnnotation`]: one labelled box on one image
//! - [`BoundingBox`]: a center-form rectangle tagged with its coordinate space
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use odconvert::dataset::{
//!     BoundingBox, DatasetAnnotation, DatasetClass, DatasetHandler, DatasetImage,
//!     DatasetPartition, DatasetType, ImageId, MemoryPartition,
//! };
//!
//! let cat = Arc::new(DatasetClass::new(0u64, "cat"));
//! let train = MemoryPartition::new(
//!     "train",
//!     [cat.clone()],
//!     vec![DatasetImage::new(Some(ImageId(1)), "images/a.jpg").with_size(640, 480)],
//!     vec![DatasetAnnotation::new(
//!         None,
//!         ImageId(1),
//!         cat,
//!         BoundingBox::from_min_max(10.0, 20.0, 110.0, 220.0),
//!         0,
//!     )],
//! );
//!
//! let dataset = DatasetHandler::new(DatasetType::Coco, ".", vec![Box::new(train)])?;
//! assert_eq!(dataset.partitions()[0].stats()?, (1, 1));
//! # Ok::<(), odconvert::OdConvertError>(())
//! ```

mod bbox;
mod handler;
mod ids;
pub mod io_coco;
pub mod io_yolo;
mod model;
mod partition;

pub use bbox::{BoundingBox, Normalized, Pixel};
pub use handler::DatasetHandler;
pub use ids::{AnnotationId, ClassId, ImageId};
pub use model::{DatasetAnnotation, DatasetClass, DatasetImage, DatasetType};
pub use partition::{Cached, ClassMap, DatasetPartition, MemoryPartition};
