//! Newtype IDs for classes, images and annotations.
//!
//! COCO uses bare integers for all three, which makes it easy to look up an
//! image with a category id by accident. Wrapping them keeps the lookups in
//! the reader and writer honest.

use std::fmt;

macro_rules! dataset_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            /// Wraps a raw id.
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dataset_id!(
    /// Identifier of a class (COCO `category.id`, YOLO class index).
    ClassId
);

dataset_id!(
    /// Identifier of an image within a partition.
    ImageId
);

dataset_id!(
    /// Identifier of a single annotation record.
    AnnotationId
);
