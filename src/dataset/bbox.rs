//! Bounding boxes in canonical center form.

use std::fmt;
use std::marker::PhantomData;

/// Marker for absolute pixel coordinates, origin at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker for coordinates expressed as fractions of the image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

/// An axis-aligned bounding box stored as center + size.
///
/// The fields are private: [`BoundingBox::from_center`] and
/// [`BoundingBox::from_min_max`] are the only ways to obtain one. The
/// `TSpace` parameter tags the coordinate space so a pixel box cannot be
/// written where a normalized one is expected.
///
/// Zero-sized boxes are accepted. Negative sizes are representable when
/// `from_min_max` is given inverted corners; nothing here rejects them.
#[derive(Clone, Copy, PartialEq)]
pub struct BoundingBox<TSpace = Pixel> {
    x_center: f64,
    y_center: f64,
    width: f64,
    height: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BoundingBox<TSpace> {
    /// Creates a box directly from its center and size.
    #[inline]
    pub fn from_center(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
            _space: PhantomData,
        }
    }

    /// Creates a box from its corners.
    ///
    /// Size is `max - min`; the center is `min + size / 2`.
    #[inline]
    pub fn from_min_max(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let width = max_x - min_x;
        let height = max_y - min_y;
        Self::from_center(min_x + width / 2.0, min_y + height / 2.0, width, height)
    }

    #[inline]
    pub fn x_center(&self) -> f64 {
        self.x_center
    }

    #[inline]
    pub fn y_center(&self) -> f64 {
        self.y_center
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns `width * height`.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x_center - self.width / 2.0
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y_center - self.height / 2.0
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x_center + self.width / 2.0
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y_center + self.height / 2.0
    }

    /// Returns the corners as `(min_x, min_y, max_x, max_y)`.
    #[inline]
    pub fn to_min_max(&self) -> (f64, f64, f64, f64) {
        (self.min_x(), self.min_y(), self.max_x(), self.max_y())
    }

    /// Returns true if every component is finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x_center.is_finite()
            && self.y_center.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

impl BoundingBox<Pixel> {
    /// Divides center and size by the image dimensions.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BoundingBox<Normalized> {
        BoundingBox::from_center(
            self.x_center / image_width,
            self.y_center / image_height,
            self.width / image_width,
            self.height / image_height,
        )
    }

    /// Returns true if the box lies inside a `image_width x image_height` frame.
    pub fn fits_within(&self, image_width: f64, image_height: f64) -> bool {
        self.min_x() >= 0.0
            && self.min_y() >= 0.0
            && self.max_x() <= image_width
            && self.max_y() <= image_height
    }
}

impl BoundingBox<Normalized> {
    /// Multiplies center and size by the image dimensions.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BoundingBox<Pixel> {
        BoundingBox::from_center(
            self.x_center * image_width,
            self.y_center * image_height,
            self.width * image_width,
            self.height * image_height,
        )
    }
}

impl<TSpace> fmt::Debug for BoundingBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundingBox")
            .field("x_center", &self.x_center)
            .field("y_center", &self.y_center)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
