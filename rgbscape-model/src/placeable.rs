//! Positioned, sized, scaled and rotated elements.
//!
//! A [`Placeable`] stores its own Location/Size/Scale/Rotation and derives the
//! "actual" geometry from them (and from a parent transform, if any). Setters
//! recompute synchronously and return a [`PlaceableChanges`] describing which
//! of the seven properties changed, so owners decide what to propagate.
//!
//! ```text
//! with parent:    actual size     = size × parent.scale
//!                 actual location = rotate(location × parent.scale,
//!                                          parent.rotation, pivot) + offset
//!                 pivot           = center of parent's actual size
//!                 offset          = center of parent's boundary size − pivot
//! without parent: actual size     = size × scale
//!                 boundary        = rect rotated about its own center
//! ```

use crate::geometry::{Point, Rectangle, Rotation, Scale, Size};

/// Transform a parent contributes to the geometry of its children
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParentTransform {
    pub scale: Scale,
    pub rotation: Rotation,
    pub actual_size: Size,
    /// Size of the parent's (rotated) boundary
    pub boundary_size: Size,
}

impl ParentTransform {
    /// Snapshot the transform of `parent`
    pub fn of(parent: &Placeable) -> Self {
        Self {
            scale: parent.scale(),
            rotation: parent.rotation(),
            actual_size: parent.actual_size(),
            boundary_size: parent.boundary().size(),
        }
    }
}

/// Which properties a write changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceableChanges {
    pub location: bool,
    pub size: bool,
    pub scale: bool,
    pub rotation: bool,
    pub actual_location: bool,
    pub actual_size: bool,
    pub boundary: bool,
}

impl PlaceableChanges {
    pub fn any(&self) -> bool {
        self.location
            || self.size
            || self.scale
            || self.rotation
            || self.actual_location
            || self.actual_size
            || self.boundary
    }

    /// True if children deriving geometry from this element must be refreshed
    pub fn affects_children(&self) -> bool {
        self.scale || self.rotation || self.actual_size || self.boundary
    }

    /// Combine two change sets
    pub fn merge(self, other: PlaceableChanges) -> Self {
        Self {
            location: self.location || other.location,
            size: self.size || other.size,
            scale: self.scale || other.scale,
            rotation: self.rotation || other.rotation,
            actual_location: self.actual_location || other.actual_location,
            actual_size: self.actual_size || other.actual_size,
            boundary: self.boundary || other.boundary,
        }
    }
}

/// Element with own and derived ("actual") geometry
#[derive(Debug, Clone)]
pub struct Placeable {
    location: Point,
    size: Size,
    scale: Scale,
    rotation: Rotation,
    parent: Option<ParentTransform>,

    actual_location: Point,
    actual_size: Size,
    boundary: Rectangle,
}

impl Default for Placeable {
    fn default() -> Self {
        Self::new(Point::ORIGIN, Size::ZERO)
    }
}

impl Placeable {
    pub fn new(location: Point, size: Size) -> Self {
        let mut placeable = Self {
            location,
            size,
            scale: Scale::IDENTITY,
            rotation: Rotation::NONE,
            parent: None,
            actual_location: location,
            actual_size: size,
            boundary: Rectangle::new(location, size),
        };
        placeable.recompute();
        placeable
    }

    /// Same as [`Placeable::new`] but placed inside `parent`
    pub fn with_parent(location: Point, size: Size, parent: ParentTransform) -> Self {
        let mut placeable = Self::new(location, size);
        placeable.set_parent(Some(parent));
        placeable
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn parent(&self) -> Option<&ParentTransform> {
        self.parent.as_ref()
    }

    pub fn actual_location(&self) -> Point {
        self.actual_location
    }

    pub fn actual_size(&self) -> Size {
        self.actual_size
    }

    pub fn boundary(&self) -> Rectangle {
        self.boundary
    }

    pub fn set_location(&mut self, location: Point) -> PlaceableChanges {
        if self.location == location {
            return PlaceableChanges::default();
        }
        self.location = location;
        PlaceableChanges {
            location: true,
            ..self.recompute()
        }
    }

    pub fn set_size(&mut self, size: Size) -> PlaceableChanges {
        if self.size == size {
            return PlaceableChanges::default();
        }
        self.size = size;
        PlaceableChanges {
            size: true,
            ..self.recompute()
        }
    }

    pub fn set_scale(&mut self, scale: Scale) -> PlaceableChanges {
        if self.scale == scale {
            return PlaceableChanges::default();
        }
        self.scale = scale;
        PlaceableChanges {
            scale: true,
            ..self.recompute()
        }
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> PlaceableChanges {
        if self.rotation == rotation {
            return PlaceableChanges::default();
        }
        self.rotation = rotation;
        PlaceableChanges {
            rotation: true,
            ..self.recompute()
        }
    }

    /// Replace the parent transform and recompute derived geometry
    pub fn set_parent(&mut self, parent: Option<ParentTransform>) -> PlaceableChanges {
        if self.parent == parent {
            return PlaceableChanges::default();
        }
        self.parent = parent;
        self.recompute()
    }

    /// Recompute actual geometry; only the derived flags are set in the result
    fn recompute(&mut self) -> PlaceableChanges {
        let (actual_location, actual_size, boundary) = match self.parent {
            Some(parent) => {
                let actual_size = self.size * parent.scale;
                let scaled_location = self.location * parent.scale;
                let local = Rectangle::new(scaled_location, actual_size);

                if parent.rotation.is_rotated() {
                    let pivot = Rectangle::from_size(parent.actual_size).center();
                    let offset = Rectangle::from_size(parent.boundary_size).center() - pivot;
                    (
                        scaled_location.rotate(parent.rotation, pivot) + offset,
                        actual_size,
                        local.rotate(parent.rotation, pivot).translate(offset),
                    )
                } else {
                    (scaled_location, actual_size, local)
                }
            }
            None => {
                let actual_size = self.size * self.scale;
                let rect = Rectangle::new(self.location, actual_size);
                let boundary = if self.rotation.is_rotated() {
                    rect.rotate(self.rotation, rect.center())
                } else {
                    rect
                };
                (self.location, actual_size, boundary)
            }
        };

        let changes = PlaceableChanges {
            actual_location: self.actual_location != actual_location,
            actual_size: self.actual_size != actual_size,
            boundary: self.boundary != boundary,
            ..PlaceableChanges::default()
        };

        self.actual_location = actual_location;
        self.actual_size = actual_size;
        self.boundary = boundary;
        changes
    }
}
