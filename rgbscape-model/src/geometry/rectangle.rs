//! Axis-aligned rectangle

use serde::{Deserialize, Serialize};

use super::{Point, Rotation, Size};

/// Axis-aligned rectangle with a derived center
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "RectangleRepr", into = "RectangleRepr")]
pub struct Rectangle {
    location: Point,
    size: Size,
    center: Point,
}

#[derive(Serialize, Deserialize)]
struct RectangleRepr {
    location: Point,
    size: Size,
}

impl From<RectangleRepr> for Rectangle {
    fn from(repr: RectangleRepr) -> Self {
        Rectangle::new(repr.location, repr.size)
    }
}

impl From<Rectangle> for RectangleRepr {
    fn from(rect: Rectangle) -> Self {
        RectangleRepr {
            location: rect.location,
            size: rect.size,
        }
    }
}

impl Rectangle {
    pub fn new(location: Point, size: Size) -> Self {
        Self {
            location,
            size,
            center: Point::new(
                location.x + size.width / 2.0,
                location.y + size.height / 2.0,
            ),
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    /// Rectangle of `size` located at the origin
    pub fn from_size(size: Size) -> Self {
        Self::new(Point::ORIGIN, size)
    }

    /// Smallest rectangle containing both points
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::from_xywh(x, y, a.x.max(b.x) - x, a.y.max(b.y) - y)
    }

    /// Bounding box of a set of points; empty input gives the default rectangle
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Self::from_points(min, max)
    }

    /// Union of many rectangles; empty input gives the default rectangle
    pub fn union_all<I: IntoIterator<Item = Rectangle>>(rects: I) -> Self {
        Self::bounding(
            rects
                .into_iter()
                .flat_map(|r| [r.location, Point::new(r.right(), r.bottom())]),
        )
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn x(&self) -> f32 {
        self.location.x
    }

    pub fn y(&self) -> f32 {
        self.location.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.location.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.location.y + self.size.height
    }

    /// True if the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !(self.size.width > 0.0 && self.size.height > 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.location.is_valid() && self.size.is_valid()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x() && point.x <= self.right() && point.y >= self.y() && point.y <= self.bottom()
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Self::union_all([*self, *other])
    }

    /// Overlapping area, or the default rectangle if there is none
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        let x = self.x().max(other.x());
        let y = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Self::default();
        }
        Self::from_xywh(x, y, right - x, bottom - y)
    }

    /// Fraction (0-1) of this rectangle's area covered by `other`
    pub fn intersect_percentage(&self, other: &Rectangle) -> f32 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        self.intersection(other).size.area() / self.size.area()
    }

    pub fn translate(&self, offset: Point) -> Rectangle {
        Self::new(self.location + offset, self.size)
    }

    /// Corners (top-left, top-right, bottom-right, bottom-left) rotated around `origin`
    pub fn rotated_corners(&self, rotation: Rotation, origin: Point) -> [Point; 4] {
        [
            self.location,
            Point::new(self.right(), self.y()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x(), self.bottom()),
        ]
        .map(|p| p.rotate(rotation, origin))
    }

    /// Axis-aligned bounding box of this rectangle rotated around `origin`
    pub fn rotate(&self, rotation: Rotation, origin: Point) -> Rectangle {
        Self::bounding(self.rotated_corners(rotation, origin))
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.size == other.size
    }
}
