//! Scene model for the rgbscape lighting surface
//!
//! This crate holds the value types every other layer builds on:
//!
//! - [`Color`] - immutable ARGB color with HSV, Lab, XYZ and HCL views
//! - [`geometry`] - points, sizes, rectangles, rotations and scales
//! - [`Placeable`] - positioned element deriving its actual geometry from a parent
//! - [`Led`] / [`LedRef`] - addressable light with pending/committed colors
//! - [`Ownership`] - exclusive "belongs to one surface" slots
//! - [`EventHandlers`] - explicitly registered notification callbacks

pub mod color;
pub mod error;
pub mod event;
pub mod geometry;
pub mod led;
pub mod ownership;
pub mod placeable;

pub use color::Color;
pub use error::ColorParseError;
pub use event::{panic_message, EventHandlers, SubscriptionId};
pub use geometry::{Point, Rectangle, Rotation, Scale, Size};
pub use led::{Led, LedId, LedRef, Shape};
pub use ownership::{OwnerId, Ownership};
pub use placeable::{ParentTransform, Placeable, PlaceableChanges};
