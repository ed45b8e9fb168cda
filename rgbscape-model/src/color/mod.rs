//! Immutable ARGB color with derived color-space views.
//!
//! Channels are stored as normalized `f32` in `[0, 1]`. HSV, Lab, XYZ and HCL
//! are never stored on the value: they are computed on demand by the pure
//! conversion functions in the submodules.
//!
//! ```text
//!   RGB ──gamma──► XYZ (D65, 0-100) ──► L*a*b* ──polar──► HCL
//!    └────────────► HSV
//! ```

mod hcl;
mod hsv;
mod lab;
mod xyz;

pub use hcl::{hcl_to_lab, lab_to_hcl};
pub use hsv::{hsv_to_rgb, rgb_to_hsv};
pub use lab::{lab_to_xyz, xyz_to_lab, D65_WHITE};
pub use xyz::{rgb_to_xyz, xyz_to_rgb};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorParseError;

/// Default tolerance for [`Color::approx_eq`].
pub const COLOR_TOLERANCE: f32 = 1e-4;

/// Clamp a channel into `[0, 1]`, mapping NaN (and negative zero) to 0.
fn sanitize(value: f32) -> f32 {
    if value.is_nan() || value <= 0.0 {
        0.0
    } else if value >= 1.0 {
        1.0
    } else {
        value
    }
}

/// Byte value of a normalized channel (1.0 maps to 255, everything else scales by 256).
fn byte_from_percentage(percentage: f32) -> u8 {
    if percentage >= 1.0 {
        255
    } else {
        (percentage * 256.0) as u8
    }
}

fn percentage_from_byte(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Arithmetic applied channel-wise by the manipulators.
#[derive(Debug, Clone, Copy)]
enum ChannelOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ChannelOp {
    fn apply(self, current: f32, operand: f32) -> f32 {
        match self {
            Self::Add => current + operand,
            Self::Subtract => current - operand,
            Self::Multiply => current * operand,
            Self::Divide => current / operand,
        }
    }

    fn apply3(self, current: (f32, f32, f32), x: f32, y: f32, z: f32) -> (f32, f32, f32) {
        (
            self.apply(current.0, x),
            self.apply(current.1, y),
            self.apply(current.2, z),
        )
    }
}

fn set3(current: (f32, f32, f32), x: Option<f32>, y: Option<f32>, z: Option<f32>) -> (f32, f32, f32) {
    (
        x.unwrap_or(current.0),
        y.unwrap_or(current.1),
        z.unwrap_or(current.2),
    )
}

/// ARGB point color.
///
/// Equality and hashing cover the four channels only. Use [`Color::approx_eq`]
/// when comparing results of floating point conversions.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    a: f32,
    r: f32,
    g: f32,
    b: f32,
}

impl Color {
    /// Fully transparent black (the state of a never-written LED)
    pub const TRANSPARENT: Self = Self::const_argb(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::const_argb(1.0, 0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::const_argb(1.0, 1.0, 1.0, 1.0);
    pub const RED: Self = Self::const_argb(1.0, 1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::const_argb(1.0, 0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::const_argb(1.0, 0.0, 0.0, 1.0);

    const fn const_argb(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self { a, r, g, b }
    }

    /// Create a color from normalized channels. Values are clamped to `[0, 1]`, NaN becomes 0.
    pub fn new(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self {
            a: sanitize(a),
            r: sanitize(r),
            g: sanitize(g),
            b: sanitize(b),
        }
    }

    /// Opaque color from normalized channels
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(1.0, r, g, b)
    }

    /// Color from byte channels
    pub fn from_argb_bytes(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self::new(
            percentage_from_byte(a),
            percentage_from_byte(r),
            percentage_from_byte(g),
            percentage_from_byte(b),
        )
    }

    /// Opaque color from byte channels
    pub fn from_rgb_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb_bytes(255, r, g, b)
    }

    // === Channels ===

    pub fn a(&self) -> f32 {
        self.a
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    pub fn a_byte(&self) -> u8 {
        byte_from_percentage(self.a)
    }

    pub fn r_byte(&self) -> u8 {
        byte_from_percentage(self.r)
    }

    pub fn g_byte(&self) -> u8 {
        byte_from_percentage(self.g)
    }

    pub fn b_byte(&self) -> u8 {
        byte_from_percentage(self.b)
    }

    /// `(a, r, g, b)` as bytes
    pub fn argb_bytes(&self) -> (u8, u8, u8, u8) {
        (self.a_byte(), self.r_byte(), self.g_byte(), self.b_byte())
    }

    /// `(r, g, b)` as bytes, alpha ignored
    pub fn rgb_bytes(&self) -> (u8, u8, u8) {
        (self.r_byte(), self.g_byte(), self.b_byte())
    }

    /// Same color with another alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(a, self.r, self.g, self.b)
    }

    /// Channel-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Color, tolerance: f32) -> bool {
        (self.a - other.a).abs() <= tolerance
            && (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }

    // === Color spaces ===

    /// `(hue 0-360, saturation 0-1, value 0-1)`
    pub fn hsv(&self) -> (f32, f32, f32) {
        rgb_to_hsv(self.r, self.g, self.b)
    }

    pub fn hue(&self) -> f32 {
        self.hsv().0
    }

    pub fn saturation(&self) -> f32 {
        self.hsv().1
    }

    pub fn value(&self) -> f32 {
        self.hsv().2
    }

    /// Create from HSV (hue in degrees, wrapped; saturation and value 0-1)
    pub fn from_hsv(alpha: f32, hue: f32, saturation: f32, value: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation.clamp(0.0, 1.0), value.clamp(0.0, 1.0));
        Self::new(alpha, r, g, b)
    }

    /// CIE XYZ on the 0-100 scale (D65, sRGB primaries)
    pub fn xyz(&self) -> (f32, f32, f32) {
        rgb_to_xyz(self.r, self.g, self.b)
    }

    pub fn from_xyz(alpha: f32, x: f32, y: f32, z: f32) -> Self {
        let (r, g, b) = xyz_to_rgb(x, y, z);
        Self::new(alpha, r, g, b)
    }

    /// CIE L*a*b* referenced to D65
    pub fn lab(&self) -> (f32, f32, f32) {
        let (x, y, z) = self.xyz();
        xyz_to_lab(x, y, z)
    }

    pub fn from_lab(alpha: f32, l: f32, a: f32, b: f32) -> Self {
        let (x, y, z) = lab_to_xyz(l, a, b);
        Self::from_xyz(alpha, x, y, z)
    }

    /// `(hue 0-360, chroma, lightness)`, the polar form of Lab
    pub fn hcl(&self) -> (f32, f32, f32) {
        let (l, a, b) = self.lab();
        lab_to_hcl(l, a, b)
    }

    pub fn from_hcl(alpha: f32, hue: f32, chroma: f32, lightness: f32) -> Self {
        let (l, a, b) = hcl_to_lab(hue, chroma, lightness);
        Self::from_lab(alpha, l, a, b)
    }

    // === Blending ===

    /// Alpha-composite `overlay` on top of `self`.
    ///
    /// A transparent overlay leaves `self` unchanged, an opaque overlay
    /// replaces it.
    pub fn blend(self, overlay: Color) -> Color {
        if overlay.a <= 0.0 {
            return self;
        }
        if overlay.a >= 1.0 {
            return overlay;
        }

        let alpha = 1.0 - (1.0 - overlay.a) * (1.0 - self.a);
        let overlay_weight = overlay.a / alpha;
        let base_weight = self.a * (1.0 - overlay.a) / alpha;

        Color::new(
            alpha,
            overlay.r * overlay_weight + self.r * base_weight,
            overlay.g * overlay_weight + self.g * base_weight,
            overlay.b * overlay_weight + self.b * base_weight,
        )
    }

    /// Linear interpolation of all four channels, `t` clamped to `[0, 1]`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = sanitize(t);
        Color::new(
            self.a + (other.a - self.a) * t,
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    // === RGB manipulation ===

    fn map_rgb(self, op: ChannelOp, r: f32, g: f32, b: f32) -> Self {
        let (r, g, b) = op.apply3((self.r, self.g, self.b), r, g, b);
        Self::new(self.a, r, g, b)
    }

    pub fn add_rgb(self, r: f32, g: f32, b: f32) -> Self {
        self.map_rgb(ChannelOp::Add, r, g, b)
    }

    pub fn subtract_rgb(self, r: f32, g: f32, b: f32) -> Self {
        self.map_rgb(ChannelOp::Subtract, r, g, b)
    }

    pub fn multiply_rgb(self, r: f32, g: f32, b: f32) -> Self {
        self.map_rgb(ChannelOp::Multiply, r, g, b)
    }

    pub fn divide_rgb(self, r: f32, g: f32, b: f32) -> Self {
        self.map_rgb(ChannelOp::Divide, r, g, b)
    }

    /// Replace the given channels, keep the others
    pub fn set_rgb(self, r: Option<f32>, g: Option<f32>, b: Option<f32>) -> Self {
        let (r, g, b) = set3((self.r, self.g, self.b), r, g, b);
        Self::new(self.a, r, g, b)
    }

    pub fn add_alpha(self, a: f32) -> Self {
        self.with_alpha(ChannelOp::Add.apply(self.a, a))
    }

    pub fn subtract_alpha(self, a: f32) -> Self {
        self.with_alpha(ChannelOp::Subtract.apply(self.a, a))
    }

    pub fn multiply_alpha(self, a: f32) -> Self {
        self.with_alpha(ChannelOp::Multiply.apply(self.a, a))
    }

    pub fn divide_alpha(self, a: f32) -> Self {
        self.with_alpha(ChannelOp::Divide.apply(self.a, a))
    }

    // === HSV manipulation ===

    fn map_hsv(self, op: ChannelOp, hue: f32, saturation: f32, value: f32) -> Self {
        let (h, s, v) = op.apply3(self.hsv(), hue, saturation, value);
        Self::from_hsv(self.a, h, s, v)
    }

    pub fn add_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        self.map_hsv(ChannelOp::Add, hue, saturation, value)
    }

    pub fn subtract_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        self.map_hsv(ChannelOp::Subtract, hue, saturation, value)
    }

    pub fn multiply_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        self.map_hsv(ChannelOp::Multiply, hue, saturation, value)
    }

    pub fn divide_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        self.map_hsv(ChannelOp::Divide, hue, saturation, value)
    }

    pub fn set_hsv(self, hue: Option<f32>, saturation: Option<f32>, value: Option<f32>) -> Self {
        let (h, s, v) = set3(self.hsv(), hue, saturation, value);
        Self::from_hsv(self.a, h, s, v)
    }

    // === Lab manipulation ===

    fn map_lab(self, op: ChannelOp, l: f32, a: f32, b: f32) -> Self {
        let (l, a, b) = op.apply3(self.lab(), l, a, b);
        Self::from_lab(self.a, l, a, b)
    }

    pub fn add_lab(self, l: f32, a: f32, b: f32) -> Self {
        self.map_lab(ChannelOp::Add, l, a, b)
    }

    pub fn subtract_lab(self, l: f32, a: f32, b: f32) -> Self {
        self.map_lab(ChannelOp::Subtract, l, a, b)
    }

    pub fn multiply_lab(self, l: f32, a: f32, b: f32) -> Self {
        self.map_lab(ChannelOp::Multiply, l, a, b)
    }

    pub fn divide_lab(self, l: f32, a: f32, b: f32) -> Self {
        self.map_lab(ChannelOp::Divide, l, a, b)
    }

    pub fn set_lab(self, l: Option<f32>, a: Option<f32>, b: Option<f32>) -> Self {
        let (l, a, b) = set3(self.lab(), l, a, b);
        Self::from_lab(self.a, l, a, b)
    }

    // === XYZ manipulation ===

    fn map_xyz(self, op: ChannelOp, x: f32, y: f32, z: f32) -> Self {
        let (x, y, z) = op.apply3(self.xyz(), x, y, z);
        Self::from_xyz(self.a, x, y, z)
    }

    pub fn add_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.map_xyz(ChannelOp::Add, x, y, z)
    }

    pub fn subtract_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.map_xyz(ChannelOp::Subtract, x, y, z)
    }

    pub fn multiply_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.map_xyz(ChannelOp::Multiply, x, y, z)
    }

    pub fn divide_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.map_xyz(ChannelOp::Divide, x, y, z)
    }

    pub fn set_xyz(self, x: Option<f32>, y: Option<f32>, z: Option<f32>) -> Self {
        let (x, y, z) = set3(self.xyz(), x, y, z);
        Self::from_xyz(self.a, x, y, z)
    }

    // === HCL manipulation ===

    fn map_hcl(self, op: ChannelOp, hue: f32, chroma: f32, lightness: f32) -> Self {
        let (h, c, l) = op.apply3(self.hcl(), hue, chroma, lightness);
        Self::from_hcl(self.a, h, c, l)
    }

    pub fn add_hcl(self, hue: f32, chroma: f32, lightness: f32) -> Self {
        self.map_hcl(ChannelOp::Add, hue, chroma, lightness)
    }

    pub fn subtract_hcl(self, hue: f32, chroma: f32, lightness: f32) -> Self {
        self.map_hcl(ChannelOp::Subtract, hue, chroma, lightness)
    }

    pub fn multiply_hcl(self, hue: f32, chroma: f32, lightness: f32) -> Self {
        self.map_hcl(ChannelOp::Multiply, hue, chroma, lightness)
    }

    pub fn divide_hcl(self, hue: f32, chroma: f32, lightness: f32) -> Self {
        self.map_hcl(ChannelOp::Divide, hue, chroma, lightness)
    }

    pub fn set_hcl(self, hue: Option<f32>, chroma: Option<f32>, lightness: Option<f32>) -> Self {
        let (h, c, l) = set3(self.hcl(), hue, chroma, lightness);
        Self::from_hcl(self.a, h, c, l)
    }

    // === Hex ===

    /// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(hex.to_string()));
        }

        let byte = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorParseError::InvalidDigit(hex.to_string()))
        };

        match digits.len() {
            3 => {
                let expand = |c: &str| byte(&c.repeat(2));
                Ok(Self::from_rgb_bytes(
                    expand(&digits[0..1])?,
                    expand(&digits[1..2])?,
                    expand(&digits[2..3])?,
                ))
            }
            6 => Ok(Self::from_rgb_bytes(
                byte(&digits[0..2])?,
                byte(&digits[2..4])?,
                byte(&digits[4..6])?,
            )),
            8 => Ok(Self::from_argb_bytes(
                byte(&digits[0..2])?,
                byte(&digits[2..4])?,
                byte(&digits[4..6])?,
                byte(&digits[6..8])?,
            )),
            n => Err(ColorParseError::InvalidLength(n)),
        }
    }

    /// `#AARRGGBB`
    pub fn to_hex_argb(&self) -> String {
        let (a, r, g, b) = self.argb_bytes();
        format!("#{a:02X}{r:02X}{g:02X}{b:02X}")
    }

    /// `#RRGGBB`, alpha dropped
    pub fn to_hex_rgb(&self) -> String {
        let (r, g, b) = self.rgb_bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.r == other.r && self.g == other.g && self.b == other.b
    }
}

// Channels are sanitized at construction, so there is no NaN to break reflexivity.
impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.a.to_bits().hash(state);
        self.r.to_bits().hash(state);
        self.g.to_bits().hash(state);
        self.b.to_bits().hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, r, g, b) = self.argb_bytes();
        write!(f, "[A: {a}, R: {r}, G: {g}, B: {b}]")
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_argb())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
