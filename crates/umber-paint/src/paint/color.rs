use core::fmt;

/// Packed 32-bit pixel: `0xAARRGGBB`, premultiplied alpha.
///
/// This is the value callers hand to paint setters. It is kept packed inside the
/// paint state so that equality is exact and cheap.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Pixel(pub u32);

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel(0);

    /// Packs premultiplied 8-bit channels.
    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xff
    }

    /// Unpacks into a float premultiplied color.
    #[inline]
    pub fn to_color(self) -> Color {
        let c = |shift: u32| ((self.0 >> shift) & 0xff) as f32 / 255.0;
        Color::from_premul(c(16), c(8), c(0), c(24))
    }
}

impl fmt::Debug for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pixel({:#010x})", self.0)
    }
}

/// Premultiplied RGBA color with `f32` channels.
///
/// Invariant:
/// - `rgb` components are expected to be multiplied by `a` (premultiplied alpha).
///
/// Whether the channels are sRGB-encoded or linear depends on the interpolation
/// space chosen for the gradient that produced them; see [`Color::to_linear_rgb`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// Re-encodes an sRGB premultiplied color as linear-RGB premultiplied.
    ///
    /// Channels are un-premultiplied before the transfer function is applied.
    pub fn to_linear_rgb(self) -> Self {
        let (r, g, b, a) = self.to_straight();
        Self::from_straight(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a)
    }

    /// Inverse of [`Color::to_linear_rgb`].
    pub fn to_srgb(self) -> Self {
        let (r, g, b, a) = self.to_straight();
        Self::from_straight(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b), a)
    }

    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Quantizes to packed premultiplied RGBA8 (`0xAABBGGRR`, texel byte order).
    pub fn to_rgba8_u32(self) -> u32 {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        q(self.r) | (q(self.g) << 8) | (q(self.b) << 16) | (q(self.a) << 24)
    }
}

// Exact sRGB transfer functions (IEC 61966-2-1).
#[inline]
pub(crate) fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
pub(crate) fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_unpacks_channels() {
        let c = Pixel(0xff_ff_00_00).to_color();
        assert_eq!(c, Color::from_premul(1.0, 0.0, 0.0, 1.0));
        assert!(Pixel(0xff_00_00_ff).is_opaque());
        assert!(!Pixel(0x80_00_00_40).is_opaque());
    }

    #[test]
    fn from_argb_packs_in_order() {
        assert_eq!(Pixel::from_argb(0x11, 0x22, 0x33, 0x44), Pixel(0x11223344));
    }

    #[test]
    fn linear_rgb_round_trip() {
        let c = Color::from_straight(0.25, 0.5, 0.75, 0.5);
        let back = c.to_linear_rgb().to_srgb();
        assert!((back.r - c.r).abs() < 1e-5);
        assert!((back.g - c.g).abs() < 1e-5);
        assert!((back.b - c.b).abs() < 1e-5);
        assert_eq!(back.a, c.a);
    }

    #[test]
    fn transfer_endpoints_are_fixed() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rgba8_quantization() {
        assert_eq!(Color::from_premul(1.0, 0.0, 0.0, 1.0).to_rgba8_u32(), 0xff_00_00_ff);
    }
}
