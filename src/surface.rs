use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A pixel with zero alpha, returned by value for out-of-range reads.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// PATCH RECT — integer pixel rectangle (inclusive min, exclusive max)
// ============================================================================

/// Axis-aligned pixel rectangle.  `min` is inclusive, `max` exclusive, so
/// `width = max_x - min_x`.  All tool dirty-rect tracking and history
/// patches are expressed in these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PatchRect {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Rectangle from an origin and a size.
    pub fn from_origin_size(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { min_x: x, min_y: y, max_x: x.saturating_add(w), max_y: y.saturating_add(h) }
    }

    /// Rectangle covering an entire `w × h` surface.
    pub fn full(w: u32, h: u32) -> Self {
        Self { min_x: 0, min_y: 0, max_x: w, max_y: h }
    }

    /// Square window of half-extent `radius` centred on `(cx, cy)`,
    /// clamped at the origin.  The caller still clamps `max` against the
    /// surface when sampling.
    pub fn around(cx: u32, cy: u32, radius: u32) -> Self {
        Self {
            min_x: cx.saturating_sub(radius),
            min_y: cy.saturating_sub(radius),
            max_x: cx.saturating_add(radius).saturating_add(1),
            max_y: cy.saturating_add(radius).saturating_add(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Smallest rectangle covering both operands.
    pub fn union(&self, other: PatchRect) -> PatchRect {
        PatchRect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `pad` on every side (clamped at zero), then clamp to the
    /// surface bounds.
    pub fn expand_clamped(&self, pad: u32, w: u32, h: u32) -> PatchRect {
        PatchRect {
            min_x: self.min_x.saturating_sub(pad),
            min_y: self.min_y.saturating_sub(pad),
            max_x: self.max_x.saturating_add(pad).min(w),
            max_y: self.max_y.saturating_add(pad).min(h),
        }
    }

    /// Clamp against a `w × h` surface.
    pub fn clamped(&self, w: u32, h: u32) -> PatchRect {
        PatchRect {
            min_x: self.min_x.min(w),
            min_y: self.min_y.min(h),
            max_x: self.max_x.min(w),
            max_y: self.max_y.min(h),
        }
    }
}

// ============================================================================
// PIXEL SURFACE — the mutable RGBA bitmap tools read and write
// ============================================================================

/// Fixed-size row-major RGBA bitmap.  Tools mutate it in place; it is
/// never resized by the engine (resizing is an external document
/// operation).  Out-of-range single-pixel access degrades gracefully:
/// reads return transparent, writes are dropped.
#[derive(Clone, PartialEq)]
pub struct PixelSurface {
    pixels: RgbaImage,
}

impl PixelSurface {
    /// Create a surface filled with `fill`.  Degenerate or absurd
    /// dimensions are clamped to 1×1 (max ~256 megapixels), matching the
    /// sanity cap on document creation.
    pub fn new(width: u32, height: u32, fill: Rgba<u8>) -> Self {
        let (width, height) = {
            let total = (width as u64) * (height as u64);
            if total > 256_000_000 || width == 0 || height == 0 {
                log::warn!("PixelSurface::new: dimensions {}x{} rejected, clamped to 1x1", width, height);
                (1, 1)
            } else {
                (width, height)
            }
        };
        let mut pixels = RgbaImage::new(width, height);
        if fill != TRANSPARENT {
            for px in pixels.pixels_mut() {
                *px = fill;
            }
        }
        Self { pixels }
    }

    /// Wrap a decoded image (the import path: the external file layer
    /// hands us pixels, we own them from here).
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    // ---- pixel access -------------------------------------------------------

    /// Read a pixel.  Out-of-range reads return transparent.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        if x >= self.width() || y >= self.height() {
            return TRANSPARENT;
        }
        *self.pixels.get_pixel(x, y)
    }

    /// Write a pixel.  Out-of-range writes are silently dropped.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        self.pixels.put_pixel(x, y, pixel);
    }

    // ---- bulk access --------------------------------------------------------

    /// Copy out a rectangle, clamped to the surface bounds.  Returns the
    /// pixels together with the clamped rectangle actually read, so the
    /// caller knows where to put them back.  The clamp is silent: the
    /// drag-driven tools call this continuously and must never fail
    /// mid-gesture.
    pub fn region(&self, rect: PatchRect) -> (RgbaImage, PatchRect) {
        let r = rect.clamped(self.width(), self.height());
        if r.is_empty() {
            return (RgbaImage::new(0, 0), r);
        }
        let mut out = RgbaImage::new(r.width(), r.height());
        let stride = self.width() as usize * 4;
        let src_raw = self.pixels.as_raw();
        let row_bytes = r.width() as usize * 4;
        for (dy, y) in (r.min_y..r.max_y).enumerate() {
            let src_start = y as usize * stride + r.min_x as usize * 4;
            let dst_start = dy * row_bytes;
            out.as_mut()[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src_raw[src_start..src_start + row_bytes]);
        }
        (out, r)
    }

    /// Checked rectangle read for external callers that asked for an
    /// exact region.  Unlike `region`, a rectangle that is not fully
    /// inside the surface is an error rather than a silent clamp.
    pub fn try_region(&self, rect: PatchRect) -> Result<RgbaImage, EngineError> {
        if rect.max_x > self.width() || rect.max_y > self.height() || rect.is_empty() {
            return Err(EngineError::OutOfBounds {
                x: rect.min_x,
                y: rect.min_y,
                w: rect.width(),
                h: rect.height(),
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(self.region(rect).0)
    }

    /// Blit an RGBA sub-image at `(dst_x, dst_y)` using bulk row copies.
    /// The destination may be partially (or fully) off-surface; rows and
    /// columns outside the bounds are clipped.
    pub fn blit(&mut self, dst_x: i32, dst_y: i32, src: &RgbaImage) {
        let (sw, sh) = (src.width(), src.height());
        let (w, h) = (self.width(), self.height());
        let stride = w as usize * 4;
        let src_stride = sw as usize * 4;
        let src_raw = src.as_raw();
        for sy in 0..sh {
            let gy = dst_y + sy as i32;
            if gy < 0 || gy as u32 >= h {
                continue;
            }
            let sx_start = (-dst_x).max(0) as u32;
            if sx_start >= sw {
                continue;
            }
            let gx_start = dst_x + sx_start as i32;
            let gx_start = gx_start as u32;
            if gx_start >= w {
                continue;
            }
            let run = (sw - sx_start).min(w - gx_start) as usize;
            let src_off = sy as usize * src_stride + sx_start as usize * 4;
            let dst_off = gy as usize * stride + gx_start as usize * 4;
            self.pixels.as_mut()[dst_off..dst_off + run * 4]
                .copy_from_slice(&src_raw[src_off..src_off + run * 4]);
        }
    }

    /// Fill every pixel with `color`.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Fill a rectangle (clamped) with `color`.
    pub fn fill_rect(&mut self, rect: PatchRect, color: Rgba<u8>) {
        let r = rect.clamped(self.width(), self.height());
        for y in r.min_y..r.max_y {
            for x in r.min_x..r.max_x {
                self.pixels.put_pixel(x, y, color);
            }
        }
    }

    /// Borrow the backing image (export path, tests).
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Flat RGBA byte view, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

// ============================================================================
// BLEND MODES
// ============================================================================

/// Blend modes the brush stamp path understands.  Serialized as the
/// lowercase names the external configuration store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    Darken,
    Lighten,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::SoftLight,
            BlendMode::HardLight,
            BlendMode::ColorDodge,
            BlendMode::ColorBurn,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::Difference,
            BlendMode::Exclusion,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Multiply => "Multiply",
            BlendMode::Screen => "Screen",
            BlendMode::Overlay => "Overlay",
            BlendMode::SoftLight => "Soft Light",
            BlendMode::HardLight => "Hard Light",
            BlendMode::ColorDodge => "Color Dodge",
            BlendMode::ColorBurn => "Color Burn",
            BlendMode::Darken => "Darken",
            BlendMode::Lighten => "Lighten",
            BlendMode::Difference => "Difference",
            BlendMode::Exclusion => "Exclusion",
        }
    }
}

/// Composite `top` over `base` in `mode` at `opacity` (0..=1).
pub fn blend_pixel(base: Rgba<u8>, top: Rgba<u8>, mode: BlendMode, opacity: f32) -> Rgba<u8> {
    // Fast path: fully transparent top pixel — nothing to blend
    if top[3] == 0 {
        return base;
    }

    // Fast path: Normal blend, full opacity, fully opaque top pixel
    if matches!(mode, BlendMode::Normal) && opacity >= 1.0 && top[3] == 255 {
        return top;
    }

    let opacity = opacity.clamp(0.0, 1.0);

    let base_r = base[0] as f32 / 255.0;
    let base_g = base[1] as f32 / 255.0;
    let base_b = base[2] as f32 / 255.0;
    let base_a = base[3] as f32 / 255.0;

    let top_r = top[0] as f32 / 255.0;
    let top_g = top[1] as f32 / 255.0;
    let top_b = top[2] as f32 / 255.0;
    let top_a = (top[3] as f32 / 255.0) * opacity;

    let (r, g, b) = match mode {
        BlendMode::Normal => (top_r, top_g, top_b),
        BlendMode::Multiply => (base_r * top_r, base_g * top_g, base_b * top_b),
        BlendMode::Screen => (
            1.0 - (1.0 - base_r) * (1.0 - top_r),
            1.0 - (1.0 - base_g) * (1.0 - top_g),
            1.0 - (1.0 - base_b) * (1.0 - top_b),
        ),
        BlendMode::Overlay => (
            overlay_channel(base_r, top_r),
            overlay_channel(base_g, top_g),
            overlay_channel(base_b, top_b),
        ),
        BlendMode::SoftLight => (
            soft_light_channel(base_r, top_r),
            soft_light_channel(base_g, top_g),
            soft_light_channel(base_b, top_b),
        ),
        BlendMode::HardLight => (
            overlay_channel(top_r, base_r),
            overlay_channel(top_g, base_g),
            overlay_channel(top_b, base_b),
        ),
        BlendMode::ColorDodge => (
            color_dodge_channel(base_r, top_r),
            color_dodge_channel(base_g, top_g),
            color_dodge_channel(base_b, top_b),
        ),
        BlendMode::ColorBurn => (
            color_burn_channel(base_r, top_r),
            color_burn_channel(base_g, top_g),
            color_burn_channel(base_b, top_b),
        ),
        BlendMode::Darken => (base_r.min(top_r), base_g.min(top_g), base_b.min(top_b)),
        BlendMode::Lighten => (base_r.max(top_r), base_g.max(top_g), base_b.max(top_b)),
        BlendMode::Difference => (
            (base_r - top_r).abs(),
            (base_g - top_g).abs(),
            (base_b - top_b).abs(),
        ),
        BlendMode::Exclusion => (
            base_r + top_r - 2.0 * base_r * top_r,
            base_g + top_g - 2.0 * base_g * top_g,
            base_b + top_b - 2.0 * base_b * top_b,
        ),
    };

    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a == 0.0 {
        return TRANSPARENT;
    }

    let out_r = (r * top_a + base_r * base_a * (1.0 - top_a)) / out_a;
    let out_g = (g * top_a + base_g * base_a * (1.0 - top_a)) / out_a;
    let out_b = (b * top_a + base_b * base_a * (1.0 - top_a)) / out_a;

    Rgba([
        (out_r * 255.0).clamp(0.0, 255.0) as u8,
        (out_g * 255.0).clamp(0.0, 255.0) as u8,
        (out_b * 255.0).clamp(0.0, 255.0) as u8,
        (out_a * 255.0).clamp(0.0, 255.0) as u8,
    ])
}

fn overlay_channel(base: f32, top: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * top
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - top)
    }
}

fn color_burn_channel(base: f32, top: f32) -> f32 {
    if top == 0.0 {
        0.0
    } else {
        (1.0 - (1.0 - base) / top).max(0.0)
    }
}

fn color_dodge_channel(base: f32, top: f32) -> f32 {
    if top >= 1.0 {
        1.0
    } else {
        (base / (1.0 - top)).min(1.0)
    }
}

/// W3C Soft Light formula.
fn soft_light_channel(base: f32, top: f32) -> f32 {
    if top <= 0.5 {
        base - (1.0 - 2.0 * top) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            base.sqrt()
        };
        base + (2.0 * top - 1.0) * (d - base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn out_of_range_read_is_transparent() {
        let s = PixelSurface::new(4, 4, WHITE);
        assert_eq!(s.get_pixel(4, 0), TRANSPARENT);
        assert_eq!(s.get_pixel(0, 100), TRANSPARENT);
    }

    #[test]
    fn out_of_range_write_is_dropped() {
        let mut s = PixelSurface::new(4, 4, WHITE);
        s.put_pixel(10, 10, RED);
        assert_eq!(s.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn degenerate_dimensions_clamp_to_one() {
        let s = PixelSurface::new(0, 600, WHITE);
        assert_eq!((s.width(), s.height()), (1, 1));
    }

    #[test]
    fn region_clamps_silently() {
        let s = PixelSurface::new(8, 8, WHITE);
        let (buf, r) = s.region(PatchRect::from_origin_size(6, 6, 10, 10));
        assert_eq!(r, PatchRect::new(6, 6, 8, 8));
        assert_eq!((buf.width(), buf.height()), (2, 2));
        assert_eq!(*buf.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn try_region_rejects_partial_overlap() {
        let s = PixelSurface::new(8, 8, WHITE);
        let err = s.try_region(PatchRect::from_origin_size(6, 6, 10, 10));
        assert!(matches!(err, Err(EngineError::OutOfBounds { .. })));
        assert!(s.try_region(PatchRect::from_origin_size(2, 2, 4, 4)).is_ok());
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut s = PixelSurface::new(4, 4, WHITE);
        let mut patch = RgbaImage::new(3, 3);
        for px in patch.pixels_mut() {
            *px = RED;
        }
        s.blit(-1, -1, &patch);
        assert_eq!(s.get_pixel(0, 0), RED);
        assert_eq!(s.get_pixel(1, 1), RED);
        assert_eq!(s.get_pixel(2, 2), WHITE);
        s.blit(3, 3, &patch);
        assert_eq!(s.get_pixel(3, 3), RED);
    }

    #[test]
    fn region_roundtrip_is_exact() {
        let mut s = PixelSurface::new(6, 6, WHITE);
        s.put_pixel(2, 2, RED);
        s.put_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let rect = PatchRect::from_origin_size(1, 1, 4, 4);
        let (buf, r) = s.region(rect);
        let mut other = PixelSurface::new(6, 6, TRANSPARENT);
        other.blit(r.min_x as i32, r.min_y as i32, &buf);
        assert_eq!(other.get_pixel(2, 2), RED);
        assert_eq!(other.get_pixel(3, 2), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn blend_normal_full_opacity_overwrites() {
        assert_eq!(blend_pixel(WHITE, RED, BlendMode::Normal, 1.0), RED);
    }

    #[test]
    fn blend_transparent_top_is_identity() {
        assert_eq!(blend_pixel(RED, TRANSPARENT, BlendMode::Multiply, 1.0), RED);
    }

    #[test]
    fn blend_multiply_darkens() {
        let grey = Rgba([128, 128, 128, 255]);
        let out = blend_pixel(grey, grey, BlendMode::Multiply, 1.0);
        assert!(out[0] < 128);
    }

    #[test]
    fn patch_rect_union_and_contains() {
        let a = PatchRect::new(0, 0, 4, 4);
        let b = PatchRect::new(2, 2, 8, 8);
        let u = a.union(b);
        assert_eq!(u, PatchRect::new(0, 0, 8, 8));
        assert!(u.contains(7, 7));
        assert!(!u.contains(8, 8));
    }
}
