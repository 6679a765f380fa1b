// ============================================================================
// ADJUSTMENT OPERATIONS — whole-canvas pointwise transforms
// ============================================================================
//
// Every adjustment honors the active selection: unselected pixels are
// copied through untouched.  Rows are processed in parallel via rayon.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::selection::Selection;
use crate::surface::PixelSurface;

// ============================================================================
// HELPER: selection-aware per-pixel transform
// ============================================================================

/// Apply a per-pixel transform to the whole surface.  `transform`
/// receives `(r, g, b, a)` as f32 and returns the new channels; outputs
/// are rounded and clamped to `[0, 255]`.  Selection-gated per pixel.
pub fn apply_pixel_transform<F>(surface: &mut PixelSurface, selection: &Selection, transform: F)
where
    F: Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let w = surface.width() as usize;
    let h = surface.height() as usize;
    if w == 0 || h == 0 {
        return;
    }

    let src_raw = surface.as_raw().to_vec();
    let mut dst_raw = vec![0u8; w * h * 4];
    let stride = w * 4;

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * stride..(y + 1) * stride];
        for x in 0..w {
            let pi = x * 4;
            if !selection.contains(x as u32, y as u32) {
                row_out[pi..pi + 4].copy_from_slice(&row_in[pi..pi + 4]);
                continue;
            }
            let r = row_in[pi] as f32;
            let g = row_in[pi + 1] as f32;
            let b = row_in[pi + 2] as f32;
            let a = row_in[pi + 3] as f32;
            let (nr, ng, nb, na) = transform(r, g, b, a);
            row_out[pi] = nr.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 1] = ng.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 2] = nb.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 3] = na.round().clamp(0.0, 255.0) as u8;
        }
    });

    let out = RgbaImage::from_raw(w as u32, h as u32, dst_raw)
        .expect("dst buffer sized from surface dimensions");
    surface.blit(0, 0, &out);
}

// ============================================================================
// ADJUSTMENT CATALOG
// ============================================================================

/// One whole-canvas adjustment with its parameters.  The engine applies
/// these through `EditorEngine::apply_adjustment`, which wraps each in a
/// history entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// `brightness`: -255..255 offset, `contrast`: -255..259 slope input.
    BrightnessContrast { brightness: f32, contrast: f32 },
    /// `hue_shift`: -180..180 degrees; `saturation`, `lightness`: -100..100.
    HueSaturation { hue_shift: f32, saturation: f32, lightness: f32 },
    /// `(in_black, in_white, gamma, out_black, out_white)`.
    Levels { input_black: f32, input_white: f32, gamma: f32, output_black: f32, output_white: f32 },
    /// EV stops, 0 = no change.
    Exposure { stops: f32 },
    /// -100..100; positive boosts under-saturated colors most.
    Vibrance { amount: f32 },
    /// Tonal levels per channel, 2..=16.
    Posterize { levels: u32 },
    /// Luma cutoff, 0..255.
    Threshold { level: f32 },
    Grayscale,
    Invert,
}

impl Adjustment {
    /// Human-readable name for history entries and panels.
    pub fn description(&self) -> &'static str {
        match self {
            Adjustment::BrightnessContrast { .. } => "Brightness/Contrast",
            Adjustment::HueSaturation { .. } => "Hue/Saturation",
            Adjustment::Levels { .. } => "Levels",
            Adjustment::Exposure { .. } => "Exposure",
            Adjustment::Vibrance { .. } => "Vibrance",
            Adjustment::Posterize { .. } => "Posterize",
            Adjustment::Threshold { .. } => "Threshold",
            Adjustment::Grayscale => "Grayscale",
            Adjustment::Invert => "Invert",
        }
    }

    /// Apply to `surface`, gated by `selection`.
    pub fn apply(&self, surface: &mut PixelSurface, selection: &Selection) {
        match *self {
            Adjustment::BrightnessContrast { brightness, contrast } => {
                let factor = (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast));
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    let nr = factor * (r + brightness - 128.0) + 128.0;
                    let ng = factor * (g + brightness - 128.0) + 128.0;
                    let nb = factor * (b + brightness - 128.0) + 128.0;
                    (nr, ng, nb, a)
                });
            }
            Adjustment::HueSaturation { hue_shift, saturation, lightness } => {
                let sat_factor = 1.0 + saturation / 100.0;
                let light_offset = lightness * 255.0 / 100.0;
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
                    let nh = (h + hue_shift / 360.0).fract();
                    let nh = if nh < 0.0 { nh + 1.0 } else { nh };
                    let ns = (s * sat_factor).clamp(0.0, 1.0);
                    let (nr, ng, nb) = hsl_to_rgb(nh, ns, l);
                    (
                        nr * 255.0 + light_offset,
                        ng * 255.0 + light_offset,
                        nb * 255.0 + light_offset,
                        a,
                    )
                });
            }
            Adjustment::Levels { input_black, input_white, gamma, output_black, output_white } => {
                let lut = build_levels_lut(input_black, input_white, gamma, output_black, output_white);
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    (
                        lut[r as usize] as f32,
                        lut[g as usize] as f32,
                        lut[b as usize] as f32,
                        a,
                    )
                });
            }
            Adjustment::Exposure { stops } => {
                let gain = 2.0f32.powf(stops);
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    (r * gain, g * gain, b * gain, a)
                });
            }
            Adjustment::Vibrance { amount } => {
                let v = amount / 100.0;
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    vibrance_pixel(r, g, b, a, v)
                });
            }
            Adjustment::Posterize { levels } => {
                let factor = levels.max(2) as f32;
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    let p = |v: f32| (v / 255.0 * (factor - 1.0)).round() / (factor - 1.0) * 255.0;
                    (p(r), p(g), p(b), a)
                });
            }
            Adjustment::Threshold { level } => {
                apply_pixel_transform(surface, selection, move |r, g, b, a| {
                    let lum = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                    let v = if lum >= level { 255.0 } else { 0.0 };
                    (v, v, v, a)
                });
            }
            Adjustment::Grayscale => {
                apply_pixel_transform(surface, selection, |r, g, b, a| {
                    let v = 0.299 * r + 0.587 * g + 0.114 * b;
                    (v, v, v, a)
                });
            }
            Adjustment::Invert => {
                apply_pixel_transform(surface, selection, |r, g, b, a| {
                    (255.0 - r, 255.0 - g, 255.0 - b, a)
                });
            }
        }
    }
}

fn build_levels_lut(in_black: f32, in_white: f32, gamma: f32, out_black: f32, out_white: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let in_range = (in_white - in_black).max(1.0);
    let out_range = out_white - out_black;
    let inv_gamma = 1.0 / gamma.max(0.01);

    for (i, slot) in lut.iter_mut().enumerate() {
        let v = i as f32;
        let normalized = ((v - in_black) / in_range).clamp(0.0, 1.0);
        let gamma_corrected = normalized.powf(inv_gamma);
        let output = out_black + gamma_corrected * out_range;
        *slot = output.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[inline]
fn vibrance_pixel(r: f32, g: f32, b: f32, a: f32, v: f32) -> (f32, f32, f32, f32) {
    let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
    // Less-saturated colors get the bigger boost.
    let boost = if v >= 0.0 { v * (1.0 - s).powi(2) } else { v * s.powi(2) };
    let ns = (s + boost).clamp(0.0, 1.0);
    let (nr, ng, nb) = hsl_to_rgb(h, ns, l);
    (nr * 255.0, ng * 255.0, nb * 255.0, a)
}

// ============================================================================
// COLOR SPACE HELPERS
// ============================================================================

/// RGB (0..1) → HSL (H: 0..1, S: 0..1, L: 0..1)
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < 1e-6 {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h / 6.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    (h, s, l)
}

/// HSL (H: 0..1, S: 0..1, L: 0..1) → RGB (0..1)
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (r, g, b)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PatchRect;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn invert_round_trips() {
        let mut s = PixelSurface::new(8, 8, Rgba([10, 200, 77, 255]));
        let before = s.as_raw().to_vec();
        Adjustment::Invert.apply(&mut s, &Selection::None);
        assert_eq!(s.get_pixel(0, 0), Rgba([245, 55, 178, 255]));
        Adjustment::Invert.apply(&mut s, &Selection::None);
        assert_eq!(s.as_raw(), &before[..]);
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let mut s = PixelSurface::new(2, 2, Rgba([255, 0, 0, 255]));
        Adjustment::Grayscale.apply(&mut s, &Selection::None);
        let px = s.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[0], 76); // 0.299 * 255, rounded
    }

    #[test]
    fn threshold_splits_on_luma() {
        let mut s = PixelSurface::new(2, 1, Rgba([200, 200, 200, 255]));
        s.put_pixel(1, 0, Rgba([20, 20, 20, 255]));
        Adjustment::Threshold { level: 128.0 }.apply(&mut s, &Selection::None);
        assert_eq!(s.get_pixel(0, 0), WHITE);
        assert_eq!(s.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn posterize_two_levels_is_extreme() {
        let mut s = PixelSurface::new(1, 1, Rgba([100, 200, 0, 255]));
        Adjustment::Posterize { levels: 2 }.apply(&mut s, &Selection::None);
        assert_eq!(s.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn adjustment_respects_selection() {
        let mut s = PixelSurface::new(20, 20, WHITE);
        let selection = Selection::Rectangle { rect: PatchRect::new(5, 5, 10, 10) };
        Adjustment::Invert.apply(&mut s, &selection);
        assert_eq!(s.get_pixel(5, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(s.get_pixel(9, 9), Rgba([0, 0, 0, 255]));
        assert_eq!(s.get_pixel(10, 10), WHITE);
        assert_eq!(s.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn exposure_doubles_per_stop() {
        let mut s = PixelSurface::new(1, 1, Rgba([60, 60, 60, 255]));
        Adjustment::Exposure { stops: 1.0 }.apply(&mut s, &Selection::None);
        assert_eq!(s.get_pixel(0, 0), Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn levels_identity_lut_is_noop() {
        let mut s = PixelSurface::new(4, 4, Rgba([13, 77, 201, 129]));
        let before = s.as_raw().to_vec();
        Adjustment::Levels {
            input_black: 0.0,
            input_white: 255.0,
            gamma: 1.0,
            output_black: 0.0,
            output_white: 255.0,
        }
        .apply(&mut s, &Selection::None);
        assert_eq!(s.as_raw(), &before[..]);
    }

    #[test]
    fn hsl_round_trip() {
        for &(r, g, b) in &[(0.2f32, 0.4f32, 0.9f32), (1.0, 0.0, 0.0), (0.5, 0.5, 0.5)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            assert!((r - r2).abs() < 1e-3);
            assert!((g - g2).abs() < 1e-3);
            assert!((b - b2).abs() < 1e-3);
        }
    }

    #[test]
    fn hue_shift_rotates_primaries() {
        let mut s = PixelSurface::new(1, 1, Rgba([255, 0, 0, 255]));
        Adjustment::HueSaturation { hue_shift: 120.0, saturation: 0.0, lightness: 0.0 }
            .apply(&mut s, &Selection::None);
        let px = s.get_pixel(0, 0);
        // Red rotated 120° lands on green.
        assert!(px[1] > 250 && px[0] < 5 && px[2] < 5);
    }
}
