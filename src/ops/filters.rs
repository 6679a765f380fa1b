// ============================================================================
// FILTER BRUSHES — windowed kernels applied around the cursor
// ============================================================================
//
// These run continuously during pointer drags, so every window is
// clamped to the surface bounds and never fails.  Each kernel computes
// its result from a snapshot of the window and writes back in one blit;
// selection gating is applied per pixel inside the window.
// ============================================================================

use image::Rgba;

use crate::selection::Selection;
use crate::surface::{PatchRect, PixelSurface};

/// Half-extent of the blur tool's window around the cursor.
pub const BLUR_WINDOW_RADIUS: u32 = 30;
/// Box-blur kernel radius k — each output pixel averages a (2k+1)² block.
pub const BLUR_KERNEL_RADIUS: u32 = 3;
/// Half-extent of the sharpen tool's window.
pub const SHARPEN_WINDOW_RADIUS: u32 = 25;
/// Half-extent of the dodge/burn/sponge windows.
pub const TONE_WINDOW_RADIUS: u32 = 25;
/// Half-extent of the smudge window.
pub const SMUDGE_WINDOW_RADIUS: u32 = 15;

/// Channel gain for dodge (lighten).
pub const DODGE_FACTOR: f32 = 1.3;
/// Channel gain for burn (darken).
pub const BURN_FACTOR: f32 = 0.7;
/// Carry-over strength of the smudge blend.
pub const SMUDGE_STRENGTH: f32 = 0.3;

/// Box blur of the window around `(cx, cy)`.  Pixels within the kernel
/// radius of the window edge are left at their original value rather
/// than clamped or wrapped; this edge policy is load-bearing for
/// reproducibility and must not change.
pub fn box_blur_window(
    surface: &mut PixelSurface,
    selection: &Selection,
    cx: u32,
    cy: u32,
) -> PatchRect {
    let window = PatchRect::around(cx, cy, BLUR_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    if window.is_empty() {
        return window;
    }
    let (snapshot, r) = surface.region(window);
    let (w, h) = (snapshot.width(), snapshot.height());
    let k = BLUR_KERNEL_RADIUS;
    if w <= 2 * k || h <= 2 * k {
        return r;
    }

    let mut out = snapshot.clone();
    for y in k..h - k {
        for x in k..w - k {
            if !selection.contains(r.min_x + x, r.min_y + y) {
                continue;
            }
            let mut acc = [0u32; 3];
            let mut count = 0u32;
            for dy in 0..=2 * k {
                for dx in 0..=2 * k {
                    let px = snapshot.get_pixel(x + dx - k, y + dy - k);
                    acc[0] += px[0] as u32;
                    acc[1] += px[1] as u32;
                    acc[2] += px[2] as u32;
                    count += 1;
                }
            }
            let a = snapshot.get_pixel(x, y)[3];
            out.put_pixel(
                x,
                y,
                Rgba([
                    (acc[0] / count) as u8,
                    (acc[1] / count) as u8,
                    (acc[2] / count) as u8,
                    a,
                ]),
            );
        }
    }
    surface.blit(r.min_x as i32, r.min_y as i32, &out);
    r
}

/// Sharpen convolution kernel: `[0,-1,0; -1,5,-1; 0,-1,0]`.
const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// 3×3 sharpen convolution over the window around `(cx, cy)`; the
/// one-pixel window border is skipped, outputs clamp to `[0, 255]`.
pub fn sharpen_window(
    surface: &mut PixelSurface,
    selection: &Selection,
    cx: u32,
    cy: u32,
) -> PatchRect {
    let window = PatchRect::around(cx, cy, SHARPEN_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    if window.is_empty() {
        return window;
    }
    let (snapshot, r) = surface.region(window);
    let (w, h) = (snapshot.width(), snapshot.height());
    if w < 3 || h < 3 {
        return r;
    }

    let mut out = snapshot.clone();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !selection.contains(r.min_x + x, r.min_y + y) {
                continue;
            }
            let mut acc = [0i32; 3];
            for ky in 0..3u32 {
                for kx in 0..3u32 {
                    let kv = SHARPEN_KERNEL[(ky * 3 + kx) as usize];
                    let px = snapshot.get_pixel(x + kx - 1, y + ky - 1);
                    acc[0] += px[0] as i32 * kv;
                    acc[1] += px[1] as i32 * kv;
                    acc[2] += px[2] as i32 * kv;
                }
            }
            let a = snapshot.get_pixel(x, y)[3];
            out.put_pixel(
                x,
                y,
                Rgba([
                    acc[0].clamp(0, 255) as u8,
                    acc[1].clamp(0, 255) as u8,
                    acc[2].clamp(0, 255) as u8,
                    a,
                ]),
            );
        }
    }
    surface.blit(r.min_x as i32, r.min_y as i32, &out);
    r
}

/// Dodge: multiply RGB by 1.3 (lighten) inside the window.
pub fn dodge_window(surface: &mut PixelSurface, selection: &Selection, cx: u32, cy: u32) -> PatchRect {
    scale_window(surface, selection, cx, cy, DODGE_FACTOR)
}

/// Burn: multiply RGB by 0.7 (darken) inside the window.
pub fn burn_window(surface: &mut PixelSurface, selection: &Selection, cx: u32, cy: u32) -> PatchRect {
    scale_window(surface, selection, cx, cy, BURN_FACTOR)
}

fn scale_window(
    surface: &mut PixelSurface,
    selection: &Selection,
    cx: u32,
    cy: u32,
    factor: f32,
) -> PatchRect {
    let window = PatchRect::around(cx, cy, TONE_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    for y in window.min_y..window.max_y {
        for x in window.min_x..window.max_x {
            if !selection.contains(x, y) {
                continue;
            }
            let px = surface.get_pixel(x, y);
            surface.put_pixel(
                x,
                y,
                Rgba([
                    (px[0] as f32 * factor).clamp(0.0, 255.0) as u8,
                    (px[1] as f32 * factor).clamp(0.0, 255.0) as u8,
                    (px[2] as f32 * factor).clamp(0.0, 255.0) as u8,
                    px[3],
                ]),
            );
        }
    }
    window
}

/// Sponge: blend each channel 50 % toward the pixel's luma
/// (`0.299 R + 0.587 G + 0.114 B`), desaturating the window.
pub fn sponge_window(surface: &mut PixelSurface, selection: &Selection, cx: u32, cy: u32) -> PatchRect {
    let window = PatchRect::around(cx, cy, TONE_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    for y in window.min_y..window.max_y {
        for x in window.min_x..window.max_x {
            if !selection.contains(x, y) {
                continue;
            }
            let px = surface.get_pixel(x, y);
            let gray = px[0] as f32 * 0.299 + px[1] as f32 * 0.587 + px[2] as f32 * 0.114;
            surface.put_pixel(
                x,
                y,
                Rgba([
                    ((px[0] as f32 + gray) / 2.0) as u8,
                    ((px[1] as f32 + gray) / 2.0) as u8,
                    ((px[2] as f32 + gray) / 2.0) as u8,
                    px[3],
                ]),
            );
        }
    }
    window
}

/// Smudge: carry the window from `(from_x, from_y)` and blend it onto
/// the window at `(to_x, to_y)` at `SMUDGE_STRENGTH`.  Returns the
/// destination window (the only rect that changed).
pub fn smudge_window(
    surface: &mut PixelSurface,
    selection: &Selection,
    from: (u32, u32),
    to: (u32, u32),
) -> PatchRect {
    let src_window = PatchRect::around(from.0, from.1, SMUDGE_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    let dst_window = PatchRect::around(to.0, to.1, SMUDGE_WINDOW_RADIUS)
        .clamped(surface.width(), surface.height());
    if src_window.is_empty() || dst_window.is_empty() {
        return dst_window;
    }
    let (carried, _) = surface.region(src_window);

    let w = carried.width().min(dst_window.width());
    let h = carried.height().min(dst_window.height());
    for dy in 0..h {
        for dx in 0..w {
            let x = dst_window.min_x + dx;
            let y = dst_window.min_y + dy;
            if !selection.contains(x, y) {
                continue;
            }
            let src = carried.get_pixel(dx, dy);
            let dst = surface.get_pixel(x, y);
            let mix = |d: u8, s: u8| -> u8 {
                (d as f32 * (1.0 - SMUDGE_STRENGTH) + s as f32 * SMUDGE_STRENGTH).round() as u8
            };
            surface.put_pixel(
                x,
                y,
                Rgba([
                    mix(dst[0], src[0]),
                    mix(dst[1], src[1]),
                    mix(dst[2], src[2]),
                    mix(dst[3], src[3]),
                ]),
            );
        }
    }
    dst_window
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn blur_softens_an_edge() {
        let mut s = PixelSurface::new(100, 100, WHITE);
        for y in 0..100 {
            for x in 0..50 {
                s.put_pixel(x, y, BLACK);
            }
        }
        box_blur_window(&mut s, &Selection::None, 50, 50);
        // A pixel just inside the black side near the edge now carries
        // some white from across the boundary.
        let px = s.get_pixel(49, 50);
        assert!(px[0] > 0 && px[0] < 255);
    }

    #[test]
    fn blur_skips_window_border_pixels() {
        let mut s = PixelSurface::new(100, 100, WHITE);
        for y in 0..100 {
            for x in 0..50 {
                s.put_pixel(x, y, BLACK);
            }
        }
        box_blur_window(&mut s, &Selection::None, 50, 50);
        // The window spans x in [20, 81); its left border column sits on
        // the black side and must be untouched.
        assert_eq!(s.get_pixel(20, 50), BLACK);
    }

    #[test]
    fn blur_of_uniform_region_is_identity() {
        let mut s = PixelSurface::new(80, 80, WHITE);
        let before = s.as_raw().to_vec();
        box_blur_window(&mut s, &Selection::None, 40, 40);
        assert_eq!(s.as_raw(), &before[..]);
    }

    #[test]
    fn sharpen_of_uniform_region_is_identity() {
        // Kernel sums to 1, so flat color is a fixed point.
        let grey = Rgba([120, 130, 140, 255]);
        let mut s = PixelSurface::new(60, 60, grey);
        let before = s.as_raw().to_vec();
        sharpen_window(&mut s, &Selection::None, 30, 30);
        assert_eq!(s.as_raw(), &before[..]);
    }

    #[test]
    fn sharpen_boosts_contrast_at_edges() {
        let grey = Rgba([100, 100, 100, 255]);
        let mut s = PixelSurface::new(60, 60, grey);
        s.put_pixel(30, 30, Rgba([200, 200, 200, 255]));
        sharpen_window(&mut s, &Selection::None, 30, 30);
        // The bright pixel gets brighter, its neighbors darker.
        assert!(s.get_pixel(30, 30)[0] > 200);
        assert!(s.get_pixel(29, 30)[0] < 100);
    }

    #[test]
    fn dodge_lightens_and_burn_darkens() {
        let grey = Rgba([100, 100, 100, 255]);
        let mut s = PixelSurface::new(60, 60, grey);
        dodge_window(&mut s, &Selection::None, 10, 10);
        assert_eq!(s.get_pixel(10, 10), Rgba([130, 130, 130, 255]));
        burn_window(&mut s, &Selection::None, 50, 50);
        assert_eq!(s.get_pixel(50, 50), Rgba([70, 70, 70, 255]));
        // Saturating at white
        let mut s = PixelSurface::new(60, 60, WHITE);
        dodge_window(&mut s, &Selection::None, 10, 10);
        assert_eq!(s.get_pixel(10, 10), WHITE);
    }

    #[test]
    fn sponge_desaturates_toward_luma() {
        let red = Rgba([255, 0, 0, 255]);
        let mut s = PixelSurface::new(60, 60, red);
        sponge_window(&mut s, &Selection::None, 30, 30);
        let px = s.get_pixel(30, 30);
        // 50% toward luma 76.245: R drops, G/B rise.
        assert_eq!(px[0], 165);
        assert_eq!(px[1], 38);
        assert_eq!(px[2], 38);
    }

    #[test]
    fn tone_window_respects_selection() {
        let grey = Rgba([100, 100, 100, 255]);
        let mut s = PixelSurface::new(60, 60, grey);
        let selection = Selection::Rectangle { rect: PatchRect::new(0, 0, 11, 60) };
        dodge_window(&mut s, &selection, 10, 10);
        assert_eq!(s.get_pixel(10, 10)[0], 130);
        assert_eq!(s.get_pixel(11, 10)[0], 100);
    }

    #[test]
    fn window_clamps_at_canvas_corner() {
        let grey = Rgba([100, 100, 100, 255]);
        let mut s = PixelSurface::new(40, 40, grey);
        // Window centred at the corner must not fail and must touch (0,0).
        let r = dodge_window(&mut s, &Selection::None, 0, 0);
        assert_eq!(r.min_x, 0);
        assert_eq!(s.get_pixel(0, 0)[0], 130);
    }

    #[test]
    fn smudge_carries_color_forward() {
        let mut s = PixelSurface::new(100, 40, WHITE);
        for y in 0..40 {
            for x in 0..20 {
                s.put_pixel(x, y, BLACK);
            }
        }
        // Drag from inside the black area to the white area.
        smudge_window(&mut s, &Selection::None, (10, 20), (40, 20));
        let px = s.get_pixel(40, 20);
        // 30% black over white.
        assert_eq!(px[0], 179);
    }
}
