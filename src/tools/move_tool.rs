use image::{GrayImage, Luma, RgbaImage};

use crate::surface::{PatchRect, TRANSPARENT};

use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Below this displacement (in pixels) a move gesture is treated as a
/// click and the cut content is restored in place.
const MOVE_THRESHOLD: i64 = 1;

struct MoveGesture {
    start: (u32, u32),
    /// Bounding box the carried pixels came from.
    origin: PatchRect,
    /// Cut content over `origin`.
    carried: RgbaImage,
    /// 255 where a pixel belongs to the cut (the selection's shape, not
    /// just its bounding box); 0 elsewhere inside `origin`.
    mask: GrayImage,
    whole_canvas: bool,
}

/// Move tool: cut-and-paste-in-place.  Pointer-down inside the active
/// selection cuts the selected pixels out; pointer-up pastes them at
/// the displaced position and translates the selection to match.  This
/// avoids compounding resampling error across a drag — the bitmap moves
/// exactly once.  With no selection the whole canvas content moves,
/// matching classic editor behavior.
#[derive(Default)]
pub struct MoveTool {
    gesture: Option<MoveGesture>,
}

impl MoveTool {
    fn paste(&self, ctx: &mut ToolCtx, g: &MoveGesture, at_x: i64, at_y: i64) {
        for dy in 0..g.carried.height() {
            for dx in 0..g.carried.width() {
                if g.mask.get_pixel(dx, dy).0[0] == 0 {
                    continue;
                }
                let tx = at_x + dx as i64;
                let ty = at_y + dy as i64;
                if tx < 0 || ty < 0 {
                    continue;
                }
                // put_pixel drops writes past the far edges.
                ctx.surface.put_pixel(tx as u32, ty as u32, *g.carried.get_pixel(dx, dy));
            }
        }
    }
}

impl ToolHandler for MoveTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        // Abandoned drag: drop the gesture.  The engine restores the cut
        // pixels from its own pre-gesture snapshot.
        self.gesture = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        let (w, h) = (ctx.surface.width(), ctx.surface.height());

        let selection_hit = ctx
            .selection
            .bounds(w, h)
            .filter(|b| b.contains(pos.0, pos.1));

        let (origin, mask, whole_canvas) = match selection_hit {
            Some(bounds) => {
                let mut mask = GrayImage::new(bounds.width(), bounds.height());
                for y in bounds.min_y..bounds.max_y {
                    for x in bounds.min_x..bounds.max_x {
                        if ctx.selection.contains(x, y) {
                            mask.put_pixel(x - bounds.min_x, y - bounds.min_y, Luma([255]));
                        }
                    }
                }
                (bounds, mask, false)
            }
            None => {
                // No selection under the cursor: move the entire canvas
                // content.
                let full = PatchRect::full(w, h);
                let mut mask = GrayImage::new(w, h);
                for p in mask.pixels_mut() {
                    *p = Luma([255]);
                }
                (full, mask, true)
            }
        };

        let (carried, origin) = ctx.surface.region(origin);

        // Clear the cut pixels to transparent.
        for y in origin.min_y..origin.max_y {
            for x in origin.min_x..origin.max_x {
                if mask.get_pixel(x - origin.min_x, y - origin.min_y).0[0] > 0 {
                    ctx.surface.put_pixel(x, y, TRANSPARENT);
                }
            }
        }

        log::debug!(
            "move: cut {:?} ({}) at {},{}",
            origin,
            if whole_canvas { "whole canvas" } else { "selection" },
            pos.0,
            pos.1
        );
        self.gesture = Some(MoveGesture {
            start: pos,
            origin,
            carried,
            mask,
            whole_canvas,
        });
        PointerOutcome::engaged_dirty(origin)
    }

    fn on_pointer_up(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let g = self.gesture.take()?;
        let (w, h) = (ctx.surface.width(), ctx.surface.height());

        let dx = pos.0 as i64 - g.start.0 as i64;
        let dy = pos.1 as i64 - g.start.1 as i64;

        if dx.abs() <= MOVE_THRESHOLD && dy.abs() <= MOVE_THRESHOLD {
            // A click, not a move: put everything back.
            self.paste(ctx, &g, g.origin.min_x as i64, g.origin.min_y as i64);
            return Some(g.origin);
        }

        let at_x = g.origin.min_x as i64 + dx;
        let at_y = g.origin.min_y as i64 + dy;
        self.paste(ctx, &g, at_x, at_y);

        if !g.whole_canvas {
            ctx.selection.translate(dx as i32, dy as i32);
        }

        // Dirty: where the pixels left from plus where they landed.
        let dest = PatchRect::new(
            at_x.clamp(0, w as i64) as u32,
            at_y.clamp(0, h as i64) as u32,
            (at_x + g.origin.width() as i64).clamp(0, w as i64) as u32,
            (at_y + g.origin.height() as i64).clamp(0, h as i64) as u32,
        );
        log::debug!("move: pasted at {},{} (delta {},{})", at_x, at_y, dx, dy);
        Some(g.origin.union(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;
    use crate::surface::PixelSurface;
    use crate::tools::ToolConfig;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn selection_move_cuts_and_pastes() {
        let mut surface = PixelSurface::new(100, 100, WHITE);
        for y in 10..30 {
            for x in 10..30 {
                surface.put_pixel(x, y, RED);
            }
        }
        let mut selection = Selection::from_drag_rectangle(10, 10, 30, 30);
        let mut config = ToolConfig::default();
        let mut tool = MoveTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        tool.on_pointer_down((15, 15), &mut ctx);
        // The cut leaves transparency behind.
        assert_eq!(ctx.surface.get_pixel(15, 15), TRANSPARENT);
        let dirty = tool.on_pointer_up((55, 15), &mut ctx);
        assert!(dirty.is_some());

        // Content moved 40 px right.
        assert_eq!(surface.get_pixel(55, 15), RED);
        assert_eq!(surface.get_pixel(50, 10), RED);
        assert_eq!(surface.get_pixel(15, 15), TRANSPARENT);
        // Selection bounds followed the pixels.
        assert!(selection.contains(55, 15));
        assert!(!selection.contains(15, 15));
    }

    #[test]
    fn click_without_displacement_restores_in_place() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        for y in 10..20 {
            for x in 10..20 {
                surface.put_pixel(x, y, RED);
            }
        }
        let before = surface.as_raw().to_vec();
        let mut selection = Selection::from_drag_rectangle(10, 10, 20, 20);
        let mut config = ToolConfig::default();
        let mut tool = MoveTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        tool.on_pointer_down((15, 15), &mut ctx);
        tool.on_pointer_up((16, 15), &mut ctx);
        assert_eq!(surface.as_raw(), &before[..]);
    }

    #[test]
    fn ellipse_move_carries_only_the_selected_shape() {
        let mut surface = PixelSurface::new(100, 100, RED);
        let mut selection = Selection::from_drag_ellipse(20, 20, 60, 60);
        let mut config = ToolConfig::default();
        let mut tool = MoveTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        tool.on_pointer_down((40, 40), &mut ctx);
        // The bbox corner is outside the ellipse: not cut.
        assert_eq!(ctx.surface.get_pixel(21, 21), RED);
        // The centre is cut.
        assert_eq!(ctx.surface.get_pixel(40, 40), TRANSPARENT);
        tool.on_pointer_up((40, 70), &mut ctx);
        // Pasted 30 px down.
        assert_eq!(surface.get_pixel(40, 70), RED);
    }

    #[test]
    fn whole_canvas_move_without_selection() {
        let mut surface = PixelSurface::new(40, 40, WHITE);
        surface.put_pixel(5, 5, RED);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = MoveTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        tool.on_pointer_down((20, 20), &mut ctx);
        tool.on_pointer_up((30, 20), &mut ctx);

        assert_eq!(surface.get_pixel(15, 5), RED);
        // The vacated strip is transparent.
        assert_eq!(surface.get_pixel(5, 5), TRANSPARENT);
    }
}
