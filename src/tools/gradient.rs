use image::Rgba;

use crate::surface::PatchRect;

use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Outline thickness of the shape tool's rectangle.
const SHAPE_STROKE_WIDTH: u32 = 3;

/// Linear gradient from the foreground to the background color along
/// the drag vector, applied to the whole canvas at pointer-up
/// (selection-gated per pixel).
#[derive(Default)]
pub struct GradientTool {
    drag_start: Option<(u32, u32)>,
}

impl ToolHandler for GradientTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        self.drag_start = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        self.drag_start = Some(pos);
        PointerOutcome::engaged()
    }

    fn on_pointer_up(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let (ax, ay) = self.drag_start.take()?;
        let (bx, by) = pos;
        let dir_x = bx as f32 - ax as f32;
        let dir_y = by as f32 - ay as f32;
        let len_sq = dir_x * dir_x + dir_y * dir_y;
        if len_sq == 0.0 {
            log::debug!("gradient: zero-length drag, ignored");
            return None;
        }

        let fg = ctx.config.foreground_rgba();
        let bg = ctx.config.background_rgba();
        let (w, h) = (ctx.surface.width(), ctx.surface.height());

        for y in 0..h {
            for x in 0..w {
                if !ctx.selection.contains(x, y) {
                    continue;
                }
                let t = ((x as f32 - ax as f32) * dir_x + (y as f32 - ay as f32) * dir_y)
                    / len_sq;
                let t = t.clamp(0.0, 1.0);
                let lerp = |a: u8, b: u8| -> u8 {
                    (a as f32 + (b as f32 - a as f32) * t).round() as u8
                };
                ctx.surface.put_pixel(
                    x,
                    y,
                    Rgba([lerp(fg[0], bg[0]), lerp(fg[1], bg[1]), lerp(fg[2], bg[2]), 255]),
                );
            }
        }
        Some(PatchRect::full(w, h))
    }
}

/// Shape tool: rasterises a rectangle outline in the foreground color
/// between the drag corners at pointer-up.
#[derive(Default)]
pub struct ShapeTool {
    drag_start: Option<(u32, u32)>,
}

impl ToolHandler for ShapeTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        self.drag_start = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        self.drag_start = Some(pos);
        PointerOutcome::engaged()
    }

    fn on_pointer_up(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let (ax, ay) = self.drag_start.take()?;
        let rect = PatchRect::new(
            ax.min(pos.0),
            ay.min(pos.1),
            ax.max(pos.0) + 1,
            ay.max(pos.1) + 1,
        )
        .clamped(ctx.surface.width(), ctx.surface.height());
        if rect.width() < 2 || rect.height() < 2 {
            return None;
        }

        let color = ctx.config.foreground_rgba();
        for y in rect.min_y..rect.max_y {
            for x in rect.min_x..rect.max_x {
                let on_border = x < rect.min_x + SHAPE_STROKE_WIDTH
                    || x + SHAPE_STROKE_WIDTH >= rect.max_x
                    || y < rect.min_y + SHAPE_STROKE_WIDTH
                    || y + SHAPE_STROKE_WIDTH >= rect.max_y;
                if on_border && ctx.selection.contains(x, y) {
                    ctx.surface.put_pixel(x, y, color);
                }
            }
        }
        Some(rect)
    }
}
