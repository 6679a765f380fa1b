use image::Rgba;

use crate::surface::{blend_pixel, PatchRect, PixelSurface};
use crate::selection::Selection;

use super::{PointerOutcome, ToolConfig, ToolCtx, ToolHandler};

/// Pencil strokes are a fixed thin hard line regardless of brush size.
const PENCIL_DIAMETER: f32 = 2.0;

/// Which of the three stroke-painting tools this handler instance is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeKind {
    /// Configured size/opacity/hardness, blends in the configured mode.
    Brush,
    /// Thin hard line in the foreground color.
    Pencil,
    /// Reduces alpha toward transparent.
    Eraser,
}

/// Brush / pencil / eraser: circular stamps interpolated along the
/// pointer path.  One handler instance per kind; the only gesture state
/// is the previous stamp position.
pub struct StrokeTool {
    kind: StrokeKind,
    last_pos: Option<(u32, u32)>,
}

impl StrokeTool {
    pub fn new(kind: StrokeKind) -> Self {
        Self { kind, last_pos: None }
    }

    fn radius(&self, config: &ToolConfig) -> f32 {
        let diameter = match self.kind {
            StrokeKind::Pencil => PENCIL_DIAMETER,
            _ => config.brush_size.max(1.0),
        };
        diameter / 2.0
    }

    fn hardness(&self, config: &ToolConfig) -> f32 {
        match self.kind {
            StrokeKind::Pencil => 1.0,
            _ => config.hardness.min(100) as f32 / 100.0,
        }
    }

    /// Stamp one circle at `(cx, cy)`, selection-gated per pixel.
    /// Returns the window the stamp may have touched.
    fn stamp(
        &self,
        surface: &mut PixelSurface,
        selection: &Selection,
        config: &ToolConfig,
        cx: u32,
        cy: u32,
    ) -> PatchRect {
        let radius = self.radius(config);
        let hardness = self.hardness(config);
        let strength = match self.kind {
            StrokeKind::Pencil => 1.0,
            _ => config.stroke_strength(),
        };
        let r_px = radius.ceil() as u32;
        let window =
            PatchRect::around(cx, cy, r_px).clamped(surface.width(), surface.height());

        let color = config.foreground_rgba();
        for y in window.min_y..window.max_y {
            for x in window.min_x..window.max_x {
                if !selection.contains(x, y) {
                    continue;
                }
                let dx = x as f32 - cx as f32;
                let dy = y as f32 - cy as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                let falloff = stamp_alpha(dist, radius, hardness);
                if falloff <= 0.0 {
                    continue;
                }
                let alpha = falloff * strength;
                let base = surface.get_pixel(x, y);
                let out = match self.kind {
                    StrokeKind::Eraser => {
                        let mut px = base;
                        px[3] = (px[3] as f32 * (1.0 - alpha)).round() as u8;
                        px
                    }
                    _ => blend_pixel(base, color, config.blend_mode, alpha),
                };
                surface.put_pixel(x, y, out);
            }
        }
        window
    }

    /// Stamp along the segment from `from` to `to` at one-pixel steps so
    /// fast pointer motion still leaves a solid line.
    fn stroke_segment(
        &self,
        surface: &mut PixelSurface,
        selection: &Selection,
        config: &ToolConfig,
        from: (u32, u32),
        to: (u32, u32),
    ) -> PatchRect {
        let (x0, y0) = (from.0 as f32, from.1 as f32);
        let (x1, y1) = (to.0 as f32, to.1 as f32);
        let dist = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let steps = dist.ceil().max(1.0) as u32;

        let mut bounds: Option<PatchRect> = None;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let x = (x0 + (x1 - x0) * t).round() as u32;
            let y = (y0 + (y1 - y0) * t).round() as u32;
            let r = self.stamp(surface, selection, config, x, y);
            bounds = Some(match bounds {
                Some(b) => b.union(r),
                None => r,
            });
        }
        bounds.unwrap_or_else(|| PatchRect::new(to.0, to.1, to.0, to.1))
    }
}

impl ToolHandler for StrokeTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        self.last_pos = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        let rect = self.stamp(ctx.surface, ctx.selection, ctx.config, pos.0, pos.1);
        self.last_pos = Some(pos);
        PointerOutcome::engaged_dirty(rect)
    }

    fn on_pointer_move(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let from = self.last_pos?;
        if from == pos {
            return None;
        }
        let rect = self.stroke_segment(ctx.surface, ctx.selection, ctx.config, from, pos);
        self.last_pos = Some(pos);
        Some(rect)
    }

    fn on_pointer_up(&mut self, _pos: (u32, u32), _ctx: &mut ToolCtx) -> Option<PatchRect> {
        self.last_pos = None;
        None
    }
}

/// Stamp coverage at `dist` from the centre: 1 inside the hard core,
/// falling linearly to 0 at the rim.
fn stamp_alpha(dist: f32, radius: f32, hardness: f32) -> f32 {
    if dist > radius {
        return 0.0;
    }
    let core = radius * hardness;
    if dist <= core || radius <= core {
        1.0
    } else {
        1.0 - (dist - core) / (radius - core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn ctx<'a>(
        surface: &'a mut PixelSurface,
        selection: &'a mut Selection,
        config: &'a mut ToolConfig,
    ) -> ToolCtx<'a> {
        ToolCtx { surface, selection, config }
    }

    #[test]
    fn brush_stroke_paints_along_the_path() {
        let mut surface = PixelSurface::new(800, 600, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default(); // size 20, black
        let mut tool = StrokeTool::new(StrokeKind::Brush);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((100, 100), &mut c);
        tool.on_pointer_move((200, 100), &mut c);
        tool.on_pointer_up((200, 100), &mut c);

        assert_eq!(surface.get_pixel(150, 100), BLACK);
        assert_eq!(surface.get_pixel(150, 50), WHITE);
    }

    #[test]
    fn stroke_is_gated_by_the_selection() {
        let mut surface = PixelSurface::new(100, 100, WHITE);
        let before = surface.as_raw().to_vec();
        let mut selection = Selection::Rectangle { rect: PatchRect::new(10, 10, 30, 30) };
        let mut config = ToolConfig::default();
        let mut tool = StrokeTool::new(StrokeKind::Brush);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((0, 20), &mut c);
        tool.on_pointer_move((99, 20), &mut c);
        tool.on_pointer_up((99, 20), &mut c);

        let w = surface.width();
        for y in 0..surface.height() {
            for x in 0..w {
                let inside = (10..30).contains(&x) && (10..30).contains(&y);
                let px = surface.get_pixel(x, y);
                let idx = ((y * w + x) * 4) as usize;
                let orig = Rgba([
                    before[idx],
                    before[idx + 1],
                    before[idx + 2],
                    before[idx + 3],
                ]);
                if !inside {
                    assert_eq!(px, orig, "pixel outside the selection changed at {},{}", x, y);
                }
            }
        }
        // And something inside did change.
        assert_eq!(surface.get_pixel(15, 20), BLACK);
    }

    #[test]
    fn eraser_reduces_alpha_to_zero() {
        let mut surface = PixelSurface::new(50, 50, BLACK);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = StrokeTool::new(StrokeKind::Eraser);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((25, 25), &mut c);
        tool.on_pointer_up((25, 25), &mut c);

        assert_eq!(surface.get_pixel(25, 25)[3], 0);
        // Outside the stamp radius the pixel is untouched.
        assert_eq!(surface.get_pixel(25, 40), BLACK);
    }

    #[test]
    fn pencil_is_thin() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = StrokeTool::new(StrokeKind::Pencil);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((25, 25), &mut c);
        tool.on_pointer_up((25, 25), &mut c);

        assert_eq!(surface.get_pixel(25, 25), BLACK);
        assert_eq!(surface.get_pixel(25, 28), WHITE);
    }

    #[test]
    fn half_opacity_brush_blends() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig { opacity: 50, ..ToolConfig::default() };
        let mut tool = StrokeTool::new(StrokeKind::Brush);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((25, 25), &mut c);

        let px = surface.get_pixel(25, 25);
        assert!(px[0] > 100 && px[0] < 160, "expected ~50% grey, got {:?}", px);
    }

    #[test]
    fn stamps_at_the_canvas_edge_clamp() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = StrokeTool::new(StrokeKind::Brush);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        tool.on_pointer_down((0, 0), &mut c);
        tool.on_pointer_move((0, 49), &mut c);
        tool.on_pointer_up((0, 49), &mut c);
        assert_eq!(surface.get_pixel(0, 0), BLACK);
        assert_eq!(surface.get_pixel(0, 49), BLACK);
    }

    #[test]
    fn pointer_move_without_down_is_a_noop() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = StrokeTool::new(StrokeKind::Brush);

        let mut c = ctx(&mut surface, &mut selection, &mut config);
        assert!(tool.on_pointer_move((25, 25), &mut c).is_none());
        assert_eq!(surface.get_pixel(25, 25), WHITE);
    }
}
