use crate::region::{self, DEFAULT_MAX_PIXELS, DEFAULT_TOLERANCE};
use crate::surface::PatchRect;

use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Paint bucket.  The active selection, if any, is authoritative: the
/// click fills every selected pixel with the foreground color.  With no
/// selection the tool runs its own flood fill seeded at the click point
/// and fills the grown region.  Commits on the down edge.
pub struct FillTool {
    pub tolerance: u32,
    pub max_pixels: usize,
}

impl Default for FillTool {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl ToolHandler for FillTool {
    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        let color = ctx.config.foreground_rgba();
        let (w, h) = (ctx.surface.width(), ctx.surface.height());

        if ctx.selection.is_active() {
            // Fill the selection, whatever its shape.
            let Some(bounds) = ctx.selection.bounds(w, h) else {
                return PointerOutcome::finished(None);
            };
            for y in bounds.min_y..bounds.max_y {
                for x in bounds.min_x..bounds.max_x {
                    if ctx.selection.contains(x, y) {
                        ctx.surface.put_pixel(x, y, color);
                    }
                }
            }
            log::debug!("paint bucket: filled selection bounds {:?}", bounds);
            return PointerOutcome::finished(Some(bounds));
        }

        // No selection: flood fill from the seed.
        let growth = region::grow(ctx.surface, pos, self.tolerance, self.max_pixels);
        if growth.is_empty() {
            return PointerOutcome::finished(None);
        }
        let mask_raw = growth.mask.as_raw();
        let bounds = growth
            .bounds
            .unwrap_or_else(|| PatchRect::full(w, h));
        for y in bounds.min_y..bounds.max_y {
            let row = y as usize * w as usize;
            for x in bounds.min_x..bounds.max_x {
                if mask_raw[row + x as usize] > 0 {
                    ctx.surface.put_pixel(x, y, color);
                }
            }
        }
        log::debug!(
            "paint bucket: flood filled {} pixels from {},{}",
            growth.pixel_count,
            pos.0,
            pos.1
        );
        PointerOutcome::finished(Some(bounds))
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
    fn bucket_floods_a_uniform_canvas() {
        let mut surface = PixelSurface::new(100, 100, WHITE);
        let mut selection = Selection::None;
        let mut config = ToolConfig { foreground: [255, 0, 0], ..ToolConfig::default() };
        let mut tool = FillTool { max_pixels: usize::MAX, ..FillTool::default() };

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        let outcome = tool.on_pointer_down((50, 50), &mut ctx);
        assert!(outcome.finished);
        for y in 0..100 {
            for x in 0..100 {
                assert_eq!(surface.get_pixel(x, y), RED);
            }
        }
    }

    #[test]
    fn bucket_stops_at_color_boundaries() {
        let mut surface = PixelSurface::new(40, 40, WHITE);
        // Vertical black wall splits the canvas.
        for y in 0..40 {
            surface.put_pixel(20, y, Rgba([0, 0, 0, 255]));
        }
        let mut selection = Selection::None;
        let mut config = ToolConfig { foreground: [255, 0, 0], ..ToolConfig::default() };
        let mut tool = FillTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        tool.on_pointer_down((5, 20), &mut ctx);
        assert_eq!(surface.get_pixel(5, 20), RED);
        assert_eq!(surface.get_pixel(19, 20), RED);
        assert_eq!(surface.get_pixel(20, 20), Rgba([0, 0, 0, 255]));
        assert_eq!(surface.get_pixel(25, 20), WHITE);
    }

    #[test]
    fn active_selection_is_authoritative() {
        let mut surface = PixelSurface::new(50, 50, WHITE);
        let mut selection = Selection::from_drag_ellipse(10, 10, 40, 40);
        let mut config = ToolConfig { foreground: [255, 0, 0], ..ToolConfig::default() };
        let mut tool = FillTool::default();

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        // Click far outside the ellipse: the selection is still what fills.
        tool.on_pointer_down((0, 0), &mut ctx);
        assert_eq!(surface.get_pixel(25, 25), RED); // ellipse centre
        assert_eq!(surface.get_pixel(0, 0), WHITE); // outside the selection
        assert_eq!(surface.get_pixel(11, 11), WHITE); // bbox corner, outside ellipse
    }
}
