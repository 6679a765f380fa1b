use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Eyedropper: samples the clicked pixel into the foreground color and
/// returns to idle immediately.  Sampling is not a mutation, so no
/// history entry results.
pub struct EyedropperTool;

impl ToolHandler for EyedropperTool {
    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        let px = ctx.surface.get_pixel(pos.0, pos.1);
        ctx.config.foreground = [px[0], px[1], px[2]];
        log::debug!(
            "eyedropper: sampled {},{},{} at {},{}",
            px[0],
            px[1],
            px[2],
            pos.0,
            pos.1
        );
        PointerOutcome::finished(None)
    }
}

/// Tools whose engine-side behavior is intentionally nothing: crop and
/// type are driven by the document layer, pen paths live in the vector
/// subsystem, hand/zoom only change the caller's viewport bookkeeping.
/// They still participate in dispatch so activation and gestures are
/// well-defined.
pub struct PassiveTool {
    name: &'static str,
}

impl PassiveTool {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ToolHandler for PassiveTool {
    fn on_activate(&mut self, _ctx: &mut ToolCtx) {
        log::debug!("{}: activated", self.name);
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        log::debug!("{}: pointer down at {},{} (no engine action)", self.name, pos.0, pos.1);
        PointerOutcome::engaged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;
    use crate::surface::PixelSurface;
    use crate::tools::ToolConfig;
    use image::Rgba;

    #[test]
    fn eyedropper_updates_the_foreground() {
        let mut surface = PixelSurface::new(10, 10, Rgba([1, 2, 3, 255]));
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = EyedropperTool;

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        let outcome = tool.on_pointer_down((5, 5), &mut ctx);
        assert!(outcome.finished);
        assert_eq!(config.foreground, [1, 2, 3]);
    }

    #[test]
    fn passive_tools_touch_nothing() {
        let mut surface = PixelSurface::new(10, 10, Rgba([7, 7, 7, 255]));
        let before = surface.as_raw().to_vec();
        let mut selection = Selection::None;
        let mut config = ToolConfig::default();
        let mut tool = PassiveTool::new("hand");

        let mut ctx = ToolCtx {
            surface: &mut surface,
            selection: &mut selection,
            config: &mut config,
        };
        let outcome = tool.on_pointer_down((3, 3), &mut ctx);
        assert!(!outcome.finished);
        tool.on_pointer_move((5, 5), &mut ctx);
        tool.on_pointer_up((5, 5), &mut ctx);
        assert_eq!(surface.as_raw(), &before[..]);
    }
}
