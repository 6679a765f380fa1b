use crate::region::{self, DEFAULT_MAX_PIXELS, DEFAULT_TOLERANCE};
use crate::selection::Selection;
use crate::surface::PatchRect;

use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Which marquee shape a `SelectTool` instance draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectShape {
    Rectangle,
    Ellipse,
}

/// Rectangle / ellipse marquee selection.  The drag is pure gesture
/// state; the selection replaces the active one at pointer-up, and
/// drags below the minimum size deselect instead (treated as a click).
pub struct SelectTool {
    shape: SelectShape,
    drag_start: Option<(u32, u32)>,
}

impl SelectTool {
    pub fn new(shape: SelectShape) -> Self {
        Self { shape, drag_start: None }
    }
}

impl ToolHandler for SelectTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        // Abandon an in-progress drag; the existing selection stands.
        self.drag_start = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        self.drag_start = Some(pos);
        PointerOutcome::engaged()
    }

    fn on_pointer_up(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let Some((ax, ay)) = self.drag_start.take() else {
            return None;
        };
        let next = match self.shape {
            SelectShape::Rectangle => Selection::from_drag_rectangle(ax, ay, pos.0, pos.1),
            SelectShape::Ellipse => Selection::from_drag_ellipse(ax, ay, pos.0, pos.1),
        };
        // A new marquee always replaces the previous selection, even
        // when it degenerates to a deselect.
        *ctx.selection = next;
        None
    }
}

/// Magic wand: tolerance-based region growing from the clicked pixel
/// into a mask selection.  Commits on the down edge; an empty growth
/// leaves the active selection unchanged.
pub struct MagicWandTool {
    pub tolerance: u32,
    pub max_pixels: usize,
}

impl Default for MagicWandTool {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl ToolHandler for MagicWandTool {
    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        let growth = region::grow(ctx.surface, pos, self.tolerance, self.max_pixels);
        if growth.is_empty() {
            log::debug!("magic wand: empty growth at {},{}, selection unchanged", pos.0, pos.1);
            return PointerOutcome::finished(None);
        }
        log::debug!(
            "magic wand: selected {} pixels from seed {},{}",
            growth.pixel_count,
            pos.0,
            pos.1
        );
        *ctx.selection = Selection::from_mask(growth.mask);
        PointerOutcome::finished(None)
    }
}
