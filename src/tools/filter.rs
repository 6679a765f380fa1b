use crate::ops::filters;
use crate::surface::PatchRect;

use super::{PointerOutcome, ToolCtx, ToolHandler};

/// Which windowed kernel a `FilterTool` instance applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Blur,
    Sharpen,
    Dodge,
    Burn,
    Sponge,
}

/// The filter brushes: apply a bounded kernel window under the cursor
/// on pointer-down and keep applying it while the pointer drags.  The
/// kernels clamp their windows to the surface, so dragging off the edge
/// is safe.
pub struct FilterTool {
    kind: FilterKind,
}

impl FilterTool {
    pub fn new(kind: FilterKind) -> Self {
        Self { kind }
    }

    fn apply(&self, pos: (u32, u32), ctx: &mut ToolCtx) -> PatchRect {
        let (cx, cy) = pos;
        match self.kind {
            FilterKind::Blur => filters::box_blur_window(ctx.surface, ctx.selection, cx, cy),
            FilterKind::Sharpen => filters::sharpen_window(ctx.surface, ctx.selection, cx, cy),
            FilterKind::Dodge => filters::dodge_window(ctx.surface, ctx.selection, cx, cy),
            FilterKind::Burn => filters::burn_window(ctx.surface, ctx.selection, cx, cy),
            FilterKind::Sponge => filters::sponge_window(ctx.surface, ctx.selection, cx, cy),
        }
    }
}

impl ToolHandler for FilterTool {
    fn on_pointer_down(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> PointerOutcome {
        PointerOutcome::engaged_dirty(self.apply(pos, ctx))
    }

    fn on_pointer_move(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        Some(self.apply(pos, ctx))
    }
}

/// Smudge: drags pixels along the pointer path by blending the window
/// from the previous position onto the current one.
#[derive(Default)]
pub struct SmudgeTool {
    last_pos: Option<(u32, u32)>,
}

impl ToolHandler for SmudgeTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {
        self.last_pos = None;
    }

    fn on_pointer_down(&mut self, pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        self.last_pos = Some(pos);
        PointerOutcome::engaged()
    }

    fn on_pointer_move(&mut self, pos: (u32, u32), ctx: &mut ToolCtx) -> Option<PatchRect> {
        let from = self.last_pos?;
        if from == pos {
            return None;
        }
        let rect = filters::smudge_window(ctx.surface, ctx.selection, from, pos);
        self.last_pos = Some(pos);
        Some(rect)
    }

    fn on_pointer_up(&mut self, _pos: (u32, u32), _ctx: &mut ToolCtx) -> Option<PatchRect> {
        self.last_pos = None;
        None
    }
}
