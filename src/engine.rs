use image::{Rgba, RgbaImage};

use crate::history::{HistoryEntry, HistoryLog, PixelPatch};
use crate::ops::adjustments::Adjustment;
use crate::selection::Selection;
use crate::surface::{PatchRect, PixelSurface};
use crate::tools::{ToolConfig, ToolCtx, ToolId, ToolSet};

// ============================================================================
// DOCUMENT — the pixel surface plus its selection and dirty flag
// ============================================================================

/// One open document: the surface tools mutate, the selection gating
/// those mutations, and the `saved` flag the external project store
/// watches.  The engine holds at most one bound document and never a
/// copy of its surface.
pub struct Document {
    pub surface: PixelSurface,
    pub selection: Selection,
    /// Cleared by every committed mutation.
    pub saved: bool,
}

impl Document {
    /// New document with a white background, the way the shell creates
    /// them.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: PixelSurface::new(width, height, Rgba([255, 255, 255, 255])),
            selection: Selection::None,
            saved: true,
        }
    }

    /// Document over imported pixels (the file layer decodes, we own).
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            surface: PixelSurface::from_image(image),
            selection: Selection::None,
            saved: true,
        }
    }
}

// ============================================================================
// GESTURE TRACKING
// ============================================================================

/// Pre-gesture snapshot plus the accumulated dirty rect.  The snapshot
/// provides the before-patch at commit time and the rollback source
/// when a gesture is abandoned mid-drag.
struct GestureTracker {
    snapshot: PixelSurface,
    bounds: Option<PatchRect>,
}

impl GestureTracker {
    fn expand(&mut self, rect: Option<PatchRect>) {
        if let Some(r) = rect {
            self.bounds = Some(match self.bounds {
                Some(b) => b.union(r),
                None => r,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Idle,
    Engaged,
}

// ============================================================================
// EDITOR ENGINE — the tool dispatch state machine
// ============================================================================

/// Routes pointer input to the active tool, enforces selection gating,
/// and records committed mutations into the history log.  All dispatch
/// before a document is bound degrades to a logged no-op — the engine
/// tolerates being driven before a document exists.
pub struct EditorEngine {
    document: Option<Document>,
    config: ToolConfig,
    tools: ToolSet,
    active_tool: ToolId,
    state: EngineState,
    history: HistoryLog,
    gesture: Option<GestureTracker>,
}

impl Default for EditorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorEngine {
    pub fn new() -> Self {
        Self {
            document: None,
            config: ToolConfig::default(),
            tools: ToolSet::default(),
            active_tool: ToolId::default(),
            state: EngineState::Idle,
            history: HistoryLog::default(),
            gesture: None,
        }
    }

    // ---- document binding ---------------------------------------------------

    /// Bind a document.  Replaces any previous one; the history log and
    /// any in-progress gesture belong to the old document and are
    /// dropped.
    pub fn bind(&mut self, document: Document) {
        self.gesture = None;
        self.state = EngineState::Idle;
        self.history.clear();
        self.document = Some(document);
    }

    /// Release the bound document (tab closed / switched away).
    pub fn unbind(&mut self) -> Option<Document> {
        self.gesture = None;
        self.state = EngineState::Idle;
        self.history.clear();
        self.document.take()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    // ---- configuration and introspection ------------------------------------

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ToolConfig {
        &mut self.config
    }

    pub fn active_tool(&self) -> ToolId {
        self.active_tool
    }

    pub fn is_engaged(&self) -> bool {
        self.state == EngineState::Engaged
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Region-growing knobs for the paint bucket and magic wand.
    pub fn tools_mut(&mut self) -> &mut ToolSet {
        &mut self.tools
    }

    // ---- tool switching -----------------------------------------------------

    /// Switch the active tool.  Always legal: an in-progress gesture is
    /// abandoned (rolled back, not committed) before the previous
    /// handler is deactivated and the new one activated.
    pub fn activate_tool(&mut self, id: ToolId) {
        if id == self.active_tool {
            return;
        }
        if self.state == EngineState::Engaged {
            self.cancel_gesture();
        } else if let Some(doc) = self.document.as_mut() {
            let mut ctx = ToolCtx {
                surface: &mut doc.surface,
                selection: &mut doc.selection,
                config: &mut self.config,
            };
            self.tools.handler_mut(self.active_tool).on_deactivate(&mut ctx);
        }
        log::debug!("tool switch: {:?} -> {:?}", self.active_tool, id);
        self.active_tool = id;
        if let Some(doc) = self.document.as_mut() {
            let mut ctx = ToolCtx {
                surface: &mut doc.surface,
                selection: &mut doc.selection,
                config: &mut self.config,
            };
            self.tools.handler_mut(id).on_activate(&mut ctx);
        }
    }

    // ---- pointer dispatch ---------------------------------------------------

    /// Pointer pressed at canvas-local coordinates.  Coordinates may
    /// fall outside the canvas (drags across the edge); they are
    /// clamped before reaching the handler.
    pub fn pointer_down(&mut self, x: i32, y: i32) {
        let Some(doc) = self.document.as_mut() else {
            log::warn!("pointer down with no document bound, ignored");
            return;
        };
        if self.state == EngineState::Engaged {
            log::warn!("pointer down while already engaged, ignored");
            return;
        }
        let pos = clamp_pos(x, y, doc.surface.width(), doc.surface.height());

        if self.active_tool.mutates_surface() {
            self.gesture = Some(GestureTracker {
                snapshot: doc.surface.clone(),
                bounds: None,
            });
        }

        let mut ctx = ToolCtx {
            surface: &mut doc.surface,
            selection: &mut doc.selection,
            config: &mut self.config,
        };
        let outcome = self.tools.handler_mut(self.active_tool).on_pointer_down(pos, &mut ctx);
        if let Some(tracker) = self.gesture.as_mut() {
            tracker.expand(outcome.dirty);
        }

        if outcome.finished {
            self.commit_gesture();
        } else {
            self.state = EngineState::Engaged;
        }
    }

    /// Pointer moved.  Meaningless while idle — a silent no-op.
    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if self.state != EngineState::Engaged {
            return;
        }
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let pos = clamp_pos(x, y, doc.surface.width(), doc.surface.height());
        let mut ctx = ToolCtx {
            surface: &mut doc.surface,
            selection: &mut doc.selection,
            config: &mut self.config,
        };
        let dirty = self.tools.handler_mut(self.active_tool).on_pointer_move(pos, &mut ctx);
        if let Some(tracker) = self.gesture.as_mut() {
            tracker.expand(dirty);
        }
    }

    /// Pointer released: the commit point.  Any accumulated mutation
    /// becomes one history entry.
    pub fn pointer_up(&mut self, x: i32, y: i32) {
        if self.state != EngineState::Engaged {
            return;
        }
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let pos = clamp_pos(x, y, doc.surface.width(), doc.surface.height());
        let mut ctx = ToolCtx {
            surface: &mut doc.surface,
            selection: &mut doc.selection,
            config: &mut self.config,
        };
        let dirty = self.tools.handler_mut(self.active_tool).on_pointer_up(pos, &mut ctx);
        if let Some(tracker) = self.gesture.as_mut() {
            tracker.expand(dirty);
        }
        self.state = EngineState::Idle;
        self.commit_gesture();
    }

    /// Abandon the in-progress gesture (pointer left the canvas, tool
    /// switched mid-drag).  Uncommitted pixel changes are rolled back
    /// from the pre-gesture snapshot, so the surface never keeps a
    /// half-applied stroke.
    pub fn cancel_gesture(&mut self) {
        if let Some(tracker) = self.gesture.take()
            && let Some(bounds) = tracker.bounds
            && let Some(doc) = self.document.as_mut()
        {
            PixelPatch::capture(&tracker.snapshot, bounds).apply(&mut doc.surface);
            log::debug!("gesture abandoned, rolled back {:?}", bounds);
        }
        if let Some(doc) = self.document.as_mut() {
            let mut ctx = ToolCtx {
                surface: &mut doc.surface,
                selection: &mut doc.selection,
                config: &mut self.config,
            };
            self.tools.handler_mut(self.active_tool).on_deactivate(&mut ctx);
        }
        self.state = EngineState::Idle;
    }

    fn commit_gesture(&mut self) {
        let Some(tracker) = self.gesture.take() else {
            return;
        };
        let Some(bounds) = tracker.bounds else {
            return;
        };
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let bounds = bounds.clamped(doc.surface.width(), doc.surface.height());
        if bounds.is_empty() {
            return;
        }
        let before = PixelPatch::capture(&tracker.snapshot, bounds);
        let after = PixelPatch::capture(&doc.surface, bounds);
        if before.pixels.as_raw() == after.pixels.as_raw() {
            // e.g. a move gesture that restored everything in place.
            return;
        }
        self.history.push(HistoryEntry::new(
            self.active_tool.display_name(),
            before,
            after,
        ));
        doc.saved = false;
    }

    // ---- whole-canvas operations --------------------------------------------

    /// Apply an adjustment (selection-gated) as one committed history
    /// entry.
    pub fn apply_adjustment(&mut self, adjustment: Adjustment) {
        let Some(doc) = self.document.as_mut() else {
            log::warn!("adjustment with no document bound, ignored");
            return;
        };
        let (w, h) = (doc.surface.width(), doc.surface.height());
        let bounds = doc
            .selection
            .bounds(w, h)
            .unwrap_or_else(|| PatchRect::full(w, h));
        let before = PixelPatch::capture(&doc.surface, bounds);
        adjustment.apply(&mut doc.surface, &doc.selection);
        let after = PixelPatch::capture(&doc.surface, bounds);
        if before.pixels.as_raw() == after.pixels.as_raw() {
            return;
        }
        self.history.push(HistoryEntry::new(adjustment.description(), before, after));
        doc.saved = false;
    }

    /// Deselect (menu action or Esc).
    pub fn clear_selection(&mut self) {
        if let Some(doc) = self.document.as_mut() {
            doc.selection.clear();
        }
    }

    // ---- history ------------------------------------------------------------

    /// Undo the newest applied entry.  Past the start of the log this is
    /// a no-op.
    pub fn undo(&mut self) -> Option<String> {
        let doc = self.document.as_mut()?;
        let action = self.history.undo(&mut doc.surface)?.to_string();
        doc.saved = false;
        log::debug!("undo: {}", action);
        Some(action)
    }

    /// Redo the next undone entry.  Past the end of the log this is a
    /// no-op.
    pub fn redo(&mut self) -> Option<String> {
        let doc = self.document.as_mut()?;
        let action = self.history.redo(&mut doc.surface)?.to_string();
        doc.saved = false;
        log::debug!("redo: {}", action);
        Some(action)
    }
}

fn clamp_pos(x: i32, y: i32, w: u32, h: u32) -> (u32, u32) {
    (
        x.clamp(0, w.saturating_sub(1) as i32) as u32,
        y.clamp(0, h.saturating_sub(1) as i32) as u32,
    )
}
