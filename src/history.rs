use std::collections::VecDeque;
use std::time::SystemTime;

use image::RgbaImage;

use crate::surface::{PatchRect, PixelSurface};

/// Cap on retained history entries; the oldest entry is evicted beyond
/// this.
pub const MAX_HISTORY: usize = 50;

// ============================================================================
// PIXEL PATCH — dirty-rect snapshot used as the reversible diff
// ============================================================================

/// A rectangular patch of pixel data.  History entries store a before
/// and an after patch over the same rect; applying one restores that
/// side byte-for-byte.  Whole-canvas operations simply carry a
/// canvas-sized patch — structured dirty-rect diffs are the one
/// snapshot strategy in this engine, by design rather than accident.
#[derive(Clone)]
pub struct PixelPatch {
    pub rect: PatchRect,
    pub pixels: RgbaImage,
}

impl PixelPatch {
    /// Capture `rect` (clamped to the surface) from `surface`.
    pub fn capture(surface: &PixelSurface, rect: PatchRect) -> Self {
        let (pixels, rect) = surface.region(rect);
        Self { rect, pixels }
    }

    /// Write the patch back where it was captured.
    pub fn apply(&self, surface: &mut PixelSurface) {
        surface.blit(self.rect.min_x as i32, self.rect.min_y as i32, &self.pixels);
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

// ============================================================================
// HISTORY ENTRY
// ============================================================================

/// One committed, reversible operation.
pub struct HistoryEntry {
    /// Human-readable action name ("Brush Tool", "Invert", ...).
    pub action: String,
    /// Commit time.
    pub at: SystemTime,
    before: PixelPatch,
    after: PixelPatch,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, before: PixelPatch, after: PixelPatch) -> Self {
        Self {
            action: action.into(),
            at: SystemTime::now(),
            before,
            after,
        }
    }

    fn undo(&self, surface: &mut PixelSurface) {
        self.before.apply(surface);
    }

    fn redo(&self, surface: &mut PixelSurface) {
        self.after.apply(surface);
    }

    fn memory_size(&self) -> usize {
        self.before.memory_size() + self.after.memory_size() + self.action.len()
    }
}

// ============================================================================
// HISTORY LOG — linear undo/redo with branch pruning and a size cap
// ============================================================================

/// Append-only log of reversible operations with a cursor.  `applied`
/// counts how many entries are currently reflected in the surface, so
/// the classic `historyIndex` is `applied - 1`.  Appending while undone
/// entries exist prunes the redo branch; exceeding the cap evicts the
/// oldest entry.
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    applied: usize,
    max_entries: usize,
    /// Running memory total across all retained entries.
    total_memory: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            applied: 0,
            max_entries,
            total_memory: 0,
        }
    }

    /// Append a committed entry.  Prunes the redo branch, then evicts
    /// the oldest entries past the cap.
    pub fn push(&mut self, entry: HistoryEntry) {
        while self.entries.len() > self.applied {
            if let Some(dropped) = self.entries.pop_back() {
                self.total_memory = self.total_memory.saturating_sub(dropped.memory_size());
            }
        }

        self.total_memory += entry.memory_size();
        self.entries.push_back(entry);
        self.applied = self.entries.len();

        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(evicted.memory_size());
                self.applied = self.applied.saturating_sub(1);
            }
        }
    }

    /// Step back one entry, restoring its before-patch.  Past the start
    /// of the log this is a no-op, never an error.
    pub fn undo(&mut self, surface: &mut PixelSurface) -> Option<&str> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        let entry = &self.entries[self.applied];
        entry.undo(surface);
        Some(entry.action.as_str())
    }

    /// Step forward one entry, reapplying its after-patch.  Past the end
    /// of the log this is a no-op.
    pub fn redo(&mut self, surface: &mut PixelSurface) -> Option<&str> {
        if self.applied >= self.entries.len() {
            return None;
        }
        let entry = &self.entries[self.applied];
        entry.redo(surface);
        self.applied += 1;
        Some(entry.action.as_str())
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The classic history index: -1 before the first entry, otherwise
    /// the index of the newest applied entry.
    pub fn index(&self) -> isize {
        self.applied as isize - 1
    }

    /// Action names in chronological order, for a history panel.
    pub fn descriptions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.action.as_str()).collect()
    }

    /// Total retained patch memory in bytes (O(1), cached).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    /// Drop everything (document switch).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
        self.total_memory = 0;
    }
}
