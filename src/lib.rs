//! rasterpad — the tool-execution core of a raster image editor.
//!
//! This crate is the headless engine behind an editor shell: it owns
//! the pixel surface, the selection model, the per-tool pixel
//! algorithms, the pointer-driven tool dispatch state machine, and the
//! undo/redo history log.  The presentation layer (menus, panels,
//! canvas blitting, file dialogs) lives elsewhere and drives this
//! engine through [`EditorEngine`].
//!
//! The shape of a session:
//!
//! ```
//! use rasterpad::{Document, EditorEngine, ToolId};
//!
//! let mut engine = EditorEngine::new();
//! engine.bind(Document::new(800, 600));
//! engine.activate_tool(ToolId::Brush);
//! engine.pointer_down(100, 100);
//! engine.pointer_move(200, 100);
//! engine.pointer_up(200, 100);     // commit point: one history entry
//! assert!(engine.history().len() == 1);
//! engine.undo();
//! ```

pub mod engine;
pub mod error;
pub mod history;
pub mod ops;
pub mod region;
pub mod selection;
pub mod surface;
pub mod tools;

pub use engine::{Document, EditorEngine};
pub use error::EngineError;
pub use history::{HistoryEntry, HistoryLog, PixelPatch};
pub use ops::adjustments::Adjustment;
pub use region::{grow, RegionGrowth};
pub use selection::Selection;
pub use surface::{BlendMode, PatchRect, PixelSurface};
pub use tools::{ToolConfig, ToolId};
