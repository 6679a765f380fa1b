use thiserror::Error;

/// Failure taxonomy for the editor core.
///
/// Most recoverable conditions (pointer input before a document is bound,
/// undo past the end of the log, an empty magic-wand result) degrade to
/// logged no-ops and never surface as `Err`.  Only the discrete, checked
/// operations return these variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A rectangle addressed pixels outside `[0,width) × [0,height)`.
    /// Returned by checked region access only; the drag-driven paths
    /// clamp silently instead.
    #[error("region {x},{y} {w}x{h} exceeds surface bounds {width}x{height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },

    /// Dispatch was attempted with no document bound to the engine.
    #[error("no document is bound to the engine")]
    NoDocument,
}
