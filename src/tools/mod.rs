// ============================================================================
// TOOLS — per-tool handlers behind a fixed capability set
// ============================================================================
//
// Every tool implements the same five capabilities (activate /
// deactivate / pointer down / move / up); a tool that does not need one
// inherits the default no-op body.  Dispatch is keyed by `ToolId`
// through an exhaustive match, so adding a tool without wiring it in is
// a compile error.
// ============================================================================

pub mod fill;
pub mod filter;
pub mod gradient;
pub mod misc;
pub mod move_tool;
pub mod select;
pub mod stroke;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::selection::Selection;
use crate::surface::{BlendMode, PatchRect, PixelSurface};

pub use fill::FillTool;
pub use filter::{FilterKind, FilterTool, SmudgeTool};
pub use gradient::{GradientTool, ShapeTool};
pub use misc::{EyedropperTool, PassiveTool};
pub use move_tool::MoveTool;
pub use select::{MagicWandTool, SelectShape, SelectTool};
pub use stroke::{StrokeKind, StrokeTool};

// ============================================================================
// TOOL IDENTITY
// ============================================================================

/// Every tool the dispatch engine knows.  Serialized as the kebab-case
/// ids the external configuration store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    #[default]
    Move,
    RectangleSelect,
    EllipseSelect,
    MagicWand,
    Brush,
    Pencil,
    Eraser,
    PaintBucket,
    Gradient,
    Blur,
    Sharpen,
    Smudge,
    Dodge,
    Burn,
    Sponge,
    Eyedropper,
    Shape,
    Crop,
    Type,
    Pen,
    Hand,
    Zoom,
}

impl ToolId {
    /// Human-readable name used for history entries and panels.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolId::Move => "Move Tool",
            ToolId::RectangleSelect => "Rectangle Select Tool",
            ToolId::EllipseSelect => "Ellipse Select Tool",
            ToolId::MagicWand => "Magic Wand Tool",
            ToolId::Brush => "Brush Tool",
            ToolId::Pencil => "Pencil Tool",
            ToolId::Eraser => "Eraser Tool",
            ToolId::PaintBucket => "Paint Bucket Tool",
            ToolId::Gradient => "Gradient Tool",
            ToolId::Blur => "Blur Tool",
            ToolId::Sharpen => "Sharpen Tool",
            ToolId::Smudge => "Smudge Tool",
            ToolId::Dodge => "Dodge Tool",
            ToolId::Burn => "Burn Tool",
            ToolId::Sponge => "Sponge Tool",
            ToolId::Eyedropper => "Eyedropper Tool",
            ToolId::Shape => "Shape Tool",
            ToolId::Crop => "Crop Tool",
            ToolId::Type => "Type Tool",
            ToolId::Pen => "Pen Tool",
            ToolId::Hand => "Hand Tool",
            ToolId::Zoom => "Zoom Tool",
        }
    }

    /// Whether a gesture with this tool can mutate pixels.  The engine
    /// snapshots the surface at pointer-down for these so it can build
    /// the before-patch of the history entry.
    pub fn mutates_surface(&self) -> bool {
        matches!(
            self,
            ToolId::Move
                | ToolId::Brush
                | ToolId::Pencil
                | ToolId::Eraser
                | ToolId::PaintBucket
                | ToolId::Gradient
                | ToolId::Blur
                | ToolId::Sharpen
                | ToolId::Smudge
                | ToolId::Dodge
                | ToolId::Burn
                | ToolId::Sponge
                | ToolId::Shape
        )
    }

    pub fn all() -> &'static [ToolId] {
        &[
            ToolId::Move,
            ToolId::RectangleSelect,
            ToolId::EllipseSelect,
            ToolId::MagicWand,
            ToolId::Brush,
            ToolId::Pencil,
            ToolId::Eraser,
            ToolId::PaintBucket,
            ToolId::Gradient,
            ToolId::Blur,
            ToolId::Sharpen,
            ToolId::Smudge,
            ToolId::Dodge,
            ToolId::Burn,
            ToolId::Sponge,
            ToolId::Eyedropper,
            ToolId::Shape,
            ToolId::Crop,
            ToolId::Type,
            ToolId::Pen,
            ToolId::Hand,
            ToolId::Zoom,
        ]
    }
}

// ============================================================================
// TOOL CONFIGURATION
// ============================================================================

/// The configuration snapshot every dispatch reads.  Mutated by external
/// UI controls; the engine never changes it except for the eyedropper
/// writing the sampled foreground color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Brush diameter in pixels, > 0.
    pub brush_size: f32,
    /// Stroke opacity, 0..=100.
    pub opacity: u8,
    /// Flow rate, 0..=100 — scales per-stamp opacity.
    pub flow: u8,
    /// Edge hardness, 0..=100.  100 = hard-edged stamp.
    pub hardness: u8,
    pub blend_mode: BlendMode,
    pub foreground: [u8; 3],
    pub background: [u8; 3],
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            brush_size: 20.0,
            opacity: 100,
            flow: 100,
            hardness: 100,
            blend_mode: BlendMode::Normal,
            foreground: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

impl ToolConfig {
    pub fn foreground_rgba(&self) -> Rgba<u8> {
        Rgba([self.foreground[0], self.foreground[1], self.foreground[2], 255])
    }

    pub fn background_rgba(&self) -> Rgba<u8> {
        Rgba([self.background[0], self.background[1], self.background[2], 255])
    }

    /// Combined stroke strength in 0..=1 (opacity × flow).
    pub fn stroke_strength(&self) -> f32 {
        (self.opacity.min(100) as f32 / 100.0) * (self.flow.min(100) as f32 / 100.0)
    }
}

// ============================================================================
// DISPATCH PLUMBING
// ============================================================================

/// Everything a handler may touch during one callback.  The engine
/// borrows these out of the bound document per dispatch; handlers never
/// keep their own copy of the surface.
pub struct ToolCtx<'a> {
    pub surface: &'a mut PixelSurface,
    pub selection: &'a mut Selection,
    pub config: &'a mut ToolConfig,
}

/// What a pointer-down produced.
pub struct PointerOutcome {
    /// Rect the callback mutated, if any (history/dirty tracking).
    pub dirty: Option<PatchRect>,
    /// True for tools that commit on the down edge (eyedropper,
    /// paint bucket): the engine stays in `Idle` and commits at once.
    pub finished: bool,
}

impl PointerOutcome {
    pub fn engaged() -> Self {
        Self { dirty: None, finished: false }
    }

    pub fn engaged_dirty(rect: PatchRect) -> Self {
        Self { dirty: Some(rect), finished: false }
    }

    pub fn finished(dirty: Option<PatchRect>) -> Self {
        Self { dirty, finished: true }
    }
}

/// The fixed capability set.  Default bodies are no-ops so each tool
/// implements only what it needs.
pub trait ToolHandler {
    /// The tool became active.
    fn on_activate(&mut self, _ctx: &mut ToolCtx) {}

    /// The tool is being switched away from, possibly mid-gesture.  Any
    /// transient gesture state must be dropped; the engine separately
    /// rolls back uncommitted pixel changes from its snapshot.
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) {}

    fn on_pointer_down(&mut self, _pos: (u32, u32), _ctx: &mut ToolCtx) -> PointerOutcome {
        PointerOutcome::engaged()
    }

    fn on_pointer_move(&mut self, _pos: (u32, u32), _ctx: &mut ToolCtx) -> Option<PatchRect> {
        None
    }

    fn on_pointer_up(&mut self, _pos: (u32, u32), _ctx: &mut ToolCtx) -> Option<PatchRect> {
        None
    }
}

// ============================================================================
// TOOL SET — one handler instance per tool, resolved by exhaustive match
// ============================================================================

pub struct ToolSet {
    brush: StrokeTool,
    pencil: StrokeTool,
    eraser: StrokeTool,
    fill: FillTool,
    magic_wand: MagicWandTool,
    rectangle_select: SelectTool,
    ellipse_select: SelectTool,
    move_tool: MoveTool,
    gradient: GradientTool,
    shape: ShapeTool,
    blur: FilterTool,
    sharpen: FilterTool,
    dodge: FilterTool,
    burn: FilterTool,
    sponge: FilterTool,
    smudge: SmudgeTool,
    eyedropper: EyedropperTool,
    crop: PassiveTool,
    type_tool: PassiveTool,
    pen: PassiveTool,
    hand: PassiveTool,
    zoom: PassiveTool,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            brush: StrokeTool::new(StrokeKind::Brush),
            pencil: StrokeTool::new(StrokeKind::Pencil),
            eraser: StrokeTool::new(StrokeKind::Eraser),
            fill: FillTool::default(),
            magic_wand: MagicWandTool::default(),
            rectangle_select: SelectTool::new(SelectShape::Rectangle),
            ellipse_select: SelectTool::new(SelectShape::Ellipse),
            move_tool: MoveTool::default(),
            gradient: GradientTool::default(),
            shape: ShapeTool::default(),
            blur: FilterTool::new(FilterKind::Blur),
            sharpen: FilterTool::new(FilterKind::Sharpen),
            dodge: FilterTool::new(FilterKind::Dodge),
            burn: FilterTool::new(FilterKind::Burn),
            sponge: FilterTool::new(FilterKind::Sponge),
            smudge: SmudgeTool::default(),
            eyedropper: EyedropperTool,
            crop: PassiveTool::new("crop"),
            type_tool: PassiveTool::new("type"),
            pen: PassiveTool::new("pen"),
            hand: PassiveTool::new("hand"),
            zoom: PassiveTool::new("zoom"),
        }
    }
}

impl ToolSet {
    /// Resolve the handler for a tool.  Exhaustive on purpose.
    pub fn handler_mut(&mut self, id: ToolId) -> &mut dyn ToolHandler {
        match id {
            ToolId::Brush => &mut self.brush,
            ToolId::Pencil => &mut self.pencil,
            ToolId::Eraser => &mut self.eraser,
            ToolId::PaintBucket => &mut self.fill,
            ToolId::MagicWand => &mut self.magic_wand,
            ToolId::RectangleSelect => &mut self.rectangle_select,
            ToolId::EllipseSelect => &mut self.ellipse_select,
            ToolId::Move => &mut self.move_tool,
            ToolId::Gradient => &mut self.gradient,
            ToolId::Shape => &mut self.shape,
            ToolId::Blur => &mut self.blur,
            ToolId::Sharpen => &mut self.sharpen,
            ToolId::Dodge => &mut self.dodge,
            ToolId::Burn => &mut self.burn,
            ToolId::Sponge => &mut self.sponge,
            ToolId::Smudge => &mut self.smudge,
            ToolId::Eyedropper => &mut self.eyedropper,
            ToolId::Crop => &mut self.crop,
            ToolId::Type => &mut self.type_tool,
            ToolId::Pen => &mut self.pen,
            ToolId::Hand => &mut self.hand,
            ToolId::Zoom => &mut self.zoom,
        }
    }

    /// Per-tool tolerance knobs for the region-growing tools (the UI's
    /// tolerance sliders write through these).
    pub fn fill_mut(&mut self) -> &mut FillTool {
        &mut self.fill
    }

    pub fn magic_wand_mut(&mut self) -> &mut MagicWandTool {
        &mut self.magic_wand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_cover_every_tool() {
        for &id in ToolId::all() {
            assert!(id.display_name().ends_with("Tool"));
        }
    }

    #[test]
    fn default_config_matches_store_defaults() {
        let c = ToolConfig::default();
        assert_eq!(c.brush_size, 20.0);
        assert_eq!(c.opacity, 100);
        assert_eq!(c.flow, 100);
        assert_eq!(c.hardness, 100);
        assert_eq!(c.blend_mode, BlendMode::Normal);
        assert_eq!(c.foreground, [0, 0, 0]);
        assert_eq!(c.background, [255, 255, 255]);
        assert_eq!(c.stroke_strength(), 1.0);
    }

    #[test]
    fn every_tool_resolves_to_a_handler() {
        let mut set = ToolSet::default();
        for &id in ToolId::all() {
            // Must not panic; the match is exhaustive.
            let _ = set.handler_mut(id);
        }
    }

    #[test]
    fn mutating_tools_are_flagged() {
        assert!(ToolId::Brush.mutates_surface());
        assert!(ToolId::PaintBucket.mutates_surface());
        assert!(ToolId::Move.mutates_surface());
        assert!(!ToolId::MagicWand.mutates_surface());
        assert!(!ToolId::Eyedropper.mutates_surface());
        assert!(!ToolId::Hand.mutates_surface());
    }
}
