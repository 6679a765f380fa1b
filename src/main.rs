mod cli;

use clap::Parser;

use rasterpad::{Adjustment, Document, EditorEngine, ToolId};

/// Drives one scripted editing session: paint, select, fill, filter,
/// adjust, then undo/redo the whole stack to prove the log restores the
/// exact pixels, and finally export the canvas.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::CliArgs::parse();

    let mut engine = EditorEngine::new();
    engine.bind(Document::new(args.width, args.height));
    let (w, h) = (args.width as i32, args.height as i32);

    // Background: diagonal gradient, dark blue into pale blue.
    engine.config_mut().foreground = [32, 48, 96];
    engine.config_mut().background = [216, 226, 255];
    engine.activate_tool(ToolId::Gradient);
    engine.pointer_down(0, 0);
    engine.pointer_up(w - 1, h - 1);

    // A couple of brush strokes.
    engine.config_mut().foreground = [220, 60, 40];
    engine.config_mut().brush_size = 24.0;
    engine.activate_tool(ToolId::Brush);
    engine.pointer_down(w / 8, h / 2);
    engine.pointer_move(w / 2, h / 4);
    engine.pointer_move(7 * w / 8, h / 2);
    engine.pointer_up(7 * w / 8, h / 2);

    // Invert inside a rectangular selection.
    engine.activate_tool(ToolId::RectangleSelect);
    engine.pointer_down(w / 16, h / 16);
    engine.pointer_up(w / 2, h / 2);
    engine.apply_adjustment(Adjustment::Invert);
    engine.clear_selection();

    // Magic-wand a patch of the gradient and bucket-fill it.
    engine.activate_tool(ToolId::MagicWand);
    engine.pointer_down(3 * w / 4, 3 * h / 4);
    engine.config_mut().foreground = [255, 200, 0];
    engine.activate_tool(ToolId::PaintBucket);
    engine.pointer_down(3 * w / 4, 3 * h / 4);
    engine.clear_selection();

    // Soften the middle with the blur brush.
    engine.activate_tool(ToolId::Blur);
    engine.pointer_down(w / 2, h / 2);
    engine.pointer_move(w / 2 + 60, h / 2);
    engine.pointer_up(w / 2 + 60, h / 2);

    // Global tone pass.
    engine.apply_adjustment(Adjustment::BrightnessContrast { brightness: 8.0, contrast: 12.0 });

    // Walk the whole history back and forward again; the redo side must
    // reproduce the committed canvas byte for byte.
    let committed = engine.document().unwrap().surface.as_image().clone();
    let steps = engine.history().len();
    while engine.undo().is_some() {}
    let mut redone = 0;
    while engine.redo().is_some() {
        redone += 1;
    }
    assert_eq!(redone, steps);
    assert_eq!(
        engine.document().unwrap().surface.as_image().as_raw(),
        committed.as_raw()
    );
    log::info!("history round trip ok over {} entries", steps);

    committed.save(&args.output)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}
