mod app;
mod config;

use std::path::PathBuf;

use clap::Parser;
use log::info;

use app::App;
use config::EngineConfig;
use isogrid_grid::GridSize;
use isogrid_quality::QualityLevel;

/// Grids outside this range are clamped before the core sees them.
const GRID_MIN: i32 = 1;
const GRID_MAX: i32 = 512;

#[derive(Parser, Debug)]
#[command(name = "isogrid", about = "Isometric tile-grid engine shell")]
struct Args {
    /// Grid width in tiles
    #[arg(long)]
    grid_width: Option<i32>,
    /// Grid height in tiles
    #[arg(long)]
    grid_height: Option<i32>,
    /// Restrict connection routing to orthogonal steps
    #[arg(long)]
    no_diagonal: bool,
    /// Pin the quality level (ultra, high, medium, low, potato)
    #[arg(long)]
    quality: Option<String>,
    /// Watch assets/shaders and hot-reload on change
    #[arg(long)]
    watch: bool,
    /// Window width in pixels
    #[arg(long)]
    window_width: Option<i32>,
    /// Window height in pixels
    #[arg(long)]
    window_height: Option<i32>,
    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Root directory for shaders and other assets
    #[arg(long)]
    assets_root: Option<PathBuf>,
}

fn parse_quality(s: &str) -> Option<QualityLevel> {
    QualityLevel::ALL
        .into_iter()
        .find(|l| l.label().eq_ignore_ascii_case(s))
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let cfg = args
        .config
        .as_deref()
        .map(EngineConfig::load)
        .unwrap_or_default();

    let grid_cfg = cfg.grid.as_ref();
    let width = args
        .grid_width
        .or(grid_cfg.map(|g| g.width))
        .unwrap_or(60)
        .clamp(GRID_MIN, GRID_MAX);
    let height = args
        .grid_height
        .or(grid_cfg.map(|g| g.height))
        .unwrap_or(60)
        .clamp(GRID_MIN, GRID_MAX);
    let grid_size = GridSize::new(width, height);

    let win_cfg = cfg.window.as_ref();
    let win_w = args.window_width.or(win_cfg.map(|w| w.width)).unwrap_or(1280);
    let win_h = args.window_height.or(win_cfg.map(|w| w.height)).unwrap_or(720);
    let target_fps = win_cfg.and_then(|w| w.target_fps).unwrap_or(60);

    let diagonal = !args.no_diagonal && cfg.diagonal_routing.unwrap_or(true);
    let forced_quality = args.quality.as_deref().and_then(parse_quality);
    let assets_root = args
        .assets_root
        .or(cfg.assets_root)
        .unwrap_or_else(|| PathBuf::from("."));

    // MSAA is a window-creation flag, so the startup level decides it; a
    // level pinned to a low tier skips multisampling entirely.
    let startup_level = forced_quality.unwrap_or(QualityLevel::High);
    let mut builder = raylib::init();
    builder.size(win_w, win_h).title("isogrid").resizable();
    if startup_level.settings().msaa_samples > 1 {
        builder.msaa_4x();
    }
    let (mut rl, thread) = builder.build();
    rl.set_target_fps(target_fps);

    info!(
        "starting: {}x{} grid, diagonal routing {}, quality {:?}",
        width, height, diagonal, forced_quality
    );

    let mut app = App::new(
        &mut rl,
        &thread,
        grid_size,
        diagonal,
        forced_quality,
        args.watch,
        assets_root,
    );

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        app.step(&mut rl, &thread, dt);
        app.render(&mut rl, &thread);
    }
}
