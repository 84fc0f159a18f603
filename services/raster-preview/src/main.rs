//! Raster preview
//!
//! Loads an ESRI ASCII grid, draws it through a scalar field layer onto an
//! off-screen Web Mercator map and writes the frame as PNG.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use field_common::{ascii_grid, LatLng, LatLngBounds, ScalarField};
use raster_layer::{
    png, scalar_field_layer, ColorFn, DrawOutcome, LayerConfig, PixmapHost, WebMercatorViewport,
};

/// Scalar field map preview
#[derive(Parser, Debug)]
#[command(name = "raster-preview")]
#[command(about = "Render an ASCII grid as a colored raster layer and save it as PNG")]
struct Args {
    /// ESRI ASCII grid to render
    #[arg(env = "RASTER_PREVIEW_GRID")]
    grid: PathBuf,

    /// JSON layer configuration (color, opacity, interpolate)
    #[arg(short, long, env = "RASTER_PREVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Color override, e.g. "steelblue" or "#ff000080"
    #[arg(long)]
    color: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "preview.png", env = "RASTER_PREVIEW_OUTPUT")]
    output: PathBuf,

    /// Map width in pixels
    #[arg(long, default_value_t = 800, env = "RASTER_PREVIEW_WIDTH")]
    width: u32,

    /// Map height in pixels
    #[arg(long, default_value_t = 600, env = "RASTER_PREVIEW_HEIGHT")]
    height: u32,

    /// Map centre as "lat,lng" (requires --zoom; default fits the grid)
    #[arg(long, requires = "zoom")]
    center: Option<String>,

    /// Map zoom level
    #[arg(long, requires = "center")]
    zoom: Option<f64>,

    /// Log the field value at "lat,lng"
    #[arg(long)]
    value_at: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "RASTER_PREVIEW_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }
    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let field = ascii_grid::read_file(&args.grid)
        .with_context(|| format!("Failed to read grid {}", args.grid.display()))?;
    let (min, max) = field.range();
    info!(
        path = %args.grid.display(),
        columns = field.columns(),
        rows = field.rows(),
        min,
        max,
        "Loaded grid"
    );

    let config = match &args.config {
        Some(path) => LayerConfig::from_file(path)
            .with_context(|| format!("Failed to load layer config {}", path.display()))?,
        None => LayerConfig::default(),
    };
    let mut options = config.resolve(field.range())?;
    if let Some(color) = &args.color {
        let color = ColorFn::parse(color).with_context(|| format!("Invalid color {}", color))?;
        options.color = Some(color);
    }

    let bounds = field.bounds();
    let viewport = map_view(&args, &bounds)?;
    info!(
        lat = viewport.center().lat,
        lng = viewport.center().lng,
        zoom = viewport.zoom(),
        "Map view"
    );

    let mut layer = scalar_field_layer(field, options)?;

    if let Some(position) = &args.value_at {
        let at = parse_lat_lng(position)?;
        match layer.value_at(at) {
            Some(value) => info!(lat = at.lat, lng = at.lng, value, "Field value"),
            None => info!(lat = at.lat, lng = at.lng, "No field value at position"),
        }
    }

    layer.settle().await?;

    let mut host = PixmapHost::new(viewport)?;
    match layer.on_draw(&mut host)? {
        DrawOutcome::Drawn(placement) => info!(
            x = placement.top_left.x,
            y = placement.top_left.y,
            width = placement.screen_width,
            height = placement.screen_height,
            "Layer drawn"
        ),
        other => warn!(outcome = ?other, "Layer not drawn"),
    }

    let bytes = png::encode_surface(host.surface())?;
    tokio::fs::write(&args.output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), bytes = bytes.len(), "Preview written");

    Ok(())
}

/// Fit the grid, unless an explicit centre and zoom were given.
fn map_view(args: &Args, bounds: &LatLngBounds) -> Result<WebMercatorViewport> {
    let mut viewport = WebMercatorViewport::fit_bounds(bounds, args.width, args.height);
    if let (Some(center), Some(zoom)) = (&args.center, args.zoom) {
        viewport.set_view(parse_lat_lng(center)?, zoom);
    }
    Ok(viewport)
}

/// Parse "lat,lng".
fn parse_lat_lng(s: &str) -> Result<LatLng> {
    let Some((lat, lng)) = s.split_once(',') else {
        bail!("Expected \"lat,lng\", got {:?}", s);
    };
    let lat: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude in {:?}", s))?;
    let lng: f64 = lng.trim().parse().with_context(|| format!("Invalid longitude in {:?}", s))?;
    Ok(LatLng::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lng() {
        assert_eq!(parse_lat_lng("40.5, -3.7").unwrap(), LatLng::new(40.5, -3.7));
        assert!(parse_lat_lng("40.5").is_err());
        assert!(parse_lat_lng("north,-3").is_err());
    }

    #[test]
    fn test_args_require_center_and_zoom_together() {
        assert!(Args::try_parse_from(["raster-preview", "grid.asc", "--zoom", "4"]).is_err());
        let args = Args::try_parse_from([
            "raster-preview",
            "grid.asc",
            "--center",
            "40,-3",
            "--zoom",
            "4",
        ])
        .unwrap();
        assert_eq!(args.zoom, Some(4.0));
    }

    #[test]
    fn test_map_view_fits_or_follows_args() {
        let bounds = LatLngBounds::new(35.0, -10.0, 44.0, 3.0);

        let fitted = Args::try_parse_from(["raster-preview", "grid.asc"]).unwrap();
        let view = map_view(&fitted, &bounds).unwrap();
        assert_eq!(view, WebMercatorViewport::fit_bounds(&bounds, 800, 600));

        let explicit = Args::try_parse_from([
            "raster-preview",
            "grid.asc",
            "--center",
            "40,-3",
            "--zoom",
            "6",
        ])
        .unwrap();
        let view = map_view(&explicit, &bounds).unwrap();
        assert_eq!(view.center(), LatLng::new(40.0, -3.0));
        assert_eq!(view.zoom(), 6.0);
        assert_eq!(view.size(), (800, 600));
    }
}
