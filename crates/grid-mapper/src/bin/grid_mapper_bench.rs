//! Benchmark for gate-to-grid mapping on a synthetic radar volume.
//!
//! Builds a PPI volume with a storm-like reflectivity pattern, maps it onto
//! a grid centered on the radar and reports timing.
//!
//! Run with: cargo run --release --bin grid-mapper-bench -- --azimuths 720 --gates 920

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use grid_mapper::{
    GridMapper, GridShape, GridSpec, MappingConfig, RoiConfig, RoiPolicy, Weighting,
};
use radar_common::{FieldData, GeoPoint, RadarVolume, Sweep};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "grid-mapper-bench")]
#[command(about = "Time gate-to-grid mapping on a synthetic radar volume")]
struct Args {
    /// Rays per sweep
    #[arg(long, default_value = "360")]
    azimuths: usize,

    /// Gates per ray
    #[arg(long, default_value = "400")]
    gates: usize,

    /// Gate spacing in meters
    #[arg(long, default_value = "250")]
    gate_spacing: f64,

    /// Sweep elevation angles in degrees
    #[arg(long, value_delimiter = ',', default_value = "0.5,1.5,2.4,3.4,4.3,6.0,9.9")]
    elevations: Vec<f64>,

    /// Grid cells along x and y
    #[arg(long, default_value = "201")]
    cells: usize,

    /// Grid levels
    #[arg(long, default_value = "10")]
    levels: usize,

    /// Half-width of the grid in meters
    #[arg(long, default_value = "100000")]
    half_width: f64,

    /// Top of the grid in meters
    #[arg(long, default_value = "9000")]
    top: f64,

    /// Weighting function (nearest, cressman, barnes, barnes2, idw)
    #[arg(long, env = "GRID_WEIGHTING")]
    weighting: Option<String>,

    /// Constant radius of influence in meters (overrides the configured policy)
    #[arg(long)]
    roi: Option<f64>,

    /// YAML mapping configuration (defaults to GRID_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map rows on a single thread
    #[arg(long)]
    sequential: bool,

    /// Timed iterations
    #[arg(long, default_value = "3")]
    iterations: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs and the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    gates: usize,
    cells: usize,
    iterations: usize,
    weighting: String,
    parallel: bool,
    mean_ms: f64,
    min_ms: f64,
    cells_per_sec: f64,
    valid_cells: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut config = match &args.config {
        Some(path) => MappingConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MappingConfig::from_env(),
    };
    if let Some(name) = &args.weighting {
        config.weighting = Weighting::from_str(name);
    }
    if let Some(radius) = args.roi {
        config.roi = RoiConfig::new(RoiPolicy::Constant { radius }, 0.0);
    }
    config.parallel = !args.sequential;

    let site = GeoPoint::new(35.3331, -97.2778, 370.0);
    let volume = synthetic_volume(site, &args)?;
    let spec = GridSpec::from_limits(
        site,
        GridShape::new(args.cells, args.cells, args.levels),
        [
            (0.0, args.top),
            (-args.half_width, args.half_width),
            (-args.half_width, args.half_width),
        ],
    );

    info!(
        gates = volume.gate_count(),
        cells = spec.len(),
        weighting = %config.weighting,
        parallel = config.parallel,
        "Starting mapping benchmark"
    );

    let weighting = config.weighting.to_string();
    let parallel = config.parallel;
    let mapper = GridMapper::new(config)?;

    let mut timings = Vec::with_capacity(args.iterations);
    let mut valid_cells = 0;
    for i in 0..args.iterations.max(1) {
        let start = Instant::now();
        let grid = mapper.map_radar(&volume, &spec, &["reflectivity"])?;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;
        valid_cells = grid
            .field("reflectivity")
            .map(|f| f.valid_count())
            .unwrap_or(0);
        info!(iteration = i, elapsed_ms = elapsed, "Mapping finished");
        timings.push(elapsed);
    }

    let mean_ms = timings.iter().sum::<f64>() / timings.len() as f64;
    let min_ms = timings.iter().cloned().fold(f64::INFINITY, f64::min);
    let report = Report {
        gates: volume.gate_count(),
        cells: spec.len(),
        iterations: timings.len(),
        weighting,
        parallel,
        mean_ms,
        min_ms,
        cells_per_sec: spec.len() as f64 / (mean_ms / 1000.0),
        valid_cells,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Gate-to-grid mapping");
        println!("{:-<50}", "");
        println!("{:<20} {:>12}", "Gates", report.gates);
        println!("{:<20} {:>12}", "Cells", report.cells);
        println!("{:<20} {:>12}", "Weighting", report.weighting);
        println!("{:<20} {:>12}", "Parallel", report.parallel);
        println!("{:<20} {:>12.1}", "Mean (ms)", report.mean_ms);
        println!("{:<20} {:>12.1}", "Min (ms)", report.min_ms);
        println!("{:<20} {:>12.0}", "Cells/sec", report.cells_per_sec);
        println!("{:<20} {:>12}", "Cells with data", report.valid_cells);
    }

    let stats = mapper.stats();
    info!(
        mappings = stats.mappings,
        gates_per_index = stats.gates_per_index(),
        "Mapper statistics"
    );

    Ok(())
}

/// PPI volume with a storm cell 30 km out on the 45 degree radial.
fn synthetic_volume(site: GeoPoint, args: &Args) -> Result<RadarVolume> {
    let step = 360.0 / args.azimuths.max(1) as f64;
    let azimuths: Vec<f64> = (0..args.azimuths).map(|i| i as f64 * step).collect();
    let ranges: Vec<f64> = (1..=args.gates).map(|i| i as f64 * args.gate_spacing).collect();
    let sweeps: Vec<Sweep> = args
        .elevations
        .iter()
        .map(|&el| Sweep::ppi(el, &azimuths))
        .collect();

    let volume = RadarVolume::new("SYNTH", site, ranges, sweeps)?;
    let values = volume
        .gates()
        .map(|gate| {
            let dr = (gate.range - 30_000.0) / 12_000.0;
            let da = (gate.azimuth - 45.0) / 25.0;
            (5.0 + 50.0 * (-(dr * dr) - da * da).exp()) as f32
        })
        .collect();

    Ok(volume.with_field("reflectivity", FieldData::new(values))?)
}
