//! flock-demo: a few thousand boids circling an orbiting repeller.
//!
//! ```text
//! flock-demo [--sqlite] [sequential|parallel] [params.json]
//! ```
//!
//! The optional JSON file holds any subset of `Params` fields; missing fields
//! take their defaults.  Poses and tick summaries land in `output/flock-demo/`
//! as CSV, or in `output/flock-demo/output.db` with `--sqlite` (needs the
//! `sqlite` feature).
//! Set `RUST_LOG=info` (or `debug`, `trace`) to see the simulation's logs.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;

use flock_agent::Pose;
use flock_behavior::{FnObstacles, Obstacle, Unavailable};
use flock_core::{Params, SimConfig, Tick, Vec3};
use flock_output::{CsvWriter, PoseWriter, SimOutputObserver};
use flock_sim::{Backend, ParallelBackend, SequentialBackend, SimBuilder, SimObserver, TickSummary};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEQUENTIAL_POPULATION: usize = 500;
const PARALLEL_POPULATION:   usize = 8_192;
const SEED:                  u64   = 42;
const DT:                    f32   = 1.0 / 60.0;
const TOTAL_TICKS:           u64   = 600;   // 10 simulated seconds
const OUTPUT_INTERVAL_TICKS: u64   = 30;    // two snapshots per simulated second
const ORBIT_RADIUS:          f32   = 1.5;
const ORBIT_RATE:            f32   = 0.02;  // radians per tick
const OUTPUT_DIR:            &str  = "output/flock-demo";

// ── Observer wrapper to count rows and report progress ───────────────────────

struct ProgressObserver<W: PoseWriter> {
    inner:         SimOutputObserver<W>,
    pose_rows:     usize,
    summary_rows:  usize,
    last:          Option<TickSummary>,
}

impl<W: PoseWriter> ProgressObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, pose_rows: 0, summary_rows: 0, last: None }
    }
}

impl<W: PoseWriter> SimObserver for ProgressObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.summary_rows += 1;
        self.last = Some(*summary);
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, poses: &[Pose]) {
        self.pose_rows += poses.len();
        if let Some(s) = &self.last {
            info!(
                %tick,
                sim_secs = s.elapsed_secs,
                mean_neighbors = s.mean_neighbors,
                mean_speed = s.mean_speed,
                "snapshot"
            );
        }
        self.inner.on_snapshot(tick, poses);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_params(path: Option<&str>) -> Result<Params> {
    let Some(path) = path else {
        return Ok(Params::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

/// A single repeller circling the containment box's vertical axis.
fn orbiting_repeller(
    center: Vec3,
) -> FnObstacles<impl FnMut(Tick, &mut Vec<Obstacle>) -> Result<(), Unavailable> + Send> {
    FnObstacles(move |tick: Tick, out: &mut Vec<Obstacle>| -> Result<(), Unavailable> {
        let angle = tick.0 as f32 * ORBIT_RATE;
        out.push(Obstacle::point(
            center + Vec3::new(angle.cos(), 0.0, angle.sin()) * ORBIT_RADIUS,
        ));
        Ok(())
    })
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run<B: Backend, W: PoseWriter>(backend: B, population: usize, params: Params, writer: W) -> Result<()> {
    let config = SimConfig {
        population,
        seed:                  SEED,
        dt:                    DT,
        total_ticks:           TOTAL_TICKS,
        num_threads:           None, // all logical cores
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        seed_radius:           params.wall_half_extents().min_element() * 0.5,
    };
    println!(
        "Backend: {}  |  Agents: {}  |  Ticks: {}  |  Seed: {}",
        backend.name(),
        config.population,
        config.total_ticks,
        config.seed
    );
    for issue in params.issues() {
        println!("  note: {issue}");
    }

    let repeller = orbiting_repeller(params.wall_center);
    let mut sim = SimBuilder::new(config, params, backend)
        .obstacles(repeller)
        .build()?;

    let mut obs = ProgressObserver::new(SimOutputObserver::new(writer));

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  agent_poses    : {} rows", obs.pose_rows);
    println!("  tick_summaries : {} rows", obs.summary_rows);
    if let Some(s) = obs.last {
        println!(
            "  final tick {}: mean speed {:.3}, mean neighbors {:.2}",
            s.tick, s.mean_speed, s.mean_neighbors
        );
    }

    sim.shutdown();
    Ok(())
}

#[cfg(feature = "sqlite")]
fn run_sqlite<B: Backend>(backend: B, population: usize, params: Params) -> Result<()> {
    let dir = Path::new(OUTPUT_DIR);
    let db = dir.join("output.db");
    if db.exists() {
        std::fs::remove_file(&db).with_context(|| format!("removing stale {}", db.display()))?;
    }
    run(backend, population, params, flock_output::SqliteWriter::new(dir)?)
}

#[cfg(not(feature = "sqlite"))]
fn run_sqlite<B: Backend>(_backend: B, _population: usize, _params: Params) -> Result<()> {
    bail!("--sqlite needs flock-demo built with `--features sqlite`")
}

fn run_with_output<B: Backend>(backend: B, population: usize, params: Params, sqlite: bool) -> Result<()> {
    if sqlite {
        run_sqlite(backend, population, params)
    } else {
        run(backend, population, params, CsvWriter::new(Path::new(OUTPUT_DIR))?)
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let (flags, args): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|a| a.starts_with("--"));
    let sqlite = match flags.as_slice() {
        [] => false,
        [f] if f == "--sqlite" => true,
        other => bail!("unknown flags {other:?}; expected `--sqlite`"),
    };
    let backend = args.first().map(String::as_str).unwrap_or("parallel");
    let params = load_params(args.get(1).map(String::as_str))?;

    println!("=== flock-demo ===");
    match backend {
        "sequential" => run_with_output(SequentialBackend::new(), SEQUENTIAL_POPULATION, params, sqlite),
        "parallel" => run_with_output(ParallelBackend::new(), PARALLEL_POPULATION, params, sqlite),
        other => bail!("unknown backend {other:?}; expected `sequential` or `parallel`"),
    }
}
