//! Demo entrypoint for the trajectory cache & access layer: opens a
//! trajectory through the façade and fans frame fetches out across worker
//! threads, showing the one-decode-per-miss contract in action.

use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use tcal_backend::{MemoryBackend, TrajectoryBackend};
use tcal_cache::EvictionPolicy;
use tcal_config::{Config, physical_ram_bytes};
use tcal_facade::OpenTrajectories;
use tcal_loader::init_loader_state;
use tcal_model::{Allocator, AtomMask, FrameHeader};
use tcal_registry::FormatRegistry;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tcal", version, about = "Trajectory cache & access layer demo")]
struct Args {
    /// Path to the trajectory file to open. Only its extension is consulted;
    /// the demo backend is a deterministic in-memory trajectory since no
    /// real MD format parsers are in scope.
    path: PathBuf,

    /// Optional path to a `tcal.toml` cache-size override.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Atom count the demo trajectory reports.
    #[arg(long, default_value_t = 200)]
    atoms: usize,

    /// Frame count the demo trajectory reports.
    #[arg(long, default_value_t = 500)]
    frames: usize,

    /// Number of worker threads fetching frames concurrently.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Recenter on atom 0 after decode.
    #[arg(long)]
    recenter: bool,

    /// Deperiodize connected structures after decode.
    #[arg(long)]
    deperiodize: bool,
}

fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_path = PathBuf::from("tcal.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(".", "tcal.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let _log_guard = configure_logging()?;
    install_panic_hook();

    let args = Args::parse();
    info!(target: "runtime", path = %args.path.display(), "startup");

    let alloc = Allocator::new("tcal-cli");

    let mut format_registry = FormatRegistry::new();
    let (mol_backend, traj_factory) = MemoryBackend::matched_pair(args.frames, args.atoms, tcal_model::UnitCell::orthorhombic(20.0, 20.0, 20.0));
    format_registry.register_molecule("XYZ", Arc::new(mol_backend));
    format_registry.register_trajectory("XYZ", Arc::new(traj_factory));

    let loader_state = init_loader_state(&args.path, &format_registry, &alloc)
        .with_context(|| format!("no backend registered for {}", args.path.display()))?;
    if loader_state.requires_dialogue() {
        warn!(target: "runtime.loader", "path requires user disambiguation, demo proceeds with defaults anyway");
    }

    let molecule_backend = loader_state
        .molecule_backend()
        .context("no molecule backend matched this extension")?
        .clone();
    let molecule = molecule_backend.create(&args.path, &alloc)?;

    let config_path = args.config.unwrap_or_else(|| PathBuf::from("tcal.toml"));
    let config = Config::load(&config_path)?;
    let available_bytes = config.available_bytes(physical_ram_bytes());
    let eviction_policy = match config.eviction_policy_name() {
        "lru" => EvictionPolicy::Lru,
        other => {
            if other != "clock" {
                warn!(target: "runtime.config", policy = other, "unknown eviction policy, defaulting to clock");
            }
            EvictionPolicy::Clock
        }
    };
    info!(target: "runtime.config", available_bytes, ?eviction_policy, "cache budget resolved");

    let mut open_trajectories = OpenTrajectories::new();
    let handle = open_trajectories.open_file(
        &args.path,
        &format_registry,
        molecule.clone(),
        &alloc,
        available_bytes,
        eviction_policy,
    )?;

    {
        let facade = open_trajectories
            .find_entry(handle)
            .expect("just opened, must be present");
        if args.recenter {
            facade.set_recenter_target(Some(AtomMask::from_indices(args.atoms, [0])));
        }
        facade.set_deperiodize(args.deperiodize);
    }

    let open_trajectories = Arc::new(open_trajectories);
    let num_frames = args.frames;
    let atom_count = args.atoms;

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    for frame in 0..num_frames {
        job_tx.send(frame).expect("receivers outlive this send");
    }
    drop(job_tx);

    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, f32)>();
    let start = Instant::now();
    let mut workers = Vec::new();
    for worker_id in 0..args.workers {
        let open_trajectories = open_trajectories.clone();
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        workers.push(std::thread::spawn(move || {
            let facade = open_trajectories.find_entry(handle).expect("handle stays open for run duration");
            let mut header = FrameHeader::empty(atom_count);
            let mut x = vec![0.0f32; atom_count];
            let mut y = vec![0.0f32; atom_count];
            let mut z = vec![0.0f32; atom_count];
            while let Ok(frame) = job_rx.recv() {
                if let Err(err) = facade.load_frame(frame, &mut header, &mut x, &mut y, &mut z) {
                    tracing::error!(target: "runtime.worker", worker_id, frame, %err, "decode failed");
                    continue;
                }
                let _ = result_tx.send((frame, x[0]));
            }
        }));
    }
    drop(result_tx);

    let mut seen = 0usize;
    while result_rx.recv().is_ok() {
        seen += 1;
    }
    for worker in workers {
        let _ = worker.join();
    }
    let elapsed = start.elapsed();

    let facade = open_trajectories
        .find_entry(handle)
        .expect("handle stays open for run duration");
    info!(
        target: "runtime.summary",
        frames_fetched = seen,
        cache_frames = facade.num_cache_frames(),
        elapsed_ms = elapsed.as_millis() as u64,
        "run complete"
    );
    println!(
        "fetched {seen} frames across {} workers in {:?}; {} frames cached",
        args.workers,
        elapsed,
        facade.num_cache_frames()
    );

    Ok(())
}
