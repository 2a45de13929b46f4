// Entry point: load config and embedding, run the requested sweep, emit CSV.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nullscape::cli::{Args, Axis};
use nullscape::config::AppConfig;
use nullscape::core::embedding::event_count;
use nullscape::core::intensity::CramerIntensity;
use nullscape::core::nullfield::calibrate;
use nullscape::io;
use nullscape::sweep::{Controls, SweepOrchestrator};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = AppConfig::load_or_default(&args.config);

    let label = args.label.unwrap_or(cfg.input.label);
    let controls = Controls {
        target_count: args.target_count.or(cfg.sweep.target_count),
        sample_size: args.sample_size.unwrap_or(cfg.sweep.sample_size),
        seed: args.seed.unwrap_or(cfg.sweep.seed),
    };
    let radius = args.radius.unwrap_or(cfg.sweep.radius);
    let radii = args.radii.unwrap_or(cfg.sweep.radii);
    let cutoffs = args.cutoffs.unwrap_or(cfg.sweep.cutoffs);

    let embedding = io::load_embedding_csv(&args.embedding, &label)
        .with_context(|| format!("loading embedding {}", args.embedding.display()))?;
    info!(
        points = embedding.len(),
        events = event_count(embedding.points()),
        max_n = embedding.max_n(),
        "embedding loaded"
    );

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_for_ctrlc = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_for_ctrlc.store(true, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let model = CramerIntensity;
    let orchestrator =
        SweepOrchestrator::new(&embedding, &model, controls).with_abort(stop_flag);

    let table = match args.axis {
        Axis::Radius => orchestrator.radius_sweep(&radii),
        Axis::Cutoff => orchestrator.cutoff_sweep(&cutoffs, radius),
    };
    if table.rows.is_empty() {
        warn!("sweep produced no computable rows");
    }

    if let Some(null_out) = &args.null_out {
        let target = controls
            .target_count
            .unwrap_or_else(|| event_count(embedding.points()));
        let field = calibrate(embedding.points(), target, &model, controls.seed)
            .context("calibrating null field for export")?;
        io::write_null_field_csv(null_out, embedding.points(), &field, &cfg.input.null_label)
            .context("writing null field CSV")?;
        info!(
            path = %null_out.display(),
            realized = field.realized,
            c = field.constant,
            "null field exported"
        );
    }

    io::write_sweep_csv(&args.out, &table).context("writing sweep CSV")?;
    info!(
        path = %args.out.display(),
        rows = table.rows.len(),
        skipped = table.skipped.len(),
        "sweep table written"
    );
    Ok(())
}
