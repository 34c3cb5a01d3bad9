/// casinos-erp: run the full single-subject ERP pipeline and write the
/// seven diagnostic figures.
///
/// Prints the event table, the removed ICA components and the epoch count.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use casinos_erp::{load_subject, run_pipeline, write_report, ArtifactStrategy, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "casinos-erp", about = "Single-subject ERP pipeline for the casinos task")]
struct Args {
    /// Dataset root containing `sub-XX/eeg/`.
    #[arg(long, default_value = ".")]
    data_root: PathBuf,

    /// Subject directory name.
    #[arg(long, default_value = "sub-28")]
    subject: String,

    /// Figure output directory.
    #[arg(long, default_value = "milestone4_outputs")]
    out_dir: PathBuf,

    /// Blink detection: `correlation` (Fp1/Fp2 mean, |r| > 0.3) or `eog-score` (Fp1, z-score).
    #[arg(long, default_value = "correlation")]
    strategy: ArtifactStrategy,

    /// Requested ICA components.
    #[arg(long, default_value_t = 20)]
    n_components: usize,

    /// ICA random seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Stimulus label to epoch on.
    #[arg(long, default_value = "Stimulus/S 11")]
    label: String,

    /// Skip figure rendering.
    #[arg(long)]
    no_plots: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let cfg = PipelineConfig {
        data_root: args.data_root,
        subject_id: args.subject,
        out_dir: args.out_dir,
        strategy: args.strategy,
        n_components: args.n_components,
        random_state: args.seed,
        target_label: args.label,
        ..PipelineConfig::default()
    };

    let raw = load_subject(&cfg)
        .with_context(|| format!("loading {}", cfg.vhdr_path().display()))?;
    println!(
        "Loaded {} ch × {} samples @ {} Hz",
        raw.n_channels(),
        raw.n_times(),
        raw.sfreq
    );

    let out = run_pipeline(&raw, &cfg).context("running ERP pipeline")?;

    println!("Event IDs:");
    for (label, code) in &out.event_id {
        println!("  {code:>6}  {label}");
    }
    println!("Removed ICA components: {:?}", out.detection.excluded);
    println!(
        "Epochs for {:?}: {} kept, {} dropped",
        cfg.target_label,
        out.epochs.len(),
        out.epochs.n_dropped
    );

    if !args.no_plots {
        let written = write_report(&raw, &out, &cfg).context("writing figures")?;
        println!("Saved {} figures in {}", written.len(), cfg.out_dir.display());
    }
    Ok(())
}
