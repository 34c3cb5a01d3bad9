/// list-events: load one BrainVision recording and print its event code table.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use casinos_erp::{events_from_annotations, read_raw_brainvision, EventCodeScheme};

#[derive(Parser, Debug)]
#[command(name = "list-events")]
struct Args {
    /// Path to the `.vhdr` header.
    vhdr: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = read_raw_brainvision(&args.vhdr)
        .with_context(|| format!("reading {}", args.vhdr.display()))?;
    println!(
        "{} ch × {} samples @ {} Hz ({:.1} s)",
        raw.n_channels(),
        raw.n_times(),
        raw.sfreq,
        raw.duration_secs()
    );

    let (events, event_id) = events_from_annotations(&raw.annotations, EventCodeScheme::BrainVision);
    println!("{} events, {} distinct labels", events.len(), event_id.len());
    for (label, code) in &event_id {
        let n = events.iter().filter(|e| e.code == *code).count();
        println!("  {code:>6}  {n:>5}×  {label}");
    }
    Ok(())
}
