//! Unison - hear what the spectrum is playing
//!
//! Analyses a recording tick by tick, detects which notes are sounding and
//! doubles them on a bank of square-wave voices.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use unison::audio::{wav, PlaybackSystem, Session};
use unison::cli::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let clip = wav::read_mono(&args.input)?;
    info!(
        "Loaded {} ({:.1}s @ {}Hz)",
        args.input.display(),
        clip.duration_secs(),
        clip.sample_rate
    );

    let mut session = Session::new(
        args.analysis_config(clip.sample_rate),
        args.playback_config(),
        args.detector_settings(),
        args.filter_range(),
    )
    .context("Invalid configuration")?;

    let (mix, report) = session.run(&clip.samples);

    let mut busiest: Vec<_> = report.detections.iter().collect();
    busiest.sort_by(|a, b| b.1.cmp(a.1));
    for (label, ticks) in busiest.iter().take(12) {
        info!("{:<4} detected for {} ticks", label, ticks);
    }

    if let Some(path) = &args.output {
        wav::write_mono(path, &mix, clip.sample_rate)?;
        info!("Wrote {}", path.display());
    }

    if args.play {
        let playback = PlaybackSystem::start(mix, clip.sample_rate)?;
        info!("Playing... (Ctrl+C to stop)");
        playback.wait();
    } else if args.output.is_none() {
        warn!("Neither --output nor --play given; analysis only");
    }

    Ok(())
}
