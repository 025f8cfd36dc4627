//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{
    FilmstripArgs, MergeArgs, PreviewArgs, ProbeArgs, ThumbnailArgs, WaveformArgs,
};
use crate::cli::Commands;
use crate::domain::model::{FrameProgress, MediaDescriptor, MergeJob, ProgressEvent, ProgressState};
use crate::domain::rules::PreviewRules;
use crate::engine::ProgressSink;
use crate::utils::{format_file_size, format_timestamp};

/// Dispatch one parsed command
pub async fn execute(command: Commands, container: &DefaultAppContainer) -> Result<()> {
    match command {
        Commands::Probe(args) => probe(args, container).await,
        Commands::Thumbnail(args) => thumbnail(args, container).await,
        Commands::Filmstrip(args) => filmstrip(args, container).await,
        Commands::Waveform(args) => waveform(args, container).await,
        Commands::Preview(args) => preview(args, container).await,
        Commands::Merge(args) => merge(args, container).await,
    }
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, container: &DefaultAppContainer) -> Result<()> {
    info!("Starting probe of {} file(s)", args.inputs.len());
    let results = container.probe().probe_many(&args.inputs).await;

    if args.json {
        let entries: Vec<_> = args
            .inputs
            .iter()
            .zip(&results)
            .map(|(path, result)| match result {
                Ok(descriptor) => serde_json::to_value(descriptor),
                Err(e) => Ok(json!({ "path": path, "error": e.to_string() })),
            })
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (path, result) in args.inputs.iter().zip(&results) {
            match result {
                Ok(descriptor) => display_descriptor(descriptor),
                Err(e) => eprintln!("{}: {}", path.display(), e),
            }
        }
    }

    let failures = results.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        anyhow::bail!("{} of {} probe(s) failed", failures, results.len());
    }
    Ok(())
}

fn display_descriptor(descriptor: &MediaDescriptor) {
    println!("{}", descriptor.path);
    println!("  Duration:   {}", format_timestamp(descriptor.duration_seconds));
    if descriptor.has_video() {
        println!("  Resolution: {}", descriptor.resolution());
        println!("  Frame rate: {:.3} fps", descriptor.frame_rate);
    }
    println!("  Codec:      {}", descriptor.codec_name);
    println!("  Size:       {}", format_file_size(descriptor.size_bytes));
}

/// Execute the thumbnail command
pub async fn thumbnail(args: ThumbnailArgs, container: &DefaultAppContainer) -> Result<()> {
    let at = match args.at {
        Some(at) => at,
        None => {
            let descriptor = container.probe().probe(&args.input).await?;
            PreviewRules::thumbnail_offset(descriptor.duration_seconds)
        }
    };

    let uri = container
        .previews()
        .thumbnail(&args.input, at)
        .await
        .with_context(|| format!("Failed to render thumbnail for {}", args.input.display()))?;
    println!("{}", uri);
    Ok(())
}

/// Execute the filmstrip command
pub async fn filmstrip(args: FilmstripArgs, container: &DefaultAppContainer) -> Result<()> {
    let duration = match args.duration {
        Some(duration) => duration,
        None => container.probe().probe(&args.input).await?.duration_seconds,
    };
    let previews = container.previews();
    let count = args.count.unwrap_or(previews.settings().filmstrip_frames);

    let (sink, events) = ProgressSink::channel();
    let reporter = tokio::spawn(report_frames(events));
    let frames = previews
        .filmstrip(&args.input, duration, count, &sink)
        .await
        .with_context(|| format!("Failed to render filmstrip for {}", args.input.display()));
    drop(sink);
    if let Err(e) = reporter.await {
        warn!("Frame progress reporter stopped: {}", e);
    }
    let frames = frames?;

    if args.json {
        println!("{}", serde_json::to_string(&frames)?);
    } else {
        for frame in &frames {
            println!("{}", frame);
        }
    }
    info!("Filmstrip rendered with {} frame(s)", frames.len());
    Ok(())
}

async fn report_frames(mut events: UnboundedReceiver<FrameProgress>) {
    while let Some(event) = events.recv().await {
        debug!("Filmstrip frame {}/{}", event.current, event.total);
    }
}

/// Execute the waveform command
pub async fn waveform(args: WaveformArgs, container: &DefaultAppContainer) -> Result<()> {
    let envelope = container
        .previews()
        .waveform(&args.input)
        .await
        .with_context(|| format!("Failed to extract waveform for {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string(&envelope)?);
    } else {
        let peak = envelope.iter().copied().fold(0.0_f32, f32::max);
        println!("{}", args.input.display());
        println!("  Values: {}", envelope.len());
        println!("  Peak:   {:.3}", peak);
    }
    Ok(())
}

/// Execute the preview command
pub async fn preview(args: PreviewArgs, container: &DefaultAppContainer) -> Result<()> {
    let descriptor = container.probe().probe(&args.input).await?;
    let bundle = container
        .previews()
        .bundle(&descriptor)
        .await
        .with_context(|| format!("Failed to render previews for {}", args.input.display()))?;

    let output = json!({ "media": descriptor, "preview": bundle });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Execute the merge command; Ctrl-C cancels the running job
pub async fn merge(args: MergeArgs, container: &DefaultAppContainer) -> Result<()> {
    let mut job = MergeJob::new(args.clips, args.format);
    if let Some(id) = args.job_id {
        job = job.with_job_id(id);
    }
    if let Some(output) = args.output {
        job = job.with_output_path(output);
    }
    let job_id = job.job_id.clone();
    info!("Starting merge job {} with {} clip(s)", job_id, job.clips.len());

    let merger = container.merger();
    let (sink, events) = ProgressSink::channel();
    let reporter = tokio::spawn(report_merge_progress(events, args.json));

    let merge = merger.merge(job, sink);
    tokio::pin!(merge);
    let mut cancel_requested = false;
    let result = loop {
        tokio::select! {
            result = &mut merge => break result,
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                cancel_requested = true;
                eprintln!("Cancelling job {}...", job_id);
                merger.cancel(&job_id);
            }
        }
    };

    if let Err(e) = reporter.await {
        warn!("Merge progress reporter stopped: {}", e);
    }

    let output = result.with_context(|| format!("Merge job {} did not complete", job_id))?;
    if args.json {
        println!("{}", json!({ "jobId": job_id, "outputPath": output }));
    } else {
        println!("{}", output.display());
    }
    Ok(())
}

async fn report_merge_progress(mut events: UnboundedReceiver<ProgressEvent>, json_lines: bool) {
    while let Some(event) = events.recv().await {
        if json_lines {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize progress event: {}", e),
            }
        } else {
            print_progress(&event);
        }
        if event.is_terminal() {
            break;
        }
    }
}

fn print_progress(event: &ProgressEvent) {
    let job_id = &event.job_id;
    match event.state {
        ProgressState::Analyzing => eprintln!("[{}] Analyzing clips", job_id),
        ProgressState::Processing => match event.speed_multiplier {
            Some(speed) => eprintln!("[{}] {:5.1}% ({:.2}x)", job_id, event.percent, speed),
            None => eprintln!("[{}] {:5.1}%", job_id, event.percent),
        },
        ProgressState::Complete => {
            let path = event.output_path.as_deref().unwrap_or(Path::new(""));
            eprintln!("[{}] Complete: {}", job_id, path.display());
        }
        ProgressState::Error => eprintln!(
            "[{}] Failed: {}",
            job_id,
            event.error_message.as_deref().unwrap_or("unknown error")
        ),
    }
}
