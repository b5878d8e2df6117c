//! Command-line front end.
//!
//! Renders tracker state as text and forwards intents; the simulated player
//! stands in for an embedded video player.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coursetrack::config::{ENV_CHAPTERS_DIR, ENV_DATA_DIR};
use coursetrack::core::time::format_timestamp;
use coursetrack::{
    ChapterList, ChapterSource, Config, DirectoryChapterSource, FileStore, PlaybackTracker, ProgressStorage,
    SimulatedPlayer, TrackerUpdate, VideoId, VideoProgress,
};
use env_logger::{Builder, Target};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "coursetrack", version, about = "Track chapter progress through course videos")]
struct Cli {
    /// Directory holding `<video-id>.txt` descriptions
    #[arg(long, global = true, env = ENV_CHAPTERS_DIR)]
    chapters_dir: Option<PathBuf>,

    /// Directory progress is stored in
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the chapters of a video
    Chapters { video: String },
    /// Show progress for one video, or every video with progress
    Status { video: Option<String> },
    /// Mark a chapter completed, or unmark it if it already is
    Toggle { video: String, chapter: usize },
    /// Play a video on a simulated player and track its chapters
    Play {
        video: String,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
        /// Video seconds per wall-clock second
        #[arg(long, default_value_t = 60.0)]
        rate: f64,
        /// Wall-clock seconds to play before ending
        #[arg(long = "for", default_value_t = 10.0)]
        duration: f64,
    },
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("coursetrack", LevelFilter::Debug)
        .init();
}

fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(dir) = cli.chapters_dir {
        config.chapters_dir = dir;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    log::debug!("Using {:?}", config);

    let source = DirectoryChapterSource::new(&config.chapters_dir);
    let mut storage = ProgressStorage::with_key(FileStore::new(&config.data_dir), config.storage_key.clone());

    match cli.command {
        Command::Chapters { video } => {
            let video = VideoId::parse(&video)?;
            let chapters = source.fetch_chapters(&video)?;
            let progress = storage.load().progress(&video);
            print_chapters(&chapters, &progress);
        }
        Command::Status { video: Some(video) } => {
            let video = VideoId::parse(&video)?;
            print_progress(&video, &storage.load().progress(&video));
        }
        Command::Status { video: None } => {
            let store = storage.load();
            if store.is_empty() {
                println!("No progress recorded yet.");
            }
            for (video, progress) in store.iter() {
                print_progress(video, progress);
            }
        }
        Command::Toggle { video, chapter } => {
            let video = VideoId::parse(&video)?;
            let chapters = source.fetch_chapters(&video)?;
            if chapter >= chapters.len() {
                anyhow::bail!("Chapter {} does not exist ({} chapters)", chapter, chapters.len());
            }
            let store = storage.load().toggle_completion(&video, chapter, chapters.len());
            storage.save(&store).context("saving progress")?;
            print_chapters(&chapters, &store.progress(&video));
        }
        Command::Play {
            video,
            from,
            rate,
            duration,
        } => {
            let duration = play_duration(duration)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("starting runtime")?;
            runtime.block_on(play(source, storage, config.sample_interval(), video, from, rate, duration));
        }
    }

    Ok(())
}

async fn play(
    source: DirectoryChapterSource,
    storage: ProgressStorage<FileStore>,
    interval: Duration,
    video: String,
    from: f64,
    rate: f64,
    duration: Duration,
) {
    let player = SimulatedPlayer::with_rate(rate);
    let mut tracker = PlaybackTracker::new(player.clone(), source, storage, interval);
    let handle = tracker.handle();
    let updates = tracker.updates();

    let printer = std::thread::spawn(move || {
        let mut chapters = ChapterList::default();
        for update in updates.iter() {
            render(&mut chapters, update);
        }
    });

    let driver = async move {
        handle.load(video);
        player.make_ready();
        player.scrub_to(from);
        player.play();
        tokio::time::sleep(duration).await;
        player.end();
        handle.shutdown();
    };

    let (tracker, ()) = tokio::join!(tracker.run(), driver);
    // Dropping the tracker closes the update channel and stops the printer.
    drop(tracker);
    if printer.join().is_err() {
        log::warn!("Update printer panicked");
    }
}

/// Wall-clock play time from `--for`
fn play_duration(seconds: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("--for must be a finite, non-negative number of seconds, got {}", seconds))
}

fn render(chapters: &mut ChapterList, update: TrackerUpdate) {
    match update {
        TrackerUpdate::VideoLoaded {
            video,
            chapters: loaded,
            progress,
        } => {
            println!("Loaded {} ({} chapters)", video, loaded.len());
            print_chapters(&loaded, &progress);
            *chapters = loaded;
        }
        TrackerUpdate::PhaseChanged(phase) => println!("[{:?}]", phase),
        TrackerUpdate::ChapterChanged(index) => match chapters.get(index) {
            Some(chapter) => println!("> {:>2}. {} {}", index, chapter.display_time, chapter.title),
            None => println!("> {:>2}", index),
        },
        TrackerUpdate::ProgressChanged(progress) => println!(
            "  {}% complete, {} chapter(s) done",
            progress.progress_percentage,
            progress.completed_chapters.len()
        ),
        TrackerUpdate::Notice(message) => eprintln!("! {}", message),
    }
}

fn print_chapters(chapters: &ChapterList, progress: &VideoProgress) {
    for (index, chapter) in chapters.iter().enumerate() {
        let mark = if progress.is_completed(index) { "x" } else { " " };
        let here = if progress.last_watched_chapter == Some(index) { "<" } else { "" };
        println!("[{}] {:>2}. {:>8}  {} {}", mark, index, chapter.display_time, chapter.title, here);
    }
    println!("{}% complete", progress.progress_percentage);
}

fn print_progress(video: &VideoId, progress: &VideoProgress) {
    let last = progress
        .last_watched_chapter
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let updated = progress
        .updated_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "{}  {:>3}%  completed {:?}  last {}  watched {}  updated {}",
        video,
        progress.progress_percentage,
        progress.completed_chapters,
        last,
        format_timestamp(progress.total_watch_time_seconds),
        updated
    );
}
