use std::time::Duration;

use coursetrack::playback::{TrackerPhase, TrackerUpdate};
use coursetrack::{
    FileStore, PlaybackTracker, ProgressStorage, SimulatedPlayer, StaticChapterSource, VideoId,
};

const VIDEO: &str = "dQw4w9WgXcQ";
const DESCRIPTION: &str = "\
Course outline:
0:00 Intro
2:00 Setup
5:00 Wrap up";

fn source() -> StaticChapterSource {
    StaticChapterSource::new().with_description(VideoId::parse(VIDEO).unwrap(), DESCRIPTION)
}

#[tokio::test(start_paused = true)]
async fn test_full_session_persists_progress() {
    let dir = tempfile::tempdir().unwrap();
    let video = VideoId::parse(VIDEO).unwrap();

    // One minute of video per second of (virtual) wall clock.
    let player = SimulatedPlayer::with_rate(60.0);
    let mut tracker = PlaybackTracker::new(
        player.clone(),
        source(),
        ProgressStorage::new(FileStore::new(dir.path())),
        Duration::from_secs(1),
    );
    let handle = tracker.handle();
    let updates = tracker.updates();

    let driver = async move {
        handle.load(format!("https://youtu.be/{}", VIDEO));
        player.make_ready();
        player.play();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        player.end();
        handle.shutdown();
    };
    let (tracker, ()) = tokio::join!(tracker.run(), driver);

    assert_eq!(tracker.phase(), TrackerPhase::Idle);
    let progress = tracker.store().progress(&video);
    assert_eq!(progress.completed_chapters, [0, 1].into_iter().collect());
    assert_eq!(progress.progress_percentage, 67);
    assert_eq!(progress.last_watched_chapter, Some(2));
    // Watch time accrues one interval per chapter advance.
    assert_eq!(progress.total_watch_time_seconds, 2);

    let received: Vec<TrackerUpdate> = updates.try_iter().collect();
    assert!(matches!(received.first(), Some(TrackerUpdate::PhaseChanged(TrackerPhase::Ready))));
    let chapter_changes: Vec<usize> = received
        .iter()
        .filter_map(|update| match update {
            TrackerUpdate::ChapterChanged(index) => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(chapter_changes, vec![1, 2]);
    assert!(received.contains(&TrackerUpdate::PhaseChanged(TrackerPhase::Ended)));
    assert!(!received.iter().any(|update| matches!(update, TrackerUpdate::Notice(_))));

    // A later session restores what was saved.
    let restored = ProgressStorage::new(FileStore::new(dir.path())).load();
    assert_eq!(restored.progress(&video), progress);
}

#[tokio::test(start_paused = true)]
async fn test_manual_completion_without_playback() {
    let dir = tempfile::tempdir().unwrap();
    let video = VideoId::parse(VIDEO).unwrap();

    let mut tracker = PlaybackTracker::new(
        SimulatedPlayer::new(),
        source(),
        ProgressStorage::new(FileStore::new(dir.path())),
        Duration::from_secs(1),
    );
    tracker.load_video(VIDEO).unwrap();
    tracker.mark_chapter_completed(2).unwrap();
    assert_eq!(tracker.phase(), TrackerPhase::Ready);

    let restored = ProgressStorage::new(FileStore::new(dir.path())).load();
    let progress = restored.progress(&video);
    assert_eq!(progress.completed_chapters, [2].into_iter().collect());
    assert_eq!(progress.progress_percentage, 33);
}

#[tokio::test(start_paused = true)]
async fn test_bad_reference_is_reported_not_fatal() {
    let mut tracker = PlaybackTracker::new(
        SimulatedPlayer::new(),
        source(),
        ProgressStorage::new(coursetrack::MemoryStore::new()),
        Duration::from_secs(1),
    );
    let handle = tracker.handle();
    let updates = tracker.updates();

    handle.load("https://example.com/not-a-video");
    handle.shutdown();
    let tracker = tracker.run().await;

    assert_eq!(tracker.phase(), TrackerPhase::Idle);
    let received: Vec<TrackerUpdate> = updates.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert!(matches!(&received[0], TrackerUpdate::Notice(message) if message.contains("not-a-video")));
}
