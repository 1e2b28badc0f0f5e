use std::time::Duration;

use crate::services::analytics::ListeningTracker;

#[test]
fn begin_returns_nothing_when_idle() {
    let tracker = ListeningTracker::new();
    assert_eq!(tracker.begin("a.mp3", Some(Duration::from_secs(180))), None);
}

#[test]
fn begin_closes_previous_window() {
    let tracker = ListeningTracker::new();
    tracker.begin("a.mp3", Some(Duration::from_secs(180)));

    let finished = tracker.begin("b.mp3", None).unwrap();
    assert_eq!(finished.id, "a.mp3");
    assert_eq!(finished.duration, Some(Duration::from_secs(180)));
}

#[test]
fn finish_closes_and_empties() {
    let tracker = ListeningTracker::new();
    tracker.begin("a.mp3", None);

    let finished = tracker.finish().unwrap();
    assert_eq!(finished.id, "a.mp3");
    assert_eq!(finished.duration, None);

    assert_eq!(tracker.finish(), None);
}
