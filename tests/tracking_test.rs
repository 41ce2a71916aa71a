use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use intrusion_rs::{
    AlarmController, AlarmEvent, Detection, IntrusionMonitor, IouTracker, Polygon, TrackerConfig,
    ZoneIndex,
};

#[test]
fn test_basic_tracking() {
    let mut tracker = IouTracker::new(TrackerConfig::default()).unwrap();

    // Frame 1: one detection, born but not yet confirmed (min_hits = 2)
    let tracks1 = tracker.update(vec![Detection::new(100, 100, 200, 300, 0.9)]);
    assert!(tracks1.is_empty());
    assert_eq!(tracker.tracks().len(), 1);
    assert_eq!(tracker.tracks()[0].hits, 1);

    // Frame 2: same person moved slightly
    let tracks2 = tracker.update(vec![Detection::new(105, 102, 205, 302, 0.9)]);
    assert_eq!(tracks2.len(), 1);
    let id1 = tracks2[0].track_id;
    assert_eq!(tracks2[0].hits, 2);

    // Frame 3: person missed by the detector, last box is kept
    let tracks3 = tracker.update(vec![]);
    assert_eq!(tracks3.len(), 1);
    assert_eq!(tracks3[0].track_id, id1);
    assert_eq!(tracks3[0].bbox.to_tlbr(), [105, 102, 205, 302]);

    // Frame 4: person reappears near the old box, same identity
    let tracks4 = tracker.update(vec![Detection::new(110, 104, 210, 304, 0.9)]);
    assert_eq!(tracks4.len(), 1);
    assert_eq!(tracks4[0].track_id, id1);
    assert_eq!(tracks4[0].age, 0);
}

#[test]
fn test_two_people_keep_their_ids() {
    let mut tracker = IouTracker::new(TrackerConfig {
        min_hits: 1,
        ..TrackerConfig::default()
    })
    .unwrap();

    let mut left = 0;
    let mut right = 400;
    tracker.update(vec![
        Detection::new(left, 100, left + 50, 250, 0.9),
        Detection::new(right, 100, right + 50, 250, 0.8),
    ]);

    for _ in 0..20 {
        left += 5;
        right -= 5;
        // detector output order flips every frame
        let confirmed = tracker.update(vec![
            Detection::new(right, 100, right + 50, 250, 0.8),
            Detection::new(left, 100, left + 50, 250, 0.9),
        ]);
        assert_eq!(confirmed.len(), 2);
        for track in confirmed {
            match track.track_id {
                1 => assert_eq!(track.bbox.x1, left),
                2 => assert_eq!(track.bbox.x1, right),
                other => panic!("unexpected track id {other}"),
            }
        }
    }
}

#[test]
fn test_identical_inputs_give_identical_ids() {
    let frames: Vec<Vec<Detection>> = (0..30)
        .map(|i| {
            vec![
                Detection::new(10 + i, 10, 60 + i, 160, 0.9),
                Detection::new(40 + i, 10, 90 + i, 160, 0.9),
                Detection::new(300 - i, 50, 350 - i, 200, 0.7),
            ]
        })
        .collect();

    let run = || {
        let mut tracker = IouTracker::new(TrackerConfig::default()).unwrap();
        frames
            .iter()
            .map(|dets| {
                let mut out: Vec<(u64, [i32; 4])> = tracker
                    .update(dets.clone())
                    .iter()
                    .map(|t| (t.track_id, t.bbox.to_tlbr()))
                    .collect();
                out.sort_unstable();
                out
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_intrusion_scenario() {
    // restricted area: the right half of a 640x480 frame
    let zone = Polygon::from_coords(&[(320, 0), (640, 0), (640, 480), (320, 480)]).unwrap();
    let mut monitor = IntrusionMonitor::new(
        TrackerConfig {
            max_age: 5,
            ..TrackerConfig::default()
        },
        ZoneIndex::new(vec![zone]),
        AlarmController::new(Duration::from_secs(3)),
    )
    .unwrap();

    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);
    let walker = |x: i32| Detection::new(x, 200, x + 60, 400, 0.9);

    // walking toward the zone, feet still outside
    let mut x = 200;
    let mut ms = 0;
    for _ in 0..4 {
        let report = monitor.observe_at(vec![walker(x)], at(ms));
        assert!(!report.alarm.active);
        x += 10;
        ms += 100;
    }

    // feet cross x = 320
    let mut raised_at = None;
    for _ in 0..10 {
        let report = monitor.observe_at(vec![walker(x)], at(ms));
        if report.event == Some(AlarmEvent::Raised) {
            raised_at = Some(x);
            assert_eq!(report.alarm.intruders, BTreeSet::from([1]));
        }
        x += 10;
        ms += 100;
    }
    // feet at x + 30; the zone's left edge itself counts as outside
    assert_eq!(raised_at, Some(300));

    // person leaves the frame: the lost track keeps its last box, still inside
    for _ in 0..5 {
        let report = monitor.observe_at(vec![], at(ms));
        assert!(report.is_intruding(1));
        assert_eq!(report.event, None);
        ms += 100;
    }

    // sixth miss: track expires and the cooldown starts
    let left_at = ms;
    let report = monitor.observe_at(vec![], at(left_at));
    assert!(report.tracks.is_empty());
    assert_eq!(report.event, Some(AlarmEvent::CooldownStarted));
    assert!(report.alarm.active);

    let report = monitor.observe_at(vec![], at(left_at + 2_999));
    assert!(report.alarm.active);
    assert_eq!(report.event, None);

    let report = monitor.observe_at(vec![], at(left_at + 3_000));
    assert_eq!(report.event, Some(AlarmEvent::Cleared));
    assert!(!report.alarm.active);
    assert!(report.alarm.intruders.is_empty());
}
