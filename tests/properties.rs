use std::collections::HashSet;

use proptest::prelude::*;
use vehicle_tracker_rs::tracker::{iou_matrix, linear_assignment};
use vehicle_tracker_rs::{BBox, Detection, IdentityPool, TrackerConfig, VehicleTracker};

fn bbox() -> impl Strategy<Value = BBox> {
    (0.0f32..400.0, 0.0f32..400.0, 5.0f32..120.0, 5.0f32..120.0)
        .prop_map(|(y, x, h, w)| BBox::new(y, x, y + h, x + w))
}

fn frames() -> impl Strategy<Value = Vec<Vec<BBox>>> {
    prop::collection::vec(prop::collection::vec(bbox(), 0..5), 1..40)
}

proptest! {
    #[test]
    fn iou_is_symmetric_and_bounded(a in bbox(), b in bbox()) {
        let ab = a.iou(&b);
        prop_assert_eq!(ab, b.iou(&a));
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou(a in bbox(), gap in 0.0f32..50.0) {
        let b = BBox::new(a.ymin, a.xmax + gap, a.ymax, a.xmax + gap + a.width());
        prop_assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn assignment_partitions_both_sides(
        tracks in prop::collection::vec(bbox(), 0..6),
        dets in prop::collection::vec(bbox(), 0..6),
    ) {
        let ious = iou_matrix(&tracks, &dets);
        let result = linear_assignment(&ious, 0.25).unwrap();

        let mut seen_tracks: Vec<usize> = result.matches.iter().map(|m| m.0).collect();
        seen_tracks.extend(&result.unmatched_tracks);
        seen_tracks.sort_unstable();
        prop_assert_eq!(seen_tracks, (0..tracks.len()).collect::<Vec<_>>());

        let mut seen_dets: Vec<usize> = result.matches.iter().map(|m| m.1).collect();
        seen_dets.extend(&result.unmatched_detections);
        seen_dets.sort_unstable();
        prop_assert_eq!(seen_dets, (0..dets.len()).collect::<Vec<_>>());

        for &(t, d) in &result.matches {
            prop_assert!(ious[[t, d]] > 0.25);
        }
    }

    #[test]
    fn lifecycle_invariants_hold(frames in frames()) {
        let config = TrackerConfig {
            max_age: 2,
            min_hits: 2,
            ..TrackerConfig::default()
        };
        let mut tracker =
            VehicleTracker::with_identity_pool(config, IdentityPool::bounded(64)).unwrap();

        for boxes in frames {
            let dets: Vec<Detection> =
                boxes.into_iter().map(|b| Detection::from_bbox(b, 0.9)).collect();
            let report = tracker.update(&dets).unwrap();

            let active = tracker.tracks();
            let stats = tracker.stats();
            prop_assert!(report.visible.len() <= active.len());
            prop_assert_eq!(active.len() as u64, stats.created - stats.deleted);

            let ids: HashSet<_> = active.iter().map(|t| t.track_id).collect();
            prop_assert_eq!(ids.len(), active.len());

            if let IdentityPool::Bounded { free, .. } = tracker.identity_pool() {
                prop_assert!(free.iter().all(|id| !ids.contains(id)));
                prop_assert_eq!(free.len() + ids.len(), 64);
            }

            for track in active {
                prop_assert!(track.unmatched <= 2);
            }
        }
    }
}
