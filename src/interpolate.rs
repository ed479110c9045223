//! Keyframe interpolation.
//!
//! Given the sparse keyframes of a preview script plus any keyframes
//! inserted while the preview was paused, compute where each actor stands
//! at an arbitrary virtual time. Motion is linear in x and y between
//! neighbouring keyframes and clamps to the first/last keyframe outside the
//! covered range. Interior results are snapped to whole pixels.

use std::collections::BTreeMap;

use crate::constants::DEFAULT_ACTOR_POSITION;
use crate::model::{ActorId, Keyframe, Point, sort_by_time};

/// Resolved actor positions at one instant.
pub type PositionMap = BTreeMap<ActorId, Point>;

/// Read-only view over the original and dynamic keyframe lists.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    original: &'a [Keyframe],
    dynamic: &'a [Keyframe],
}

impl<'a> Interpolator<'a> {
    pub fn new(original: &'a [Keyframe], dynamic: &'a [Keyframe]) -> Self {
        Self { original, dynamic }
    }

    /// Merged keyframes of one actor sorted by time.
    ///
    /// Dynamic keyframes come after original ones with the same time.
    pub fn keyframes_for(&self, actor: ActorId) -> Vec<Keyframe> {
        let mut track: Vec<Keyframe> = self
            .original
            .iter()
            .chain(self.dynamic)
            .filter(|k| k.actor_id == actor)
            .copied()
            .collect();
        sort_by_time(&mut track);
        track
    }

    /// Position of `actor` at virtual time `t` (seconds).
    pub fn position_at(&self, actor: ActorId, t: f64) -> Point {
        position_on_track(&self.keyframes_for(actor), t)
    }

    /// Positions of every actor that has at least one keyframe.
    pub fn positions_at(&self, t: f64) -> PositionMap {
        let mut actors: Vec<ActorId> = self
            .original
            .iter()
            .chain(self.dynamic)
            .map(|k| k.actor_id)
            .collect();
        actors.sort_unstable();
        actors.dedup();

        actors
            .into_iter()
            .map(|actor| (actor, self.position_at(actor, t)))
            .collect()
    }

    /// All keyframes, original first, sorted by time.
    pub fn merged(&self) -> Vec<Keyframe> {
        let mut all: Vec<Keyframe> = self.original.iter().chain(self.dynamic).copied().collect();
        sort_by_time(&mut all);
        all
    }
}

/// Interpolate along a single actor's time-sorted keyframes.
pub fn position_on_track(track: &[Keyframe], t: f64) -> Point {
    let (Some(first), Some(last)) = (track.first(), track.last()) else {
        return DEFAULT_ACTOR_POSITION;
    };

    if t.is_nan() || t <= first.time {
        return first.position();
    }
    if t >= last.time {
        return last.position();
    }

    // first.time < t < last.time, so 1 <= upper < len
    let upper = track.partition_point(|k| k.time <= t);
    let from = &track[upper - 1];
    let to = &track[upper];

    let ratio = (t - from.time) / (to.time - from.time);
    from.position().lerp(to.position(), ratio).rounded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const A: ActorId = ActorId(1);

    fn kf(time: f64, x: f64, y: f64) -> Keyframe {
        Keyframe::new(A, time, x, y)
    }

    #[test]
    fn test_midpoint_and_clamping() {
        let original = [kf(0.0, 200.0, 120.0), kf(2.0, 250.0, 150.0)];
        let interp = Interpolator::new(&original, &[]);

        assert_eq!(interp.position_at(A, 1.0), Point::new(225.0, 135.0));
        assert_eq!(interp.position_at(A, -1.0), Point::new(200.0, 120.0));
        assert_eq!(interp.position_at(A, 5.0), Point::new(250.0, 150.0));
    }

    #[test]
    fn test_no_keyframes_uses_default() {
        let interp = Interpolator::new(&[], &[]);
        assert_eq!(interp.position_at(A, 3.0), DEFAULT_ACTOR_POSITION);
        assert!(interp.positions_at(3.0).is_empty());
    }

    #[test]
    fn test_single_keyframe_everywhere() {
        let original = [kf(4.0, 10.0, 20.0)];
        let interp = Interpolator::new(&original, &[]);
        for t in [0.0, 4.0, 100.0] {
            assert_eq!(interp.position_at(A, t), Point::new(10.0, 20.0));
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let original = [kf(10.0, 100.0, 0.0), kf(0.0, 0.0, 0.0)];
        let interp = Interpolator::new(&original, &[]);
        assert_eq!(interp.position_at(A, 5.0), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_dynamic_keyframe_reshapes_path() {
        let original = [kf(0.0, 0.0, 0.0), kf(10.0, 100.0, 0.0)];
        let dynamic = [kf(5.0, 50.0, 80.0)];
        let interp = Interpolator::new(&original, &dynamic);

        assert_eq!(interp.position_at(A, 5.0), Point::new(50.0, 80.0));
        assert_eq!(interp.position_at(A, 2.5), Point::new(25.0, 40.0));
        assert_eq!(interp.keyframes_for(A).len(), 3);
    }

    #[test]
    fn test_dynamic_wins_at_shared_time() {
        let original = [kf(0.0, 0.0, 0.0), kf(5.0, 50.0, 0.0), kf(10.0, 100.0, 0.0)];
        let dynamic = [kf(5.0, 300.0, 300.0)];
        let interp = Interpolator::new(&original, &dynamic);

        assert_eq!(interp.position_at(A, 5.0), Point::new(300.0, 300.0));
        // Just after the shared time the segment starts from the dynamic keyframe
        let p = interp.position_at(A, 7.5);
        assert_eq!(p, Point::new(200.0, 150.0));
    }

    #[test]
    fn test_rounds_half_up() {
        let original = [kf(0.0, 0.0, 0.0), kf(4.0, 1.0, -1.0)];
        let interp = Interpolator::new(&original, &[]);
        // 0.5 -> 1, -0.5 -> 0
        assert_eq!(interp.position_at(A, 2.0), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_positions_at_covers_each_actor() {
        let original = [
            Keyframe::new(ActorId(2), 0.0, 1.0, 1.0),
            Keyframe::new(ActorId(1), 0.0, 2.0, 2.0),
        ];
        let dynamic = [Keyframe::new(ActorId(3), 1.0, 3.0, 3.0)];
        let positions = Interpolator::new(&original, &dynamic).positions_at(0.5);
        assert_eq!(
            positions.keys().copied().collect::<Vec<_>>(),
            vec![ActorId(1), ActorId(2), ActorId(3)]
        );
    }

    #[test]
    fn test_nan_time_clamps_to_first() {
        let original = [kf(0.0, 1.0, 2.0), kf(1.0, 3.0, 4.0)];
        assert_eq!(
            Interpolator::new(&original, &[]).position_at(A, f64::NAN),
            Point::new(1.0, 2.0)
        );
    }

    fn track() -> impl Strategy<Value = Vec<Keyframe>> {
        prop::collection::vec((0.0f64..100.0, -500.0f64..1500.0, -500.0f64..1500.0), 1..8)
            .prop_map(|v| v.into_iter().map(|(t, x, y)| kf(t, x, y)).collect())
    }

    proptest! {
        #[test]
        fn prop_segment_proportional(
            t0 in 0.0f64..50.0,
            span in 0.1f64..50.0,
            frac in 0.0f64..1.0,
            (x0, y0, x1, y1) in (-500.0f64..1500.0, -500.0f64..1500.0, -500.0f64..1500.0, -500.0f64..1500.0),
        ) {
            let t1 = t0 + span;
            let original = [kf(t0, x0, y0), kf(t1, x1, y1)];
            let t = t0 + span * frac;
            prop_assume!(t > t0 && t < t1);

            let p = Interpolator::new(&original, &[]).position_at(A, t);
            let ratio = (t - t0) / (t1 - t0);
            let expected_x = ((x0 + (x1 - x0) * ratio) + 0.5).floor();
            let expected_y = ((y0 + (y1 - y0) * ratio) + 0.5).floor();
            prop_assert_eq!(p, Point::new(expected_x, expected_y));
        }

        #[test]
        fn prop_clamps_outside_range(kfs in track(), before in 0.0f64..100.0, after in 0.0f64..100.0) {
            let interp = Interpolator::new(&kfs, &[]);
            let sorted = interp.keyframes_for(A);
            let first = sorted[0];
            let last = sorted[sorted.len() - 1];

            prop_assert_eq!(interp.position_at(A, first.time - before), first.position());
            prop_assert_eq!(interp.position_at(A, last.time + after), last.position());
        }

        #[test]
        fn prop_empty_dynamic_matches_original(kfs in track(), t in -10.0f64..110.0) {
            let mut sorted = kfs.clone();
            sort_by_time(&mut sorted);
            prop_assert_eq!(
                Interpolator::new(&kfs, &[]).position_at(A, t),
                position_on_track(&sorted, t)
            );
        }

        #[test]
        fn prop_stays_within_segment_box(kfs in track(), t in 0.0f64..100.0) {
            let interp = Interpolator::new(&kfs, &[]);
            let p = interp.position_at(A, t);
            let xs = kfs.iter().map(|k| k.x);
            let ys = kfs.iter().map(|k| k.y);
            let (min_x, max_x) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
            let (min_y, max_y) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
            // Rounding may push at most half a pixel past the hull
            prop_assert!(p.x >= min_x - 0.5 && p.x <= max_x + 1.0);
            prop_assert!(p.y >= min_y - 0.5 && p.y <= max_y + 1.0);
        }
    }
}
