use clipmarks_model::{MarkerSide, SpeedMap, SpeedPoint};
use proptest::prelude::*;

fn speed_map_strategy() -> impl Strategy<Value = SpeedMap> {
    (
        0.0f64..60.0,
        prop::collection::vec((0.1f64..4.0, 0.05f64..2.0), 1..6),
        0.05f64..2.0,
    )
        .prop_map(|(start, segments, first_speed)| {
            let mut points = vec![SpeedPoint::new(start, first_speed)];
            let mut x = start;
            for (len, speed) in segments {
                x += len;
                points.push(SpeedPoint::new(x, speed));
            }
            SpeedMap::new(points).expect("generated map should be valid")
        })
}

fn side_strategy() -> impl Strategy<Value = MarkerSide> {
    prop_oneof![Just(MarkerSide::Start), Just(MarkerSide::End)]
}

proptest! {
    #[test]
    fn restore_undoes_any_accepted_move(
        map in speed_map_strategy(),
        side in side_strategy(),
        fraction in -0.5f64..1.5,
    ) {
        let span = map.end() - map.start();
        let new_time = (map.start() + span * fraction).max(0.0);
        let old_time = match side {
            MarkerSide::Start => map.start(),
            MarkerSide::End => map.end(),
        };

        let mut moved = map.clone();
        match moved.set_boundary(side, new_time) {
            Ok(dropped) => {
                prop_assert!(moved.validate().is_ok());
                prop_assert!(moved.start() < moved.end());
                moved.restore_boundary(side, old_time, &dropped).unwrap();
                prop_assert_eq!(moved, map);
            }
            Err(err) => {
                prop_assert!(err.is_ordering_violation());
                prop_assert_eq!(moved, map);
            }
        }
    }

    #[test]
    fn moved_map_stays_inside_new_span(
        map in speed_map_strategy(),
        side in side_strategy(),
        fraction in 0.01f64..0.99,
    ) {
        let new_time = map.start() + (map.end() - map.start()) * fraction;
        let mut moved = map.clone();
        let dropped = moved.set_boundary(side, new_time).unwrap();

        prop_assert_eq!(moved.len() + dropped.len(), map.len());
        prop_assert!(moved
            .points()
            .iter()
            .all(|p| moved.start() <= p.x && p.x <= moved.end()));
    }
}
