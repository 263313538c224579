#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessel_layout::{DockConfig, DockError, DockTree, Point, Side, Size, hit_test};

#[derive(Debug, Arbitrary)]
enum Op {
    Add { width: u16, height: u16 },
    Delete { pick: u16 },
    Insert { moving: u16, target: u16, side: u8 },
    Grow { pick: u16, grow: u8 },
    Drag { pick: u16, x: u16, y: u16 },
    Drop { dragged: u16, x: u16, y: u16 },
}

fn side(raw: u8) -> Side {
    match raw % 4 {
        0 => Side::Left,
        1 => Side::Right,
        2 => Side::Top,
        _ => Side::Bottom,
    }
}

const VIEWPORT: Size = Size::new(1600.0, 900.0);

fuzz_target!(|ops: Vec<Op>| {
    // Cap length to keep fuzzing fast.
    if ops.len() > 256 {
        return;
    }
    let config = DockConfig::default();
    let mut tree: DockTree<usize> = DockTree::new();

    for (step, op) in ops.into_iter().enumerate() {
        let ids = tree.ids().to_vec();
        let pick = |raw: u16| ids.get(usize::from(raw) % ids.len().max(1)).cloned();
        let result = match op {
            Op::Add { width, height } => tree
                .add_best_fitting(step, Size::new(f64::from(width), f64::from(height)))
                .map(|_| ()),
            Op::Delete { pick: raw } => match pick(raw) {
                Some(id) => tree.delete_tile(&id),
                None => Ok(()),
            },
            Op::Insert {
                moving,
                target,
                side: raw_side,
            } => match (pick(moving), pick(target)) {
                (Some(moving), Some(target)) => tree.apply_insert(&moving, &target, side(raw_side)),
                _ => Ok(()),
            },
            Op::Grow { pick: raw, grow } => match pick(raw) {
                Some(id) => tree.update_growth_values([(id, f64::from(grow) / 16.0)]),
                None => Ok(()),
            },
            Op::Drag { pick: raw, x, y } => {
                let measurement = tree.measure().expect("valid trees measure");
                match measurement.dividers().get(usize::from(raw) % measurement.dividers().len().max(1)) {
                    Some(divider) => tree.resize_divider(
                        divider,
                        Point::new(f64::from(x), f64::from(y)),
                        VIEWPORT,
                        &config,
                    ),
                    None => Ok(()),
                }
            }
            Op::Drop { dragged, x, y } => match pick(dragged) {
                Some(dragged) => {
                    let zones = tree
                        .drop_zones_excluding(&dragged, VIEWPORT, &config)
                        .expect("drop zones");
                    match hit_test(&zones, Point::new(f64::from(x), f64::from(y))) {
                        Some(zone) => {
                            let target = zone.target().clone();
                            tree.apply_insert(&dragged, &target, zone.side())
                        }
                        None => Ok(()),
                    }
                }
                None => Ok(()),
            },
        };

        // Only caller-input rejections are acceptable; never an invariant breach.
        if let Err(err) = result {
            assert!(!matches!(err, DockError::Invariant(_)), "invariant breach: {err}");
        }
        tree.validate().expect("tree stays valid");
        tree.measure().expect("valid trees measure");
    }
});
