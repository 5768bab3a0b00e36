use std::collections::HashSet;

use airplanes::{
    Airplane, CellState, Coord, GameSession, Orientation, OwnGrid, PieceColor, PlacementError,
    PlayerConfig, AIRPLANE_CELLS, GRID_SIZE, MAX_AIRPLANES,
};
use proptest::prelude::*;

fn session() -> GameSession {
    GameSession::with_seed(PlayerConfig::new("Tester", "classic").unwrap(), 7)
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![
        Just(Orientation::Up),
        Just(Orientation::Down),
        Just(Orientation::Left),
        Just(Orientation::Right),
    ]
}

#[test]
fn up_airplane_at_five_five_marks_expected_cells() {
    let mut s = session();
    s.place_airplane(Coord::new(5, 5)).unwrap();

    let expected: HashSet<Coord> = [
        (5, 5),
        (6, 5),
        (6, 3),
        (6, 4),
        (6, 6),
        (6, 7),
        (7, 5),
        (8, 5),
        (8, 4),
        (8, 6),
    ]
    .into_iter()
    .map(|(r, c)| Coord::new(r, c))
    .collect();

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let at = Coord::new(row, col);
            let occupied = s.own_grid().cell_state(at) == CellState::Occupied;
            assert_eq!(occupied, expected.contains(&at), "cell {}", at);
        }
    }
    assert_eq!(s.heads(), &[Coord::new(5, 5)]);
}

#[test]
fn overlapping_airplane_is_rejected_without_mutation() {
    let mut s = session();
    s.place_airplane(Coord::new(5, 5)).unwrap();
    let before = s.own_grid().clone();

    s.set_orientation(Orientation::Left);
    // Left-facing nose at (6,2) puts its wing root on (6,3).
    assert_eq!(
        s.place_airplane(Coord::new(6, 2)),
        Err(PlacementError::Overlaps)
    );
    assert_eq!(s.own_grid(), &before);
    assert_eq!(s.planes_placed(), 1);
}

#[test]
fn off_grid_airplane_is_rejected() {
    let mut s = session();
    assert_eq!(
        s.place_airplane(Coord::new(0, 0)),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(s.own_grid().occupied(), 0);
}

#[test]
fn far_off_grid_anchor_is_rejected() {
    let mut s = session();
    let anchor = Coord::new((1 << 32) + 5, 5);
    assert_eq!(s.place_airplane(anchor), Err(PlacementError::OutOfBounds));
    assert_eq!(s.own_grid().occupied(), 0);
    assert!(s.heads().is_empty());
    assert!(s.outbound().head_positions.is_empty());

    let preview = s.preview(anchor).unwrap();
    assert!(!preview.valid);
    assert!(preview.cells.is_empty());
}

#[test]
fn preview_agrees_with_placement() {
    let mut s = session();
    let ok = s.preview(Coord::new(5, 5)).unwrap();
    assert!(ok.valid);
    assert_eq!(ok.cells.len(), AIRPLANE_CELLS);

    let edge = s.preview(Coord::new(9, 0)).unwrap();
    assert!(!edge.valid);
    assert!(edge.cells.len() < AIRPLANE_CELLS);
    assert_eq!(s.own_grid().occupied(), 0);

    s.place_airplane(Coord::new(5, 5)).unwrap();
    assert!(!s.preview(Coord::new(5, 5)).unwrap().valid);
}

#[test]
fn fourth_airplane_is_refused() {
    let mut s = session();
    for _ in 0..MAX_AIRPLANES {
        s.auto_place().unwrap();
    }
    assert_eq!(s.planes_placed(), MAX_AIRPLANES);
    assert_eq!(s.own_grid().occupied(), MAX_AIRPLANES * AIRPLANE_CELLS);
    assert_eq!(s.auto_place(), Err(PlacementError::AllPlaced));
    assert_eq!(
        s.place_airplane(Coord::new(0, 5)),
        Err(PlacementError::AllPlaced)
    );
    assert!(s.preview(Coord::new(0, 5)).is_none());
}

#[test]
fn outbound_state_lists_heads_in_order() {
    let mut s = session();
    s.place_airplane(Coord::new(0, 2)).unwrap();
    s.place_airplane(Coord::new(0, 7)).unwrap();
    let msg = s.outbound();
    assert_eq!(msg.head_positions, vec![Coord::new(0, 2), Coord::new(0, 7)]);
    let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(json["head_positions"], serde_json::json!([[0, 2], [0, 7]]));
    assert_ne!(json["grid"][0][2], serde_json::json!([255, 255, 255]));
    assert_eq!(json["grid"][9][9], serde_json::json!([255, 255, 255]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn footprint_has_ten_cells_and_one_head(
        row in 0..GRID_SIZE,
        col in 0..GRID_SIZE,
        o in orientation(),
    ) {
        let plane = Airplane::new(Coord::new(row, col), o);
        let cells: HashSet<_> = plane.cells().iter().copied().collect();
        prop_assert_eq!(cells.len(), AIRPLANE_CELLS);
        let heads = plane
            .cells()
            .iter()
            .filter(|&&(r, c)| (r, c) == (row as i32, col as i32))
            .count();
        prop_assert_eq!(heads, 1);
        prop_assert_eq!(plane.head(), Coord::new(row, col));
    }

    #[test]
    fn placement_is_all_or_nothing(
        seed in any::<u64>(),
        row in 0..GRID_SIZE,
        col in 0..GRID_SIZE,
        o in orientation(),
    ) {
        use rand::{rngs::SmallRng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = OwnGrid::new();
        let first = grid.random_placement(&mut rng, None).unwrap();
        grid.place(&first, PieceColor([10, 20, 30])).unwrap();
        let before = grid.clone();

        let plane = Airplane::new(Coord::new(row, col), o);
        let blocked = plane
            .cells()
            .iter()
            .any(|&(r, c)| match Coord::from_signed(r, c) {
                None => true,
                Some(at) => before.cell_state(at) == CellState::Occupied,
            });

        match grid.place(&plane, PieceColor([1, 2, 3])) {
            Ok(()) => {
                prop_assert!(!blocked);
                prop_assert_eq!(grid.occupied(), 2 * AIRPLANE_CELLS);
            }
            Err(_) => {
                prop_assert!(blocked);
                prop_assert_eq!(&grid, &before);
            }
        }
    }
}
