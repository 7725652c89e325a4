//! Property tests for the move and match resolvers over generated boards.
use std::collections::BTreeSet;

use proptest::prelude::*;
use slide_match::board::{Board, Pos, Slot, TileHandle, TileType};
use slide_match::matching::{apply_matches, compute_matches, MatchPolicy};
use slide_match::movement::{compute_move, resolve_move, Direction, MovePolicy};

fn build_board(width: usize, height: usize, cells: &[Option<u8>]) -> Board {
    let mut board = Board::new(width, height).unwrap();
    for (idx, cell) in cells.iter().enumerate() {
        if let Some(t) = cell {
            let slot = Slot::occupied(TileType(*t), TileHandle(idx as u64));
            board.set(idx % width, idx / width, slot).unwrap();
        }
    }
    board
}

fn board_strategy() -> impl Strategy<Value = Board> {
    (1usize..8, 1usize..8).prop_flat_map(|(w, h)| {
        prop::collection::vec(prop::option::of(0u8..4), w * h)
            .prop_map(move |cells| build_board(w, h, &cells))
    })
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn move_policy_strategy() -> impl Strategy<Value = MovePolicy> {
    prop_oneof![
        Just(MovePolicy::RowOneStep),
        Just(MovePolicy::RowToEnd),
        Just(MovePolicy::AllOneStep),
        Just(MovePolicy::AllToEnd),
    ]
}

fn match_policy_strategy() -> impl Strategy<Value = MatchPolicy> {
    prop_oneof![
        Just(MatchPolicy::Connected2),
        Just(MatchPolicy::Connected3),
        Just(MatchPolicy::Straight3),
    ]
}

fn handles(board: &Board) -> BTreeSet<TileHandle> {
    board.occupied().map(|(_, _, h)| h).collect()
}

proptest! {
    #[test]
    fn all_to_end_fully_compacts(board in board_strategy(), direction in direction_strategy()) {
        let outcome = resolve_move(&board, direction, MovePolicy::AllToEnd);
        let (dx, dy) = direction.delta();
        let result = &outcome.board;

        for (pos, _, _) in result.occupied() {
            let mut x = pos.x as isize + dx as isize;
            let mut y = pos.y as isize + dy as isize;
            while result.in_bounds(x, y) {
                prop_assert!(
                    !result.is_empty(x as usize, y as usize).unwrap(),
                    "gap at ({}, {}) ahead of tile at {}", x, y, pos
                );
                x += dx as isize;
                y += dy as isize;
            }
        }
    }

    #[test]
    fn zero_vector_is_a_noop(board in board_strategy(), policy in move_policy_strategy()) {
        let outcome = compute_move(&board, 0, 0, policy);
        prop_assert_eq!(&outcome.board, &board);
        prop_assert!(outcome.displacements.is_empty());
        prop_assert!(outcome.moves.is_empty());
    }

    #[test]
    fn moves_conserve_tiles(
        board in board_strategy(),
        direction in direction_strategy(),
        policy in move_policy_strategy(),
    ) {
        let outcome = resolve_move(&board, direction, policy);
        prop_assert_eq!(outcome.board.tile_counts(), board.tile_counts());
        prop_assert_eq!(handles(&outcome.board), handles(&board));
    }

    #[test]
    fn moves_never_collide(
        board in board_strategy(),
        direction in direction_strategy(),
        policy in move_policy_strategy(),
    ) {
        let outcome = resolve_move(&board, direction, policy);
        let (dx, dy) = direction.delta();

        let mut destinations = BTreeSet::new();
        for (from, _, _) in board.occupied() {
            let distance = outcome.displacements.get(from);
            let to = from.offset(dx, dy, distance).unwrap();
            prop_assert!(destinations.insert(to), "two tiles resolved to {}", to);
        }
        prop_assert_eq!(destinations.len(), outcome.board.occupied_count());
    }

    #[test]
    fn relocations_match_displacements(
        board in board_strategy(),
        direction in direction_strategy(),
        policy in move_policy_strategy(),
    ) {
        let outcome = resolve_move(&board, direction, policy);
        let (dx, dy) = direction.delta();

        for tile_move in &outcome.moves {
            prop_assert!(tile_move.distance > 0);
            prop_assert_eq!(outcome.displacements.get(tile_move.from), tile_move.distance);
            prop_assert_eq!(tile_move.from.offset(dx, dy, tile_move.distance), Some(tile_move.to));
            prop_assert_eq!(outcome.board.at(tile_move.to).unwrap().handle(), Some(tile_move.handle));
        }
        for y in 0..board.height() {
            for x in 0..board.width() {
                if board.is_empty(x, y).unwrap() {
                    prop_assert_eq!(outcome.displacements.get(Pos::new(x, y)), 0);
                }
            }
        }
    }

    #[test]
    fn one_step_policies_move_at_most_one(
        board in board_strategy(),
        direction in direction_strategy(),
        one_step_all in any::<bool>(),
    ) {
        let policy = if one_step_all { MovePolicy::AllOneStep } else { MovePolicy::RowOneStep };
        let outcome = resolve_move(&board, direction, policy);
        prop_assert!(outcome.displacements.max() <= 1);
    }

    #[test]
    fn matches_are_occupied_same_type_neighbors(
        board in board_strategy(),
        policy in match_policy_strategy(),
    ) {
        let matches = compute_matches(&board, policy);
        for pos in &matches {
            let tile = board.at(*pos).unwrap().tile();
            prop_assert!(tile.is_some(), "empty slot {} matched", pos);

            // Every matched tile touches another matched tile of its type.
            let partner = [(1isize, 0isize), (0, 1), (-1, 0), (0, -1)].iter().any(|&(dx, dy)| {
                let nx = pos.x as isize + dx;
                let ny = pos.y as isize + dy;
                board.in_bounds(nx, ny)
                    && matches.contains(&Pos::new(nx as usize, ny as usize))
                    && board.tile(nx as usize, ny as usize).unwrap() == tile
            });
            prop_assert!(partner, "matched tile {} has no matched partner", pos);
        }
    }

    #[test]
    fn applying_matches_removes_exactly_the_set(
        board in board_strategy(),
        policy in match_policy_strategy(),
    ) {
        let matches = compute_matches(&board, policy);
        let mut cleared = board.clone();
        let released = apply_matches(&mut cleared, &matches).unwrap();

        prop_assert_eq!(released.len(), matches.len());
        prop_assert_eq!(cleared.occupied_count() + matches.len(), board.occupied_count());
        for pos in &matches {
            prop_assert!(cleared.at(*pos).unwrap().is_empty());
        }
    }
}
