//! Property tests for the engine state machine.
//!
//! Random boards, seeds and action streams are fed through [`GameEngine`],
//! checking after every step that:
//!
//! - the falling piece stays inside the board and never overlaps a locked cell;
//! - no filled row survives a lock;
//! - a lock adds the piece's cells and removes whole rows only;
//! - a hard drop locks the piece where the landing preview showed it;
//! - score and piece count never decrease;
//! - rejected commands change nothing;
//! - game over is terminal.
//!
//! Sessions start either from an empty board or from one seeded with locked
//! cells in its lower half.

use blockfall_engine::{
    Board, ColorTag, Command, CommandOutcome, GameEngine, Phase, PieceSeed, Position,
    SpawnOutcome,
};
use proptest::{prelude::*, test_runner::TestCaseError};

#[derive(Debug, Clone, Copy)]
enum Action {
    Command(Command),
    HardDrop,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Left),
        Just(Command::Right),
        Just(Command::Down),
        Just(Command::RotateCw),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => command().prop_map(Action::Command),
        1 => Just(Action::HardDrop),
    ]
}

fn spawn_point(width: usize) -> Position {
    Position::new(i32::try_from(width / 2 - 2).unwrap(), 0)
}

/// Board with `cells` locked, folded into the rows below the top half.
fn seeded_board(width: usize, height: usize, cells: &[(usize, usize)]) -> Board {
    let mut board = Board::new(width, height).unwrap();
    let top = height / 2;
    for &(x, y) in cells {
        let pos = Position::new(
            i32::try_from(x % width).unwrap(),
            i32::try_from(top + y % (height - top)).unwrap(),
        );
        board.fill_cell(pos, ColorTag::new(8));
    }
    board
}

fn assert_active_piece_fits(engine: &GameEngine) -> Result<(), TestCaseError> {
    let Some(piece) = engine.active_piece() else {
        return Ok(());
    };
    for pos in piece.cells() {
        let cell = engine.board().cell(pos);
        prop_assert!(cell.is_some(), "{pos:?} outside the board");
        prop_assert!(cell.is_some_and(|c| c.is_empty()), "{pos:?} overlaps");
    }
    Ok(())
}

fn check_session(mut engine: GameEngine, actions: &[Action]) -> Result<(), TestCaseError> {
    let width = engine.board().width();
    let height = engine.board().height();

    for action in actions {
        let before = engine.snapshot();
        let occupied = engine.board().occupied_count();

        if engine.phase() == Phase::Spawning {
            let outcome = engine.spawn(None);
            if outcome == SpawnOutcome::GameOver {
                prop_assert_eq!(engine.stats().piece_count(), before.piece_count);
                prop_assert_eq!(&engine.snapshot().cells, &before.cells);
                break;
            }
            prop_assert!(outcome.is_spawned());
            prop_assert_eq!(engine.stats().piece_count(), before.piece_count + 1);
            assert_active_piece_fits(&engine)?;
            continue;
        }

        let piece_cells = engine.active_piece().map(|p| p.template().cell_count());
        let outcome = match *action {
            Action::Command(command) => engine.apply_command(command),
            Action::HardDrop => {
                let outcome = engine.hard_drop();
                prop_assert!(outcome.is_locked(), "hard drop gave {outcome:?}");
                if outcome == (CommandOutcome::Locked { cleared_rows: 0 }) {
                    for pos in &before.landing {
                        prop_assert!(engine.board().is_occupied(*pos), "{pos:?} not locked");
                    }
                }
                outcome
            }
        };
        let after = engine.snapshot();

        match outcome {
            CommandOutcome::Rejected => prop_assert_eq!(&after, &before),
            CommandOutcome::Locked { cleared_rows } => {
                prop_assert_eq!(after.phase, Phase::Spawning);
                for y in 0..height {
                    prop_assert!(!engine.board().is_row_filled(y));
                }
                let added = piece_cells.unwrap_or(0);
                prop_assert_eq!(
                    engine.board().occupied_count() + cleared_rows * width,
                    occupied + added
                );
                prop_assert_eq!(after.cleared_rows, before.cleared_rows + cleared_rows);
            }
            CommandOutcome::Moved | CommandOutcome::Rotated => {
                prop_assert_eq!(&after.cells, &before.cells);
                prop_assert_eq!(after.phase, Phase::Falling);
            }
            CommandOutcome::NotFalling | CommandOutcome::GameOver => {
                prop_assert!(false, "unexpected outcome {outcome:?}");
            }
        }

        prop_assert!(after.score >= before.score);
        prop_assert!(after.piece_count >= before.piece_count);
        assert_active_piece_fits(&engine)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_session_keeps_invariants(
        seed in any::<u64>(),
        width in 4usize..12,
        height in 4usize..16,
        actions in prop::collection::vec(action(), 1..400),
    ) {
        let engine =
            GameEngine::new(width, height, spawn_point(width), PieceSeed::new(seed)).unwrap();
        check_session(engine, &actions)?;
    }

    #[test]
    fn seeded_board_session_keeps_invariants(
        seed in any::<u64>(),
        width in 4usize..12,
        height in 4usize..16,
        cells in prop::collection::vec((0usize..12, 0usize..16), 0..60),
        actions in prop::collection::vec(action(), 1..400),
    ) {
        let board = seeded_board(width, height, &cells);
        let engine =
            GameEngine::with_board(board, spawn_point(width), PieceSeed::new(seed)).unwrap();
        check_session(engine, &actions)?;
    }

    #[test]
    fn game_over_is_terminal(
        seed in any::<u64>(),
        commands in prop::collection::vec(command(), 1..20),
    ) {
        let mut engine =
            GameEngine::new(6, 6, Position::new(1, 0), PieceSeed::new(seed)).unwrap();
        while engine.spawn(None).is_spawned() {
            engine.hard_drop();
        }
        prop_assert_eq!(engine.phase(), Phase::GameOver);

        let frozen = engine.snapshot();
        for command in commands {
            prop_assert_eq!(engine.apply_command(command), CommandOutcome::GameOver);
            prop_assert_eq!(engine.tick(), CommandOutcome::GameOver);
            prop_assert_eq!(engine.hard_drop(), CommandOutcome::GameOver);
            prop_assert_eq!(engine.spawn(None), SpawnOutcome::GameOver);
        }
        prop_assert_eq!(engine.snapshot(), frozen);
    }

    #[test]
    fn same_seed_same_session(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..200),
    ) {
        let spawn = Position::new(3, 0);
        let mut a = GameEngine::new(10, 12, spawn, PieceSeed::new(seed)).unwrap();
        let mut b = GameEngine::new(10, 12, spawn, PieceSeed::new(seed)).unwrap();
        for action in actions {
            if a.phase().is_spawning() {
                prop_assert_eq!(a.spawn(None), b.spawn(None));
            }
            let (outcome_a, outcome_b) = match action {
                Action::Command(command) => (a.apply_command(command), b.apply_command(command)),
                Action::HardDrop => (a.hard_drop(), b.hard_drop()),
            };
            prop_assert_eq!(outcome_a, outcome_b);
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
