use crate::board::{Board, Mark};
use crate::session_rng::SessionRng;
use crate::win::{evaluate, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Relaxed,
    Balanced,
    Perfect,
}

impl Difficulty {
    /// Probability of skipping the search and playing a random empty cell.
    /// Never applies to forced wins or forced blocks.
    pub fn mistake_chance(&self) -> f64 {
        match self {
            Difficulty::Relaxed => 0.55,
            Difficulty::Balanced => 0.30,
            Difficulty::Perfect => 0.0,
        }
    }
}

/// Picks the cell the automated player should occupy next, or `None` when
/// the board is full. Checks, in order: an immediate win, an immediate
/// block, a difficulty-gated random mistake, then an exhaustive minimax
/// over the remaining moves. Transient placements on `board` are undone
/// before returning.
pub fn select_move(
    board: &mut Board,
    ai_mark: Mark,
    human_mark: Mark,
    difficulty: Difficulty,
    rng: &mut SessionRng,
) -> Result<Option<usize>, String> {
    if ai_mark == human_mark {
        return Err("AI and human marks must differ".to_string());
    }

    let available = board.empty_cells();
    if available.is_empty() {
        return Ok(None);
    }

    if let Some(index) = find_winning_cell(board, ai_mark, &available) {
        return Ok(Some(index));
    }

    if let Some(index) = find_winning_cell(board, human_mark, &available) {
        return Ok(Some(index));
    }

    let draw: f64 = rng.random();
    if draw < difficulty.mistake_chance() {
        let pick = rng.random_range(0..available.len());
        return Ok(Some(available[pick]));
    }

    let mut best_index = available[0];
    let mut best_score = i32::MIN;
    for &index in &available {
        board.set(index, ai_mark);
        let score = minimax(board, 0, false, ai_mark, human_mark);
        board.clear(index);

        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    Ok(Some(best_index))
}

/// First cell in ascending order that completes a line for `mark`, if any.
fn find_winning_cell(board: &mut Board, mark: Mark, available: &[usize]) -> Option<usize> {
    for &index in available {
        board.set(index, mark);
        let wins = matches!(evaluate(board), Outcome::Win { mark: winner, .. } if winner == mark);
        board.clear(index);

        if wins {
            return Some(index);
        }
    }
    None
}

/// Exhaustive game-tree search. Depth-weighted terminal scores make the
/// search prefer faster wins and slower losses. No pruning: the worst case
/// is 9! leaf evaluations, which is trivial on a 3x3 board.
fn minimax(board: &mut Board, depth: i32, maximizing: bool, ai_mark: Mark, human_mark: Mark) -> i32 {
    match evaluate(board) {
        Outcome::Win { mark, .. } => {
            return if mark == ai_mark { 10 - depth } else { depth - 10 };
        }
        Outcome::Tie => return 0,
        Outcome::None => {}
    }

    let mark = if maximizing { ai_mark } else { human_mark };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for index in board.empty_cells() {
        board.set(index, mark);
        let score = minimax(board, depth + 1, !maximizing, ai_mark, human_mark);
        board.clear(index);

        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DIFFICULTIES: [Difficulty; 3] =
        [Difficulty::Relaxed, Difficulty::Balanced, Difficulty::Perfect];

    fn board_from(layout: &str) -> Board {
        assert_eq!(layout.len(), 9);
        let mut board = Board::new();
        for (index, ch) in layout.chars().enumerate() {
            match ch {
                'X' => board.set(index, Mark::X),
                'O' => board.set(index, Mark::O),
                _ => {}
            }
        }
        board
    }

    fn select(board: &mut Board, ai: Mark, difficulty: Difficulty, seed: u64) -> Option<usize> {
        let mut rng = SessionRng::new(seed);
        select_move(board, ai, ai.opponent(), difficulty, &mut rng).unwrap()
    }

    #[test]
    fn test_full_board_returns_none() {
        let mut board = board_from("XOXXXOOXO");
        for difficulty in ALL_DIFFICULTIES {
            assert_eq!(select(&mut board, Mark::O, difficulty, 1), None);
        }
    }

    #[test]
    fn test_equal_marks_is_an_error() {
        let mut board = Board::new();
        let mut rng = SessionRng::new(1);
        let result = select_move(&mut board, Mark::X, Mark::X, Difficulty::Perfect, &mut rng);
        assert_eq!(result, Err("AI and human marks must differ".to_string()));
    }

    #[test]
    fn test_takes_immediate_win() {
        // O completes [3, 4, 5] at cell 5.
        let mut board = board_from("X  OO  X ");
        assert_eq!(select(&mut board, Mark::O, Difficulty::Perfect, 1), Some(5));
    }

    #[test]
    fn test_blocks_immediate_threat() {
        // X threatens [0, 1, 2]; O must take cell 2.
        let mut board = board_from("XX  O    ");
        assert_eq!(select(&mut board, Mark::O, Difficulty::Perfect, 1), Some(2));
    }

    #[test]
    fn test_win_takes_priority_over_block() {
        // X threatens at 2, but O can win at 5 right away.
        let mut board = board_from("XX OO    ");
        assert_eq!(select(&mut board, Mark::O, Difficulty::Perfect, 1), Some(5));
    }

    #[test]
    fn test_forced_moves_ignore_difficulty() {
        // The mistake draw never overrides a forced block.
        let mut board = board_from("XX  O    ");
        for difficulty in ALL_DIFFICULTIES {
            for seed in 0..20 {
                assert_eq!(select(&mut board, Mark::O, difficulty, seed), Some(2));
            }
        }
    }

    #[test]
    fn test_win_tie_break_is_lowest_index() {
        // O can complete [0, 4, 8] at 0 or [2, 5, 8] at 2; 0 comes first.
        let mut board = board_from(" X XOOXXO");
        assert_eq!(select(&mut board, Mark::O, Difficulty::Perfect, 1), Some(0));
    }

    #[test]
    fn test_single_empty_cell_returned_at_every_difficulty() {
        let mut board = board_from("XOXXOOOX ");
        for difficulty in ALL_DIFFICULTIES {
            for seed in 0..10 {
                assert_eq!(select(&mut board, Mark::X, difficulty, seed), Some(8));
            }
        }
    }

    #[test]
    fn test_minimax_tie_break_is_first_encountered() {
        // Every opening move ties under perfect play, so the strict
        // greater-than keeps the first candidate.
        let mut board = Board::new();
        assert_eq!(select(&mut board, Mark::X, Difficulty::Perfect, 1), Some(0));
    }

    #[test]
    fn test_transient_placements_are_undone() {
        let mut board = board_from("XX  O    ");
        let before = board.clone();
        let _ = select(&mut board, Mark::O, Difficulty::Perfect, 1);
        assert_eq!(board, before);

        let mut board = Board::new();
        let _ = select(&mut board, Mark::X, Difficulty::Perfect, 1);
        assert_eq!(board, Board::new());
    }

    /// Plays one full game. X opens on a random cell, then plays perfectly;
    /// O plays at `o_difficulty`. Any X opening still draws under perfect
    /// continuation, so a perfect O can never lose here.
    fn play_vs_perfect_x(o_difficulty: Difficulty, rng: &mut SessionRng) -> Outcome {
        let mut board = Board::new();
        let opening = rng.random_range(0..9);
        board.set(opening, Mark::X);

        let mut current = Mark::O;
        loop {
            match evaluate(&board) {
                Outcome::None => {}
                outcome => return outcome,
            }

            let difficulty = match current {
                Mark::X => Difficulty::Perfect,
                Mark::O => o_difficulty,
            };
            let index = select_move(&mut board, current, current.opponent(), difficulty, rng)
                .unwrap()
                .unwrap();
            board.set(index, current);
            current = current.opponent();
        }
    }

    fn count_x_wins(o_difficulty: Difficulty, games: u32, seed: u64) -> u32 {
        let mut rng = SessionRng::new(seed);
        let mut x_wins = 0;
        for _ in 0..games {
            if let Outcome::Win { mark: Mark::X, .. } = play_vs_perfect_x(o_difficulty, &mut rng) {
                x_wins += 1;
            }
        }
        x_wins
    }

    #[test]
    fn test_perfect_never_loses() {
        assert_eq!(count_x_wins(Difficulty::Perfect, 50, 99), 0);
    }

    #[test]
    fn test_relaxed_loses_more_than_perfect() {
        let relaxed_losses = count_x_wins(Difficulty::Relaxed, 50, 99);
        let perfect_losses = count_x_wins(Difficulty::Perfect, 50, 99);
        assert_eq!(perfect_losses, 0);
        assert!(
            relaxed_losses > perfect_losses,
            "relaxed lost {relaxed_losses} games, perfect lost {perfect_losses}"
        );
    }

    #[test]
    fn test_perfect_self_play_from_empty_board_is_a_tie() {
        let mut board = Board::new();
        let mut rng = SessionRng::new(1);
        let mut current = Mark::X;
        loop {
            match evaluate(&board) {
                Outcome::None => {}
                outcome => {
                    assert_eq!(outcome, Outcome::Tie);
                    return;
                }
            }
            let index =
                select_move(&mut board, current, current.opponent(), Difficulty::Perfect, &mut rng)
                    .unwrap()
                    .unwrap();
            board.set(index, current);
            current = current.opponent();
        }
    }

    #[test]
    fn test_mistake_chances() {
        assert_eq!(Difficulty::Relaxed.mistake_chance(), 0.55);
        assert_eq!(Difficulty::Balanced.mistake_chance(), 0.30);
        assert_eq!(Difficulty::Perfect.mistake_chance(), 0.0);
    }
}
