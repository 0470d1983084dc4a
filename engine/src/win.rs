use crate::board::{Board, Mark};

/// The 8 winning lines: 3 rows top-to-bottom, 3 columns left-to-right,
/// then the two diagonals. The scan order decides which line is reported
/// when more than one is complete.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    None,
    Win { mark: Mark, line: [usize; 3] },
    Tie,
}

pub fn evaluate(board: &Board) -> Outcome {
    for line in &WIN_LINES {
        if let Some(mark) = board.get(line[0])
            && board.get(line[1]) == Some(mark)
            && board.get(line[2]) == Some(mark)
        {
            return Outcome::Win { mark, line: *line };
        }
    }

    if board.is_full() {
        Outcome::Tie
    } else {
        Outcome::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_empty_board_is_no_outcome() {
        assert_eq!(evaluate(&Board::new()), Outcome::None);
    }

    #[test]
    fn test_partial_board_is_no_outcome() {
        let board = board_from("XO X O   ");
        assert_eq!(evaluate(&board), Outcome::None);
    }

    #[test]
    fn test_row_wins() {
        let cases = [
            ("XXX OO   ", [0, 1, 2]),
            ("OO XXX  O", [3, 4, 5]),
            ("OO  O XXX", [6, 7, 8]),
        ];
        for (layout, line) in cases {
            assert_eq!(
                evaluate(&board_from(layout)),
                Outcome::Win { mark: Mark::X, line },
                "layout: {layout}"
            );
        }
    }

    #[test]
    fn test_column_wins() {
        let cases = [
            ("OX O  OXX", [0, 3, 6]),
            ("XOXXO  O ", [1, 4, 7]),
            ("XXO  O XO", [2, 5, 8]),
        ];
        for (layout, line) in cases {
            assert_eq!(
                evaluate(&board_from(layout)),
                Outcome::Win { mark: Mark::O, line },
                "layout: {layout}"
            );
        }
    }

    #[test]
    fn test_diagonal_wins() {
        let board = board_from("XOO X   X");
        assert_eq!(
            evaluate(&board),
            Outcome::Win { mark: Mark::X, line: [0, 4, 8] }
        );

        let board = board_from("XXO O O X");
        assert_eq!(
            evaluate(&board),
            Outcome::Win { mark: Mark::O, line: [2, 4, 6] }
        );
    }

    #[test]
    fn test_full_board_with_no_line_is_tie() {
        let board = board_from("XOXXXOOXO");
        assert_eq!(evaluate(&board), Outcome::Tie);
    }

    #[test]
    fn test_first_line_in_scan_order_is_reported() {
        // Not reachable under alternating play, but the contract says the
        // first complete line in scan order wins.
        let board = board_from("XXXXXX OO");
        assert_eq!(
            evaluate(&board),
            Outcome::Win { mark: Mark::X, line: [0, 1, 2] }
        );
    }

    #[test]
    fn test_win_on_last_cell_is_a_win_not_a_tie() {
        let board = board_from("XOXXOOXXO");
        // Full board, but column [0, 3, 6] is complete for X.
        assert_eq!(
            evaluate(&board),
            Outcome::Win { mark: Mark::X, line: [0, 3, 6] }
        );
    }
}
