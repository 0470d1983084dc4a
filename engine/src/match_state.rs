use crate::board::{Board, Mark};
use crate::bot::Difficulty;
use crate::win::{evaluate, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opponent {
    /// Two humans alternating on a shared device.
    Human,
    /// One human; the other mark is driven by the move selector.
    Bot { mark: Mark, difficulty: Difficulty },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirstMoveRule {
    /// X opens every round.
    XAlways,
    /// The opening mark alternates between rounds, X first.
    Alternate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    XWon,
    OWon,
    Tie,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub ties: u32,
}

/// Authoritative board, turn, round, and tally state for one match.
/// Synchronous and protocol-free; the server wraps it in a session.
#[derive(Debug)]
pub struct MatchState {
    pub board: Board,
    pub current_mark: Mark,
    pub status: RoundStatus,
    pub winning_line: Option<[usize; 3]>,
    pub tally: ScoreTally,
    pub round: u32,
    pub opponent: Opponent,
    pub first_move: FirstMoveRule,
    pub last_move: Option<usize>,
}

impl MatchState {
    pub fn new(opponent: Opponent, first_move: FirstMoveRule) -> Self {
        Self {
            board: Board::new(),
            current_mark: Mark::X,
            status: RoundStatus::InProgress,
            winning_line: None,
            tally: ScoreTally::default(),
            round: 1,
            opponent,
            first_move,
            last_move: None,
        }
    }

    /// Applies the current mark at `index`. On round end the tally is
    /// updated; otherwise the turn switches. State is unchanged on error.
    pub fn place_mark(&mut self, index: usize) -> Result<(), String> {
        if self.status != RoundStatus::InProgress {
            return Err("Game is already over".to_string());
        }

        if index >= Board::CELL_COUNT {
            return Err("Position out of bounds".to_string());
        }

        if self.board.get(index).is_some() {
            return Err("Cell is already marked".to_string());
        }

        self.board.set(index, self.current_mark);
        self.last_move = Some(index);

        self.check_round_over();

        if self.status == RoundStatus::InProgress {
            self.current_mark = self.current_mark.opponent();
        }

        Ok(())
    }

    /// Applies a client-issued move. While the bot's mark is to move the
    /// command is rejected; only the session loop places the bot's marks.
    pub fn place_client_mark(&mut self, index: usize) -> Result<(), String> {
        if self.bot_turn().is_some() {
            return Err("Not your turn".to_string());
        }
        self.place_mark(index)
    }

    fn check_round_over(&mut self) {
        match evaluate(&self.board) {
            Outcome::Win { mark, line } => {
                self.winning_line = Some(line);
                match mark {
                    Mark::X => {
                        self.status = RoundStatus::XWon;
                        self.tally.x_wins += 1;
                    }
                    Mark::O => {
                        self.status = RoundStatus::OWon;
                        self.tally.o_wins += 1;
                    }
                }
            }
            Outcome::Tie => {
                self.status = RoundStatus::Tie;
                self.tally.ties += 1;
            }
            Outcome::None => {}
        }
    }

    /// Clears the board for the next round. The tally survives.
    pub fn start_next_round(&mut self) -> Result<(), String> {
        if self.status == RoundStatus::InProgress {
            return Err("Round is still in progress".to_string());
        }

        self.board = Board::new();
        self.winning_line = None;
        self.last_move = None;
        self.round += 1;
        self.status = RoundStatus::InProgress;
        self.current_mark = self.opening_mark();

        Ok(())
    }

    fn opening_mark(&self) -> Mark {
        match self.first_move {
            FirstMoveRule::XAlways => Mark::X,
            FirstMoveRule::Alternate => {
                if self.round % 2 == 1 {
                    Mark::X
                } else {
                    Mark::O
                }
            }
        }
    }

    pub fn reset_tally(&mut self) {
        self.tally = ScoreTally::default();
    }

    /// Takes effect from the bot's next move.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), String> {
        match &mut self.opponent {
            Opponent::Bot { difficulty: current, .. } => {
                *current = difficulty;
                Ok(())
            }
            Opponent::Human => Err("Match has no bot opponent".to_string()),
        }
    }

    /// `Some((ai, human, difficulty))` when the round is in progress, the
    /// opponent is a bot, and the bot's mark is to move.
    pub fn bot_turn(&self) -> Option<(Mark, Mark, Difficulty)> {
        if self.status != RoundStatus::InProgress {
            return None;
        }

        match self.opponent {
            Opponent::Bot { mark, difficulty } if mark == self.current_mark => {
                Some((mark, mark.opponent(), difficulty))
            }
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<Mark> {
        match self.status {
            RoundStatus::XWon => Some(Mark::X),
            RoundStatus::OWon => Some(Mark::O),
            _ => None,
        }
    }
}
