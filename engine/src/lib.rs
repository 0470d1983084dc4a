pub mod board;
pub mod bot;
pub mod match_state;
pub mod session_rng;
pub mod win;

pub use board::{Board, Mark};
pub use bot::{select_move, Difficulty};
pub use match_state::{FirstMoveRule, MatchState, Opponent, RoundStatus, ScoreTally};
pub use session_rng::SessionRng;
pub use win::{evaluate, Outcome, WIN_LINES};
