//! Conversions between engine types and the `xo` wire protocol. Unknown or
//! unspecified enum values coming off the wire are validation errors.

use common::proto;
use engine::{Difficulty, FirstMoveRule, Mark, MatchState, Opponent, RoundStatus};

pub fn mark_to_proto(mark: Mark) -> proto::Mark {
    match mark {
        Mark::X => proto::Mark::X,
        Mark::O => proto::Mark::O,
    }
}

pub fn mark_from_proto(value: i32) -> Result<Mark, String> {
    match proto::Mark::try_from(value) {
        Ok(proto::Mark::X) => Ok(Mark::X),
        Ok(proto::Mark::O) => Ok(Mark::O),
        Ok(proto::Mark::Unspecified) | Err(_) => Err("Mark is not specified".to_string()),
    }
}

pub fn difficulty_to_proto(difficulty: Difficulty) -> proto::Difficulty {
    match difficulty {
        Difficulty::Relaxed => proto::Difficulty::Relaxed,
        Difficulty::Balanced => proto::Difficulty::Balanced,
        Difficulty::Perfect => proto::Difficulty::Perfect,
    }
}

pub fn difficulty_from_proto(value: i32) -> Result<Difficulty, String> {
    match proto::Difficulty::try_from(value) {
        Ok(proto::Difficulty::Relaxed) => Ok(Difficulty::Relaxed),
        Ok(proto::Difficulty::Balanced) => Ok(Difficulty::Balanced),
        Ok(proto::Difficulty::Perfect) => Ok(Difficulty::Perfect),
        Ok(proto::Difficulty::Unspecified) | Err(_) => {
            Err("Difficulty is not specified".to_string())
        }
    }
}

pub fn first_move_to_proto(rule: FirstMoveRule) -> proto::FirstMoveRule {
    match rule {
        FirstMoveRule::XAlways => proto::FirstMoveRule::XAlways,
        FirstMoveRule::Alternate => proto::FirstMoveRule::Alternate,
    }
}

pub fn first_move_from_proto(value: i32) -> Result<FirstMoveRule, String> {
    match proto::FirstMoveRule::try_from(value) {
        Ok(proto::FirstMoveRule::XAlways) => Ok(FirstMoveRule::XAlways),
        Ok(proto::FirstMoveRule::Alternate) => Ok(FirstMoveRule::Alternate),
        Ok(proto::FirstMoveRule::Unspecified) | Err(_) => {
            Err("First move rule is not specified".to_string())
        }
    }
}

pub fn status_to_proto(status: RoundStatus) -> proto::RoundStatus {
    match status {
        RoundStatus::InProgress => proto::RoundStatus::InProgress,
        RoundStatus::XWon => proto::RoundStatus::XWon,
        RoundStatus::OWon => proto::RoundStatus::OWon,
        RoundStatus::Tie => proto::RoundStatus::Tie,
    }
}

pub fn opponent_from_proto(request: &proto::StartMatchRequest) -> Result<Opponent, String> {
    match proto::MatchMode::try_from(request.mode) {
        Ok(proto::MatchMode::HumanVsHuman) => Ok(Opponent::Human),
        Ok(proto::MatchMode::HumanVsBot) => {
            let mark = mark_from_proto(request.bot_mark)?;
            let difficulty = difficulty_from_proto(request.difficulty)?;
            Ok(Opponent::Bot { mark, difficulty })
        }
        Ok(proto::MatchMode::Unspecified) | Err(_) => {
            Err("Match mode is not specified".to_string())
        }
    }
}

fn tally_to_proto(tally: &engine::ScoreTally) -> proto::ScoreTally {
    proto::ScoreTally {
        x_wins: tally.x_wins,
        o_wins: tally.o_wins,
        ties: tally.ties,
    }
}

fn line_to_proto(line: [usize; 3]) -> proto::WinningLine {
    proto::WinningLine {
        cells: line.iter().map(|&index| index as u32).collect(),
    }
}

pub fn build_snapshot(state: &MatchState) -> proto::MatchSnapshot {
    let board = state
        .board
        .cells()
        .iter()
        .map(|cell| match cell {
            Some(mark) => mark_to_proto(*mark).into(),
            None => proto::Mark::Unspecified.into(),
        })
        .collect();

    let (mode, difficulty, bot_mark) = match state.opponent {
        Opponent::Human => (
            proto::MatchMode::HumanVsHuman,
            proto::Difficulty::Unspecified,
            proto::Mark::Unspecified,
        ),
        Opponent::Bot { mark, difficulty } => (
            proto::MatchMode::HumanVsBot,
            difficulty_to_proto(difficulty),
            mark_to_proto(mark),
        ),
    };

    proto::MatchSnapshot {
        board,
        current_mark: mark_to_proto(state.current_mark).into(),
        status: status_to_proto(state.status).into(),
        mode: mode.into(),
        difficulty: difficulty.into(),
        bot_mark: bot_mark.into(),
        first_move: first_move_to_proto(state.first_move).into(),
        round: state.round,
        tally: Some(tally_to_proto(&state.tally)),
        last_move: state.last_move.map(|index| index as u32),
        winning_line: state.winning_line.map(line_to_proto),
    }
}

pub fn build_round_over(state: &MatchState) -> proto::RoundOverNotification {
    proto::RoundOverNotification {
        status: status_to_proto(state.status).into(),
        winner: state
            .winner()
            .map(mark_to_proto)
            .unwrap_or(proto::Mark::Unspecified)
            .into(),
        line: state.winning_line.map(line_to_proto),
        tally: Some(tally_to_proto(&state.tally)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_conversions() {
        assert_eq!(mark_from_proto(proto::Mark::X.into()), Ok(Mark::X));
        assert_eq!(mark_from_proto(proto::Mark::O.into()), Ok(Mark::O));
        assert!(mark_from_proto(proto::Mark::Unspecified.into()).is_err());
        assert!(mark_from_proto(99).is_err());
    }

    #[test]
    fn test_difficulty_conversions() {
        for difficulty in [Difficulty::Relaxed, Difficulty::Balanced, Difficulty::Perfect] {
            let wire = difficulty_to_proto(difficulty).into();
            assert_eq!(difficulty_from_proto(wire), Ok(difficulty));
        }
        assert!(difficulty_from_proto(0).is_err());
        assert!(difficulty_from_proto(99).is_err());
    }

    #[test]
    fn test_first_move_conversions() {
        for rule in [FirstMoveRule::XAlways, FirstMoveRule::Alternate] {
            let wire = first_move_to_proto(rule).into();
            assert_eq!(first_move_from_proto(wire), Ok(rule));
        }
        assert!(first_move_from_proto(0).is_err());
    }

    #[test]
    fn test_opponent_from_proto() {
        let request = proto::StartMatchRequest {
            mode: proto::MatchMode::HumanVsBot.into(),
            difficulty: proto::Difficulty::Perfect.into(),
            bot_mark: proto::Mark::O.into(),
            first_move: proto::FirstMoveRule::XAlways.into(),
        };
        assert_eq!(
            opponent_from_proto(&request),
            Ok(Opponent::Bot { mark: Mark::O, difficulty: Difficulty::Perfect })
        );

        let human = proto::StartMatchRequest {
            mode: proto::MatchMode::HumanVsHuman.into(),
            ..request.clone()
        };
        assert_eq!(opponent_from_proto(&human), Ok(Opponent::Human));

        // Bot matches require a bot mark.
        let missing_mark = proto::StartMatchRequest {
            bot_mark: proto::Mark::Unspecified.into(),
            ..request.clone()
        };
        assert!(opponent_from_proto(&missing_mark).is_err());

        let missing_mode = proto::StartMatchRequest { mode: 0, ..request };
        assert!(opponent_from_proto(&missing_mode).is_err());
    }

    #[test]
    fn test_snapshot_shape() {
        let mut state = MatchState::new(
            Opponent::Bot { mark: Mark::O, difficulty: Difficulty::Balanced },
            FirstMoveRule::Alternate,
        );
        state.place_mark(4).unwrap();

        let snapshot = build_snapshot(&state);
        assert_eq!(snapshot.board.len(), 9);
        assert_eq!(snapshot.board[4], i32::from(proto::Mark::X));
        assert_eq!(snapshot.board[0], i32::from(proto::Mark::Unspecified));
        assert_eq!(snapshot.current_mark, i32::from(proto::Mark::O));
        assert_eq!(snapshot.status, i32::from(proto::RoundStatus::InProgress));
        assert_eq!(snapshot.mode, i32::from(proto::MatchMode::HumanVsBot));
        assert_eq!(snapshot.difficulty, i32::from(proto::Difficulty::Balanced));
        assert_eq!(snapshot.bot_mark, i32::from(proto::Mark::O));
        assert_eq!(snapshot.first_move, i32::from(proto::FirstMoveRule::Alternate));
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.tally, Some(proto::ScoreTally::default()));
        assert_eq!(snapshot.last_move, Some(4));
        assert_eq!(snapshot.winning_line, None);
    }

    #[test]
    fn test_round_over_notification() {
        let mut state = MatchState::new(Opponent::Human, FirstMoveRule::XAlways);
        for index in [0, 3, 1, 4, 2] {
            state.place_mark(index).unwrap();
        }

        let notification = build_round_over(&state);
        assert_eq!(notification.status, i32::from(proto::RoundStatus::XWon));
        assert_eq!(notification.winner, i32::from(proto::Mark::X));
        assert_eq!(
            notification.line,
            Some(proto::WinningLine { cells: vec![0, 1, 2] })
        );
        assert_eq!(
            notification.tally,
            Some(proto::ScoreTally { x_wins: 1, o_wins: 0, ties: 0 })
        );
    }
}
