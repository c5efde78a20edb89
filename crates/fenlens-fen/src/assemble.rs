//! FEN board-field assembly and expansion.

use crate::label::PieceLabel;

/// The non-visual FEN fields cannot be derived from a photograph: side to
/// move, castling rights, en passant square and the move counters are fixed
/// placeholders. A documented limitation, not a defect.
const FEN_PLACEHOLDER_TAIL: &str = "w - - 0 1";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FenParseError {
    #[error("expected 8 ranks, got {0}")]
    BadRankCount(usize),
    #[error("rank {rank} describes {files} files")]
    BadFileCount { rank: usize, files: usize },
    #[error("unexpected character {0:?} in board field")]
    BadChar(char),
}

/// Encode 64 labels (row-major, row 0 = rank 8, col 0 = file a) as the FEN
/// board field.
///
/// Each rank accumulates runs of consecutive empty squares; a piece flushes
/// the pending run digit before its letter, and a trailing run is flushed at
/// rank end. Ranks are joined with `/`.
pub fn board_field_from_labels(labels: &[PieceLabel; 64]) -> String {
    let mut ranks = Vec::with_capacity(8);

    for row in 0..8 {
        let mut rank = String::new();
        let mut empty_run = 0u8;

        for col in 0..8 {
            match labels[row * 8 + col].fen_char() {
                None => empty_run += 1,
                Some(c) => {
                    if empty_run > 0 {
                        rank.push((b'0' + empty_run) as char);
                        empty_run = 0;
                    }
                    rank.push(c);
                }
            }
        }
        if empty_run > 0 {
            rank.push((b'0' + empty_run) as char);
        }
        ranks.push(rank);
    }

    ranks.join("/")
}

/// Expand a FEN board field back into 64 labels (inverse of
/// [`board_field_from_labels`]).
pub fn expand_board_field(field: &str) -> Result<[PieceLabel; 64], FenParseError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenParseError::BadRankCount(ranks.len()));
    }

    let mut labels = [PieceLabel::Empty; 64];
    for (row, rank) in ranks.iter().enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(run) = c.to_digit(10) {
                if run == 0 || run > 8 {
                    return Err(FenParseError::BadChar(c));
                }
                col += run as usize;
            } else {
                let label = PieceLabel::from_fen_char(c).ok_or(FenParseError::BadChar(c))?;
                if col < 8 {
                    labels[row * 8 + col] = label;
                }
                col += 1;
            }
        }
        if col != 8 {
            return Err(FenParseError::BadFileCount { rank: row, files: col });
        }
    }

    Ok(labels)
}

/// Full FEN string with the placeholder non-visual fields appended.
pub fn full_fen(board_field: &str) -> String {
    format!("{board_field} {FEN_PLACEHOLDER_TAIL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FIELD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    fn starting_labels() -> [PieceLabel; 64] {
        expand_board_field(START_FIELD).expect("valid start position")
    }

    #[test]
    fn starting_position_round_trips() {
        let labels = starting_labels();
        assert_eq!(board_field_from_labels(&labels), START_FIELD);
    }

    #[test]
    fn arbitrary_grid_round_trips() {
        let mut labels = [PieceLabel::Empty; 64];
        labels[0] = PieceLabel::BlackRook;
        labels[12] = PieceLabel::WhiteQueen;
        labels[35] = PieceLabel::BlackKing;
        labels[36] = PieceLabel::WhiteKing;
        labels[63] = PieceLabel::WhitePawn;

        let field = board_field_from_labels(&labels);
        assert_eq!(expand_board_field(&field).expect("round trip"), labels);
    }

    #[test]
    fn empty_board_is_eight_eights() {
        let labels = [PieceLabel::Empty; 64];
        assert_eq!(board_field_from_labels(&labels), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn runs_flush_before_pieces_and_at_rank_end() {
        let mut labels = [PieceLabel::Empty; 64];
        labels[2] = PieceLabel::WhiteKnight; // rank 8: 2N5
        let field = board_field_from_labels(&labels);
        assert!(field.starts_with("2N5/"));
    }

    #[test]
    fn expansion_rejects_malformed_fields() {
        assert_eq!(
            expand_board_field("8/8/8"),
            Err(FenParseError::BadRankCount(3))
        );
        assert_eq!(
            expand_board_field("9/8/8/8/8/8/8/8"),
            Err(FenParseError::BadChar('9'))
        );
        assert!(matches!(
            expand_board_field("7/8/8/8/8/8/8/8"),
            Err(FenParseError::BadFileCount { rank: 0, files: 7 })
        ));
        assert_eq!(
            expand_board_field("8/8/8/8/8/8/8/7x"),
            Err(FenParseError::BadChar('x'))
        );
    }

    #[test]
    fn full_fen_appends_placeholder_tail() {
        assert_eq!(
            full_fen(START_FIELD),
            format!("{START_FIELD} w - - 0 1")
        );
    }
}
