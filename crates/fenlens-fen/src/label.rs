use serde::{Deserialize, Serialize};

/// Number of classes the tile classifier distinguishes.
pub const LABEL_COUNT: usize = 13;

/// What occupies one board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceLabel {
    Empty,
    WhitePawn,
    WhiteKnight,
    WhiteBishop,
    WhiteRook,
    WhiteQueen,
    WhiteKing,
    BlackPawn,
    BlackKnight,
    BlackBishop,
    BlackRook,
    BlackQueen,
    BlackKing,
}

/// The pinned classifier output ordering.
///
/// A probability vector returned by a [`crate::PieceClassifier`] follows this
/// order exactly. The ordering is part of the trained artifact's contract; an
/// implementation wrapping a model with a different class layout must reorder
/// inside its own `classify`, never here.
pub const CLASSIFIER_LABELS: [PieceLabel; LABEL_COUNT] = [
    PieceLabel::Empty,
    PieceLabel::WhitePawn,
    PieceLabel::WhiteKnight,
    PieceLabel::WhiteBishop,
    PieceLabel::WhiteRook,
    PieceLabel::WhiteQueen,
    PieceLabel::WhiteKing,
    PieceLabel::BlackPawn,
    PieceLabel::BlackKnight,
    PieceLabel::BlackBishop,
    PieceLabel::BlackRook,
    PieceLabel::BlackQueen,
    PieceLabel::BlackKing,
];

impl PieceLabel {
    /// FEN piece letter; `None` for an empty square (FEN encodes empties as
    /// run-length digits, not characters).
    pub fn fen_char(self) -> Option<char> {
        match self {
            PieceLabel::Empty => None,
            PieceLabel::WhitePawn => Some('P'),
            PieceLabel::WhiteKnight => Some('N'),
            PieceLabel::WhiteBishop => Some('B'),
            PieceLabel::WhiteRook => Some('R'),
            PieceLabel::WhiteQueen => Some('Q'),
            PieceLabel::WhiteKing => Some('K'),
            PieceLabel::BlackPawn => Some('p'),
            PieceLabel::BlackKnight => Some('n'),
            PieceLabel::BlackBishop => Some('b'),
            PieceLabel::BlackRook => Some('r'),
            PieceLabel::BlackQueen => Some('q'),
            PieceLabel::BlackKing => Some('k'),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceLabel::WhitePawn),
            'N' => Some(PieceLabel::WhiteKnight),
            'B' => Some(PieceLabel::WhiteBishop),
            'R' => Some(PieceLabel::WhiteRook),
            'Q' => Some(PieceLabel::WhiteQueen),
            'K' => Some(PieceLabel::WhiteKing),
            'p' => Some(PieceLabel::BlackPawn),
            'n' => Some(PieceLabel::BlackKnight),
            'b' => Some(PieceLabel::BlackBishop),
            'r' => Some(PieceLabel::BlackRook),
            'q' => Some(PieceLabel::BlackQueen),
            'k' => Some(PieceLabel::BlackKing),
            _ => None,
        }
    }
}
