//! Error types for board operations.

use std::fmt;

use super::types::{Color, Square};

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs all six)
    TooFewFields { found: usize },
    /// Invalid piece character in the placement field
    InvalidPiece { char: char },
    /// Wrong number of ranks in the placement field
    InvalidRankCount { found: usize },
    /// Too many files in a rank
    TooManyFiles { rank: usize },
    /// Invalid side to move (must be 'w' or 'b')
    InvalidSideToMove { found: String },
    /// Invalid castling character
    InvalidCastling { char: char },
    /// Invalid en passant square
    InvalidEnPassant { found: String },
    /// Halfmove clock or fullmove number is not a number
    InvalidCounter { found: String },
    /// FEN parsed but the position is illegal
    IllegalPosition(ValidationError),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewFields { found } => {
                write!(f, "FEN must have 6 fields, found {found}")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "Invalid piece character '{char}' in FEN")
            }
            FenError::InvalidRankCount { found } => {
                write!(f, "FEN placement must have 8 ranks, found {found}")
            }
            FenError::TooManyFiles { rank } => {
                write!(f, "Too many files in FEN rank {rank}")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "Invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "Invalid castling character '{char}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "Invalid en passant square '{found}'")
            }
            FenError::InvalidCounter { found } => {
                write!(f, "Invalid move counter '{found}'")
            }
            FenError::IllegalPosition(err) => {
                write!(f, "FEN position is illegal: {err}")
            }
        }
    }
}

impl std::error::Error for FenError {}

impl From<ValidationError> for FenError {
    fn from(err: ValidationError) -> Self {
        FenError::IllegalPosition(err)
    }
}

/// Error type for positions that parse but are not legal chess positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A side must have exactly one king
    WrongKingCount { color: Color, count: u32 },
    /// Pawns can never stand on rank 1 or rank 8
    PawnOnBackRank { square: Square },
    /// En passant square rank does not match the side to move
    EnPassantRankMismatch { square: Square },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongKingCount { color, count } => {
                write!(f, "{color} must have exactly one king, found {count}")
            }
            ValidationError::PawnOnBackRank { square } => {
                write!(f, "Pawn on back rank at {square}")
            }
            ValidationError::EnPassantRankMismatch { square } => {
                write!(f, "En passant square {square} on wrong rank for side to move")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error type for move parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters)
    InvalidLength { len: usize },
    /// Invalid square notation in move
    InvalidSquare { notation: String },
    /// Invalid promotion piece
    InvalidPromotion { char: char },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "Invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// Invalid algebraic notation
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::InvalidNotation { notation } => {
                write!(f, "Invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_error_display() {
        let err = FenError::TooFewFields { found: 2 };
        assert!(err.to_string().contains('2'));
        let err = FenError::InvalidPiece { char: 'z' };
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_validation_error_wraps_into_fen_error() {
        let err: FenError = ValidationError::WrongKingCount {
            color: Color::White,
            count: 2,
        }
        .into();
        assert!(matches!(err, FenError::IllegalPosition(_)));
        assert!(err.to_string().contains("king"));
    }

    #[test]
    fn test_move_parse_error_display() {
        let err = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert!(err.to_string().contains("e2e5"));
    }
}
