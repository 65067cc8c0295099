//! FEN parsing, serialization and position validation.

use std::str::FromStr;

use super::error::{FenError, MoveParseError, ValidationError};
use super::position::Position;
use super::types::{
    Color, Move, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};

impl Position {
    /// Parse a position from FEN notation and validate it.
    ///
    /// The halfmove clock and fullmove number fields are optional and
    /// default to 0 and 1 (several test-suite FENs omit them). A position
    /// that parses but is not legal chess (wrong king count, pawns on a
    /// back rank, en-passant square on the wrong rank) is rejected.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let pos = Self::parse_fen(fen)?;
        pos.validate()?;
        Ok(pos)
    }

    fn parse_fen(fen: &str) -> Result<Self, FenError> {
        let mut pos = Position::empty();
        let fields: Vec<&str> = fen.split_whitespace().collect();

        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        // Field 1: piece placement, rank 8 first
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount { found: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= 8 {
                        return Err(FenError::TooManyFiles { rank });
                    }
                    pos.put_piece(Square::new(rank, file), piece, color);
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::TooManyFiles { rank });
            }
        }

        // Field 2: side to move
        match fields[1] {
            "w" => pos.set_side_to_move(Color::White),
            "b" => pos.set_side_to_move(Color::Black),
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        }

        // Field 3: castling rights
        let mut rights = 0u8;
        for c in fields[2].chars() {
            match c {
                'K' => rights |= CASTLE_WHITE_K,
                'Q' => rights |= CASTLE_WHITE_Q,
                'k' => rights |= CASTLE_BLACK_K,
                'q' => rights |= CASTLE_BLACK_Q,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        pos.set_castling_rights(rights);

        // Field 4: en passant target square
        if fields[3] == "-" {
            pos.set_en_passant(None);
        } else {
            let sq = Square::from_str(fields[3]).map_err(|_| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            pos.set_en_passant(Some(sq));
        }

        // Fields 5 and 6: halfmove clock and fullmove number (optional)
        if fields.len() >= 5 {
            let clock = fields[4].parse().map_err(|_| FenError::InvalidCounter {
                found: fields[4].to_string(),
            })?;
            pos.set_halfmove_clock(clock);
        }
        if fields.len() >= 6 {
            let number = fields[5].parse().map_err(|_| FenError::InvalidCounter {
                found: fields[5].to_string(),
            })?;
            pos.set_fullmove_number(number);
        }

        pos.rebuild_hash();
        Ok(pos)
    }

    /// Check logical consistency of a parsed position.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for color in Color::BOTH {
            let kings = self.pieces(Piece::King, color).popcount();
            if kings != 1 {
                return Err(ValidationError::WrongKingCount {
                    color,
                    count: kings,
                });
            }
        }

        let back_ranks = super::types::Bitboard::RANK_1 | super::types::Bitboard::RANK_8;
        let pawns = self.piece_bb(Piece::Pawn);
        if !(pawns & back_ranks).is_empty() {
            let square = (pawns & back_ranks).lsb();
            return Err(ValidationError::PawnOnBackRank { square });
        }

        if let Some(ep) = self.en_passant_square() {
            // White to move means Black just double-pushed onto rank 5, so
            // the target sits on rank 6; mirrored for Black to move.
            let expected_rank = match self.side_to_move() {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep.rank() != expected_rank {
                return Err(ValidationError::EnPassantRankMismatch { square: ep });
            }
        }

        Ok(())
    }

    /// Serialize the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut placement: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square::new(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            placement.push(row);
        }

        let side = match self.side_to_move() {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling_rights() & CASTLE_WHITE_K != 0 {
            castling.push('K');
        }
        if self.castling_rights() & CASTLE_WHITE_Q != 0 {
            castling.push('Q');
        }
        if self.castling_rights() & CASTLE_BLACK_K != 0 {
            castling.push('k');
        }
        if self.castling_rights() & CASTLE_BLACK_Q != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .en_passant_square()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            placement.join("/"),
            side,
            castling,
            ep,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }

    /// Parse a move in UCI long algebraic notation (e.g., "e2e4", "e7e8q").
    ///
    /// Resolves against the legal move list, so the returned move carries
    /// the right kind flags and illegal input surfaces as an error.
    pub fn parse_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }

        let chars: Vec<char> = uci.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            });
        }

        let from = Square::new(chars[1] as usize - '1' as usize, chars[0] as usize - 'a' as usize);
        let to = Square::new(chars[3] as usize - '1' as usize, chars[2] as usize - 'a' as usize);

        let promotion = if uci.len() == 5 {
            let piece = Piece::from_char(chars[4])
                .ok_or(MoveParseError::InvalidPromotion { char: chars[4] })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece)
        } else {
            None
        };

        for legal in &self.legal_moves() {
            if legal.from() == from && legal.to() == to && legal.promotion_piece() == promotion {
                return Ok(*legal);
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: uci.to_string(),
        })
    }

    /// Parse a UCI move and make it on the board in one call.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(uci)?;
        let _ = self.make_move(mv);
        Ok(mv)
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}
