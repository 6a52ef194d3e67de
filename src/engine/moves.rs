//! Move values and the external move descriptor.
//!
//! A [`Move`] is only ever built by the generator; consumers identify moves
//! by a [`MoveRequest`] (origin, destination, promotion choice) and resolve it
//! against a position's legal set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::piece::Piece;
use crate::engine::types::{ChessError, PieceType, Square};

// ---------------------------------------------------------------------------
// MoveKind
// ---------------------------------------------------------------------------

/// Which side of the board a castle goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// The variant-specific part of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Quiet move to an empty square.
    Normal,
    /// Capture of the piece standing on the destination.
    Capture { captured: Piece },
    /// Pawn double step; sets the en-passant target on the next position.
    PawnJump,
    /// Pawn capture of a pawn that just double-stepped past the destination.
    EnPassant { captured: Piece },
    /// King move of two files; the rook is relocated in the same transition.
    Castle {
        side: CastleSide,
        rook: Piece,
        rook_to: Square,
    },
    /// Pawn reaching the last rank, optionally capturing.
    Promotion {
        to: PieceType,
        captured: Option<Piece>,
    },
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A generated move: the moved piece (pre-move value), its destination, and
/// the variant-specific payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    to: Square,
    kind: MoveKind,
}

impl Move {
    pub(crate) fn normal(piece: Piece, to: Square) -> Self {
        Move {
            piece,
            to,
            kind: MoveKind::Normal,
        }
    }

    pub(crate) fn capture(piece: Piece, to: Square, captured: Piece) -> Self {
        Move {
            piece,
            to,
            kind: MoveKind::Capture { captured },
        }
    }

    pub(crate) fn pawn_jump(piece: Piece, to: Square) -> Self {
        Move {
            piece,
            to,
            kind: MoveKind::PawnJump,
        }
    }

    pub(crate) fn en_passant(piece: Piece, to: Square, captured: Piece) -> Self {
        Move {
            piece,
            to,
            kind: MoveKind::EnPassant { captured },
        }
    }

    pub(crate) fn castle(
        king: Piece,
        to: Square,
        side: CastleSide,
        rook: Piece,
        rook_to: Square,
    ) -> Self {
        Move {
            piece: king,
            to,
            kind: MoveKind::Castle {
                side,
                rook,
                rook_to,
            },
        }
    }

    pub(crate) fn promotion(
        piece: Piece,
        to: Square,
        promote_to: PieceType,
        captured: Option<Piece>,
    ) -> Self {
        Move {
            piece,
            to,
            kind: MoveKind::Promotion {
                to: promote_to,
                captured,
            },
        }
    }

    #[inline]
    pub fn from(&self) -> Square {
        self.piece.square()
    }

    #[inline]
    pub fn to(&self) -> Square {
        self.to
    }

    /// The piece as it stood before the move.
    #[inline]
    pub fn moved_piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn captured(&self) -> Option<Piece> {
        match self.kind {
            MoveKind::Capture { captured } | MoveKind::EnPassant { captured } => Some(captured),
            MoveKind::Promotion { captured, .. } => captured,
            MoveKind::Normal | MoveKind::PawnJump | MoveKind::Castle { .. } => None,
        }
    }

    pub fn promotion_piece(&self) -> Option<PieceType> {
        match self.kind {
            MoveKind::Promotion { to, .. } => Some(to),
            _ => None,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured().is_some()
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        match self.kind {
            MoveKind::Castle { side, .. } => Some(side),
            _ => None,
        }
    }

    /// External identity of this move.
    pub fn request(&self) -> MoveRequest {
        MoveRequest {
            from: self.from(),
            to: self.to,
            promotion: self.promotion_piece(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request())
    }
}

// ---------------------------------------------------------------------------
// MoveRequest
// ---------------------------------------------------------------------------

/// Transport-level identity of a move: origin, destination and the chosen
/// promotion piece. Serializes as `{"from":"e7","to":"e8","promotion":"q"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    #[serde(default, with = "promotion_serde", skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square, promotion: Option<PieceType>) -> Self {
        MoveRequest {
            from,
            to,
            promotion,
        }
    }

    /// Build a request from loosely-typed text fields (REST bodies, socket
    /// commands).
    pub fn from_parts(from: &str, to: &str, promotion: Option<&str>) -> Result<Self, ChessError> {
        let parse_square = |s: &str| {
            Square::from_algebraic(s)
                .ok_or_else(|| ChessError::MalformedMoveRequest(format!("invalid square '{s}'")))
        };
        let promotion = promotion
            .map(|p| {
                PieceType::from_promotion(p).ok_or_else(|| {
                    ChessError::MalformedMoveRequest(format!("invalid promotion '{p}'"))
                })
            })
            .transpose()?;
        Ok(MoveRequest {
            from: parse_square(from)?,
            to: parse_square(to)?,
            promotion,
        })
    }

    /// Find the legal move this request names in `pos`.
    pub fn resolve(&self, pos: &Position) -> Result<Move, ChessError> {
        movegen::legal_moves_from(pos, self.from)
            .into_iter()
            .find(|mv| mv.to() == self.to && mv.promotion_piece() == self.promotion)
            .ok_or_else(|| {
                ChessError::MalformedMoveRequest(format!("{self} is not a legal move"))
            })
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.letter())?;
        }
        Ok(())
    }
}

impl FromStr for MoveRequest {
    type Err = ChessError;

    /// Parse compact coordinate notation: `e2e4`, `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(ChessError::MalformedMoveRequest(format!(
                "expected coordinate notation like e2e4, got '{s}'"
            )));
        }
        let promotion = if s.len() == 5 { Some(&s[4..5]) } else { None };
        MoveRequest::from_parts(&s[0..2], &s[2..4], promotion)
    }
}

mod promotion_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::engine::types::PieceType;

    pub fn serialize<S: Serializer>(
        promotion: &Option<PieceType>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match promotion {
            Some(pt) => serializer.serialize_str(&pt.letter().to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PieceType>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| {
            PieceType::from_promotion(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid promotion '{s}'")))
        })
        .transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
