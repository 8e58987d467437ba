use crate::board::board::CastlingRights;

/// Per-ply record of the state that a board mutation alone cannot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub castling_before: CastlingRights,
    pub castling_after: CastlingRights,
    pub en_passant_before: Option<u8>,
    pub en_passant_after: Option<u8>,
    pub round_before: u16,
    pub halfmove_before: u16,
}
