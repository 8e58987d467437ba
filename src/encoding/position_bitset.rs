//! Fixed-width bitset encoding of a position.
//!
//! Layout (265 bits used in five words):
//! - words 0..=3: one nibble per square, 16 squares per word, `a1` first.
//!   Nibble `0` is empty; bit 3 is the color (set for black) and bits 0..=2
//!   hold `figure_type.index() + 1`.
//! - word 4: bit 0 side to move (set for black), bits 1..=4 castling rights,
//!   bit 5 en-passant present, bits 6..=8 en-passant column minus one.
//!
//! Every feature is xor-toggled, so applying the same toggle twice restores
//! the previous bitset exactly.

use crate::board::board::CastlingRights;
use crate::board::figure::{Color, FigureType};

const META_WORD: usize = 4;
const SIDE_BIT: u64 = 1;
const CASTLING_SHIFT: u32 = 1;
const EN_PASSANT_FLAG: u64 = 1 << 5;
const EN_PASSANT_SHIFT: u32 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PositionBitset {
    words: [u64; 5],
}

#[inline]
const fn figure_code(color: Color, figure_type: FigureType) -> u64 {
    let color_bit = match color {
        Color::White => 0,
        Color::Black => 0b1000,
    };
    color_bit | (figure_type.index() as u64 + 1)
}

fn decode_code(code: u64) -> Option<(Color, FigureType)> {
    if code == 0 {
        return None;
    }
    let color = if code & 0b1000 != 0 { Color::Black } else { Color::White };
    let type_index = (code & 0b0111) as usize;
    let figure_type = *FigureType::ALL.get(type_index.checked_sub(1)?)?;
    Some((color, figure_type))
}

#[inline]
fn en_passant_bits(column: Option<u8>) -> u64 {
    match column {
        Some(column @ 1..=8) => EN_PASSANT_FLAG | (u64::from(column - 1) << EN_PASSANT_SHIFT),
        _ => 0,
    }
}

impl PositionBitset {
    /// Toggle a figure on square index `square` (`0..64`).
    #[inline]
    pub fn toggle_figure(&mut self, color: Color, figure_type: FigureType, square: usize) {
        self.words[square / 16] ^= figure_code(color, figure_type) << ((square % 16) * 4);
    }

    #[inline]
    pub fn toggle_side_to_move(&mut self) {
        self.words[META_WORD] ^= SIDE_BIT;
    }

    #[inline]
    pub fn toggle_castling(&mut self, rights: CastlingRights) {
        self.words[META_WORD] ^= u64::from(rights & 0x0F) << CASTLING_SHIFT;
    }

    #[inline]
    pub fn toggle_en_passant(&mut self, column: Option<u8>) {
        self.words[META_WORD] ^= en_passant_bits(column);
    }

    /// Figure on square index `square`, if any.
    pub fn figure_at(&self, square: usize) -> Option<(Color, FigureType)> {
        let code = (self.words[square / 16] >> ((square % 16) * 4)) & 0x0F;
        decode_code(code)
    }

    pub fn side_to_move(&self) -> Color {
        if self.words[META_WORD] & SIDE_BIT != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn castling_rights(&self) -> CastlingRights {
        ((self.words[META_WORD] >> CASTLING_SHIFT) & 0x0F) as CastlingRights
    }

    pub fn en_passant_column(&self) -> Option<u8> {
        let meta = self.words[META_WORD];
        if meta & EN_PASSANT_FLAG == 0 {
            return None;
        }
        Some(((meta >> EN_PASSANT_SHIFT) & 0b111) as u8 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_toggle_is_self_inverse() {
        let mut bits = PositionBitset::default();
        bits.toggle_figure(Color::Black, FigureType::Queen, 59);
        assert_eq!(bits.figure_at(59), Some((Color::Black, FigureType::Queen)));
        assert_eq!(bits.figure_at(58), None);
        bits.toggle_figure(Color::Black, FigureType::Queen, 59);
        assert_eq!(bits, PositionBitset::default());
    }

    #[test]
    fn replacing_a_figure_via_two_toggles() {
        let mut bits = PositionBitset::default();
        bits.toggle_figure(Color::Black, FigureType::Knight, 30);
        bits.toggle_figure(Color::Black, FigureType::Knight, 30);
        bits.toggle_figure(Color::White, FigureType::Bishop, 30);
        assert_eq!(bits.figure_at(30), Some((Color::White, FigureType::Bishop)));
    }

    #[test]
    fn meta_fields_decode() {
        let mut bits = PositionBitset::default();
        bits.toggle_side_to_move();
        bits.toggle_castling(0b1010);
        bits.toggle_en_passant(Some(8));
        assert_eq!(bits.side_to_move(), Color::Black);
        assert_eq!(bits.castling_rights(), 0b1010);
        assert_eq!(bits.en_passant_column(), Some(8));
        bits.toggle_en_passant(Some(8));
        assert_eq!(bits.en_passant_column(), None);
    }
}
