//! Card faces: the name, glyph and color shown for a card value.

use crate::fb::Rgb;
use crate::types::CardValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardFace {
    pub name: &'static str,
    pub glyph: char,
    pub color: Rgb,
}

const fn face(name: &'static str, glyph: char, r: u8, g: u8, b: u8) -> CardFace {
    CardFace {
        name,
        glyph,
        color: Rgb::new(r, g, b),
    }
}

/// The first eight make up the default 4x4 board.
pub const FACES: [CardFace; 16] = [
    face("Agumon", '▲', 230, 140, 40),
    face("Patamon", '●', 220, 170, 90),
    face("Tailmon", '★', 200, 200, 200),
    face("Piyomon", '♥', 230, 110, 150),
    face("Gabumon", '■', 90, 130, 220),
    face("Palmon", '✿', 110, 200, 110),
    face("Tentomon", '◆', 200, 60, 60),
    face("Gomamon", '≈', 120, 200, 220),
    face("Veemon", '▼', 70, 110, 240),
    face("Wormmon", '◎', 140, 210, 80),
    face("Hawkmon", '♦', 220, 80, 60),
    face("Armadimon", '♣', 210, 180, 60),
    face("Terriermon", '♪', 180, 220, 160),
    face("Guilmon", '♠', 240, 60, 60),
    face("Renamon", '☾', 240, 200, 80),
    face("Lopmon", '✚', 170, 120, 90),
];

/// Face for `value`. Values past the table wrap around.
pub fn face_for(value: CardValue) -> CardFace {
    FACES[value.index() % FACES.len()]
}
