//! Built-in single-stroke font for figure labels.
//!
//! Glyphs are polylines on a grid where the cap height is
//! [`CAP_HEIGHT`] units, `y = 0` is the top of a capital and
//! `y = CAP_HEIGHT` is the baseline. At scale 1.0 a capital is 21 px
//! tall. Only the characters that can appear in a label are defined:
//! `A`-`Z` (lowercase maps to uppercase) and space. Anything else
//! advances like a space and draws nothing.

/// Height of a capital letter in font units.
pub const CAP_HEIGHT: f32 = 21.0;

/// Horizontal advance of a space and of unknown characters.
const SPACE_ADVANCE: u8 = 12;

/// One character: its strokes and how far the pen moves after it.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    /// Pen advance in font units.
    pub advance: u8,
    /// Open polylines in font units.
    pub strokes: &'static [&'static [(u8, u8)]],
}

const fn g(advance: u8, strokes: &'static [&'static [(u8, u8)]]) -> Glyph {
    Glyph { advance, strokes }
}

const O_RING: &[(u8, u8)] = &[
    (7, 0),
    (3, 1),
    (0, 5),
    (0, 16),
    (3, 20),
    (7, 21),
    (11, 20),
    (14, 16),
    (14, 5),
    (11, 1),
    (7, 0),
];

const C_ARC: &[(u8, u8)] = &[
    (14, 4),
    (11, 1),
    (7, 0),
    (3, 1),
    (0, 5),
    (0, 16),
    (3, 20),
    (7, 21),
    (11, 20),
    (14, 17),
];

const P_BOWL: &[(u8, u8)] = &[
    (0, 21),
    (0, 0),
    (10, 0),
    (13, 2),
    (14, 5),
    (13, 8),
    (10, 10),
    (0, 10),
];

const LETTERS: [Glyph; 26] = [
    g(18, &[&[(0, 21), (7, 0), (14, 21)], &[(3, 13), (11, 13)]]),
    g(
        17,
        &[
            &[
                (0, 0),
                (0, 21),
                (9, 21),
                (12, 19),
                (13, 16),
                (12, 13),
                (9, 11),
                (0, 11),
            ],
            &[(0, 0), (9, 0), (12, 2), (12, 8), (9, 11)],
        ],
    ),
    g(18, &[C_ARC]),
    g(
        18,
        &[&[
            (0, 0),
            (0, 21),
            (7, 21),
            (11, 19),
            (14, 14),
            (14, 7),
            (11, 2),
            (7, 0),
            (0, 0),
        ]],
    ),
    g(17, &[&[(13, 0), (0, 0), (0, 21), (13, 21)], &[(0, 11), (9, 11)]]),
    g(16, &[&[(13, 0), (0, 0), (0, 21)], &[(0, 11), (9, 11)]]),
    g(
        18,
        &[&[
            (14, 4),
            (11, 1),
            (7, 0),
            (3, 1),
            (0, 5),
            (0, 16),
            (3, 20),
            (7, 21),
            (11, 20),
            (14, 17),
            (14, 12),
            (8, 12),
        ]],
    ),
    g(18, &[&[(0, 0), (0, 21)], &[(14, 0), (14, 21)], &[(0, 11), (14, 11)]]),
    g(12, &[&[(0, 0), (8, 0)], &[(4, 0), (4, 21)], &[(0, 21), (8, 21)]]),
    g(14, &[&[(10, 0), (10, 16), (8, 20), (5, 21), (2, 20), (0, 16)]]),
    g(17, &[&[(0, 0), (0, 21)], &[(13, 0), (0, 14)], &[(5, 9), (13, 21)]]),
    g(15, &[&[(0, 0), (0, 21), (12, 21)]]),
    g(20, &[&[(0, 21), (0, 0), (8, 21), (16, 0), (16, 21)]]),
    g(18, &[&[(0, 21), (0, 0), (14, 21), (14, 0)]]),
    g(18, &[O_RING]),
    g(17, &[P_BOWL]),
    g(18, &[O_RING, &[(9, 16), (15, 22)]]),
    g(17, &[P_BOWL, &[(7, 10), (14, 21)]]),
    g(
        18,
        &[&[
            (14, 3),
            (10, 0),
            (4, 0),
            (0, 3),
            (0, 7),
            (3, 10),
            (11, 11),
            (14, 14),
            (14, 18),
            (10, 21),
            (4, 21),
            (0, 18),
        ]],
    ),
    g(16, &[&[(0, 0), (14, 0)], &[(7, 0), (7, 21)]]),
    g(18, &[&[(0, 0), (0, 16), (3, 20), (7, 21), (11, 20), (14, 16), (14, 0)]]),
    g(17, &[&[(0, 0), (7, 21), (14, 0)]]),
    g(22, &[&[(0, 0), (4, 21), (9, 6), (14, 21), (18, 0)]]),
    g(17, &[&[(0, 0), (14, 21)], &[(14, 0), (0, 21)]]),
    g(17, &[&[(0, 0), (7, 10), (14, 0)], &[(7, 10), (7, 21)]]),
    g(17, &[&[(0, 0), (14, 0), (0, 21), (14, 21)]]),
];

/// Look up the glyph for `c`, if the font has one.
#[must_use]
pub fn glyph(c: char) -> Option<&'static Glyph> {
    let upper = c.to_ascii_uppercase();
    if !upper.is_ascii_uppercase() {
        return None;
    }
    let index = u8::try_from(upper).ok()? - b'A';
    LETTERS.get(usize::from(index))
}

fn advance(c: char) -> u8 {
    glyph(c).map_or(SPACE_ADVANCE, |g| g.advance)
}

/// Lay out `text` as pixel-space polylines.
///
/// `origin` is the left end of the baseline; capitals extend
/// `CAP_HEIGHT * scale` pixels above it.
#[must_use = "returns the laid-out strokes"]
pub fn layout(text: &str, origin: (f32, f32), scale: f32) -> Vec<Vec<(f32, f32)>> {
    let (ox, oy) = origin;
    let mut pen = 0.0_f32;
    let mut strokes = Vec::new();

    for c in text.chars() {
        if let Some(glyph) = glyph(c) {
            for stroke in glyph.strokes {
                strokes.push(
                    stroke
                        .iter()
                        .map(|&(x, y)| {
                            (
                                (pen + f32::from(x)).mul_add(scale, ox),
                                (f32::from(y) - CAP_HEIGHT).mul_add(scale, oy),
                            )
                        })
                        .collect(),
                );
            }
        }
        pen += f32::from(advance(c));
    }
    strokes
}
