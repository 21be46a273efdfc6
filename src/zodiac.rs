use crate::angle::normalize_angle;

pub const SIGN_COUNT: usize = 12;
pub const SIGN_WIDTH_DEG: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZodiacSign {
    pub index: usize,
    pub glyph: char,
    pub name: &'static str,
}

#[rustfmt::skip]
pub const SIGNS: [ZodiacSign; SIGN_COUNT] = [
    ZodiacSign { index: 0, glyph: '♈', name: "Aries" },
    ZodiacSign { index: 1, glyph: '♉', name: "Taurus" },
    ZodiacSign { index: 2, glyph: '♊', name: "Gemini" },
    ZodiacSign { index: 3, glyph: '♋', name: "Cancer" },
    ZodiacSign { index: 4, glyph: '♌', name: "Leo" },
    ZodiacSign { index: 5, glyph: '♍', name: "Virgo" },
    ZodiacSign { index: 6, glyph: '♎', name: "Libra" },
    ZodiacSign { index: 7, glyph: '♏', name: "Scorpio" },
    ZodiacSign { index: 8, glyph: '♐', name: "Sagittarius" },
    ZodiacSign { index: 9, glyph: '♑', name: "Capricorn" },
    ZodiacSign { index: 10, glyph: '♒', name: "Aquarius" },
    ZodiacSign { index: 11, glyph: '♓', name: "Pisces" },
];

impl ZodiacSign {
    pub fn start_lon(&self) -> f64 {
        self.index as f64 * SIGN_WIDTH_DEG
    }

    pub fn center_lon(&self) -> f64 {
        self.start_lon() + SIGN_WIDTH_DEG / 2.0
    }

    pub fn contains(&self, lon: f64) -> bool {
        let lon = normalize_angle(lon);
        lon >= self.start_lon() && lon < self.start_lon() + SIGN_WIDTH_DEG
    }
}

pub fn sign_from_longitude(lon: f64) -> &'static ZodiacSign {
    let index = (normalize_angle(lon) / SIGN_WIDTH_DEG).floor() as usize % SIGN_COUNT;
    &SIGNS[index]
}

/// Sign by index; anything outside 0..12 falls back to Aries.
pub fn sign_or_default(index: i64) -> &'static ZodiacSign {
    usize::try_from(index)
        .ok()
        .and_then(|i| SIGNS.get(i))
        .unwrap_or(&SIGNS[0])
}
