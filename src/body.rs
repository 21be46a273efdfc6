use crate::error::EphemerisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

pub struct BodyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: char,
    pub reference: bool,
}

#[rustfmt::skip]
const BODY_TABLE: [BodyInfo; 9] = [
    BodyInfo { id: "sun", name: "Sun", glyph: '☉', reference: true },
    BodyInfo { id: "moon", name: "Moon", glyph: '☽', reference: false },
    BodyInfo { id: "mercury", name: "Mercury", glyph: '☿', reference: false },
    BodyInfo { id: "venus", name: "Venus", glyph: '♀', reference: false },
    BodyInfo { id: "mars", name: "Mars", glyph: '♂', reference: false },
    BodyInfo { id: "jupiter", name: "Jupiter", glyph: '♃', reference: false },
    BodyInfo { id: "saturn", name: "Saturn", glyph: '♄', reference: false },
    BodyInfo { id: "uranus", name: "Uranus", glyph: '♅', reference: false },
    BodyInfo { id: "neptune", name: "Neptune", glyph: '♆', reference: false },
];

impl Body {
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn info(self) -> &'static BodyInfo {
        &BODY_TABLE[self.index()]
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn glyph(self) -> char {
        self.info().glyph
    }

    /// Glyph followed by U+FE0E so terminals pick the text presentation
    /// instead of an emoji.
    pub fn glyph_text(self) -> String {
        glyph_text(self.glyph())
    }

    pub fn is_reference(self) -> bool {
        self.info().reference
    }
}

pub fn glyph_text(glyph: char) -> String {
    format!("{glyph}\u{FE0E}")
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Body::ALL
            .into_iter()
            .find(|b| b.id() == key)
            .ok_or_else(|| EphemerisError::UnknownBody(s.to_string()))
    }
}

/// One value per body, always complete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyMap<T> {
    slots: [T; 9],
}

impl<T> BodyMap<T> {
    pub fn from_fn(mut f: impl FnMut(Body) -> T) -> Self {
        Self {
            slots: Body::ALL.map(&mut f),
        }
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Body) -> Result<T, E>) -> Result<Self, E> {
        let mut values = Vec::with_capacity(9);
        for body in Body::ALL {
            values.push(f(body)?);
        }
        let slots: [T; 9] = match values.try_into() {
            Ok(slots) => slots,
            Err(_) => unreachable!("one value per body"),
        };
        Ok(Self { slots })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Body, &T)> {
        Body::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Body, &T) -> U) -> BodyMap<U> {
        BodyMap::from_fn(|b| f(b, &self[b]))
    }
}

impl<T> Index<Body> for BodyMap<T> {
    type Output = T;

    fn index(&self, body: Body) -> &T {
        &self.slots[body.index()]
    }
}

impl<T> IndexMut<Body> for BodyMap<T> {
    fn index_mut(&mut self, body: Body) -> &mut T {
        &mut self.slots[body.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum_order() {
        for (i, body) in Body::ALL.into_iter().enumerate() {
            assert_eq!(body.index(), i);
            assert_eq!(body.id().parse::<Body>(), Ok(body));
        }
        assert!(Body::Sun.is_reference());
        assert_eq!(Body::ALL.iter().filter(|b| b.is_reference()).count(), 1);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Venus ".parse::<Body>(), Ok(Body::Venus));
        assert_eq!(
            "pluto".parse::<Body>(),
            Err(EphemerisError::UnknownBody("pluto".to_string()))
        );
    }

    #[test]
    fn glyph_text_forces_text_presentation() {
        assert_eq!(Body::Mars.glyph_text(), "♂\u{FE0E}");
    }

    #[test]
    fn try_from_fn_stops_on_error() {
        let ok: Result<BodyMap<usize>, ()> = BodyMap::try_from_fn(|b| Ok(b.index()));
        assert_eq!(ok.map(|m| m[Body::Saturn]), Ok(6));
        let err: Result<BodyMap<usize>, &str> =
            BodyMap::try_from_fn(|b| if b == Body::Mars { Err("mars") } else { Ok(0) });
        assert_eq!(err, Err("mars"));
    }
}
