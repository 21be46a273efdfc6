use crate::angle::signed_delta;
use crate::body::{Body, BodyMap};
use crate::zodiac::{sign_or_default, ZodiacSign};
use serde::{Deserialize, Serialize};

/// Origin for every displayed angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Follows the Sun's longitude at the rendered instant.
    SunRelative,
    /// Fixed at the centre of the given sign (0..12).
    SignLocked(usize),
}

impl ReferenceFrame {
    /// Builds a frame from the configuration toggles. An out-of-range sign
    /// index falls back to Aries.
    pub fn from_options(lock: bool, sign_index: i64) -> Self {
        if lock {
            ReferenceFrame::SignLocked(sign_or_default(sign_index).index)
        } else {
            ReferenceFrame::SunRelative
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, ReferenceFrame::SignLocked(_))
    }

    pub fn locked_sign(self) -> Option<&'static ZodiacSign> {
        match self {
            ReferenceFrame::SunRelative => None,
            ReferenceFrame::SignLocked(i) => Some(sign_or_default(i as i64)),
        }
    }

    /// Origin longitude given the Sun's current longitude.
    pub fn origin(self, sun_lon: f64) -> f64 {
        match self {
            ReferenceFrame::SunRelative => sun_lon,
            ReferenceFrame::SignLocked(i) => sign_or_default(i as i64).center_lon(),
        }
    }

    /// Signed angle of a longitude from the origin, in (-180, 180].
    pub fn relative(self, lon: f64, sun_lon: f64) -> f64 {
        signed_delta(lon, self.origin(sun_lon))
    }

    /// Relative angles for every body. In the Sun-relative frame the Sun is
    /// pinned to exactly zero.
    pub fn relative_angles(self, lons: &BodyMap<f64>) -> BodyMap<f64> {
        let sun = lons[Body::Sun];
        lons.map(|body, &lon| match self {
            ReferenceFrame::SunRelative if body.is_reference() => 0.0,
            _ => self.relative(lon, sun),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_is_zero_in_sun_frame() {
        let lons = BodyMap::from_fn(|b| 37.3 * b.index() as f64 + 211.9);
        let rel = ReferenceFrame::SunRelative.relative_angles(&lons);
        assert_eq!(rel[Body::Sun], 0.0);
        assert!((rel[Body::Moon] - 37.3).abs() < 1e-9);
    }

    #[test]
    fn locked_frame_uses_sign_center() {
        let frame = ReferenceFrame::from_options(true, 3);
        assert_eq!(frame, ReferenceFrame::SignLocked(3));
        assert_eq!(frame.origin(123.0), 105.0);
        assert_eq!(frame.relative(105.0, 0.0), 0.0);
        assert_eq!(frame.relative(285.0, 0.0), 180.0);
        assert_eq!(frame.locked_sign().map(|s| s.name), Some("Cancer"));
    }

    #[test]
    fn bad_sign_index_is_clamped() {
        assert_eq!(ReferenceFrame::from_options(true, 42), ReferenceFrame::SignLocked(0));
        assert_eq!(ReferenceFrame::from_options(true, -1), ReferenceFrame::SignLocked(0));
        assert_eq!(ReferenceFrame::from_options(false, 5), ReferenceFrame::SunRelative);
    }
}
