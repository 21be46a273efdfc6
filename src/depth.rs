//! Front/behind-Sun hints for markers that overlap the Sun on the band.

use crate::angle::{signed_delta, Spherical};
use crate::body::{Body, BodyMap};
use serde::{Deserialize, Serialize};

pub const MIN_PROXIMITY_DEG: f64 = 7.0;
/// The Moon only passes in front when this close to the ecliptic.
pub const MOON_LATITUDE_LIMIT_DEG: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthParams {
    pub proximity_deg: f64,
    pub moon_latitude_limit_deg: f64,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            proximity_deg: MIN_PROXIMITY_DEG,
            moon_latitude_limit_deg: MOON_LATITUDE_LIMIT_DEG,
        }
    }
}

impl DepthParams {
    /// Markers overlap once their centres are within half their combined
    /// widths (both in degrees of band).
    pub fn from_marker_sizes(sun_marker_deg: f64, body_marker_deg: f64) -> Self {
        let overlap = (sun_marker_deg + body_marker_deg) / 2.0;
        Self {
            proximity_deg: overlap.max(MIN_PROXIMITY_DEG),
            ..Self::default()
        }
    }
}

/// Whether `body` should be drawn over the Sun.
pub fn is_front_of_sun(body: Body, pos: &Spherical, sun: &Spherical, params: &DepthParams) -> bool {
    if signed_delta(pos.lon, sun.lon).abs() > params.proximity_deg {
        return false;
    }
    let nearer = pos.r < sun.r;
    match body {
        Body::Mercury | Body::Venus => nearer,
        Body::Moon => nearer && pos.lat.abs() < params.moon_latitude_limit_deg,
        Body::Sun | Body::Mars | Body::Jupiter | Body::Saturn | Body::Uranus | Body::Neptune => {
            false
        }
    }
}

pub fn depth_ordering(positions: &BodyMap<Spherical>, params: &DepthParams) -> BodyMap<bool> {
    let sun = positions[Body::Sun];
    positions.map(|body, pos| is_front_of_sun(body, pos, &sun, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lon: f64, lat: f64, r: f64) -> Spherical {
        Spherical { lon, lat, r }
    }

    #[test]
    fn inner_planets_pass_in_front_when_nearer() {
        let sun = at(100.0, 0.0, 1.0);
        let p = DepthParams::default();
        assert!(is_front_of_sun(Body::Venus, &at(103.0, 4.0, 0.27), &sun, &p));
        assert!(!is_front_of_sun(Body::Venus, &at(103.0, 1.0, 1.7), &sun, &p));
        assert!(!is_front_of_sun(Body::Mercury, &at(110.0, 0.0, 0.6), &sun, &p));
        assert!(is_front_of_sun(Body::Mercury, &at(357.0, 0.0, 0.6), &at(2.0, 0.0, 1.0), &p));
    }

    #[test]
    fn outer_planets_never_in_front() {
        let sun = at(100.0, 0.0, 1.0);
        let p = DepthParams::default();
        for body in [Body::Mars, Body::Jupiter, Body::Saturn, Body::Uranus, Body::Neptune] {
            assert!(!is_front_of_sun(body, &at(100.5, 0.0, 0.5), &sun, &p));
        }
        assert!(!is_front_of_sun(Body::Sun, &sun, &sun, &p));
    }

    #[test]
    fn moon_needs_to_be_on_the_ecliptic() {
        let sun = at(19.4, 0.0, 1.0);
        let p = DepthParams::default();
        assert!(is_front_of_sun(Body::Moon, &at(19.1, 0.35, 0.0024), &sun, &p));
        assert!(!is_front_of_sun(Body::Moon, &at(19.1, 3.9, 0.0024), &sun, &p));
    }

    #[test]
    fn marker_sizes_widen_but_never_narrow() {
        assert_eq!(DepthParams::from_marker_sizes(4.0, 2.0).proximity_deg, 7.0);
        assert_eq!(DepthParams::from_marker_sizes(12.0, 6.0).proximity_deg, 9.0);
    }
}
