//! Analytic position pipeline: elements -> Kepler -> ecliptic vectors.

use crate::angle::{
    normalize_angle, sin_deg, spherical_from_rectangular, to_rad, Rectangular, Spherical,
};
use crate::body::{Body, BodyMap};
use crate::elements::{moon_elements, orbital_elements, OrbitalElements, Planet};
use crate::error::EphemerisError;
use crate::kepler::solve_kepler;
use serde::{Deserialize, Serialize};

/// Equatorial Earth radius in AU.
pub const EARTH_RADIUS_AU: f64 = 6378.137 / 149_597_870.7;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    pub rect: Rectangular,
    pub sph: Spherical,
}

impl EclipticPosition {
    fn from_rect(rect: Rectangular) -> Self {
        Self {
            rect,
            sph: spherical_from_rectangular(rect),
        }
    }
}

/// Position in the orbit's own frame rotated into ecliptic coordinates.
pub fn rectangular_from_elements(el: &OrbitalElements) -> Rectangular {
    let m = to_rad(normalize_angle(el.m));
    let e_anom = solve_kepler(m, el.e);

    let xv = el.a * (e_anom.cos() - el.e);
    let yv = el.a * ((1.0 - el.e * el.e).sqrt() * e_anom.sin());

    let v = yv.atan2(xv);
    let r = (xv * xv + yv * yv).sqrt();

    let (sin_n, cos_n) = to_rad(el.n).sin_cos();
    let (sin_i, cos_i) = to_rad(el.i).sin_cos();
    let (sin_vw, cos_vw) = (v + to_rad(el.w)).sin_cos();

    Rectangular {
        x: r * (cos_n * cos_vw - sin_n * sin_vw * cos_i),
        y: r * (sin_n * cos_vw + cos_n * sin_vw * cos_i),
        z: r * sin_vw * sin_i,
    }
}

/// The Sun as seen from the Earth, from the `Earth` element row.
pub fn sun_geocentric(d: f64) -> EclipticPosition {
    EclipticPosition::from_rect(rectangular_from_elements(&orbital_elements(Planet::Earth, d)))
}

pub fn heliocentric_position(planet: Planet, d: f64) -> EclipticPosition {
    match planet {
        Planet::Earth => EclipticPosition::from_rect(sun_geocentric(d).rect.neg()),
        _ => EclipticPosition::from_rect(rectangular_from_elements(&orbital_elements(planet, d))),
    }
}

/// Heliocentric position for a display body; the Sun and Moon have no
/// heliocentric elements.
pub fn heliocentric_position_of(body: Body, d: f64) -> Result<EclipticPosition, EphemerisError> {
    Ok(heliocentric_position(Planet::try_from(body)?, d))
}

/// Geocentric Moon with the periodic perturbation terms applied. The radius
/// is in Earth radii.
pub fn moon_geocentric(d: f64, sun_mean_anomaly: f64, sun_true_longitude: f64) -> Spherical {
    let el = moon_elements(d);
    let first_pass = spherical_from_rectangular(rectangular_from_elements(&el));

    let mm = normalize_angle(el.m);
    let ms = normalize_angle(sun_mean_anomaly);
    let lm = normalize_angle(el.n + el.w + el.m);
    let ls = normalize_angle(sun_true_longitude);
    let dd = normalize_angle(lm - ls);
    let f = normalize_angle(lm - el.n);

    let lon = first_pass.lon - 1.274 * sin_deg(mm - 2.0 * dd) + 0.658 * sin_deg(2.0 * dd)
        - 0.186 * sin_deg(ms)
        - 0.059 * sin_deg(2.0 * mm - 2.0 * dd)
        - 0.057 * sin_deg(mm - 2.0 * dd + ms)
        + 0.053 * sin_deg(mm + 2.0 * dd)
        + 0.046 * sin_deg(2.0 * dd - ms)
        + 0.041 * sin_deg(mm - ms)
        - 0.035 * sin_deg(dd)
        - 0.031 * sin_deg(mm + ms)
        - 0.015 * sin_deg(2.0 * f - 2.0 * dd)
        + 0.011 * sin_deg(mm - 4.0 * dd);

    let lat = first_pass.lat - 0.173 * sin_deg(f - 2.0 * dd) - 0.055 * sin_deg(mm - f - 2.0 * dd)
        - 0.046 * sin_deg(mm + f - 2.0 * dd)
        + 0.033 * sin_deg(f + 2.0 * dd)
        + 0.017 * sin_deg(2.0 * mm + f);

    Spherical {
        lon: normalize_angle(lon),
        lat,
        r: first_pass.r,
    }
}

pub fn moon_geocentric_longitude(d: f64, sun_mean_anomaly: f64, sun_true_longitude: f64) -> f64 {
    moon_geocentric(d, sun_mean_anomaly, sun_true_longitude).lon
}

/// Every body seen from the Earth at day number `d`; radii in AU.
pub fn geocentric_positions_at(d: f64) -> BodyMap<Spherical> {
    let sun = sun_geocentric(d);
    let sun_mean_anomaly = orbital_elements(Planet::Earth, d).m;

    // the Earth row's vector points from the Earth to the Sun, so adding it
    // shifts a heliocentric vector onto the Earth
    let from_earth = |planet: Planet| {
        let helio = rectangular_from_elements(&orbital_elements(planet, d));
        spherical_from_rectangular(helio.add(sun.rect))
    };

    BodyMap::from_fn(|body| match body {
        Body::Sun => sun.sph,
        Body::Moon => {
            let moon = moon_geocentric(d, sun_mean_anomaly, sun.sph.lon);
            Spherical {
                r: moon.r * EARTH_RADIUS_AU,
                ..moon
            }
        }
        Body::Mercury => from_earth(Planet::Mercury),
        Body::Venus => from_earth(Planet::Venus),
        Body::Mars => from_earth(Planet::Mars),
        Body::Jupiter => from_earth(Planet::Jupiter),
        Body::Saturn => from_earth(Planet::Saturn),
        Body::Uranus => from_earth(Planet::Uranus),
        Body::Neptune => from_earth(Planet::Neptune),
    })
}
