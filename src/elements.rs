//! Low-precision osculating elements as linear functions of the day number.
//!
//! `d` counts days from 2000 Jan 0.0 UT (see [`crate::ephemeris::ELEMENT_EPOCH_JD`]).
//! Angles are degrees and may exceed 360; callers normalize.

use crate::body::Body;
use crate::error::EphemerisError;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalElements {
    /// Longitude of the ascending node.
    pub n: f64,
    /// Inclination to the ecliptic.
    pub i: f64,
    /// Argument of perihelion.
    pub w: f64,
    /// Semi-major axis (AU; Earth radii for the Moon).
    pub a: f64,
    pub e: f64,
    /// Mean anomaly.
    pub m: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Planet {
    Mercury,
    Venus,
    /// Only used to move the origin to the Earth; its row describes the
    /// Sun's apparent orbit around the Earth.
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Planet::Mercury => "mercury",
            Planet::Venus => "venus",
            Planet::Earth => "earth",
            Planet::Mars => "mars",
            Planet::Jupiter => "jupiter",
            Planet::Saturn => "saturn",
            Planet::Uranus => "uranus",
            Planet::Neptune => "neptune",
        }
    }
}

impl TryFrom<Body> for Planet {
    type Error = EphemerisError;

    fn try_from(body: Body) -> Result<Self, Self::Error> {
        match body {
            Body::Mercury => Ok(Planet::Mercury),
            Body::Venus => Ok(Planet::Venus),
            Body::Mars => Ok(Planet::Mars),
            Body::Jupiter => Ok(Planet::Jupiter),
            Body::Saturn => Ok(Planet::Saturn),
            Body::Uranus => Ok(Planet::Uranus),
            Body::Neptune => Ok(Planet::Neptune),
            Body::Sun | Body::Moon => Err(EphemerisError::UnknownBody(body.id().to_string())),
        }
    }
}

impl FromStr for Planet {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Planet::ALL
            .into_iter()
            .find(|p| p.id() == key)
            .ok_or_else(|| EphemerisError::UnknownBody(s.to_string()))
    }
}

pub fn orbital_elements(planet: Planet, d: f64) -> OrbitalElements {
    match planet {
        Planet::Mercury => OrbitalElements {
            n: 48.3313 + 3.24587e-5 * d,
            i: 7.0047 + 5.0e-8 * d,
            w: 29.1241 + 1.01444e-5 * d,
            a: 0.387098,
            e: 0.205635 + 5.59e-10 * d,
            m: 168.6562 + 4.0923344368 * d,
        },
        Planet::Venus => OrbitalElements {
            n: 76.6799 + 2.4659e-5 * d,
            i: 3.3946 + 2.75e-8 * d,
            w: 54.891 + 1.38374e-5 * d,
            a: 0.72333,
            e: 0.006773 - 1.302e-9 * d,
            m: 48.0052 + 1.6021302244 * d,
        },
        Planet::Earth => OrbitalElements {
            n: 0.0,
            i: 0.0,
            w: 282.9404 + 4.70935e-5 * d,
            a: 1.0,
            e: 0.016709 - 1.151e-9 * d,
            m: 356.047 + 0.9856002585 * d,
        },
        Planet::Mars => OrbitalElements {
            n: 49.5574 + 2.11081e-5 * d,
            i: 1.8497 - 1.78e-8 * d,
            w: 286.5016 + 2.92961e-5 * d,
            a: 1.523688,
            e: 0.093405 + 2.516e-9 * d,
            m: 18.6021 + 0.5240207766 * d,
        },
        Planet::Jupiter => OrbitalElements {
            n: 100.4542 + 2.76854e-5 * d,
            i: 1.303 - 1.557e-7 * d,
            w: 273.8777 + 1.64505e-5 * d,
            a: 5.20256,
            e: 0.048498 + 4.469e-9 * d,
            m: 19.895 + 0.0830853001 * d,
        },
        Planet::Saturn => OrbitalElements {
            n: 113.6634 + 2.3898e-5 * d,
            i: 2.4886 - 1.081e-7 * d,
            w: 339.3939 + 2.97661e-5 * d,
            a: 9.55475,
            e: 0.055546 - 9.499e-9 * d,
            m: 316.967 + 0.0334442282 * d,
        },
        Planet::Uranus => OrbitalElements {
            n: 74.0005 + 1.3978e-5 * d,
            i: 0.7733 + 1.9e-8 * d,
            w: 96.6612 + 3.0565e-5 * d,
            a: 19.18171 - 1.55e-8 * d,
            e: 0.047318 + 7.45e-9 * d,
            m: 142.5905 + 0.011725806 * d,
        },
        Planet::Neptune => OrbitalElements {
            n: 131.7806 + 3.0173e-5 * d,
            i: 1.77 - 2.55e-7 * d,
            w: 272.8461 - 6.027e-6 * d,
            a: 30.05826 + 3.313e-8 * d,
            e: 0.008606 + 2.15e-9 * d,
            m: 260.2471 + 0.005995147 * d,
        },
    }
}

/// Elements looked up by identifier, e.g. from a settings file.
pub fn orbital_elements_by_id(id: &str, d: f64) -> Result<OrbitalElements, EphemerisError> {
    Ok(orbital_elements(id.parse()?, d))
}

/// Geocentric lunar elements; `a` is in Earth radii.
pub fn moon_elements(d: f64) -> OrbitalElements {
    OrbitalElements {
        n: 125.1228 - 0.0529538083 * d,
        i: 5.1454,
        w: 318.0634 + 0.1643573223 * d,
        a: 60.2666,
        e: 0.0549,
        m: 115.3654 + 13.0649929509 * d,
    }
}
