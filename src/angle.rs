//! Degree helpers and ecliptic coordinate conversions.

use serde::{Deserialize, Serialize};

pub fn to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

pub fn sin_deg(deg: f64) -> f64 {
    to_rad(deg).sin()
}

pub fn cos_deg(deg: f64) -> f64 {
    to_rad(deg).cos()
}

/// Reduces an angle in degrees to [0, 360).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % 360.0;
    let a = if a < 0.0 { a + 360.0 } else { a };
    // tiny negative inputs round up to exactly 360
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Shortest signed rotation from `origin` to `target`, in (-180, 180].
/// Positive means increasing longitude.
pub fn signed_delta(target: f64, origin: f64) -> f64 {
    let d = normalize_angle(target - origin);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangular {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rectangular {
    pub fn add(self, o: Rectangular) -> Rectangular {
        Rectangular {
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }

    pub fn sub(self, o: Rectangular) -> Rectangular {
        Rectangular {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }

    pub fn neg(self) -> Rectangular {
        Rectangular {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    pub fn len(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Ecliptic longitude/latitude in degrees and radius (AU unless noted).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub lon: f64,
    pub lat: f64,
    pub r: f64,
}

pub fn spherical_from_rectangular(p: Rectangular) -> Spherical {
    let Rectangular { x, y, z } = p;
    let lon = normalize_angle(to_deg(y.atan2(x)));
    let lat = to_deg(z.atan2((x * x + y * y).sqrt()));
    let r = (x * x + y * y + z * z).sqrt();
    Spherical { lon, lat, r }
}

pub fn rectangular_from_spherical(s: Spherical) -> Rectangular {
    let clat = cos_deg(s.lat);
    Rectangular {
        x: s.r * clat * cos_deg(s.lon),
        y: s.r * clat * sin_deg(s.lon),
        z: s.r * sin_deg(s.lat),
    }
}
