//! Finite-difference angular speeds and their direction classes.

use crate::angle::{signed_delta, Spherical};
use crate::body::{Body, BodyMap};
use crate::ephemeris::Ephemeris;
use crate::error::EphemerisError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Speeds below this (deg/day) count as stationary.
pub const STATIONARY_DEG_PER_DAY: f64 = 0.005;
pub const DEFAULT_DELTA_HOURS: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Retrograde,
    Stationary,
    Prograde,
}

impl Direction {
    pub fn classify(speed: f64) -> Self {
        if speed.abs() < STATIONARY_DEG_PER_DAY {
            Direction::Stationary
        } else if speed > 0.0 {
            Direction::Prograde
        } else {
            Direction::Retrograde
        }
    }

    pub fn icon(self) -> char {
        match self {
            Direction::Retrograde => '<',
            Direction::Stationary => '•',
            Direction::Prograde => '>',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Ecliptic longitude speed, deg/day.
    pub speed: f64,
    pub direction: Direction,
    /// Speed of the Sun-relative angle, deg/day.
    pub relative_speed: f64,
    pub drift: Direction,
}

impl MotionSample {
    /// Derives motion from longitudes `days` apart; `sun_*` are the Sun's
    /// longitudes at the same two instants.
    pub fn from_longitudes(
        body: Body,
        lon_now: f64,
        lon_next: f64,
        sun_now: f64,
        sun_next: f64,
        days: f64,
    ) -> Self {
        let speed = signed_delta(lon_next, lon_now) / days;
        let (rel_now, rel_next) = if body.is_reference() {
            (0.0, 0.0)
        } else {
            (signed_delta(lon_now, sun_now), signed_delta(lon_next, sun_next))
        };
        let relative_speed = signed_delta(rel_next, rel_now) / days;
        Self {
            speed,
            direction: Direction::classify(speed),
            relative_speed,
            drift: Direction::classify(relative_speed),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MotionSnapshot {
    pub instant: DateTime<Utc>,
    /// Full positions at `instant`; depth ordering needs the distances.
    pub positions: BodyMap<Spherical>,
    pub next: BodyMap<f64>,
    pub details: BodyMap<MotionSample>,
}

pub fn motion_snapshot(
    ephemeris: &Ephemeris,
    instant: DateTime<Utc>,
    delta_hours: f64,
) -> Result<MotionSnapshot, EphemerisError> {
    let later = Duration::try_milliseconds((delta_hours * 3_600_000.0).round() as i64)
        .and_then(|step| instant.checked_add_signed(step))
        .ok_or_else(|| {
            let reason = format!("{delta_hours} h after {instant} is out of range");
            EphemerisError::unavailable("motion", reason)
        })?;
    let days = delta_hours / 24.0;
    let positions = ephemeris.geocentric_positions(instant)?;
    let next = ephemeris.geocentric_longitudes(later)?;

    let sun_now = positions[Body::Sun].lon;
    let sun_next = next[Body::Sun];
    let details = BodyMap::from_fn(|body| {
        let lon_now = positions[body].lon;
        MotionSample::from_longitudes(body, lon_now, next[body], sun_now, sun_next, days)
    });

    Ok(MotionSnapshot {
        instant,
        positions,
        next,
        details,
    })
}
