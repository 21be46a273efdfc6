//! Source selection between an injected high-precision oracle and the
//! analytic model.

use crate::angle::{normalize_angle, Spherical};
use crate::body::{Body, BodyMap};
use crate::error::EphemerisError;
use crate::position::geocentric_positions_at;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Julian day of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian day of day zero of the element table (1999-12-31T00:00Z).
pub const ELEMENT_EPOCH_JD: f64 = 2_451_543.5;

pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

pub fn days_since_epoch(instant: DateTime<Utc>) -> f64 {
    julian_day(instant) - ELEMENT_EPOCH_JD
}

/// A high-precision ephemeris provided from outside the crate.
pub trait EphemerisOracle {
    fn name(&self) -> &str {
        "oracle"
    }

    /// Geocentric ecliptic longitude/latitude in degrees and distance in AU.
    fn position(&self, body: Body, instant: DateTime<Utc>) -> Result<Spherical, EphemerisError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisMode {
    /// Analytic model only; any oracle is ignored.
    Analytic,
    /// Oracle when it answers, analytic model otherwise.
    #[default]
    Auto,
    /// Oracle required.
    Oracle,
}

pub struct Ephemeris {
    mode: EphemerisMode,
    oracle: Option<Box<dyn EphemerisOracle>>,
}

impl fmt::Debug for Ephemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ephemeris")
            .field("mode", &self.mode)
            .field("oracle", &self.oracle.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self::analytic()
    }
}

impl Ephemeris {
    pub fn analytic() -> Self {
        Self {
            mode: EphemerisMode::Analytic,
            oracle: None,
        }
    }

    pub fn new(mode: EphemerisMode, oracle: Option<Box<dyn EphemerisOracle>>) -> Self {
        Self { mode, oracle }
    }

    pub fn with_oracle(oracle: Box<dyn EphemerisOracle>) -> Self {
        Self::new(EphemerisMode::Auto, Some(oracle))
    }

    pub fn mode(&self) -> EphemerisMode {
        self.mode
    }

    pub fn source_label(&self) -> &str {
        match (self.mode, &self.oracle) {
            (EphemerisMode::Analytic, _) | (_, None) => "analytic",
            (_, Some(oracle)) => oracle.name(),
        }
    }

    /// Apparent geocentric positions of every body. Longitudes are in
    /// [0, 360), distances in AU.
    pub fn geocentric_positions(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<BodyMap<Spherical>, EphemerisError> {
        match (self.mode, &self.oracle) {
            (EphemerisMode::Analytic, _) | (EphemerisMode::Auto, None) => {
                Ok(analytic_geocentric_positions(instant))
            }
            (EphemerisMode::Oracle, None) => Err(EphemerisError::MissingEphemeris),
            (EphemerisMode::Oracle, Some(oracle)) => BodyMap::try_from_fn(|body| {
                oracle
                    .position(body, instant)
                    .map(normalized)
                    .map_err(|e| EphemerisError::unavailable(body.id(), e.to_string()))
            }),
            (EphemerisMode::Auto, Some(oracle)) => {
                let mut fallback: Option<BodyMap<Spherical>> = None;
                Ok(BodyMap::from_fn(|body| match oracle.position(body, instant) {
                    Ok(pos) => normalized(pos),
                    Err(e) => {
                        log::debug!(
                            "{} has no {} position at {}: {}; using analytic model",
                            oracle.name(),
                            body.id(),
                            instant,
                            e
                        );
                        fallback
                            .get_or_insert_with(|| analytic_geocentric_positions(instant))[body]
                    }
                }))
            }
        }
    }

    pub fn geocentric_longitudes(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<BodyMap<f64>, EphemerisError> {
        Ok(self.geocentric_positions(instant)?.map(|_, p| p.lon))
    }
}

fn normalized(pos: Spherical) -> Spherical {
    Spherical {
        lon: normalize_angle(pos.lon),
        ..pos
    }
}

pub fn analytic_geocentric_positions(instant: DateTime<Utc>) -> BodyMap<Spherical> {
    geocentric_positions_at(days_since_epoch(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Fixed;

    impl EphemerisOracle for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn position(&self, body: Body, _: DateTime<Utc>) -> Result<Spherical, EphemerisError> {
            match body {
                Body::Neptune => Err(EphemerisError::unavailable("neptune", "out of range")),
                _ => Ok(Spherical {
                    lon: -10.0 * body.index() as f64,
                    lat: 0.0,
                    r: 1.0,
                }),
            }
        }
    }

    #[test]
    fn day_numbers() {
        let day_zero = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(days_since_epoch(day_zero), 0.0);
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(julian_day(j2000), 2_451_545.0);
        assert_eq!(days_since_epoch(j2000), 1.5);
    }

    #[test]
    fn oracle_mode_without_oracle_is_missing() {
        let eph = Ephemeris::new(EphemerisMode::Oracle, None);
        assert_eq!(
            eph.geocentric_positions(Utc::now()).unwrap_err(),
            EphemerisError::MissingEphemeris
        );
    }

    #[test]
    fn oracle_mode_surfaces_unavailable() {
        let eph = Ephemeris::new(EphemerisMode::Oracle, Some(Box::new(Fixed)));
        match eph.geocentric_positions(Utc::now()) {
            Err(EphemerisError::PositionUnavailable { body, .. }) => assert_eq!(body, "neptune"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn auto_mode_falls_back_per_body() {
        let t = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let eph = Ephemeris::with_oracle(Box::new(Fixed));
        let lons = eph.geocentric_longitudes(t).unwrap();
        assert_eq!(lons[Body::Sun], 0.0);
        assert_eq!(lons[Body::Moon], 350.0);
        let analytic = analytic_geocentric_positions(t);
        assert_eq!(lons[Body::Neptune], analytic[Body::Neptune].lon);
        assert_eq!(eph.source_label(), "fixed");
    }

    #[test]
    fn analytic_mode_ignores_oracle() {
        let t = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let eph = Ephemeris::new(EphemerisMode::Analytic, Some(Box::new(Fixed)));
        let got = eph.geocentric_positions(t).unwrap();
        assert_eq!(got, analytic_geocentric_positions(t));
        assert_eq!(eph.source_label(), "analytic");
    }
}
