//! Windowed series of relative angles around the view instant, with a
//! single-entry memo.

use crate::body::BodyMap;
use crate::ephemeris::Ephemeris;
use crate::error::EphemerisError;
use crate::frame::ReferenceFrame;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_WINDOW_DAYS: f64 = 30.0;
pub const DEFAULT_STEP_HOURS: f64 = 12.0;
/// Upper bound on samples per side so a tiny step cannot stall a tick.
const MAX_HALF_SAMPLES: i64 = 1_000;
pub const MAX_WINDOW_DAYS: f64 = 36_500.0;
pub const MIN_STEP_HOURS: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendOptions {
    /// Half-width of the window, days.
    pub window_days: f64,
    pub step_hours: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            step_hours: DEFAULT_STEP_HOURS,
        }
    }
}

impl TrendOptions {
    /// Non-finite or out-of-range values revert to the defaults. The step is
    /// then capped at the full window.
    pub fn sanitized(self) -> Self {
        let window_days = if self.window_days.is_finite()
            && self.window_days > 0.0
            && self.window_days <= MAX_WINDOW_DAYS
        {
            self.window_days
        } else {
            DEFAULT_WINDOW_DAYS
        };
        let step_hours = if self.step_hours.is_finite() && self.step_hours >= MIN_STEP_HOURS {
            self.step_hours
        } else {
            DEFAULT_STEP_HOURS
        };
        Self {
            window_days,
            step_hours: step_hours.min(window_days * 24.0).max(MIN_STEP_HOURS),
        }
    }

    /// Samples on each side of the base instant.
    pub fn half_samples(&self) -> i64 {
        let n = (self.window_days * 24.0 / self.step_hours + 1e-9).floor() as i64;
        n.clamp(0, MAX_HALF_SAMPLES)
    }

    pub fn sample_count(&self) -> usize {
        (2 * self.half_samples() + 1) as usize
    }
}

/// Everything a cached series depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendKey {
    /// Whole hours since the Unix epoch.
    pub hour: i64,
    pub window_days: f64,
    pub step_hours: f64,
    pub locked: bool,
    pub locked_sign: usize,
}

impl TrendKey {
    pub fn new(base: DateTime<Utc>, options: TrendOptions, frame: ReferenceFrame) -> Self {
        let (locked, locked_sign) = match frame {
            ReferenceFrame::SunRelative => (false, 0),
            ReferenceFrame::SignLocked(i) => (true, i),
        };
        Self {
            hour: base.timestamp().div_euclid(3600),
            window_days: options.window_days,
            step_hours: options.step_hours,
            locked,
            locked_sign,
        }
    }

    pub fn base(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.hour * 3600, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrendSeries {
    pub key: TrendKey,
    pub frame: ReferenceFrame,
    /// Sample offsets from the hour-floored base, days.
    pub offsets_days: Vec<f64>,
    /// Signed angle from the frame origin at each sample.
    pub angles: BodyMap<Vec<f64>>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.offsets_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets_days.is_empty()
    }
}

pub fn build_trend_series(
    ephemeris: &Ephemeris,
    base: DateTime<Utc>,
    options: TrendOptions,
    frame: ReferenceFrame,
) -> Result<TrendSeries, EphemerisError> {
    let options = options.sanitized();
    let key = TrendKey::new(base, options, frame);
    let start = key.base();
    let n = options.half_samples();
    let step_ms = (options.step_hours * 3_600_000.0).round() as i64;

    let mut offsets_days = Vec::with_capacity(options.sample_count());
    let mut angles = BodyMap::from_fn(|_| Vec::with_capacity(options.sample_count()));
    for k in -n..=n {
        let at = k
            .checked_mul(step_ms)
            .and_then(Duration::try_milliseconds)
            .and_then(|offset| start.checked_add_signed(offset))
            .ok_or_else(|| {
                let reason = format!("sample {k} from {start} is out of range");
                EphemerisError::unavailable("trend", reason)
            })?;
        let rel = frame.relative_angles(&ephemeris.geocentric_longitudes(at)?);
        offsets_days.push(k as f64 * options.step_hours / 24.0);
        for (body, angle) in rel.iter() {
            angles[body].push(*angle);
        }
    }

    Ok(TrendSeries {
        key,
        frame,
        offsets_days,
        angles,
    })
}

/// Holds the most recent series; a lookup with a different key rebuilds.
#[derive(Clone, Debug, Default)]
pub struct TrendCache {
    cell: RefCell<Option<Rc<TrendSeries>>>,
}

impl TrendCache {
    pub fn get_or_build(
        &self,
        ephemeris: &Ephemeris,
        base: DateTime<Utc>,
        options: TrendOptions,
        frame: ReferenceFrame,
    ) -> Result<Rc<TrendSeries>, EphemerisError> {
        let key = TrendKey::new(base, options.sanitized(), frame);
        if let Some(series) = self.cell.borrow().as_ref() {
            if series.key == key {
                return Ok(Rc::clone(series));
            }
        }

        log::debug!("rebuilding trend series for {:?}", key);
        let series = Rc::new(build_trend_series(ephemeris, base, options, frame)?);
        *self.cell.borrow_mut() = Some(Rc::clone(&series));
        Ok(series)
    }

    pub fn invalidate(&self) {
        self.cell.borrow_mut().take();
    }

    pub fn cached_key(&self) -> Option<TrendKey> {
        self.cell.borrow().as_ref().map(|s| s.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;

    #[test]
    fn default_window_has_121_samples() {
        let opts = TrendOptions::default();
        assert_eq!(opts.half_samples(), 60);
        assert_eq!(opts.sample_count(), 121);
    }

    #[test]
    fn bad_options_fall_back() {
        let opts = TrendOptions {
            window_days: -3.0,
            step_hours: f64::NAN,
        }
        .sanitized();
        assert_eq!(opts, TrendOptions::default());
    }

    #[test]
    fn oversized_options_are_bounded() {
        let opts = TrendOptions {
            window_days: 1e9,
            step_hours: 1e7,
        }
        .sanitized();
        assert_eq!(opts.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(opts.step_hours, DEFAULT_WINDOW_DAYS * 24.0);
        assert_eq!(opts.sample_count(), 3);

        let tiny = TrendOptions {
            window_days: 1.0,
            step_hours: 1e-6,
        }
        .sanitized();
        assert_eq!(tiny.step_hours, DEFAULT_STEP_HOURS);
        assert_eq!(tiny.half_samples(), 2);
    }

    #[test]
    fn window_past_the_calendar_end_is_an_error() {
        let end = DateTime::<Utc>::MAX_UTC - Duration::days(2);
        let opts = TrendOptions::default();
        let frame = ReferenceFrame::SunRelative;
        let err = build_trend_series(&Ephemeris::analytic(), end, opts, frame).unwrap_err();
        assert!(matches!(err, EphemerisError::PositionUnavailable { .. }));
    }

    #[test]
    fn key_floors_to_the_hour() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 2, 3, 59, 59).unwrap();
        let frame = ReferenceFrame::SunRelative;
        let ka = TrendKey::new(a, TrendOptions::default(), frame);
        assert_eq!(ka, TrendKey::new(b, TrendOptions::default(), frame));
        assert_eq!(ka.base(), a);
        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(TrendKey::new(before_epoch, TrendOptions::default(), frame).hour, -1);
    }

    #[test]
    fn sun_row_is_flat_in_sun_frame() {
        let t = Utc.with_ymd_and_hms(2010, 6, 1, 0, 0, 0).unwrap();
        let opts = TrendOptions {
            window_days: 2.0,
            step_hours: 12.0,
        };
        let series =
            build_trend_series(&Ephemeris::analytic(), t, opts, ReferenceFrame::SunRelative)
                .unwrap();
        assert_eq!(series.len(), 9);
        assert!(series.angles[Body::Sun].iter().all(|&a| a == 0.0));
        assert_eq!(series.offsets_days.first(), Some(&-2.0));
        assert_eq!(series.offsets_days[4], 0.0);
    }
}
