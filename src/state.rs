//! View state and the transitions that produce the next state.

use crate::frame::ReferenceFrame;
use crate::trend::{TrendCache, TrendOptions};
use crate::zodiac::SIGN_COUNT;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub show_stars: bool,
    pub show_labels: bool,
    pub show_trend: bool,
    pub vertical: bool,
    pub lock_frame: bool,
    pub show_travel: bool,
    pub show_timestamp: bool,
    pub locked_sign: usize,
    pub trend: TrendOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_stars: true,
            show_labels: true,
            show_trend: true,
            vertical: false,
            lock_frame: false,
            show_travel: true,
            show_timestamp: true,
            locked_sign: 0,
            trend: TrendOptions::default(),
        }
    }
}

impl ViewOptions {
    pub fn sanitized(self) -> Self {
        Self {
            locked_sign: if self.locked_sign < SIGN_COUNT {
                self.locked_sign
            } else {
                0
            },
            trend: self.trend.sanitized(),
            ..self
        }
    }

    pub fn frame(&self) -> ReferenceFrame {
        ReferenceFrame::from_options(self.lock_frame, self.locked_sign as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Stars,
    Labels,
    Trend,
    Vertical,
    FrameLock,
    Travel,
    Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(i32),
    Years(i32),
    JumpTo(DateTime<Utc>),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized time step: {0}")]
pub struct ParseNavigationError(String);

/// Parses steps like `+1-day`, `-2-week`, `3-month` or `-1-year`.
impl FromStr for Navigation {
    type Err = ParseNavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNavigationError(s.to_string());
        let body = s.trim();
        let (sign, rest) = match body.as_bytes().first() {
            Some(b'+') => (1, &body[1..]),
            Some(b'-') => (-1, &body[1..]),
            _ => (1, body),
        };
        let (amount, unit) = rest.split_once('-').ok_or_else(err)?;
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let amount: i64 = amount.parse().map_err(|_| err())?;
        let amount = sign * amount;
        let small = || i32::try_from(amount).map_err(|_| err());
        match unit {
            "hour" => Ok(Navigation::Hours(amount)),
            "day" => Ok(Navigation::Days(amount)),
            "week" => Ok(Navigation::Weeks(amount)),
            "month" => Ok(Navigation::Months(small()?)),
            "year" => Ok(Navigation::Years(small()?)),
            _ => Err(err()),
        }
    }
}

/// Everything `render` needs besides the ephemeris.
#[derive(Clone, Debug)]
pub struct AppState {
    pub instant: DateTime<Utc>,
    pub options: ViewOptions,
    pub paused: bool,
    pub trend_cache: TrendCache,
}

impl AppState {
    pub fn new(instant: DateTime<Utc>, options: ViewOptions) -> Self {
        Self {
            instant,
            options: options.sanitized(),
            paused: false,
            trend_cache: TrendCache::default(),
        }
    }

    /// One wall-clock second has passed.
    pub fn tick(self) -> Self {
        if self.paused {
            return self;
        }
        match self.instant.checked_add_signed(Duration::seconds(1)) {
            Some(instant) => Self { instant, ..self },
            None => self,
        }
    }

    pub fn navigate(self, nav: Navigation) -> Self {
        let instant = match nav {
            Navigation::Hours(n) => shift_by(self.instant, Duration::try_hours(n)),
            Navigation::Days(n) => shift_by(self.instant, Duration::try_days(n)),
            Navigation::Weeks(n) => shift_by(self.instant, Duration::try_weeks(n)),
            Navigation::Months(n) => shift_months(self.instant, n),
            Navigation::Years(n) => n.checked_mul(12).and_then(|m| shift_months(self.instant, m)),
            Navigation::JumpTo(t) => Some(t),
        };
        match instant {
            Some(instant) => Self { instant, ..self },
            None => {
                log::warn!("ignoring {:?}: outside the representable date range", nav);
                self
            }
        }
    }

    pub fn toggle(self, toggle: Toggle) -> Self {
        let mut options = self.options;
        match toggle {
            Toggle::Stars => options.show_stars = !options.show_stars,
            Toggle::Labels => options.show_labels = !options.show_labels,
            Toggle::Trend => options.show_trend = !options.show_trend,
            Toggle::Vertical => options.vertical = !options.vertical,
            Toggle::FrameLock => options.lock_frame = !options.lock_frame,
            Toggle::Travel => options.show_travel = !options.show_travel,
            Toggle::Timestamp => options.show_timestamp = !options.show_timestamp,
        }
        Self { options, ..self }
    }

    pub fn toggle_pause(self) -> Self {
        Self {
            paused: !self.paused,
            ..self
        }
    }

    /// Out-of-range indices select Aries.
    pub fn set_locked_sign(self, index: i64) -> Self {
        let locked_sign = usize::try_from(index)
            .ok()
            .filter(|&i| i < SIGN_COUNT)
            .unwrap_or(0);
        Self {
            options: ViewOptions {
                locked_sign,
                ..self.options
            },
            ..self
        }
    }

    /// Steps the locked sign, wrapping around the circle.
    pub fn cycle_locked_sign(self, delta: i64) -> Self {
        let next = (self.options.locked_sign as i64 + delta).rem_euclid(SIGN_COUNT as i64);
        self.set_locked_sign(next)
    }

    pub fn set_trend(self, trend: TrendOptions) -> Self {
        Self {
            options: ViewOptions {
                trend: trend.sanitized(),
                ..self.options
            },
            ..self
        }
    }

    pub fn frame(&self) -> ReferenceFrame {
        self.options.frame()
    }
}

fn shift_by(instant: DateTime<Utc>, step: Option<Duration>) -> Option<DateTime<Utc>> {
    step.and_then(|d| instant.checked_add_signed(d))
}

/// Clamps to the last day of the target month (Jan 31 + 1 month is Feb 28/29)
/// rather than rolling the overflow into the following month.
fn shift_months(instant: DateTime<Utc>, n: i32) -> Option<DateTime<Utc>> {
    let months = Months::new(n.unsigned_abs());
    if n >= 0 {
        instant.checked_add_months(months)
    } else {
        instant.checked_sub_months(months)
    }
}
