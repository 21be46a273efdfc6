use chrono::{DateTime, Duration, TimeZone, Utc};
use std::rc::Rc;
use zodiacband::angle::Spherical;
use zodiacband::ephemeris::{analytic_geocentric_positions, EphemerisMode};
use zodiacband::{
    render, AppState, Body, Ephemeris, EphemerisError, EphemerisOracle, Navigation,
    ReferenceFrame, Toggle, ViewOptions,
};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn trend_of(state: &AppState, eph: &Ephemeris) -> Rc<zodiacband::trend::TrendSeries> {
    render(state, eph).unwrap().trend.unwrap()
}

#[test]
fn test_trend_reused_within_the_hour() {
    let eph = Ephemeris::analytic();
    let state = AppState::new(utc(2024, 4, 8, 18, 5), ViewOptions::default());
    let first = trend_of(&state, &eph);
    let state = state.navigate(Navigation::JumpTo(utc(2024, 4, 8, 18, 55)));
    let second = trend_of(&state, &eph);
    assert!(Rc::ptr_eq(&first, &second));

    let state = state.tick().tick();
    assert!(Rc::ptr_eq(&first, &trend_of(&state, &eph)));
}

#[test]
fn test_trend_rebuilt_when_key_changes() {
    let eph = Ephemeris::analytic();
    let state = AppState::new(utc(2024, 4, 8, 18, 5), ViewOptions::default());
    let base = trend_of(&state, &eph);

    let state = state.navigate(Navigation::Hours(1));
    let next_hour = trend_of(&state, &eph);
    assert!(!Rc::ptr_eq(&base, &next_hour));
    assert_eq!(next_hour.key.hour, base.key.hour + 1);

    let state = state.toggle(Toggle::FrameLock);
    let locked = trend_of(&state, &eph);
    assert!(!Rc::ptr_eq(&next_hour, &locked));
    assert_eq!(locked.frame, ReferenceFrame::SignLocked(0));

    let state = state.cycle_locked_sign(1);
    let taurus = trend_of(&state, &eph);
    assert!(!Rc::ptr_eq(&locked, &taurus));

    let mut trend = state.options.trend;
    trend.step_hours = 6.0;
    let state = state.set_trend(trend);
    let finer = trend_of(&state, &eph);
    assert!(!Rc::ptr_eq(&taurus, &finer));
    assert_eq!(finer.len(), 241);
}

#[test]
fn test_locked_sign_ignored_while_unlocked() {
    let eph = Ephemeris::analytic();
    let state = AppState::new(utc(2010, 10, 10, 10, 10), ViewOptions::default());
    let a = trend_of(&state, &eph);
    let state = state.cycle_locked_sign(5);
    assert!(Rc::ptr_eq(&a, &trend_of(&state, &eph)));

    state.trend_cache.invalidate();
    assert!(state.trend_cache.cached_key().is_none());
    assert!(!Rc::ptr_eq(&a, &trend_of(&state, &eph)));
}

#[test]
fn test_locked_frame_measures_from_sign_centre() {
    let t = utc(2020, 12, 21, 18, 0);
    let state = AppState::new(
        t,
        ViewOptions {
            lock_frame: true,
            locked_sign: 9,
            ..ViewOptions::default()
        },
    );
    let frame = render(&state, &Ephemeris::analytic()).unwrap();
    assert_eq!(frame.origin, 285.0);
    let jupiter = &frame.bodies[Body::Jupiter];
    assert!((jupiter.relative - (jupiter.longitude - 285.0)).abs() < 1e-9);
    assert!(frame.bodies[Body::Sun].relative != 0.0);
    assert_eq!(frame.zodiac[9].center_rel, 0.0);
}

#[test]
fn test_sun_relative_drift_of_the_sun_is_stationary() {
    let frame = render(
        &AppState::new(utc(2015, 5, 5, 5, 5), ViewOptions::default()),
        &Ephemeris::analytic(),
    )
    .unwrap();
    let sun = &frame.bodies[Body::Sun];
    assert_eq!(sun.relative, 0.0);
    assert_eq!(sun.relative_speed, 0.0);
    assert!(sun.speed > 0.9 && sun.speed < 1.05);
}

#[test]
fn test_month_navigation_clamps() {
    let state = AppState::new(utc(2023, 3, 31, 8, 0), ViewOptions::default());
    let state = state.navigate(Navigation::Months(-1));
    assert_eq!(state.instant, utc(2023, 2, 28, 8, 0));
    let state = state.navigate(Navigation::Years(1)).navigate(Navigation::Weeks(-1));
    assert_eq!(state.instant, utc(2024, 2, 21, 8, 0));
    assert_eq!(state.instant - utc(2024, 2, 20, 8, 0), Duration::days(1));
}

#[test]
fn test_render_near_the_calendar_end_fails_cleanly() {
    let late = DateTime::<Utc>::MAX_UTC - Duration::days(10);
    let state = AppState::new(late, ViewOptions::default());
    assert!(matches!(
        render(&state, &Ephemeris::analytic()),
        Err(EphemerisError::PositionUnavailable { .. })
    ));

    let options = ViewOptions {
        show_trend: false,
        ..ViewOptions::default()
    };
    let frame = render(&AppState::new(late, options), &Ephemeris::analytic()).unwrap();
    assert!(frame.trend.is_none());
}

/// Answers for the Sun only, a degree ahead of the model.
struct SunOnly;

impl EphemerisOracle for SunOnly {
    fn name(&self) -> &str {
        "sun-only"
    }

    fn position(&self, body: Body, instant: DateTime<Utc>) -> Result<Spherical, EphemerisError> {
        match body {
            Body::Sun => {
                let sun = analytic_geocentric_positions(instant)[Body::Sun];
                Ok(Spherical {
                    lon: sun.lon + 1.0,
                    ..sun
                })
            }
            other => Err(EphemerisError::unavailable(other.id(), "not tabulated")),
        }
    }
}

#[test]
fn test_render_with_partial_oracle() {
    let t = utc(2019, 8, 1, 0, 0);
    let state = AppState::new(t, ViewOptions::default());

    let auto = Ephemeris::with_oracle(Box::new(SunOnly));
    let frame = render(&state, &auto).unwrap();
    let model = analytic_geocentric_positions(t);
    assert!((frame.bodies[Body::Sun].longitude - (model[Body::Sun].lon + 1.0)).abs() < 1e-9);
    assert_eq!(frame.bodies[Body::Mars].longitude, model[Body::Mars].lon);
    assert_eq!(frame.source, "sun-only");

    let strict = Ephemeris::new(EphemerisMode::Oracle, Some(Box::new(SunOnly)));
    match render(&state, &strict) {
        Err(EphemerisError::PositionUnavailable { body, .. }) => assert_eq!(body, "moon"),
        other => panic!("expected an unavailable position, got {other:?}"),
    }

    let missing = Ephemeris::new(EphemerisMode::Oracle, None);
    assert_eq!(
        render(&state, &missing).unwrap_err(),
        EphemerisError::MissingEphemeris
    );
}
