use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zodiacband::ephemeris::analytic_geocentric_positions;
use zodiacband::frame::ReferenceFrame;
use zodiacband::kepler::solve_kepler;
use zodiacband::trend::{build_trend_series, TrendOptions};
use zodiacband::{render, AppState, Ephemeris, ViewOptions};

fn bench_positions(c: &mut Criterion) {
    let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();

    c.bench_function("solve_kepler", |b| {
        b.iter(|| solve_kepler(black_box(1.2), black_box(0.2056)))
    });

    c.bench_function("geocentric_positions", |b| {
        b.iter(|| analytic_geocentric_positions(black_box(t)))
    });

    let eph = Ephemeris::analytic();
    c.bench_function("trend_series_default", |b| {
        b.iter(|| {
            build_trend_series(
                &eph,
                black_box(t),
                TrendOptions::default(),
                ReferenceFrame::SunRelative,
            )
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let eph = Ephemeris::analytic();
    let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();

    // cached trend: same hour every iteration
    let state = AppState::new(t, ViewOptions::default());
    c.bench_function("render_cached", |b| b.iter(|| render(black_box(&state), &eph)));

    let mut hour = 0;
    c.bench_function("render_uncached", |b| {
        b.iter(|| {
            hour += 1;
            let state = AppState::new(t + Duration::hours(hour), ViewOptions::default());
            render(black_box(&state), &eph)
        })
    });
}

criterion_group!(benches, bench_positions, bench_render);
criterion_main!(benches);
