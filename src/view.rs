//! Flattens one instant into a `Frame` that a rendering port can draw
//! without touching the ephemeris.

use crate::body::{glyph_text, Body, BodyMap};
use crate::depth::{depth_ordering, DepthParams};
use crate::ephemeris::Ephemeris;
use crate::error::EphemerisError;
use crate::frame::ReferenceFrame;
use crate::motion::{motion_snapshot, Direction, DEFAULT_DELTA_HOURS};
use crate::state::{AppState, ViewOptions};
use crate::trend::TrendSeries;
use crate::zodiac::{sign_from_longitude, ZodiacSign, SIGNS};
use chrono::{DateTime, Utc};
use std::rc::Rc;

pub const LABEL_LANES: usize = 3;
/// Minimum spacing between labels sharing a lane, as a fraction of the band.
pub const LABEL_MIN_GAP: f64 = 0.08;

/// Anything that can show a frame.
pub trait RenderPort {
    fn draw(&mut self, frame: &Frame) -> anyhow::Result<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct BodyRecord {
    pub body: Body,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_au: f64,
    /// Signed angle from the frame origin.
    pub relative: f64,
    /// 0.0 at the left (top) edge of the band, 1.0 at the right (bottom).
    pub position: f64,
    pub speed: f64,
    pub direction: Direction,
    pub relative_speed: f64,
    pub drift: Direction,
    pub depth_front: bool,
    pub sign: &'static ZodiacSign,
    /// `None` when the label is hidden or labels are off.
    pub label_lane: Option<usize>,
}

impl BodyRecord {
    pub fn legend_value(&self) -> String {
        format!(
            "{} {} {:.1}° {}",
            glyph_text(self.sign.glyph),
            self.sign.name,
            self.longitude,
            self.direction.icon()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZodiacMarker {
    pub sign: &'static ZodiacSign,
    pub boundary_rel: f64,
    pub boundary_position: f64,
    pub center_rel: f64,
    pub center_position: f64,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub instant: DateTime<Utc>,
    pub timestamp: Option<String>,
    pub frame: ReferenceFrame,
    /// Ecliptic longitude at the centre of the band.
    pub origin: f64,
    pub bodies: BodyMap<BodyRecord>,
    pub zodiac: Vec<ZodiacMarker>,
    pub trend: Option<Rc<TrendSeries>>,
    pub options: ViewOptions,
    pub source: String,
    pub paused: bool,
}

impl Frame {
    /// Behind-Sun bodies first, then the Sun, then anything in front of it.
    pub fn draw_order(&self) -> Vec<Body> {
        let behind = Body::ALL
            .into_iter()
            .filter(|&b| !b.is_reference() && !self.bodies[b].depth_front);
        let front = Body::ALL.into_iter().filter(|&b| self.bodies[b].depth_front);
        behind.chain(std::iter::once(Body::Sun)).chain(front).collect()
    }
}

pub fn rel_to_position(rel: f64) -> f64 {
    (rel + 180.0) / 360.0
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("UTC %Y-%m-%d %H:%M").to_string()
}

/// Greedy left-to-right lane assignment. The Sun never gets a label; a
/// label with no free lane is hidden.
pub fn layout_labels(positions: &BodyMap<f64>) -> BodyMap<Option<usize>> {
    let mut order: Vec<Body> = Body::ALL
        .into_iter()
        .filter(|b| !b.is_reference())
        .collect();
    order.sort_by(|a, b| positions[*a].total_cmp(&positions[*b]));

    let mut lanes: [Option<f64>; LABEL_LANES] = [None; LABEL_LANES];
    let mut out = BodyMap::from_fn(|_| None);
    for body in order {
        let x = positions[body];
        let free = lanes
            .iter()
            .position(|last| last.map_or(true, |l| x - l >= LABEL_MIN_GAP - 1e-12));
        if let Some(lane) = free {
            lanes[lane] = Some(x);
            out[body] = Some(lane);
        }
    }
    out
}

pub fn zodiac_markers(frame: ReferenceFrame, sun_lon: f64) -> Vec<ZodiacMarker> {
    SIGNS
        .iter()
        .map(|sign| {
            let boundary_rel = frame.relative(sign.start_lon(), sun_lon);
            let center_rel = frame.relative(sign.center_lon(), sun_lon);
            ZodiacMarker {
                sign,
                boundary_rel,
                boundary_position: rel_to_position(boundary_rel),
                center_rel,
                center_position: rel_to_position(center_rel),
            }
        })
        .collect()
}

pub fn render(state: &AppState, ephemeris: &Ephemeris) -> Result<Frame, EphemerisError> {
    render_with_depth(state, ephemeris, &DepthParams::default())
}

/// `render` with a proximity threshold matched to the port's marker sizes.
pub fn render_with_depth(
    state: &AppState,
    ephemeris: &Ephemeris,
    depth: &DepthParams,
) -> Result<Frame, EphemerisError> {
    let options = state.options;
    let frame = state.frame();
    let snapshot = motion_snapshot(ephemeris, state.instant, DEFAULT_DELTA_HOURS)?;
    let positions = &snapshot.positions;
    let sun_lon = positions[Body::Sun].lon;

    let relative = frame.relative_angles(&positions.map(|_, p| p.lon));
    let band = relative.map(|_, &rel| rel_to_position(rel));
    let front = depth_ordering(positions, depth);
    let lanes = if options.show_labels {
        layout_labels(&band)
    } else {
        BodyMap::from_fn(|_| None)
    };

    let bodies = BodyMap::from_fn(|body| {
        let pos = positions[body];
        let motion = snapshot.details[body];
        BodyRecord {
            body,
            longitude: pos.lon,
            latitude: pos.lat,
            distance_au: pos.r,
            relative: relative[body],
            position: band[body],
            speed: motion.speed,
            direction: motion.direction,
            relative_speed: motion.relative_speed,
            drift: motion.drift,
            depth_front: front[body],
            sign: sign_from_longitude(pos.lon),
            label_lane: lanes[body],
        }
    });

    let trend = if options.show_trend {
        Some(
            state
                .trend_cache
                .get_or_build(ephemeris, state.instant, options.trend, frame)?,
        )
    } else {
        None
    };

    Ok(Frame {
        instant: state.instant,
        timestamp: options.show_timestamp.then(|| format_timestamp(state.instant)),
        frame,
        origin: frame.origin(sun_lon),
        bodies,
        zodiac: zodiac_markers(frame, sun_lon),
        trend,
        options,
        source: ephemeris.source_label().to_string(),
        paused: state.paused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn spread(xs: [f64; 9]) -> BodyMap<f64> {
        BodyMap::from_fn(|b| xs[b.index()])
    }

    #[test]
    fn band_position_maps_the_circle() {
        assert_eq!(rel_to_position(-180.0), 0.0);
        assert_eq!(rel_to_position(0.0), 0.5);
        assert_eq!(rel_to_position(180.0), 1.0);
    }

    #[test]
    fn labels_stack_into_three_lanes() {
        // sun, moon, mercury, venus, mars, jupiter, saturn, uranus, neptune
        let lanes = layout_labels(&spread([0.5, 0.10, 0.11, 0.12, 0.13, 0.18, 0.30, 0.31, 0.90]));
        assert_eq!(lanes[Body::Sun], None);
        assert_eq!(lanes[Body::Moon], Some(0));
        assert_eq!(lanes[Body::Mercury], Some(1));
        assert_eq!(lanes[Body::Venus], Some(2));
        assert_eq!(lanes[Body::Mars], None);
        assert_eq!(lanes[Body::Jupiter], Some(0));
        assert_eq!(lanes[Body::Saturn], Some(0));
        assert_eq!(lanes[Body::Uranus], Some(1));
        assert_eq!(lanes[Body::Neptune], Some(0));
    }

    #[test]
    fn zodiac_follows_the_frame() {
        let locked = zodiac_markers(ReferenceFrame::SignLocked(0), 200.0);
        assert_eq!(locked.len(), 12);
        assert_eq!(locked[0].center_rel, 0.0);
        assert_eq!(locked[0].center_position, 0.5);
        assert_eq!(locked[1].boundary_rel, 15.0);

        let sun = zodiac_markers(ReferenceFrame::SunRelative, 10.0);
        assert_eq!(sun[0].boundary_rel, -10.0);
        assert_eq!(sun[0].center_rel, 5.0);
    }

    #[test]
    fn timestamp_is_minute_precision() {
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 7, 59).unwrap();
        assert_eq!(format_timestamp(t), "UTC 2024-04-08 18:07");
    }

    #[test]
    fn rendered_frame_is_consistent() {
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        let state = AppState::new(t, ViewOptions::default());
        let frame = render(&state, &Ephemeris::analytic()).unwrap();
        let sun = &frame.bodies[Body::Sun];
        assert_eq!(sun.relative, 0.0);
        assert_eq!(sun.position, 0.5);
        assert_eq!(sun.label_lane, None);
        assert_eq!(sun.sign.name, "Aries");
        assert!(frame.bodies[Body::Moon].depth_front);
        assert_eq!(frame.trend.as_ref().map(|t| t.len()), Some(121));
        assert_eq!(frame.timestamp.as_deref(), Some("UTC 2024-04-08 18:00"));

        let order = frame.draw_order();
        assert_eq!(order.len(), 9);
        let at = |b: Body| order.iter().position(|&o| o == b);
        assert!(at(Body::Sun) < at(Body::Moon));
        assert!(at(Body::Saturn) < at(Body::Sun));
        for (body, record) in frame.bodies.iter() {
            assert_eq!(record.body, body);
            assert!((0.0..=1.0).contains(&record.position));
        }
    }

    #[test]
    fn hidden_features_are_left_out() {
        let t = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap();
        let opts = ViewOptions {
            show_trend: false,
            show_labels: false,
            show_timestamp: false,
            ..ViewOptions::default()
        };
        let frame = render(&AppState::new(t, opts), &Ephemeris::analytic()).unwrap();
        assert!(frame.trend.is_none());
        assert!(frame.timestamp.is_none());
        assert!(frame.bodies.iter().all(|(_, r)| r.label_lane.is_none()));
    }

    #[test]
    fn legend_shows_sign_longitude_and_direction() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let frame = render(&AppState::new(t, ViewOptions::default()), &Ephemeris::analytic())
            .unwrap();
        assert_eq!(
            frame.bodies[Body::Sun].legend_value(),
            "♑\u{FE0E} Capricorn 280.4° >"
        );
    }
}
