use std::io::Write;
use zodiacband::body::Body;
use zodiacband::view::{Frame, RenderPort};

pub(crate) const BAND_WIDTH: usize = 73;

/// Plain-text port used by `--once`.
pub(crate) struct TextRenderer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            width: BAND_WIDTH,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

fn slot(position: f64, width: usize) -> usize {
    let last = width.saturating_sub(1) as f64;
    (position.clamp(0.0, 1.0) * last).round() as usize
}

/// One line of band: `|` at sign boundaries, body glyphs on top in draw
/// order.
pub(crate) fn band_line(frame: &Frame, width: usize) -> String {
    let mut cells = vec!['-'; width];
    for marker in &frame.zodiac {
        cells[slot(marker.boundary_position, width)] = '|';
    }
    for body in frame.draw_order() {
        cells[slot(frame.bodies[body].position, width)] = body.glyph();
    }
    cells.into_iter().collect()
}

fn sign_line(frame: &Frame, width: usize) -> String {
    let mut cells = vec![' '; width];
    for marker in &frame.zodiac {
        cells[slot(marker.center_position, width)] = marker.sign.glyph;
    }
    cells.into_iter().collect()
}

impl<W: Write> RenderPort for TextRenderer<W> {
    fn draw(&mut self, frame: &Frame) -> anyhow::Result<()> {
        let out = &mut self.out;
        if let Some(ts) = &frame.timestamp {
            writeln!(out, "{ts}")?;
        }
        let frame_name = match frame.frame.locked_sign() {
            Some(sign) => format!("locked to {}", sign.name),
            None => "Sun-relative".to_string(),
        };
        writeln!(
            out,
            "frame: {} (origin {:.1}°)  source: {}",
            frame_name, frame.origin, frame.source
        )?;
        writeln!(out)?;
        writeln!(out, "{}", sign_line(frame, self.width))?;
        writeln!(out, "{}", band_line(frame, self.width))?;
        writeln!(out)?;

        for (body, rec) in frame.bodies.iter() {
            write!(
                out,
                "{} {:<8} {:<24} lat {:+5.2}°  {:>9.4} AU  {:+8.3}°/d  rel {:+7.2}° {}",
                body.glyph_text(),
                body.name(),
                rec.legend_value(),
                rec.latitude,
                rec.distance_au,
                rec.speed,
                rec.relative,
                rec.drift.icon(),
            )?;
            if rec.depth_front {
                write!(out, "  in front of the Sun")?;
            }
            writeln!(out)?;
        }

        if let Some(series) = &frame.trend {
            writeln!(out)?;
            writeln!(
                out,
                "trend ±{}d every {}h ({} samples): first / now / last",
                series.key.window_days,
                series.key.step_hours,
                series.len()
            )?;
            let mid = series.len() / 2;
            for body in Body::ALL {
                let angles = &series.angles[body];
                if let (Some(first), Some(now), Some(last)) =
                    (angles.first(), angles.get(mid), angles.last())
                {
                    writeln!(
                        out,
                        "{} {:<8} {:+7.1}° {:+7.1}° {:+7.1}°",
                        body.glyph_text(),
                        body.name(),
                        first,
                        now,
                        last
                    )?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}
