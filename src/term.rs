use crossterm::{
    cursor, execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;
use std::io::{self, Write};
use std::time::Instant;
use zodiacband::body::Body;
use zodiacband::depth::DepthParams;
use zodiacband::frame::ReferenceFrame;
use zodiacband::trend::TrendSeries;
use zodiacband::view::{Frame, RenderPort, LABEL_LANES, LABEL_MIN_GAP};

const BG: Color = Color::Black;
const DIM: Color = Color::Rgb { r: 70, g: 80, b: 90 };
const TEXT: Color = Color::Rgb { r: 200, g: 200, b: 210 };
const SUN_MARKER_CELLS: f64 = 3.0;
/// Vertical layout: columns given to each label lane.
const LANE_COLS: u16 = 9;
/// One star per this many cells.
const STAR_SPACING: usize = 90;

const CONTROLS: &str = "←/→ day  ↑/↓ week  PgUp/PgDn month  Home/End year  [/] hour  \
n now  p pause  s l t v f c u toggles  ,/. sign  q quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: BG,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn put(&mut self, x: u16, y: u16, ch: char, fg: Color, bold: bool) {
        self.set(x, y, Cell { ch, fg, bg: BG, bold });
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }

    /// Writes until the right edge; returns the number of cells used.
    pub(crate) fn write_str(&mut self, x: u16, y: u16, s: &str, fg: Color) -> u16 {
        let mut n = 0;
        for (i, ch) in s.chars().enumerate() {
            let xi = x as usize + i;
            if xi >= self.w as usize {
                break;
            }
            self.put(xi as u16, y, ch, fg, false);
            n += 1;
        }
        n
    }

    pub(crate) fn box_draw(&mut self, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color) {
        if bw < 2 || bh < 2 {
            return;
        }
        let x1 = x0.saturating_add(bw - 1);
        let y1 = y0.saturating_add(bh - 1);
        for x in x0 + 1..x1 {
            self.put(x, y0, '─', fg, false);
            self.put(x, y1, '─', fg, false);
        }
        for y in y0 + 1..y1 {
            self.put(x0, y, '│', fg, false);
            self.put(x1, y, '│', fg, false);
        }
        self.put(x0, y0, '┌', fg, false);
        self.put(x1, y0, '┐', fg, false);
        self.put(x0, y1, '└', fg, false);
        self.put(x1, y1, '┘', fg, false);
    }

    #[cfg(test)]
    pub(crate) fn row_text(&self, y: u16) -> String {
        (0..self.w).filter_map(|x| self.get(x, y)).map(|c| c.ch).collect()
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    cols: u16,
    rows: u16,
    prev: CellBuffer,
    cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = false;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if c.bold != last_bold {
                    // NormalIntensity also resets colours on some terminals
                    let attr = if c.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                    last_fg = None;
                    last_bg = None;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Star {
    x: u16,
    y: u16,
    phase: f32,
    depth: f32,
}

pub(crate) fn build_stars(w: u16, h: u16, seed: u64) -> Vec<Star> {
    let count = (w as usize * h as usize) / STAR_SPACING;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stars = Vec::with_capacity(count);
    if w == 0 || h == 0 {
        return stars;
    }
    for _ in 0..count {
        stars.push(Star {
            x: rng.gen_range(0..w),
            y: rng.gen_range(0..h),
            phase: rng.gen_range(0.0..(PI * 2.0)),
            depth: rng.gen_range(0.35..1.0),
        });
    }
    stars
}

fn draw_stars(buf: &mut CellBuffer, stars: &[Star], t: f32) {
    for s in stars {
        let tw = (t * 0.65 + s.phase).sin() * 0.5 + 0.5;
        let b = 0.2 + 0.8 * tw * s.depth;
        let c = (40.0 + b * 140.0).clamp(0.0, 255.0) as u8;
        let ch = if b > 0.82 { '✦' } else if b > 0.62 { '•' } else { '·' };
        let fg = Color::Rgb {
            r: c,
            g: c,
            b: (c as u16 + 25).min(255) as u8,
        };
        buf.put(s.x, s.y, ch, fg, false);
    }
}

fn body_color(body: Body) -> Color {
    let (r, g, b) = match body {
        Body::Sun => (255, 190, 90),
        Body::Moon => (215, 215, 230),
        Body::Mercury => (170, 170, 185),
        Body::Venus => (235, 180, 90),
        Body::Mars => (225, 95, 65),
        Body::Jupiter => (215, 175, 125),
        Body::Saturn => (225, 205, 145),
        Body::Uranus => (125, 210, 230),
        Body::Neptune => (95, 135, 255),
    };
    Color::Rgb { r, g, b }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Sign,
    Track,
    Lane(usize),
}

/// Where the band sits on screen. `along` runs left to right (top to bottom
/// when vertical); slots stack across it.
#[derive(Clone, Copy, Debug)]
struct BandLayout {
    vertical: bool,
    x0: u16,
    y0: u16,
    len: u16,
}

impl BandLayout {
    fn new(w: u16, h: u16, vertical: bool) -> Self {
        let len = if vertical {
            h.saturating_sub(4)
        } else {
            w.saturating_sub(4)
        };
        Self {
            vertical,
            x0: 2,
            y0: 2,
            len,
        }
    }

    fn along(&self, pos: f64) -> u16 {
        let last = self.len.saturating_sub(1) as f64;
        (pos.clamp(0.0, 1.0) * last).round() as u16
    }

    fn cross(&self, slot: Slot) -> u16 {
        match (self.vertical, slot) {
            (_, Slot::Sign) => 0,
            (false, Slot::Track) => 1,
            (true, Slot::Track) => 2,
            (false, Slot::Lane(l)) => 2 + l as u16,
            (true, Slot::Lane(l)) => 4 + l as u16 * LANE_COLS,
        }
    }

    fn cell(&self, along: u16, slot: Slot) -> (u16, u16) {
        let cross = self.cross(slot);
        if self.vertical {
            (self.x0 + cross, self.y0 + along)
        } else {
            (self.x0 + along, self.y0 + cross)
        }
    }

    fn at(&self, pos: f64, slot: Slot) -> (u16, u16) {
        self.cell(self.along(pos), slot)
    }

    /// Outer box: (x, y, w, h).
    fn frame_box(&self) -> (u16, u16, u16, u16) {
        let depth = self.cross(Slot::Lane(LABEL_LANES - 1)) + 1;
        let depth = if self.vertical { depth + LANE_COLS - 1 } else { depth };
        let (w, h) = if self.vertical {
            (depth + 2, self.len + 2)
        } else {
            (self.len + 2, depth + 2)
        };
        (self.x0 - 1, self.y0 - 1, w, h)
    }

    /// Top-left corner of the area left for the legend and trend chart.
    fn panel_origin(&self) -> (u16, u16) {
        let (x, y, w, h) = self.frame_box();
        if self.vertical {
            (x + w + 2, y)
        } else {
            (x + 1, y + h)
        }
    }

    fn label_cells(&self) -> usize {
        if self.vertical {
            (LANE_COLS - 1) as usize
        } else {
            ((LABEL_MIN_GAP * self.len as f64).floor() as usize)
                .saturating_sub(1)
                .max(3)
        }
    }
}

fn ink(c: Color, color: bool) -> Color {
    if color {
        c
    } else {
        Color::White
    }
}

fn frame_description(frame: &Frame) -> String {
    match frame.frame.locked_sign() {
        Some(sign) => format!("locked to {} {}", sign.glyph, sign.name),
        None => "Sun-relative".to_string(),
    }
}

fn draw_header(buf: &mut CellBuffer, frame: &Frame) {
    let left = format!(
        " zodiacband │ {} │ {}",
        frame_description(frame),
        frame.source
    );
    buf.write_str(0, 0, &left, TEXT);

    let mut right = frame.timestamp.clone().unwrap_or_default();
    if frame.paused {
        right.push_str(" [paused]");
    }
    let n = right.chars().count() as u16;
    if n > 0 {
        buf.write_str(buf.w.saturating_sub(n + 1), 0, &right, Color::White);
    }
}

fn draw_band(buf: &mut CellBuffer, frame: &Frame, band: &BandLayout, color: bool) {
    if band.len < 8 {
        return;
    }
    let (bx, by, bw, bh) = band.frame_box();
    buf.box_draw(bx, by, bw, bh, DIM);

    let rail = if band.vertical { '│' } else { '─' };
    for i in 0..band.len {
        let (x, y) = band.cell(i, Slot::Track);
        buf.put(x, y, rail, DIM, false);
    }

    for marker in &frame.zodiac {
        let (x, y) = band.at(marker.boundary_position, Slot::Track);
        buf.put(x, y, '┼', DIM, false);
        let (x, y) = band.at(marker.center_position, Slot::Sign);
        buf.put(x, y, marker.sign.glyph, ink(TEXT, color), false);
    }

    for body in frame.draw_order() {
        let rec = &frame.bodies[body];
        let fg = ink(body_color(body), color);
        let along = band.along(rec.position);
        if body.is_reference() {
            let glow = if band.vertical { '‖' } else { '═' };
            for side in [along.checked_sub(1), Some(along + 1)].into_iter().flatten() {
                if side < band.len {
                    let (x, y) = band.cell(side, Slot::Track);
                    buf.put(x, y, glow, fg, false);
                }
            }
        }
        let (x, y) = band.cell(along, Slot::Track);
        buf.put(x, y, body.glyph(), fg, true);

        if let Some(lane) = rec.label_lane {
            let name: String = body.name().chars().take(band.label_cells()).collect();
            let (mut x, y) = band.cell(along, Slot::Lane(lane));
            if !band.vertical {
                let right_edge = band.x0 + band.len;
                x = x.min(right_edge.saturating_sub(name.chars().count() as u16));
            }
            buf.write_str(x, y, &name, fg);
        }
    }
}

/// Returns the first free row below the legend.
fn draw_legend(buf: &mut CellBuffer, frame: &Frame, x: u16, y: u16, color: bool) -> u16 {
    let mut row = y;
    for (body, rec) in frame.bodies.iter() {
        let line = format!(
            "{} {:<8} {} {:<11} {:>6.1}° {}  drift {} {:+7.1}°{}",
            body.glyph(),
            body.name(),
            rec.sign.glyph,
            rec.sign.name,
            rec.longitude,
            rec.direction.icon(),
            rec.drift.icon(),
            rec.relative,
            if rec.depth_front { "  front" } else { "" }
        );
        buf.write_str(x, row, &line, ink(body_color(body), color));
        row += 1;
    }
    row
}

fn draw_trend(
    buf: &mut CellBuffer,
    series: &TrendSeries,
    rect: (u16, u16, u16, u16),
    color: bool,
) {
    let (x0, y0, w, h) = rect;
    if w < 12 || h < 5 || series.is_empty() {
        return;
    }
    buf.box_draw(x0, y0, w, h, DIM);
    let title = format!(
        " trend ±{}d / {}h ",
        series.key.window_days, series.key.step_hours
    );
    buf.write_str(x0 + 2, y0, &title, TEXT);

    let (ix, iy, iw, ih) = (x0 + 1, y0 + 1, w - 2, h - 2);
    let col = |k: usize| -> u16 {
        let last = (series.len() - 1).max(1) as f64;
        ix + ((k as f64 / last) * (iw - 1) as f64).round() as u16
    };
    let row = |angle: f64| -> u16 {
        let t = ((180.0 - angle) / 360.0).clamp(0.0, 1.0);
        iy + (t * (ih - 1) as f64).round() as u16
    };

    for x in ix..ix + iw {
        buf.put(x, row(0.0), '┄', DIM, false);
    }
    let now = col(series.len() / 2);
    for y in iy..iy + ih {
        buf.put(now, y, '┆', DIM, false);
    }

    // Sun last so it stays visible in its own frame
    let order = Body::ALL.into_iter().filter(|b| !b.is_reference()).chain([Body::Sun]);
    for body in order {
        if series.frame == ReferenceFrame::SunRelative && body.is_reference() {
            continue;
        }
        let fg = ink(body_color(body), color);
        for (k, &angle) in series.angles[body].iter().enumerate() {
            buf.put(col(k), row(angle), '•', fg, false);
        }
    }
}

/// Draws one full screen into `buf`.
pub(crate) fn compose(buf: &mut CellBuffer, frame: &Frame, stars: &[Star], t: f32, color: bool) {
    buf.clear(BG);
    if frame.options.show_stars {
        draw_stars(buf, stars, t);
    }
    draw_header(buf, frame);

    let band = BandLayout::new(buf.w, buf.h, frame.options.vertical);
    draw_band(buf, frame, &band, color);

    let (px, py) = band.panel_origin();
    let below = draw_legend(buf, frame, px, py, color);
    if let Some(series) = &frame.trend {
        let bottom = buf.h.saturating_sub(1);
        let w = buf.w.saturating_sub(px + 1);
        let h = bottom.saturating_sub(below + 1);
        draw_trend(buf, series, (px, below + 1, w, h), color);
    }

    if frame.options.show_travel {
        let y = buf.h.saturating_sub(1);
        buf.write_str(1, y, CONTROLS, DIM);
    }
}

/// Interactive port: alternate screen plus a twinkling star backdrop.
pub(crate) struct TerminalRenderer {
    term: Terminal,
    stars: Vec<Star>,
    star_seed: u64,
    color: bool,
    started: Instant,
}

impl TerminalRenderer {
    pub(crate) fn begin(star_seed: u64, color: bool) -> anyhow::Result<Self> {
        let term = Terminal::begin()?;
        let stars = build_stars(term.cols, term.rows, star_seed);
        Ok(Self {
            term,
            stars,
            star_seed,
            color,
            started: Instant::now(),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        self.term.end()
    }

    /// Overlap threshold for the markers as drawn at the current size.
    pub(crate) fn depth_params(&self, vertical: bool) -> DepthParams {
        let band = BandLayout::new(self.term.cols, self.term.rows, vertical);
        let per_cell = 360.0 / band.len.max(1) as f64;
        DepthParams::from_marker_sizes(SUN_MARKER_CELLS * per_cell, per_cell)
    }
}

impl RenderPort for TerminalRenderer {
    fn draw(&mut self, frame: &Frame) -> anyhow::Result<()> {
        if self.term.resize_if_needed()? {
            self.stars = build_stars(self.term.cols, self.term.rows, self.star_seed);
        }
        let t = self.started.elapsed().as_secs_f32();
        compose(&mut self.term.cur, frame, &self.stars, t, self.color);
        self.term.present(true)
    }
}
