mod app;
mod input;
mod term;
mod text;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zodiacband::config::{load_settings, project_paths, Settings};
use zodiacband::trend::TrendOptions;
use zodiacband::{render, AppState, Ephemeris, Navigation, RenderPort};

#[derive(Parser, Debug, Clone)]
#[command(name = "zodiacband")]
#[command(about = "Sun, Moon and planets on a terminal zodiac band")]
struct Cli {
    /// Start at this UTC instant instead of now. Example: 2024-04-08T18:00:00Z
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Step from the start instant, e.g. +1-day, -2-week, 3-month (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    shift: Vec<Navigation>,

    /// Print one text snapshot and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Lock the band to the centre of this sign (0 = Aries … 11 = Pisces)
    #[arg(long, allow_negative_numbers = true)]
    lock_sign: Option<i64>,

    #[arg(long, default_value_t = false)]
    vertical: bool,

    #[arg(long, default_value_t = false)]
    no_trend: bool,

    #[arg(long, default_value_t = false)]
    no_stars: bool,

    /// Trend half-window in days
    #[arg(long)]
    window_days: Option<f64>,

    /// Trend sample spacing in hours
    #[arg(long)]
    step_hours: Option<f64>,

    /// Settings file (defaults to the per-user data directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Append log output here; the interactive view discards it otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    mono: bool,
}

impl Cli {
    fn apply(&self, settings: Settings) -> Settings {
        let mut s = settings;
        if let Some(sign) = self.lock_sign {
            s.view.lock_frame = true;
            s.view.locked_sign = usize::try_from(sign).unwrap_or(usize::MAX);
        }
        s.view.vertical |= self.vertical;
        if self.no_trend {
            s.view.show_trend = false;
        }
        if self.no_stars {
            s.view.show_stars = false;
        }
        s.view.trend = TrendOptions {
            window_days: self.window_days.unwrap_or(s.view.trend.window_days),
            step_hours: self.step_hours.unwrap_or(s.view.trend.step_hours),
        };
        if self.mono {
            s.enable_color = false;
        }
        s.sanitized()
    }
}

fn init_logging(log_file: Option<&Path>, once: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if once => {
            builder.target(env_logger::Target::Stderr);
        }
        // stderr would tear the alternate screen
        None => return Ok(()),
    }
    builder.try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.once)?;

    let settings_path = match &cli.settings {
        Some(path) => path.clone(),
        None => project_paths()?.settings_path,
    };
    let settings = cli.apply(load_settings(&settings_path));
    let instant = cli.at.unwrap_or_else(Utc::now);
    let ephemeris = Ephemeris::analytic();
    log::info!("starting at {} with {:?}", instant, settings.view);

    let state = cli
        .shift
        .iter()
        .fold(AppState::new(instant, settings.view), |s, step| s.navigate(*step));
    if cli.once {
        let frame = render(&state, &ephemeris)?;
        let mut port = text::TextRenderer::new(io::stdout().lock());
        return port.draw(&frame);
    }

    app::App::new(settings, settings_path, ephemeris)?.run(state)
}
