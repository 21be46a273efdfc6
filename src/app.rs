use crate::input::{apply_action, collect_input_nonblocking, map_event_to_action, Action};
use crate::term::TerminalRenderer;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use zodiacband::config::{save_settings_atomic, Settings};
use zodiacband::view::render_with_depth;
use zodiacband::{AppState, Ephemeris, RenderPort};

const TICK: Duration = Duration::from_secs(1);

pub(crate) struct App {
    settings: Settings,
    settings_path: PathBuf,
    ephemeris: Ephemeris,
    port: TerminalRenderer,
}

impl App {
    pub(crate) fn new(
        settings: Settings,
        settings_path: PathBuf,
        ephemeris: Ephemeris,
    ) -> anyhow::Result<Self> {
        let port = TerminalRenderer::begin(settings.star_seed, settings.enable_color)?;
        Ok(Self {
            settings,
            settings_path,
            ephemeris,
            port,
        })
    }

    pub(crate) fn run(mut self, state: AppState) -> anyhow::Result<()> {
        let result = self.run_loop(state);
        // restore the terminal before reporting anything
        self.port.end()?;
        let state = result?;

        self.settings.view = state.options;
        save_settings_atomic(&self.settings_path, &self.settings)?;
        log::info!("saved view options to {}", self.settings_path.display());
        Ok(())
    }

    fn run_loop(&mut self, mut state: AppState) -> anyhow::Result<AppState> {
        let fps = self.settings.fps_cap.clamp(1, 120);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut next_tick = Instant::now() + TICK;

        loop {
            let frame_start = Instant::now();

            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event_to_action(&ev) {
                    Some(Action::Quit) => return Ok(state),
                    Some(action) => state = apply_action(state, action),
                    None => {}
                }
            }

            while Instant::now() >= next_tick {
                state = state.tick();
                next_tick += TICK;
            }

            let depth = self.port.depth_params(state.options.vertical);
            let frame = render_with_depth(&state, &self.ephemeris, &depth)?;
            self.port.draw(&frame)?;

            spin_sleep(frame_dt, frame_start);
        }
    }
}

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
