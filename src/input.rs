use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;
use zodiacband::{AppState, Navigation, Toggle};

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Navigate(Navigation),
    Now,
    Pause,
    Toggle(Toggle),
    CycleSign(i64),
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(ev: &InputEvent) -> Option<Action> {
    if ev.key == KeyCode::Char('c') && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    let nav = |n| Some(Action::Navigate(n));
    let toggle = |t| Some(Action::Toggle(t));
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),

        KeyCode::Left => nav(Navigation::Days(-1)),
        KeyCode::Right => nav(Navigation::Days(1)),
        KeyCode::Down => nav(Navigation::Weeks(-1)),
        KeyCode::Up => nav(Navigation::Weeks(1)),
        KeyCode::PageDown => nav(Navigation::Months(-1)),
        KeyCode::PageUp => nav(Navigation::Months(1)),
        KeyCode::Home => nav(Navigation::Years(-1)),
        KeyCode::End => nav(Navigation::Years(1)),
        KeyCode::Char('[') => nav(Navigation::Hours(-1)),
        KeyCode::Char(']') => nav(Navigation::Hours(1)),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::Now),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::Pause),

        KeyCode::Char('s') | KeyCode::Char('S') => toggle(Toggle::Stars),
        KeyCode::Char('l') | KeyCode::Char('L') => toggle(Toggle::Labels),
        KeyCode::Char('t') | KeyCode::Char('T') => toggle(Toggle::Trend),
        KeyCode::Char('v') | KeyCode::Char('V') => toggle(Toggle::Vertical),
        KeyCode::Char('f') | KeyCode::Char('F') => toggle(Toggle::FrameLock),
        KeyCode::Char('c') | KeyCode::Char('C') => toggle(Toggle::Travel),
        KeyCode::Char('u') | KeyCode::Char('U') => toggle(Toggle::Timestamp),

        KeyCode::Char(',') | KeyCode::Char('<') => Some(Action::CycleSign(-1)),
        KeyCode::Char('.') | KeyCode::Char('>') => Some(Action::CycleSign(1)),
        _ => None,
    }
}

/// Applies everything except `Quit`, which the loop handles.
pub(crate) fn apply_action(state: AppState, action: Action) -> AppState {
    match action {
        Action::Quit => state,
        Action::Navigate(nav) => state.navigate(nav),
        Action::Now => state.navigate(Navigation::JumpTo(Utc::now())),
        Action::Pause => state.toggle_pause(),
        Action::Toggle(t) => state.toggle(t),
        Action::CycleSign(delta) => state.cycle_locked_sign(delta),
    }
}
