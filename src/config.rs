use crate::state::ViewOptions;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub view: ViewOptions,
    pub enable_color: bool,
    pub star_seed: u64,
    pub fps_cap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view: ViewOptions::default(),
            enable_color: true,
            star_seed: 0x57A2_5EED_u64,
            fps_cap: 30,
        }
    }
}

impl Settings {
    pub fn sanitized(self) -> Self {
        Self {
            view: self.view.sanitized(),
            fps_cap: self.fps_cap.clamp(1, 120),
            ..self
        }
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("org", "zodiacband", "ZodiacBand")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
    })
}

/// Missing or unreadable settings fall back to the defaults.
pub fn load_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("no settings at {}: {}", path.display(), e);
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&text) {
        Ok(s) => {
            log::info!("loaded settings from {}", path.display());
            s.sanitized()
        }
        Err(e) => {
            log::warn!("ignoring malformed settings at {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("could not write {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    log::debug!("saved settings to {}", path.display());
    Ok(())
}

pub fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file is not atomic on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("could not move {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.view.vertical = true;
        s.view.lock_frame = true;
        s.view.locked_sign = 7;
        s.enable_color = false;
        save_settings_atomic(&path, &s).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_settings(&path), s);
    }

    #[test]
    fn missing_and_malformed_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings(&path), Settings::default());
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn partial_file_is_filled_and_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"view": {"locked_sign": 19, "show_stars": false, "trend": {"window_days": 0, "step_hours": 6}}}"#,
        )
        .unwrap();
        let s = load_settings(&path);
        assert_eq!(s.view.locked_sign, 0);
        assert!(!s.view.show_stars);
        assert!(s.view.show_labels);
        assert_eq!(s.view.trend.window_days, 30.0);
        assert_eq!(s.view.trend.step_hours, 6.0);
        assert_eq!(s.fps_cap, 30);
    }
}
