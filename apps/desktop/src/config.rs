use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use client_core::Zone;

pub const SETTINGS_FILE: &str = "appointments.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:5137/api/appointment";

#[derive(Debug)]
pub struct Settings {
    pub api_url: String,
    pub zone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            zone: "local".into(),
        }
    }
}

impl Settings {
    pub fn zone(&self) -> anyhow::Result<Zone> {
        self.zone
            .parse()
            .with_context(|| format!("invalid zone setting '{}'", self.zone))
    }
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_from(path, |key| std::env::var(key).ok())
}

/// Defaults, then `path` if it parses, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("zone") {
                settings.zone = v.clone();
            }
        }
    }

    if let Some(v) = env("APPOINTMENTS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APPOINTMENTS_ZONE") {
        settings.zone = v;
    }
    if let Some(v) = env("APP__ZONE") {
        settings.zone = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
