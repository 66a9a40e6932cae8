use std::{collections::HashMap, fs, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub csrf_cookie: String,
    pub update_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            csrf_cookie: "csrftoken".into(),
            update_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }
}

/// Defaults, overlaid by `rematch.toml` when present, overlaid by
/// environment variables. Malformed numbers keep the earlier value.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("rematch.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("server_url").and_then(|v| v.as_str()) {
                settings.server_url = v.to_string();
            }
            if let Some(v) = file_cfg.get("csrf_cookie").and_then(|v| v.as_str()) {
                settings.csrf_cookie = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("update_timeout_secs")
                .and_then(|v| v.as_integer())
            {
                if v > 0 {
                    settings.update_timeout_secs = v as u64;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("REMATCH_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("REMATCH_CSRF_COOKIE") {
        settings.csrf_cookie = v;
    }
    if let Ok(v) = std::env::var("REMATCH_UPDATE_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.update_timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %v, "ignoring malformed REMATCH_UPDATE_TIMEOUT_SECS"),
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_dev_server() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://127.0.0.1:8000");
        assert_eq!(settings.csrf_cookie, "csrftoken");
        assert_eq!(settings.update_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_apply_and_bad_numbers_fall_back() {
        std::env::set_var("REMATCH_SERVER_URL", "http://shelf.test:9000");
        std::env::set_var("REMATCH_UPDATE_TIMEOUT_SECS", "not-a-number");
        let settings = load_settings();
        assert_eq!(settings.server_url, "http://shelf.test:9000");
        assert_eq!(settings.update_timeout_secs, 10);

        std::env::set_var("REMATCH_UPDATE_TIMEOUT_SECS", "4");
        let settings = load_settings();
        assert_eq!(settings.update_timeout_secs, 4);

        std::env::remove_var("REMATCH_SERVER_URL");
        std::env::remove_var("REMATCH_UPDATE_TIMEOUT_SECS");
    }
}
