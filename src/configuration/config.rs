#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    CsrfToken,
    PomodoroTickMs,
    ProfilePictureURL,
    ServerURL,
    SessionCode,
}

fn config_dir() -> path::PathBuf {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        if !xdg_config.is_empty() {
            return path::PathBuf::from(xdg_config);
        }
    }

    #[cfg(not(target_os = "macos"))]
    let base = dirs::config_dir();
    #[cfg(target_os = "macos")]
    let base = dirs::home_dir().map(|home| return home.join(".config"));

    return base.unwrap_or_else(env::temp_dir);
}

/// Directory the debug log is written to when logging is enabled.
pub fn debug_log_dir() -> path::PathBuf {
    if let Ok(log_dir) = env::var("STUDYSYNC_LOG_DIR") {
        if !log_dir.is_empty() {
            return path::PathBuf::from(log_dir);
        }
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("studysync");
}

fn validate(key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::PomodoroTickMs => {
            if !matches!(value.parse::<u64>(), Ok(ms) if ms > 0) {
                bail!(format!(
                    "Invalid value for '{key}': {value}\nExpected a whole number of milliseconds greater than zero"
                ));
            }
        }
        ConfigKey::ServerURL => {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                bail!(format!(
                    "Invalid value for '{key}': {value}\nThe server URL must start with http:// or https://"
                ));
            }
        }
        _ => (),
    }

    return Ok(());
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = config_dir().join("studysync/config.toml");

        let res = match key {
            ConfigKey::CsrfToken => "",
            ConfigKey::PomodoroTickMs => "1000",
            ConfigKey::ProfilePictureURL => "",
            ConfigKey::ServerURL => "http://localhost:8000",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
            ConfigKey::SessionCode => "",
        };

        return res.to_string();
    }

    /// Tick quantum for the Pomodoro timer, as loaded and validated.
    pub fn pomodoro_tick() -> std::time::Duration {
        let ms = Config::get(ConfigKey::PomodoroTickMs)
            .parse::<u64>()
            .unwrap_or(1000);

        return std::time::Duration::from_millis(ms);
    }

    /// Merges defaults, the config file and command line/env values. Nothing
    /// is written to the global config unless every value is valid.
    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        let mut values = ConfigKey::iter()
            .map(|key| return (key, Config::default(key)))
            .collect::<HashMap<ConfigKey, String>>();

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile || key == ConfigKey::SessionCode {
                    continue;
                }

                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        values.insert(key, val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        values.insert(key, val_str.to_string());
                    } else {
                        bail!(format!(
                            "{} has an unsupported value type for key '{key}'",
                            config_path.display()
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    values.insert(key, val.to_string());
                }
            }
        }

        for (key, val) in values.iter() {
            validate(*key, val)?;
        }

        for (key, val) in values.iter() {
            // Only the origin is needed to build every URL.
            if *key == ConfigKey::ServerURL {
                Config::set(*key, val.trim_end_matches('/'));
                continue;
            }
            Config::set(*key, val);
        }

        tracing::debug!(
            server_url = Config::get(ConfigKey::ServerURL),
            session_code = Config::get(ConfigKey::SessionCode),
            pomodoro_tick_ms = Config::get(ConfigKey::PomodoroTickMs),
            has_csrf_token = !Config::get(ConfigKey::CsrfToken).is_empty(),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::SessionCode || key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd.get_arguments().find(|e| {
                    return e.get_long() == Some(key.to_string().as_str());
                })?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
