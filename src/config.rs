use serde::{Deserialize, Serialize};
use std::{
    env,
    fs,
    path::PathBuf,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
  pub bracket_path: String,
  pub logs_dir: String,
  pub log_filter: String,
  pub cascade_clears: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    AppConfig {
      bracket_path: String::new(),
      logs_dir: String::new(),
      log_filter: String::new(),
      cascade_clears: true,
    }
  }
}

impl AppConfig {
  pub fn bracket_file(&self) -> PathBuf {
    let trimmed = self.bracket_path.trim();
    if trimmed.is_empty() {
      return repo_root().join("tournament.json");
    }
    resolve_repo_path(trimmed)
  }

  pub fn logs_path(&self) -> PathBuf {
    let trimmed = self.logs_dir.trim();
    if trimmed.is_empty() {
      return repo_root().join("logs");
    }
    resolve_repo_path(trimmed)
  }

  pub fn filter(&self) -> &str {
    let trimmed = self.log_filter.trim();
    if trimmed.is_empty() { "info" } else { trimmed }
  }
}

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  if let Some(raw) = env_default("BRACKET_CONFIG_PATH") {
    return resolve_repo_path(&raw);
  }
  repo_root().join("config.json")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn parse_flag(value: &str) -> bool {
  let value = value.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

pub fn env_flag_true_default(key: &str, default: bool) -> bool {
  match env::var(key) {
    Ok(value) => parse_flag(&value),
    Err(_) => default,
  }
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  if config.bracket_path.trim().is_empty() {
    if let Some(value) = env_default("BRACKET_STORE_PATH") {
      config.bracket_path = value;
    }
  }
  if config.logs_dir.trim().is_empty() {
    if let Some(value) = env_default("BRACKET_LOGS_DIR") {
      config.logs_dir = value;
    }
  }
  if config.log_filter.trim().is_empty() {
    if let Some(value) = env_default("BRACKET_LOG_FILTER") {
      config.log_filter = value;
    }
  }
  config.cascade_clears = env_flag_true_default("BRACKET_CASCADE_CLEARS", config.cascade_clears);
  config
}

pub fn parse_config(data: &str) -> Result<AppConfig, String> {
  serde_json::from_str::<AppConfig>(data).map_err(|e| format!("parse config: {e}"))
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  let path = config_path();
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config = parse_config(&data).map_err(|e| format!("{e} ({})", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_env_line() {
    assert_eq!(parse_env_line("# comment"), None);
    assert_eq!(parse_env_line(""), None);
    assert_eq!(
      parse_env_line("export BRACKET_STORE_PATH=\"data/t.json\""),
      Some(("BRACKET_STORE_PATH".to_string(), "data/t.json".to_string()))
    );
    assert_eq!(
      parse_env_line("BRACKET_LOG_FILTER=debug # verbose"),
      Some(("BRACKET_LOG_FILTER".to_string(), "debug".to_string()))
    );
    assert_eq!(parse_env_line("=oops"), None);
  }

  #[test]
  fn test_config_defaults_fill_missing_fields() {
    let config = parse_config(r#"{ "bracketPath": "data/cup.json" }"#).unwrap();
    assert_eq!(config.bracket_path, "data/cup.json");
    assert!(config.cascade_clears);
    assert_eq!(config.filter(), "info");
    assert_eq!(config.bracket_file(), repo_root().join("data/cup.json"));
    assert_eq!(config.logs_path(), repo_root().join("logs"));
  }

  #[test]
  fn test_config_round_trip_uses_camel_case() {
    let config = AppConfig {
      cascade_clears: false,
      log_filter: "debug".to_string(),
      ..AppConfig::default()
    };
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["cascadeClears"], false);
    assert_eq!(value["logFilter"], "debug");
    assert_eq!(parse_config(&value.to_string()).unwrap(), config);
  }

  #[test]
  fn test_load_config_reads_configured_file() {
    let dir = std::env::temp_dir().join(format!("team-bracket-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    fs::write(&path, r#"{ "bracketPath": "cups/spring.json", "logFilter": "debug" }"#).unwrap();
    env::set_var("BRACKET_CONFIG_PATH", &path);
    let loaded = load_config_inner();

    fs::write(&path, "{ broken").unwrap();
    let broken = load_config_inner();
    env::remove_var("BRACKET_CONFIG_PATH");
    let _ = fs::remove_dir_all(&dir);

    let config = loaded.unwrap();
    assert_eq!(config.bracket_file(), repo_root().join("cups/spring.json"));
    assert_eq!(config.filter(), "debug");
    let err = broken.unwrap_err();
    assert!(err.starts_with("parse config:"));
    assert!(err.contains("config.json"));
  }

  #[test]
  fn test_flag_parsing() {
    assert!(parse_flag(" YES "));
    assert!(parse_flag("1"));
    assert!(!parse_flag("off"));
    assert!(!parse_flag(""));
  }

  #[test]
  fn test_absolute_paths_are_kept() {
    let abs = std::env::temp_dir().join("cup.json");
    let config = AppConfig {
      bracket_path: abs.display().to_string(),
      ..AppConfig::default()
    };
    assert_eq!(config.bracket_file(), abs);
  }
}
