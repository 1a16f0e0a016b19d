use crate::accounts::Account;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{
  fs,
  path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const CONFIG_DIR: &str = ".config";
const APP_CONFIG_DIR: &str = "tubelist";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BehaviorConfigString {
  pub request_timeout_seconds: Option<u64>,
  pub log_level: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorConfig {
  pub request_timeout_seconds: u64,
  pub log_level: String,
}

impl Default for BehaviorConfig {
  fn default() -> Self {
    BehaviorConfig {
      request_timeout_seconds: 10,
      log_level: "info".to_string(),
    }
  }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UserConfigString {
  behavior: Option<BehaviorConfigString>,
  accounts: Option<Vec<Account>>,
  default_account: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UserConfigPaths {
  pub config_file_path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct UserConfig {
  pub behavior: BehaviorConfig,
  pub accounts: Vec<Account>,
  pub default_account: Option<String>,
  pub path_to_config: Option<UserConfigPaths>,
}

impl UserConfig {
  pub fn new() -> UserConfig {
    UserConfig::default()
  }

  pub fn get_or_build_paths(&mut self) -> Result<()> {
    match dirs::home_dir() {
      Some(home) => {
        let path = Path::new(&home);
        let home_config_dir = path.join(CONFIG_DIR);
        let app_config_dir = home_config_dir.join(APP_CONFIG_DIR);

        if !home_config_dir.exists() {
          fs::create_dir(&home_config_dir)?;
        }
        if !app_config_dir.exists() {
          fs::create_dir(&app_config_dir)?;
        }

        let config_file_path = app_config_dir.join(FILE_NAME);
        let paths = UserConfigPaths { config_file_path };
        if self.path_to_config.is_none() {
          self.path_to_config = Some(paths);
        }
        Ok(())
      }
      None => Err(anyhow!("No $HOME directory found for config")),
    }
  }

  pub fn load_config(&mut self) -> Result<()> {
    self.get_or_build_paths()?;
    let paths = self.path_to_config.as_ref().unwrap();
    if paths.config_file_path.exists() {
      let config_string = fs::read_to_string(&paths.config_file_path)?;
      // The file is empty on a fresh install: keep the defaults
      if config_string.trim().is_empty() {
        return Ok(());
      }
      let config_yml: UserConfigString = serde_yaml::from_str(&config_string)?;
      self.apply(config_yml);
    }
    Ok(())
  }

  fn apply(&mut self, file: UserConfigString) {
    if let Some(behavior) = file.behavior {
      if let Some(timeout) = behavior.request_timeout_seconds {
        self.behavior.request_timeout_seconds = timeout;
      }
      if let Some(log_level) = behavior.log_level {
        self.behavior.log_level = log_level;
      }
    }
    if let Some(accounts) = file.accounts {
      self.accounts = accounts;
    }
    if let Some(default_account) = file.default_account {
      self.default_account = Some(default_account);
    }
  }

  /// Pick the account to use: `--account NAME` wins, then the configured
  /// default, then the first configured account.
  pub fn account(&self, name: Option<&str>) -> Result<Account> {
    let wanted = name.or(self.default_account.as_deref());
    match wanted {
      Some(wanted) => self
        .accounts
        .iter()
        .find(|account| account.name.as_deref() == Some(wanted))
        .cloned()
        .ok_or_else(|| anyhow!("no account named '{}' in the config file", wanted)),
      None => self
        .accounts
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("no accounts configured; add one to config.yml")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::accounts::VideosApp;

  #[test]
  fn test_defaults() {
    let config = UserConfig::new();
    assert_eq!(config.behavior.request_timeout_seconds, 10);
    assert_eq!(config.behavior.log_level, "info");
    assert!(config.accounts.is_empty());
  }

  #[test]
  fn test_apply_yaml_config() {
    let yaml = r#"
behavior:
  request_timeout_seconds: 30
accounts:
  - name: main
    instance_url: https://invidious.example.com
    app: invidious
    token: secret
  - name: alt
    instance_url: https://pipedapi.example.com
    app: piped
default_account: alt
"#;
    let file: UserConfigString = serde_yaml::from_str(yaml).unwrap();
    let mut config = UserConfig::new();
    config.apply(file);

    assert_eq!(config.behavior.request_timeout_seconds, 30);
    // Unset keys keep their defaults
    assert_eq!(config.behavior.log_level, "info");
    assert_eq!(config.accounts.len(), 2);
    assert_eq!(config.accounts[1].app, VideosApp::Piped);
    assert_eq!(config.default_account.as_deref(), Some("alt"));
  }

  #[test]
  fn test_account_selection() {
    let mut config = UserConfig::new();
    config.accounts = vec![
      Account {
        name: Some("main".to_string()),
        instance_url: "https://invidious.example.com".to_string(),
        ..Account::default()
      },
      Account {
        name: Some("alt".to_string()),
        instance_url: "https://pipedapi.example.com".to_string(),
        app: VideosApp::Piped,
        ..Account::default()
      },
    ];

    // First account when nothing is named
    assert_eq!(config.account(None).unwrap().name.as_deref(), Some("main"));

    config.default_account = Some("alt".to_string());
    assert_eq!(config.account(None).unwrap().name.as_deref(), Some("alt"));

    // Explicit name wins over the default
    assert_eq!(
      config.account(Some("main")).unwrap().name.as_deref(),
      Some("main")
    );
    assert!(config.account(Some("missing")).is_err());
  }

  #[test]
  fn test_no_accounts_is_an_error() {
    let config = UserConfig::new();
    assert!(config.account(None).is_err());
  }
}
