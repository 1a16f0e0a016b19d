use serde::{Deserialize, Serialize};

/// Backend kind an account talks to. The two frontends expose playlists
/// through incompatible endpoints, which the capability flags describe.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideosApp {
  #[default]
  Invidious,
  Piped,
}

impl VideosApp {
  /// Whether the user playlists endpoint already returns each playlist with
  /// its ordered videos and per-video index markers.
  pub fn user_playlists_endpoint_includes_videos(self) -> bool {
    match self {
      VideosApp::Invidious => true,
      VideosApp::Piped => false,
    }
  }

  /// Whether user playlists have to be fetched through the channel playlist
  /// endpoint (and decode to its payload shape).
  pub fn user_playlists_use_channel_playlist_endpoint(self) -> bool {
    match self {
      VideosApp::Invidious => false,
      VideosApp::Piped => true,
    }
  }

  pub fn capabilities(self) -> CapabilityFlags {
    CapabilityFlags {
      user_playlists_endpoint_includes_videos: self.user_playlists_endpoint_includes_videos(),
      user_playlists_use_channel_playlist_endpoint: self
        .user_playlists_use_channel_playlist_endpoint(),
    }
  }
}

/// Per-account API quirks. Derived from the backend kind for real accounts,
/// but kept as two independent booleans so either can be injected on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
  pub user_playlists_endpoint_includes_videos: bool,
  pub user_playlists_use_channel_playlist_endpoint: bool,
}

/// An account on a specific instance. Passed explicitly to `App` and
/// `Network` instead of living in a global.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Account {
  pub name: Option<String>,
  pub instance_url: String,
  #[serde(default)]
  pub app: VideosApp,
  pub username: Option<String>,
  pub token: Option<String>,
}

impl Account {
  pub fn capabilities(&self) -> CapabilityFlags {
    self.app.capabilities()
  }

  /// Value for the `Authorization` header, when the account carries a token.
  /// Invidious expects a bearer token, Piped a raw session token.
  pub fn authorization(&self) -> Option<String> {
    let token = self.token.as_ref()?;
    match self.app {
      VideosApp::Invidious => Some(format!("Bearer {}", token)),
      VideosApp::Piped => Some(token.clone()),
    }
  }

  pub fn display_name(&self) -> &str {
    self
      .name
      .as_deref()
      .or(self.username.as_deref())
      .unwrap_or(&self.instance_url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invidious_capabilities() {
    let flags = VideosApp::Invidious.capabilities();
    assert!(flags.user_playlists_endpoint_includes_videos);
    assert!(!flags.user_playlists_use_channel_playlist_endpoint);
  }

  #[test]
  fn test_piped_capabilities() {
    let flags = VideosApp::Piped.capabilities();
    assert!(!flags.user_playlists_endpoint_includes_videos);
    assert!(flags.user_playlists_use_channel_playlist_endpoint);
  }

  #[test]
  fn test_authorization_header_per_backend() {
    let mut account = Account {
      instance_url: "https://invidious.example.com".to_string(),
      token: Some("abc123".to_string()),
      ..Account::default()
    };
    assert_eq!(account.authorization().as_deref(), Some("Bearer abc123"));

    account.app = VideosApp::Piped;
    assert_eq!(account.authorization().as_deref(), Some("abc123"));

    account.token = None;
    assert_eq!(account.authorization(), None);
  }
}
