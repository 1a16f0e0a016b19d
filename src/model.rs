use serde::{Deserialize, Serialize};

/// A video inside a playlist. `index_id` is the backend's positional marker
/// within the playlist ordering; it may be missing or backend-assigned and is
/// not guaranteed unique or stable.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  pub video_id: String,
  pub title: String,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub length_seconds: Option<u64>,
  #[serde(default, rename = "indexId")]
  pub index_id: Option<String>,
}

impl Video {
  pub fn length_display(&self) -> String {
    let total = self.length_seconds.unwrap_or(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
      format!("{}:{:02}:{:02}", h, m, s)
    } else {
      format!("{}:{:02}", m, s)
    }
  }
}

/// A user-created playlist as returned by the user playlists endpoint.
/// The catalog endpoint may return summaries only, in which case `videos`
/// stays empty and contents come from a fetched snapshot.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
  #[serde(rename = "playlistId")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub video_count: Option<u64>,
  #[serde(default)]
  pub videos: Vec<Video>,
}

/// A playlist as returned by the channel playlist endpoint. Piped serves user
/// playlists through this shape, without per-video index markers.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPlaylist {
  #[serde(rename = "playlistId")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub thumbnail_url: Option<String>,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub video_count: Option<u64>,
  #[serde(default)]
  pub videos: Vec<Video>,
}

/// Visibility of a user playlist. Piped only distinguishes on creation;
/// Invidious accepts it on create and edit.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistPrivacy {
  #[default]
  Private,
  Public,
  Unlisted,
}

impl PlaylistPrivacy {
  pub fn as_str(self) -> &'static str {
    match self {
      PlaylistPrivacy::Private => "private",
      PlaylistPrivacy::Public => "public",
      PlaylistPrivacy::Unlisted => "unlisted",
    }
  }
}

/// Generic content wrapper handed to presentation code.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentItem {
  pub id: String,
  pub video: Video,
}

impl ContentItem {
  pub fn array_of(videos: Vec<Video>) -> Vec<ContentItem> {
    videos
      .into_iter()
      .map(|video| ContentItem {
        id: video.video_id.clone(),
        video,
      })
      .collect()
  }
}
