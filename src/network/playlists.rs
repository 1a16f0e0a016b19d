use super::requests::{api_request, api_url, get_typed};
use super::Network;
use crate::accounts::{Account, VideosApp};
use crate::app::FetchedPlaylist;
use crate::model::{ChannelPlaylist, Playlist, PlaylistPrivacy, Video};
use crate::resource::EndpointVariant;
use anyhow::Result;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

/// Piped playlist summary as returned by `/user/playlists`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedPlaylistSummary {
  id: String,
  name: String,
  #[serde(default)]
  videos: Option<u64>,
}

/// Piped playlist contents as returned by `/playlists/{id}`. The payload
/// carries no id of its own and no per-video index markers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedPlaylist {
  name: String,
  #[serde(default)]
  thumbnail_url: Option<String>,
  #[serde(default)]
  uploader: Option<String>,
  #[serde(default)]
  videos: Option<u64>,
  #[serde(default)]
  related_streams: Vec<PipedStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedStream {
  url: String,
  title: String,
  #[serde(default)]
  uploader_name: Option<String>,
  #[serde(default)]
  duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedCreatedPlaylist {
  playlist_id: String,
}

fn video_id_from_url(url: &str) -> String {
  url
    .split("v=")
    .nth(1)
    .map(|rest| rest.split('&').next().unwrap_or(rest).to_string())
    .unwrap_or_else(|| url.trim_start_matches('/').to_string())
}

impl PipedStream {
  fn into_video(self) -> Video {
    Video {
      video_id: video_id_from_url(&self.url),
      title: self.title,
      author: self.uploader_name,
      length_seconds: self.duration.filter(|d| *d >= 0).map(|d| d as u64),
      index_id: None,
    }
  }
}

impl PipedPlaylist {
  fn into_channel_playlist(self, id: &str) -> ChannelPlaylist {
    ChannelPlaylist {
      id: id.to_string(),
      title: self.name,
      thumbnail_url: self.thumbnail_url,
      author: self.uploader,
      video_count: self.videos,
      videos: self
        .related_streams
        .into_iter()
        .map(PipedStream::into_video)
        .collect(),
    }
  }

  fn into_playlist(self, id: &str) -> Playlist {
    Playlist {
      id: id.to_string(),
      title: self.name,
      video_count: self.videos,
      videos: self
        .related_streams
        .into_iter()
        .map(PipedStream::into_video)
        .collect(),
    }
  }
}

impl Network {
  async fn handle_error(&mut self, e: anyhow::Error) {
    let mut app = self.app.lock().await;
    app.handle_error(e);
  }

  pub async fn get_playlists(&mut self, force: bool) {
    let (account, fresh) = {
      let app = self.app.lock().await;
      (
        app.account.clone(),
        app.catalog_is_fresh() && !app.playlists.is_empty(),
      )
    };
    if !force && fresh {
      self.app.lock().await.is_loading = false;
      return;
    }

    match self.fetch_catalog(&account).await {
      Ok(playlists) => {
        log::info!("loaded {} playlists", playlists.len());
        let mut app = self.app.lock().await;
        app.set_playlists(playlists);
        app.is_loading = false;
        // A forced reload stands in for the refresh trigger: the current
        // playlist's contents are reissued under the new generation.
        if force {
          app.load_current_playlist();
        }
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  async fn fetch_catalog(&self, account: &Account) -> Result<Vec<Playlist>> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(&account.instance_url, "api/v1/auth/playlists")?;
        get_typed::<Vec<Playlist>>(&self.client, account, url).await
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, "user/playlists")?;
        let summaries = get_typed::<Vec<PipedPlaylistSummary>>(&self.client, account, url).await?;
        Ok(
          summaries
            .into_iter()
            .map(|summary| Playlist {
              id: summary.id,
              title: summary.name,
              video_count: summary.videos,
              videos: Vec::new(),
            })
            .collect(),
        )
      }
    }
  }

  pub async fn load_playlist(
    &mut self,
    playlist_id: String,
    observer: EndpointVariant,
    generation: u64,
  ) {
    let account = self.app.lock().await.account.clone();

    let fetched = match observer {
      EndpointVariant::UserPlaylist => self
        .fetch_user_playlist(&account, &playlist_id)
        .await
        .map(FetchedPlaylist::User),
      EndpointVariant::ChannelPlaylist => self
        .fetch_channel_playlist(&account, &playlist_id)
        .await
        .map(FetchedPlaylist::Channel),
    };

    match fetched {
      Ok(fetched) => {
        let mut app = self.app.lock().await;
        app.observe_playlist(&playlist_id, generation, fetched);
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  async fn fetch_user_playlist(&self, account: &Account, playlist_id: &str) -> Result<Playlist> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(
          &account.instance_url,
          &format!("api/v1/auth/playlists/{}", playlist_id),
        )?;
        get_typed::<Playlist>(&self.client, account, url).await
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, &format!("playlists/{}", playlist_id))?;
        let playlist = get_typed::<PipedPlaylist>(&self.client, account, url).await?;
        Ok(playlist.into_playlist(playlist_id))
      }
    }
  }

  async fn fetch_channel_playlist(
    &self,
    account: &Account,
    playlist_id: &str,
  ) -> Result<ChannelPlaylist> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(
          &account.instance_url,
          &format!("api/v1/playlists/{}", playlist_id),
        )?;
        get_typed::<ChannelPlaylist>(&self.client, account, url).await
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, &format!("playlists/{}", playlist_id))?;
        let playlist = get_typed::<PipedPlaylist>(&self.client, account, url).await?;
        Ok(playlist.into_channel_playlist(playlist_id))
      }
    }
  }

  pub async fn create_playlist(&mut self, title: String, privacy: PlaylistPrivacy) {
    let account = self.app.lock().await.account.clone();

    let created = match self.post_create_playlist(&account, &title, privacy).await {
      Ok(created) => created,
      Err(e) => return self.handle_error(e).await,
    };
    log::info!("created playlist {} ({})", created.title, created.id);

    match self.fetch_catalog(&account).await {
      Ok(playlists) => {
        let mut app = self.app.lock().await;
        app.set_playlists(playlists);
        app.is_loading = false;
        app.select_created_playlist(&created);
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  async fn post_create_playlist(
    &self,
    account: &Account,
    title: &str,
    privacy: PlaylistPrivacy,
  ) -> Result<Playlist> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(&account.instance_url, "api/v1/auth/playlists")?;
        let body = json!({ "title": title, "privacy": privacy.as_str() });
        let response = api_request(&self.client, account, Method::POST, url, Some(body)).await?;
        Ok(response.json::<Playlist>().await?)
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, "user/playlists/create")?;
        let body = json!({ "name": title });
        let response = api_request(&self.client, account, Method::POST, url, Some(body)).await?;
        let created = response.json::<PipedCreatedPlaylist>().await?;
        Ok(Playlist {
          id: created.playlist_id,
          title: title.to_string(),
          ..Playlist::default()
        })
      }
    }
  }

  pub async fn edit_playlist(
    &mut self,
    playlist_id: String,
    title: String,
    privacy: PlaylistPrivacy,
  ) {
    let account = self.app.lock().await.account.clone();

    if let Err(e) = self
      .post_edit_playlist(&account, &playlist_id, &title, privacy)
      .await
    {
      return self.handle_error(e).await;
    }

    match self.fetch_catalog(&account).await {
      Ok(playlists) => {
        let mut app = self.app.lock().await;
        app.set_playlists(playlists);
        app.is_loading = false;
        let edited = app.find_playlist(&playlist_id).cloned();
        app.select_edited_playlist(edited.as_ref());
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  async fn post_edit_playlist(
    &self,
    account: &Account,
    playlist_id: &str,
    title: &str,
    privacy: PlaylistPrivacy,
  ) -> Result<()> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(
          &account.instance_url,
          &format!("api/v1/auth/playlists/{}", playlist_id),
        )?;
        let body = json!({ "title": title, "privacy": privacy.as_str() });
        api_request(&self.client, account, Method::PATCH, url, Some(body)).await?;
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, "user/playlists/rename")?;
        let body = json!({ "playlistId": playlist_id, "newName": title });
        api_request(&self.client, account, Method::POST, url, Some(body)).await?;
      }
    }
    Ok(())
  }

  pub async fn delete_playlist(&mut self, playlist_id: String) {
    let account = self.app.lock().await.account.clone();

    if let Err(e) = self.post_delete_playlist(&account, &playlist_id).await {
      return self.handle_error(e).await;
    }
    log::info!("deleted playlist {}", playlist_id);

    match self.fetch_catalog(&account).await {
      Ok(playlists) => {
        let mut app = self.app.lock().await;
        app.set_playlists(playlists);
        app.is_loading = false;
        if app.selected_playlist_id == playlist_id {
          app.select_edited_playlist(None);
        }
      }
      Err(e) => self.handle_error(e).await,
    }
  }

  async fn post_delete_playlist(&self, account: &Account, playlist_id: &str) -> Result<()> {
    match account.app {
      VideosApp::Invidious => {
        let url = api_url(
          &account.instance_url,
          &format!("api/v1/auth/playlists/{}", playlist_id),
        )?;
        api_request(&self.client, account, Method::DELETE, url, None).await?;
      }
      VideosApp::Piped => {
        let url = api_url(&account.instance_url, "user/playlists/delete")?;
        let body = json!({ "playlistId": playlist_id });
        api_request(&self.client, account, Method::POST, url, Some(body)).await?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_video_id_from_url() {
    assert_eq!(video_id_from_url("/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    assert_eq!(
      video_id_from_url("https://piped.example.com/watch?v=abc&list=PL1"),
      "abc"
    );
    assert_eq!(video_id_from_url("/shorts/xyz"), "shorts/xyz");
  }

  #[test]
  fn test_decode_piped_playlist() {
    let json = r#"{
      "name": "Favorites",
      "thumbnailUrl": "https://pipedproxy.example.com/thumb.jpg",
      "uploader": "someone",
      "videos": 2,
      "relatedStreams": [
        {"url": "/watch?v=v1", "title": "First", "uploaderName": "A", "duration": 120},
        {"url": "/watch?v=v2", "title": "Second", "duration": -1}
      ]
    }"#;

    let decoded: PipedPlaylist = serde_json::from_str(json).unwrap();
    let playlist = decoded.into_channel_playlist("PL1");
    assert_eq!(playlist.id, "PL1");
    assert_eq!(playlist.title, "Favorites");
    assert_eq!(playlist.video_count, Some(2));
    assert_eq!(playlist.videos.len(), 2);
    assert_eq!(playlist.videos[0].video_id, "v1");
    assert_eq!(playlist.videos[0].length_seconds, Some(120));
    // Livestreams report -1, which must not turn into a length
    assert_eq!(playlist.videos[1].length_seconds, None);
    // Piped carries no index markers; the normalizer regenerates them
    assert!(playlist.videos.iter().all(|video| video.index_id.is_none()));
  }

  #[test]
  fn test_decode_piped_summaries() {
    let json = r#"[{"id": "PL1", "name": "Watch Later", "videos": 4}]"#;
    let summaries: Vec<PipedPlaylistSummary> = serde_json::from_str(json).unwrap();
    assert_eq!(summaries[0].id, "PL1");
    assert_eq!(summaries[0].videos, Some(4));
  }
}
