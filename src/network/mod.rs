pub mod playlists;
pub mod requests;

use crate::app::App;
use crate::model::PlaylistPrivacy;
use crate::resource::EndpointVariant;
use crate::user_config::UserConfig;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug)]
pub enum IoEvent {
  GetPlaylists {
    force: bool,
  },
  LoadPlaylist {
    playlist_id: String,
    observer: EndpointVariant,
    generation: u64,
  },
  CreatePlaylist {
    title: String,
    privacy: PlaylistPrivacy,
  },
  EditPlaylist {
    playlist_id: String,
    title: String,
    privacy: PlaylistPrivacy,
  },
  DeletePlaylist {
    playlist_id: String,
  },
}

#[derive(Clone)]
pub struct Network {
  pub client: reqwest::Client,
  pub app: Arc<Mutex<App>>,
}

impl Network {
  pub fn new(app: &Arc<Mutex<App>>, user_config: &UserConfig) -> Result<Network> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(
        user_config.behavior.request_timeout_seconds,
      ))
      .user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
      ))
      .build()?;

    Ok(Network {
      client,
      app: Arc::clone(app),
    })
  }

  pub async fn handle_network_event(&mut self, io_event: IoEvent) {
    match io_event {
      IoEvent::GetPlaylists { force } => {
        self.get_playlists(force).await;
      }
      IoEvent::LoadPlaylist {
        playlist_id,
        observer,
        generation,
      } => {
        self.load_playlist(playlist_id, observer, generation).await;
      }
      IoEvent::CreatePlaylist { title, privacy } => {
        self.create_playlist(title, privacy).await;
      }
      IoEvent::EditPlaylist {
        playlist_id,
        title,
        privacy,
      } => {
        self.edit_playlist(playlist_id, title, privacy).await;
      }
      IoEvent::DeletePlaylist { playlist_id } => {
        self.delete_playlist(playlist_id).await;
      }
    }
  }
}
