use crate::model::{Playlist, PlaylistPrivacy, Video};
use crate::network::{IoEvent, Network};
use anyhow::{anyhow, Result};
use clap::ArgMatches;
use std::sync::mpsc::Receiver;

/// Look up a flag that may not be defined on the matched (sub)command.
fn flag(matches: &ArgMatches, id: &str) -> bool {
  matches
    .try_get_one::<bool>(id)
    .ok()
    .flatten()
    .copied()
    .unwrap_or(false)
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
  matches
    .try_get_one::<String>(id)
    .ok()
    .flatten()
    .map(String::as_str)
}

fn privacy_arg(matches: &ArgMatches) -> PlaylistPrivacy {
  match string_arg(matches, "privacy") {
    Some("public") => PlaylistPrivacy::Public,
    Some("unlisted") => PlaylistPrivacy::Unlisted,
    _ => PlaylistPrivacy::Private,
  }
}

pub fn format_playlist_line(playlist: &Playlist, is_current: bool) -> String {
  let marker = if is_current { "*" } else { " " };
  let count = playlist
    .video_count
    .unwrap_or(playlist.videos.len() as u64);
  format!(
    "{} {}  [{}] ({} videos)",
    marker, playlist.title, playlist.id, count
  )
}

pub fn format_video_line(video: &Video) -> String {
  let index = video.index_id.as_deref().unwrap_or("-");
  let author = video.author.as_deref().unwrap_or("unknown");
  format!(
    "{:>4}  {} - {} ({})",
    index,
    video.title,
    author,
    video.length_display()
  )
}

/// Process events the app dispatched while we held the lock, plus any
/// follow-up dispatches, until the channel is drained and no scheduled
/// updates remain. This is the CLI stand-in for the interactive driver tick.
async fn run_until_idle(network: &mut Network, io_rx: &Receiver<IoEvent>) {
  loop {
    let mut progressed = false;
    while let Ok(event) = io_rx.try_recv() {
      network.handle_network_event(event).await;
      progressed = true;
    }
    {
      let mut app = network.app.lock().await;
      if app.has_scheduled() {
        app.apply_scheduled();
        progressed = true;
      }
    }
    if !progressed {
      break;
    }
  }
}

async fn bail_on_api_error(network: &Network) -> Result<()> {
  let app = network.app.lock().await;
  if app.api_error.is_empty() {
    Ok(())
  } else {
    Err(anyhow!(app.api_error.clone()))
  }
}

async fn list_playlists(network: &mut Network) -> Result<String> {
  let mut app = network.app.lock().await;
  if app.playlists.is_empty() {
    return Ok("You have no playlists".to_string());
  }

  let current_id = app.current_playlist().map(|playlist| playlist.id);
  app.apply_scheduled();

  let lines: Vec<String> = app
    .playlists
    .iter()
    .map(|playlist| {
      format_playlist_line(playlist, current_id.as_deref() == Some(playlist.id.as_str()))
    })
    .collect();
  Ok(lines.join("\n"))
}

pub async fn handle_matches(
  matches: &ArgMatches,
  cmd: String,
  mut network: Network,
  io_rx: Receiver<IoEvent>,
) -> Result<String> {
  match cmd.as_str() {
    "playlists" => {
      let force = flag(matches, "refresh");
      network
        .handle_network_event(IoEvent::GetPlaylists { force })
        .await;
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;
      list_playlists(&mut network).await
    }
    "videos" => {
      network
        .handle_network_event(IoEvent::GetPlaylists { force: false })
        .await;
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;

      {
        let mut app = network.app.lock().await;
        if app.playlists.is_empty() {
          return Ok("You have no playlists".to_string());
        }
        if flag(matches, "next") {
          app.current_playlist();
          app.apply_scheduled();
          app.select_next_playlist();
        } else {
          match string_arg(matches, "playlist") {
            Some(id) => app.select_playlist(id),
            None => {
              app.current_playlist();
              app.apply_scheduled();
              app.load_current_playlist();
            }
          }
        }
      }
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;

      let mut app = network.app.lock().await;
      let title = app
        .current_playlist()
        .map(|playlist| playlist.title)
        .unwrap_or_else(|| "Playlists".to_string());
      let items = app.content_items();
      app.apply_scheduled();
      log::debug!("selection settled in phase {:?}", app.selection_phase());

      if items.is_empty() {
        return Ok(format!("{}\n\nPlaylist is empty", title));
      }
      let mut lines = vec![title];
      lines.extend(items.iter().map(|item| format_video_line(&item.video)));
      Ok(lines.join("\n"))
    }
    "create" => {
      let title = string_arg(matches, "title")
        .ok_or_else(|| anyhow!("missing playlist title"))?
        .to_string();
      network
        .handle_network_event(IoEvent::CreatePlaylist {
          title,
          privacy: privacy_arg(matches),
        })
        .await;
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;
      list_playlists(&mut network).await
    }
    "edit" => {
      let playlist_id = string_arg(matches, "playlist")
        .ok_or_else(|| anyhow!("missing playlist id"))?
        .to_string();
      let title = string_arg(matches, "title")
        .ok_or_else(|| anyhow!("missing playlist title"))?
        .to_string();
      network
        .handle_network_event(IoEvent::EditPlaylist {
          playlist_id,
          title,
          privacy: privacy_arg(matches),
        })
        .await;
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;
      list_playlists(&mut network).await
    }
    "delete" => {
      let playlist_id = string_arg(matches, "playlist")
        .ok_or_else(|| anyhow!("missing playlist id"))?
        .to_string();
      network
        .handle_network_event(IoEvent::DeletePlaylist { playlist_id })
        .await;
      run_until_idle(&mut network, &io_rx).await;
      bail_on_api_error(&network).await?;
      list_playlists(&mut network).await
    }
    _ => Err(anyhow!("unknown command: {}", cmd)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_playlist_line() {
    let playlist = Playlist {
      id: "PL1".to_string(),
      title: "Watch Later".to_string(),
      video_count: Some(12),
      ..Playlist::default()
    };
    assert_eq!(
      format_playlist_line(&playlist, true),
      "* Watch Later  [PL1] (12 videos)"
    );
    assert_eq!(
      format_playlist_line(&playlist, false),
      "  Watch Later  [PL1] (12 videos)"
    );
  }

  #[test]
  fn test_format_playlist_line_counts_embedded_videos() {
    let playlist = Playlist {
      id: "PL1".to_string(),
      title: "Mix".to_string(),
      videos: vec![Video::default(), Video::default()],
      ..Playlist::default()
    };
    assert_eq!(format_playlist_line(&playlist, false), "  Mix  [PL1] (2 videos)");
  }

  #[test]
  fn test_format_video_line() {
    let video = Video {
      video_id: "v1".to_string(),
      title: "A Video".to_string(),
      author: Some("Someone".to_string()),
      length_seconds: Some(245),
      index_id: Some("3".to_string()),
    };
    assert_eq!(format_video_line(&video), "   3  A Video - Someone (4:05)");

    let bare = Video {
      video_id: "v2".to_string(),
      title: "Bare".to_string(),
      ..Video::default()
    };
    assert_eq!(format_video_line(&bare), "   -  Bare - unknown (0:00)");
  }
}
