use crate::accounts::{Account, CapabilityFlags};
use crate::model::{ChannelPlaylist, ContentItem, Playlist, Video};
use crate::network::IoEvent;
use crate::resource::{EndpointVariant, PlaylistResource};
use crate::store::Store;
use crate::user_config::UserConfig;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// How long a loaded catalog satisfies non-forced reloads.
const CATALOG_FRESHNESS: Duration = Duration::from_secs(60);

/// State-correcting writes queued during a read and applied on the next
/// driver tick, so a read never mutates shared state mid-evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum ScheduledUpdate {
  SelectPlaylist(String),
}

/// Where the current selection sits between loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPhase {
  Unselected,
  Loading,
  Loaded,
  Stale,
}

/// A decoded load completion, tagged by the cache that observes it.
#[derive(Clone, Debug)]
pub enum FetchedPlaylist {
  User(Playlist),
  Channel(ChannelPlaylist),
}

pub struct App {
  pub user_config: UserConfig,
  pub account: Account,
  pub capabilities: CapabilityFlags,
  /// Playlist summaries for the active account, replaced wholesale on reload.
  pub playlists: Vec<Playlist>,
  /// Bumped on every catalog replacement; completions from an older
  /// generation are dropped instead of observed.
  pub playlists_generation: u64,
  pub catalog_loaded_at: Option<Instant>,
  /// Identifier of the playlist being viewed. Empty means unresolved; a read
  /// schedules repair to the catalog's first entry.
  pub selected_playlist_id: String,
  pub user_playlist: Store<Playlist>,
  pub channel_playlist: Store<ChannelPlaylist>,
  resource: Option<PlaylistResource>,
  scheduled: Vec<ScheduledUpdate>,
  pub api_error: String,
  pub is_loading: bool,
  io_tx: Option<Sender<IoEvent>>,
}

impl Default for App {
  fn default() -> App {
    let account = Account::default();
    App {
      user_config: UserConfig::default(),
      capabilities: account.capabilities(),
      account,
      playlists: Vec::new(),
      playlists_generation: 0,
      catalog_loaded_at: None,
      selected_playlist_id: String::new(),
      user_playlist: Store::new(),
      channel_playlist: Store::new(),
      resource: None,
      scheduled: Vec::new(),
      api_error: String::new(),
      is_loading: false,
      io_tx: None,
    }
  }
}

impl App {
  pub fn new(io_tx: Sender<IoEvent>, user_config: UserConfig, account: Account) -> App {
    App {
      io_tx: Some(io_tx),
      user_config,
      capabilities: account.capabilities(),
      account,
      ..App::default()
    }
  }

  // Send a network event to the network thread
  pub fn dispatch(&mut self, action: IoEvent) {
    // `is_loading` is reset once the async action has finished in network
    self.is_loading = true;
    if let Some(io_tx) = &self.io_tx {
      if let Err(e) = io_tx.send(action) {
        self.is_loading = false;
        log::error!("error from dispatch: {}", e);
      };
    }
  }

  // Close the IO channel to allow the network thread to exit gracefully
  pub fn close_io_channel(&mut self) {
    self.io_tx = None;
  }

  pub fn handle_error(&mut self, e: anyhow::Error) {
    log::error!("api error: {}", e);
    self.api_error = e.to_string();
    self.is_loading = false;
  }

  // `playlists` catalog

  pub fn set_playlists(&mut self, playlists: Vec<Playlist>) {
    self.playlists = playlists;
    self.playlists_generation += 1;
    self.catalog_loaded_at = Some(Instant::now());
  }

  pub fn catalog_is_fresh(&self) -> bool {
    self
      .catalog_loaded_at
      .is_some_and(|at| at.elapsed() < CATALOG_FRESHNESS)
  }

  pub fn find_playlist(&self, id: &str) -> Option<&Playlist> {
    self.playlists.iter().find(|playlist| playlist.id == id)
  }

  /// The catalog entry following `id`, `None` past the last one.
  pub fn next_playlist_after(&self, id: &str) -> Option<&Playlist> {
    let position = self
      .playlists
      .iter()
      .position(|playlist| playlist.id == id)?;
    self.playlists.get(position + 1)
  }

  // Selection tracker

  /// Non-mutating resolution of the stored selection id: catalog lookup with
  /// fallback to the first entry when the id is empty or no longer present.
  pub fn resolved_playlist(&self) -> Option<&Playlist> {
    if self.selected_playlist_id.is_empty() {
      return self.playlists.first();
    }
    self
      .find_playlist(&self.selected_playlist_id)
      .or_else(|| self.playlists.first())
  }

  /// The playlist being viewed. An empty selection id is repaired to the
  /// catalog's first entry on the next tick; this evaluation already returns
  /// that entry so downstream consumers never see an empty result while the
  /// catalog has one.
  pub fn current_playlist(&mut self) -> Option<Playlist> {
    if self.selected_playlist_id.is_empty() {
      if let Some(first) = self.playlists.first() {
        self
          .scheduled
          .push(ScheduledUpdate::SelectPlaylist(first.id.clone()));
      }
    }
    self.resolved_playlist().cloned()
  }

  /// Drain the scheduled-update queue. Called once per driver tick, never
  /// from inside a read.
  pub fn apply_scheduled(&mut self) {
    for update in std::mem::take(&mut self.scheduled) {
      match update {
        ScheduledUpdate::SelectPlaylist(id) => {
          // Repair only fills a selection that is still empty; it never
          // overrides an explicit selection made since it was queued.
          if self.selected_playlist_id.is_empty() {
            self.selected_playlist_id = id;
          }
        }
      }
    }
  }

  pub fn has_scheduled(&self) -> bool {
    !self.scheduled.is_empty()
  }

  /// Explicit selection. Both result caches are cleared before the load for
  /// the new selection is issued, so stale contents are never paired with a
  /// mismatched selection id.
  pub fn select_playlist(&mut self, id: &str) {
    if self.selected_playlist_id == id {
      return;
    }
    self.selected_playlist_id = id.to_string();
    self.invalidate_fetched();
    self.load_current_playlist();
  }

  /// Step to the catalog entry after the current one; an exhausted catalog
  /// resets the selection, which repairs back to the first entry.
  pub fn select_next_playlist(&mut self) {
    let next = self
      .resolved_playlist()
      .and_then(|playlist| self.next_playlist_after(&playlist.id))
      .map(|playlist| playlist.id.clone())
      .unwrap_or_default();
    self.select_playlist(&next);
  }

  /// Handoff after a create flow completed and the catalog was reloaded.
  pub fn select_created_playlist(&mut self, playlist: &Playlist) {
    let id = playlist.id.clone();
    self.select_playlist(&id);
  }

  /// Handoff after an edit flow completed; `None` means the playlist was
  /// deleted and the selection resets to unresolved.
  pub fn select_edited_playlist(&mut self, playlist: Option<&Playlist>) {
    let id = playlist
      .map(|playlist| playlist.id.clone())
      .unwrap_or_default();
    self.select_playlist(&id);
  }

  /// Swap the active account: capability flags, caches, and resource handle
  /// change together, and the forced catalog reload bumps the generation so
  /// completions issued under the old account are dropped.
  pub fn set_account(&mut self, account: Account) {
    self.capabilities = account.capabilities();
    self.account = account;
    self.invalidate_fetched();
    self.catalog_loaded_at = None;
    self.dispatch(IoEvent::GetPlaylists { force: true });
  }

  fn invalidate_fetched(&mut self) {
    self.channel_playlist.clear();
    self.user_playlist.clear();
    self.resource = None;
  }

  // Source router

  /// Remote handle for the current playlist's contents, rebuilt when the
  /// selection or the routing flag changes. Exactly one cache observes it:
  /// the channel-playlist cache when the account routes user playlists
  /// through the channel playlist endpoint, the user-playlist cache
  /// otherwise.
  pub fn playlist_resource(&mut self) -> Option<&mut PlaylistResource> {
    let playlist_id = self.resolved_playlist()?.id.clone();
    let observer = if self
      .capabilities
      .user_playlists_use_channel_playlist_endpoint
    {
      EndpointVariant::ChannelPlaylist
    } else {
      EndpointVariant::UserPlaylist
    };

    let rebuild = match &self.resource {
      Some(resource) => resource.playlist_id != playlist_id || resource.observer != observer,
      None => true,
    };
    if rebuild {
      self.resource = Some(PlaylistResource::new(playlist_id, observer));
    }
    self.resource.as_mut()
  }

  pub fn load_current_playlist(&mut self) {
    let generation = self.playlists_generation;
    let event = self
      .playlist_resource()
      .map(|resource| resource.load(generation));
    if let Some(event) = event {
      self.dispatch(event);
    }
  }

  pub fn load_current_playlist_if_needed(&mut self) {
    let generation = self.playlists_generation;
    let event = self
      .playlist_resource()
      .and_then(|resource| resource.load_if_needed(generation));
    if let Some(event) = event {
      self.dispatch(event);
    }
  }

  /// Deliver a load completion to the cache named by its variant. Last
  /// observe wins; only completions from an outdated catalog generation are
  /// dropped (the account/reload guard).
  pub fn observe_playlist(&mut self, playlist_id: &str, generation: u64, fetched: FetchedPlaylist) {
    self.is_loading = false;
    if generation != self.playlists_generation {
      log::debug!(
        "dropping stale playlist payload for {} (generation {} != {})",
        playlist_id,
        generation,
        self.playlists_generation
      );
      return;
    }

    match fetched {
      FetchedPlaylist::User(playlist) => self.user_playlist.observe(playlist),
      FetchedPlaylist::Channel(playlist) => self.channel_playlist.observe(playlist),
    }

    if let Some(resource) = self.resource.as_mut() {
      if resource.playlist_id == playlist_id {
        resource.mark_fresh();
      }
    }
  }

  // Video list normalizer

  /// Ordered videos of the current playlist: embedded contents when present,
  /// otherwise whichever cache holds a snapshot. When the endpoint did not
  /// include per-video indices, every index marker is regenerated from the
  /// fetched order.
  pub fn resolve_videos(&mut self) -> Vec<Video> {
    let mut videos = self
      .current_playlist()
      .map(|playlist| playlist.videos)
      .unwrap_or_default();

    if videos.is_empty() {
      videos = self
        .user_playlist
        .item()
        .map(|playlist| playlist.videos.clone())
        .or_else(|| {
          self
            .channel_playlist
            .item()
            .map(|playlist| playlist.videos.clone())
        })
        .unwrap_or_default();

      if !self.capabilities.user_playlists_endpoint_includes_videos {
        let mut i = 0;
        for video in videos.iter_mut() {
          video.index_id = Some(i.to_string());
          i += 1;
        }
      }
    }

    videos
  }

  pub fn content_items(&mut self) -> Vec<ContentItem> {
    ContentItem::array_of(self.resolve_videos())
  }

  pub fn selection_phase(&self) -> SelectionPhase {
    let Some(playlist) = self.resolved_playlist() else {
      return SelectionPhase::Unselected;
    };
    if !playlist.videos.is_empty()
      || !self.user_playlist.is_empty()
      || !self.channel_playlist.is_empty()
    {
      return SelectionPhase::Loaded;
    }
    match &self.resource {
      Some(resource) if resource.is_in_flight() => SelectionPhase::Loading,
      _ => SelectionPhase::Stale,
    }
  }
}
