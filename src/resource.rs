use crate::network::IoEvent;
use std::time::{Duration, Instant};

/// How long a completed fetch stays fresh before `load_if_needed` reissues it.
const FRESHNESS_WINDOW: Duration = Duration::from_secs(30);
/// How long an in-flight fetch is trusted before it is considered lost.
const IN_FLIGHT_TIMEOUT: Duration = Duration::from_secs(15);

/// Which of the two result caches observes a load completion. Resolved once
/// per resource build from the account's capability flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointVariant {
  ChannelPlaylist,
  UserPlaylist,
}

#[derive(Clone, Copy, Debug)]
enum ResourceStatus {
  Idle,
  InFlight { since: Instant },
  Fresh { at: Instant },
}

/// Remote handle for one playlist's contents. Owns the load/freshness policy;
/// the fetch itself runs on the network task and reports back through
/// `App::observe_playlist`.
#[derive(Clone, Debug)]
pub struct PlaylistResource {
  pub playlist_id: String,
  pub observer: EndpointVariant,
  status: ResourceStatus,
}

impl PlaylistResource {
  pub fn new(playlist_id: String, observer: EndpointVariant) -> PlaylistResource {
    PlaylistResource {
      playlist_id,
      observer,
      status: ResourceStatus::Idle,
    }
  }

  /// Always issues a fresh fetch.
  pub fn load(&mut self, generation: u64) -> IoEvent {
    self.status = ResourceStatus::InFlight {
      since: Instant::now(),
    };
    IoEvent::LoadPlaylist {
      playlist_id: self.playlist_id.clone(),
      observer: self.observer,
      generation,
    }
  }

  /// Issues a fetch only when nothing usable is in flight or fresh.
  pub fn load_if_needed(&mut self, generation: u64) -> Option<IoEvent> {
    match self.status {
      ResourceStatus::Idle => Some(self.load(generation)),
      ResourceStatus::InFlight { since } if since.elapsed() > IN_FLIGHT_TIMEOUT => {
        Some(self.load(generation))
      }
      ResourceStatus::Fresh { at } if at.elapsed() > FRESHNESS_WINDOW => {
        Some(self.load(generation))
      }
      _ => None,
    }
  }

  /// Acknowledge a delivered completion.
  pub fn mark_fresh(&mut self) {
    self.status = ResourceStatus::Fresh { at: Instant::now() };
  }

  pub fn is_in_flight(&self) -> bool {
    matches!(self.status, ResourceStatus::InFlight { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resource() -> PlaylistResource {
    PlaylistResource::new("PL1".to_string(), EndpointVariant::UserPlaylist)
  }

  #[test]
  fn test_load_marks_in_flight() {
    let mut resource = resource();
    let event = resource.load(0);
    assert!(resource.is_in_flight());
    match event {
      IoEvent::LoadPlaylist {
        playlist_id,
        observer,
        generation,
      } => {
        assert_eq!(playlist_id, "PL1");
        assert_eq!(observer, EndpointVariant::UserPlaylist);
        assert_eq!(generation, 0);
      }
      other => panic!("unexpected event: {:?}", other),
    }
  }

  #[test]
  fn test_load_if_needed_skips_in_flight_and_fresh() {
    let mut resource = resource();
    assert!(resource.load_if_needed(0).is_some());
    // Now in flight: no duplicate fetch
    assert!(resource.load_if_needed(0).is_none());

    resource.mark_fresh();
    assert!(resource.load_if_needed(0).is_none());
  }

  #[test]
  fn test_load_if_needed_reissues_after_freshness_lapses() {
    let mut resource = resource();
    resource.status = ResourceStatus::Fresh {
      at: Instant::now() - FRESHNESS_WINDOW - Duration::from_secs(1),
    };
    assert!(resource.load_if_needed(3).is_some());
    assert!(resource.is_in_flight());
  }

  #[test]
  fn test_load_if_needed_reissues_lost_fetch() {
    let mut resource = resource();
    resource.status = ResourceStatus::InFlight {
      since: Instant::now() - IN_FLIGHT_TIMEOUT - Duration::from_secs(1),
    };
    assert!(resource.load_if_needed(0).is_some());
  }
}
