mod clap;
mod util;

pub use self::clap::{
  create_subcommand, delete_subcommand, edit_subcommand, playlists_subcommand, videos_subcommand,
};
pub use self::util::handle_matches;
