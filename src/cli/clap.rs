use clap::{Arg, ArgAction, Command};

fn playlist_id_arg() -> Arg {
  Arg::new("playlist")
    .value_name("PLAYLIST_ID")
    .help("Identifier of the playlist")
}

fn privacy_arg() -> Arg {
  Arg::new("privacy")
    .short('p')
    .long("privacy")
    .value_name("PRIVACY")
    .value_parser(["private", "public", "unlisted"])
    .default_value("private")
    .help("Visibility of the playlist")
}

pub fn playlists_subcommand() -> Command {
  Command::new("playlists")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Lists your playlists and marks the current one")
    .visible_alias("pl")
    .arg(
      Arg::new("refresh")
        .short('r')
        .long("refresh")
        .action(ArgAction::SetTrue)
        .help("Force a refresh of the playlist catalog"),
    )
}

pub fn videos_subcommand() -> Command {
  Command::new("videos")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Shows the videos of a playlist")
    .long_about(
      "Shows the videos of the given playlist, or of the current selection when no \
PLAYLIST_ID is passed. Contents come from whichever endpoint the account's backend \
supports; position markers are regenerated when the backend omits them.",
    )
    .visible_alias("v")
    .arg(playlist_id_arg())
    .arg(
      Arg::new("next")
        .short('n')
        .long("next")
        .action(ArgAction::SetTrue)
        .conflicts_with("playlist")
        .help("Step to the playlist after the current one first"),
    )
}

pub fn create_subcommand() -> Command {
  Command::new("create")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Creates a new playlist and selects it")
    .arg(
      Arg::new("title")
        .value_name("TITLE")
        .required(true)
        .help("Title of the new playlist"),
    )
    .arg(privacy_arg())
}

pub fn edit_subcommand() -> Command {
  Command::new("edit")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Renames a playlist and selects it")
    .arg(playlist_id_arg().required(true))
    .arg(
      Arg::new("title")
        .short('t')
        .long("title")
        .value_name("TITLE")
        .required(true)
        .help("New title for the playlist"),
    )
    .arg(privacy_arg())
}

pub fn delete_subcommand() -> Command {
  Command::new("delete")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Deletes a playlist")
    .arg(playlist_id_arg().required(true))
}
