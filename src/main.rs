mod accounts;
mod app;
mod banner;
mod cli;
mod model;
mod network;
mod resource;
mod store;
mod user_config;

use anyhow::{anyhow, Result};
use app::App;
use backtrace::Backtrace;
use banner::BANNER;
use clap::{Arg, Command as ClapApp};
use clap_complete::{generate, Shell};
use log::info;
use network::{IoEvent, Network};
use std::{
  fs,
  io::{self, Write},
  panic,
  path::PathBuf,
  sync::Arc,
};
use tokio::sync::Mutex;
use user_config::{UserConfig, UserConfigPaths};

fn log_level_filter(level: &str) -> log::LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => log::LevelFilter::Off,
    "error" => log::LevelFilter::Error,
    "warn" => log::LevelFilter::Warn,
    "debug" => log::LevelFilter::Debug,
    "trace" => log::LevelFilter::Trace,
    _ => log::LevelFilter::Info,
  }
}

fn setup_logging(user_config: &UserConfig) -> Result<()> {
  let pid = std::process::id();
  let log_dir = "/tmp/tubelist_logs/";
  let log_path = format!("{}/tubelistlog{}", log_dir, pid);

  if !std::path::Path::new(log_dir).exists() {
    std::fs::create_dir_all(log_dir)
      .map_err(|e| anyhow!("Failed to create log directory {}: {}", log_dir, e))?;
  }

  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{}[{}][{}] {}",
        chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(log_level_filter(&user_config.behavior.log_level))
    .chain(fern::log_file(&log_path)?)
    .apply()
    .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

  Ok(())
}

fn install_panic_hook() {
  let default_hook = panic::take_hook();
  panic::set_hook(Box::new(move |info| {
    let panic_log_path = dirs::home_dir().map(|home| {
      home
        .join(".config")
        .join("tubelist")
        .join("tubelist_panic.log")
    });

    if let Some(path) = panic_log_path.as_ref() {
      if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
      }
      if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
      {
        let _ = writeln!(f, "\n==== tubelist panic ====");
        let _ = writeln!(f, "{}", info);
        let _ = writeln!(f, "{:?}", Backtrace::new());
      }
      eprintln!("A crash log was written to: {}", path.to_string_lossy());
    }
    default_hook(info);
  }));
}

#[tokio::main]
async fn main() -> Result<()> {
  install_panic_hook();

  let mut clap_app = ClapApp::new(env!("CARGO_PKG_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .author(env!("CARGO_PKG_AUTHORS"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .before_help(BANNER)
    .after_help(
      "Accounts and instances are configured in $HOME/.config/tubelist/config.yml. \
Running without a subcommand lists your playlists.",
    )
    .arg(
      Arg::new("config")
        .short('c')
        .long("config")
        .help("Specify configuration file path."),
    )
    .arg(
      Arg::new("account")
        .short('a')
        .long("account")
        .value_name("NAME")
        .help("Use the named account from the config file"),
    )
    .arg(
      Arg::new("instance")
        .long("instance")
        .value_name("URL")
        .help("Override the account's instance URL"),
    )
    .arg(
      Arg::new("completions")
        .long("completions")
        .help("Generates completions for your preferred shell")
        .value_parser(["bash", "zsh", "fish", "power-shell", "elvish"])
        .value_name("SHELL"),
    )
    .subcommand(cli::playlists_subcommand())
    .subcommand(cli::videos_subcommand())
    .subcommand(cli::create_subcommand())
    .subcommand(cli::edit_subcommand())
    .subcommand(cli::delete_subcommand());

  let matches = clap_app.clone().get_matches();

  // Shell completions don't need any account work
  if let Some(s) = matches.get_one::<String>("completions") {
    let shell = match s.as_str() {
      "fish" => Shell::Fish,
      "bash" => Shell::Bash,
      "zsh" => Shell::Zsh,
      "power-shell" => Shell::PowerShell,
      "elvish" => Shell::Elvish,
      _ => return Err(anyhow!("no completions avaible for '{}'", s)),
    };
    generate(shell, &mut clap_app, "tubelist", &mut io::stdout());
    return Ok(());
  }

  let mut user_config = UserConfig::new();
  if let Some(config_file_path) = matches.get_one::<String>("config") {
    let config_file_path = PathBuf::from(config_file_path);
    let path = UserConfigPaths { config_file_path };
    user_config.path_to_config.replace(path);
  }
  user_config.load_config()?;

  setup_logging(&user_config)?;
  info!("tubelist {} starting up", env!("CARGO_PKG_VERSION"));

  let mut account = user_config.account(matches.get_one::<String>("account").map(String::as_str))?;
  if let Some(instance_url) = matches.get_one::<String>("instance") {
    account.instance_url = instance_url.clone();
  }
  info!(
    "using account {} against {}",
    account.display_name(),
    account.instance_url
  );

  let (sync_io_tx, sync_io_rx) = std::sync::mpsc::channel::<IoEvent>();
  let app = Arc::new(Mutex::new(App::new(
    sync_io_tx,
    user_config.clone(),
    account,
  )));
  let cloned_app = Arc::clone(&app);
  let network = Network::new(&app, &user_config)?;

  let (cmd, sub_matches) = match matches.subcommand() {
    Some((cmd, sub_matches)) => (cmd.to_string(), sub_matches.clone()),
    // Bare invocation behaves like `tubelist playlists`
    None => ("playlists".to_string(), matches.clone()),
  };
  info!("running command: {}", cmd);

  let output = cli::handle_matches(&sub_matches, cmd, network, sync_io_rx).await;
  cloned_app.lock().await.close_io_channel();
  println!("{}", output?);

  Ok(())
}
