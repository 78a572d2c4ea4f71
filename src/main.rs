use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tokio::sync::Mutex;
use vaultsync::{
    cli, config, error,
    sync::{MirrorOptions, VaultOptions},
    types::PkceToken,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Aggregate all owned playlists and liked songs into the vault playlist
    Vault(VaultArgs),

    /// Mirror liked songs, newest first, into a playlist
    Liked(LikedArgs),

    /// List owned playlists and their role in the sync
    Playlists,

    /// Run the HTTP front end
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct VaultArgs {
    /// Name of the vault playlist (defaults to VAULT_PLAYLIST_NAME)
    #[clap(long)]
    pub name: Option<String>,

    /// Use this playlist id instead of looking the vault up
    #[clap(long)]
    pub playlist_id: Option<String>,

    /// Compute the changes without writing them
    #[clap(long)]
    pub dry_run: bool,

    /// Order the vault by when tracks were added, newest first
    #[clap(long)]
    pub chronological: bool,

    /// Keep retrying transient failures instead of giving up after 5 attempts
    #[clap(long)]
    pub unbounded_retries: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LikedArgs {
    /// Name of the mirror playlist (defaults to MIRROR_PLAYLIST_NAME)
    #[clap(long)]
    pub name: Option<String>,

    /// Use this playlist id instead of looking the mirror up
    #[clap(long)]
    pub playlist_id: Option<String>,

    /// Create the mirror as a public playlist
    #[clap(long)]
    pub public: bool,

    /// Compute the changes without writing them
    #[clap(long)]
    pub dry_run: bool,

    /// Re-read the playlist afterwards and compare its length
    #[clap(long)]
    pub verify: bool,

    /// Keep retrying transient failures instead of giving up after 5 attempts
    #[clap(long)]
    pub unbounded_retries: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let settings = cli::settings();
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(&settings, Arc::clone(&oauth_result)).await;
        }
        Command::Vault(args) => {
            let settings = cli::settings();
            let options = VaultOptions {
                playlist_name: args
                    .name
                    .unwrap_or_else(|| settings.vault_playlist_name.clone()),
                playlist_id: args.playlist_id,
                dry_run: args.dry_run,
                chronological: args.chronological,
            };
            cli::vault(&settings, options, args.unbounded_retries).await
        }
        Command::Liked(args) => {
            let settings = cli::settings();
            let options = MirrorOptions {
                playlist_name: args
                    .name
                    .unwrap_or_else(|| settings.mirror_playlist_name.clone()),
                playlist_id: args.playlist_id,
                public: args.public || settings.mirror_public,
                dry_run: args.dry_run,
                verify: args.verify,
            };
            cli::liked(&settings, options, args.unbounded_retries).await
        }
        Command::Playlists => cli::playlists(&cli::settings()).await,
        Command::Serve => cli::serve(cli::settings()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
