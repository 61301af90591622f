use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vidshelf::adapters;
use vidshelf::application::{DocumentStore, LibrarySession};
use vidshelf::config::{AppConfig, StorageBackend};
use vidshelf::domain::{NewPlaylist, PlaylistPatch, VideoRecord, DEFAULT_PLAYLIST_ID};
use vidshelf::ports::DocumentStorage;

#[derive(Parser)]
#[command(name = "vidshelf", version, about = "Track your local video library")]
struct Cli {
    /// Storage backend (overrides STORAGE_BACKEND)
    #[arg(long, value_enum, global = true)]
    backend: Option<StorageBackend>,

    /// Data directory (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List videos in sequence order
    Videos {
        #[arg(long)]
        playlist: Option<String>,
    },
    /// List playlists alphabetically
    Playlists,
    /// Import video files
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = DEFAULT_PLAYLIST_ID)]
        playlist: String,
    },
    /// Record watch progress (percent)
    Progress {
        id: String,
        percent: f64,
        /// Playback position in seconds
        #[arg(long)]
        time: Option<f64>,
    },
    /// Record a video's duration in seconds
    Duration { id: String, seconds: f64 },
    /// Remove a video
    Remove { id: String },
    CreatePlaylist {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    UpdatePlaylist {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a playlist; its videos move to the default playlist
    DeletePlaylist { id: String },
    /// Move a video to the end of another playlist
    Move { video: String, playlist: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let storage = match adapters::from_config(&config) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };
    let store = DocumentStore::with_keys(storage, &config.db_key, &config.legacy_db_key);

    if let Err(e) = run(cli.command, store).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run<S: DocumentStorage>(
    command: Command,
    store: DocumentStore<S>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match command {
        Command::Videos { playlist } => {
            for video in store.list_videos(playlist.as_deref()).await {
                print_video(&video);
            }
        }
        Command::Playlists => {
            let doc = store.load().await;
            for playlist in doc.playlists_by_name() {
                let count = doc.video_count(&playlist.id);
                println!("{}  {} ({} videos)", playlist.id, playlist.name, count);
            }
        }
        Command::Add { files, playlist } => {
            let mut session = LibrarySession::open(store).await;
            for video in session.add_files(&files, Some(playlist.as_str())).await? {
                print_video(&video);
            }
        }
        Command::Progress { id, percent, time } => {
            require(store.update_progress(&id, percent, time).await?, "video", &id)?;
        }
        Command::Duration { id, seconds } => {
            require(store.update_duration(&id, seconds).await?, "video", &id)?;
        }
        Command::Remove { id } => {
            let removed = store.remove_video(&id).await?;
            require(removed.is_some(), "video", &id)?;
        }
        Command::CreatePlaylist {
            name,
            description,
            color,
        } => {
            let playlist = store
                .create_playlist(NewPlaylist {
                    name,
                    description,
                    color,
                })
                .await?;
            println!("{}", playlist.id);
        }
        Command::UpdatePlaylist {
            id,
            name,
            description,
            color,
        } => {
            let patch = PlaylistPatch {
                name,
                description,
                color,
            };
            let updated = store.update_playlist(&id, patch).await?;
            require(updated.is_some(), "playlist", &id)?;
        }
        Command::DeletePlaylist { id } => {
            if id == DEFAULT_PLAYLIST_ID {
                return Err("the default playlist cannot be deleted".into());
            }
            require(store.delete_playlist(&id).await?, "playlist", &id)?;
        }
        Command::Move { video, playlist } => {
            if !store.move_video_to_playlist(&video, &playlist).await? {
                return Err(format!("unknown video '{}' or playlist '{}'", video, playlist).into());
            }
        }
    }
    Ok(())
}

fn require(found: bool, kind: &str, id: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if found {
        Ok(())
    } else {
        Err(format!("no {} with id '{}'", kind, id).into())
    }
}

fn print_video(video: &VideoRecord) {
    println!(
        "{:>3}  {}  {}  {:.0}%{}",
        video.sequence,
        video.id,
        video.name,
        video.progress,
        if video.watched { "  watched" } else { "" }
    );
}
