//! Terminal host for the TransCoope shell.
//!
//! # Responsibility
//! - Drive `transcoope_core` sessions from the command line.
//! - Render toasts, panels and progress as plain text lines.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use transcoope_core::model::notification::{Notification, Toast};
use transcoope_core::model::transcription::{TranscriptionProgress, TranscriptionResult};
use transcoope_core::model::upload::media_type_for_extension;
use transcoope_core::nav::loader::{Recommendation, SectionContent};
use transcoope_core::service::profile_service::ProfileView;
use transcoope_core::service::search::SearchResults;
use transcoope_core::{
    default_log_level, init_logging, AudioFile, ContentRenderer, InitError, Section, Session,
    ShellConfig, SimulatedLoader, SqliteKvStore,
};

const DB_FILE_NAME: &str = "transcoope.db";

#[derive(Parser, Debug)]
#[command(name = "transcoope", version, about = "Terminal host for the TransCoope shell")]
struct Args {
    /// Directory holding the store database and logs.
    #[arg(long, env = "TRANSCOOPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, env = "TRANSCOOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Open the shell at a section fragment.
    Open {
        #[arg(long)]
        fragment: Option<String>,
    },
    /// List notifications.
    Notifications {
        #[arg(long)]
        mark_read: bool,
    },
    /// Dismiss one notification.
    Dismiss { id: u64 },
    /// Validate an audio file for upload.
    Upload {
        path: PathBuf,
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Run the simulated transcription on an audio file. Ctrl-C cancels.
    Transcribe {
        path: PathBuf,
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Search the catalog.
    Search { query: String },
    /// Show the local profile.
    Profile,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Open { .. } => "open",
            Self::Notifications { .. } => "notifications",
            Self::Dismiss { .. } => "dismiss",
            Self::Upload { .. } => "upload",
            Self::Transcribe { .. } => "transcribe",
            Self::Search { .. } => "search",
            Self::Profile => "profile",
        }
    }
}

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Config(transcoope_core::ConfigError),
    Store(transcoope_core::db::DbError),
    Init(InitError),
    Logging(transcoope_core::LoggingError),
    Rejected(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Config(err) => write!(f, "config error: {err}"),
            Self::Store(err) => write!(f, "store error: {err}"),
            Self::Init(err) => write!(f, "shell failed to start: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Rejected(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<transcoope_core::db::DbError> for CliError {
    fn from(value: transcoope_core::db::DbError) -> Self {
        Self::Store(value)
    }
}

impl From<InitError> for CliError {
    fn from(value: InitError) -> Self {
        Self::Init(value)
    }
}

type CliSession = Session<SqliteKvStore, TerminalRenderer, SimulatedLoader>;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if matches!(args.command, Command::Ping) {
        println!("transcoope_core ping={}", transcoope_core::ping());
        println!("transcoope_core version={}", transcoope_core::core_version());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ShellConfig::load(path).map_err(CliError::Config)?,
        None => ShellConfig::default(),
    };
    let data_dir = resolve_data_dir(args.data_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    start_logging(&config, &data_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(args.command, config, &data_dir))
}

async fn execute(command: Command, config: ShellConfig, data_dir: &Path) -> Result<(), CliError> {
    let mut session = start_session(config, data_dir)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command.name()
    );

    match command {
        Command::Ping => {}
        Command::Open { fragment } => {
            session.open(fragment.as_deref()).await;
            if let Some(active) = session.navigator().active() {
                println!("active section: {} ({})", active.title(), active.id());
            }
        }
        Command::Notifications { mark_read } => {
            if mark_read {
                session
                    .mark_notifications_read()
                    .map_err(|err| CliError::Rejected(err.to_string()))?;
            } else {
                session.open_notifications();
            }
        }
        Command::Dismiss { id } => {
            session
                .dismiss_notification(id)
                .map_err(|err| CliError::Rejected(err.to_string()))?;
        }
        Command::Upload { path, media_type } => {
            let file = audio_file_from_path(&path, media_type)?;
            session
                .select_file(file)
                .map_err(|err| CliError::Rejected(err.user_message()))?;
        }
        Command::Transcribe { path, media_type } => {
            let file = audio_file_from_path(&path, media_type)?;
            session
                .select_file(file)
                .map_err(|err| CliError::Rejected(err.user_message()))?;
            let outcome = session.transcribe_until(ctrl_c()).await;
            if let Some(Err(err)) = outcome {
                return Err(CliError::Rejected(err.to_string()));
            }
        }
        Command::Search { query } => {
            if session.search(&query).await.is_none() {
                return Err(CliError::Rejected("search query is empty".to_string()));
            }
        }
        Command::Profile => {
            let user = session.user();
            println!("user id: {}", user.id);
            println!("recent activity:");
            for activity in &session.profile().recent_activity {
                println!("  [{}] {} ({})", activity.kind.icon(), activity.message, activity.time);
            }
        }
    }

    info!("event=cli_command module=cli status=ok");
    Ok(())
}

fn start_session(config: ShellConfig, data_dir: &Path) -> Result<CliSession, CliError> {
    let backend = SqliteKvStore::open(data_dir.join(DB_FILE_NAME))?;
    let loader = SimulatedLoader::new(config.load_delay());
    Ok(Session::start(config, backend, TerminalRenderer::default(), loader)?)
}

fn start_logging(config: &ShellConfig, data_dir: &Path) -> Result<(), CliError> {
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = data_dir.join("logs");
    init_logging(level, &log_dir.to_string_lossy()).map_err(CliError::Logging)
}

fn resolve_data_dir(requested: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let dir = requested.unwrap_or_else(|| std::env::temp_dir().join("transcoope"));
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

fn audio_file_from_path(path: &Path, media_type: Option<String>) -> Result<AudioFile, CliError> {
    let size_bytes = std::fs::metadata(path)?.len();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = media_type.unwrap_or_else(|| {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        media_type_for_extension(&extension).to_string()
    });
    Ok(AudioFile::new(name, media_type, size_bytes))
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=cli_signal module=cli status=error error={err}");
        std::future::pending::<()>().await;
    }
}

/// Prints everything the shell shows as plain lines on stdout.
#[derive(Default)]
struct TerminalRenderer {
    filled: BTreeSet<Section>,
}

impl ContentRenderer for TerminalRenderer {
    fn set_section_active(&mut self, _section: Section, _active: bool) {}

    fn has_content(&self, section: Section) -> bool {
        self.filled.contains(&section)
    }

    fn render_section(&mut self, section: Section, content: &SectionContent) {
        self.filled.insert(section);
        match content {
            SectionContent::Dashboard(dashboard) => {
                println!("== {} ==", section.title());
                for activity in &dashboard.recent_activity {
                    println!("  {} {}", activity.message, activity.time);
                }
                self.show_recommendations(&dashboard.recommendations);
                for entry in &dashboard.spotlight {
                    println!(
                        "  spotlight: {} by {} ({} likes, {} comments)",
                        entry.project, entry.user, entry.likes, entry.comments
                    );
                }
            }
            SectionContent::Panel(panel) => {
                println!("== {} ==", panel.heading);
                println!("  {}", panel.blurb);
            }
        }
    }

    fn set_address_fragment(&mut self, _fragment: &str) {}

    fn set_title(&mut self, title: &str) {
        println!("[{title}]");
    }

    fn show_toast(&mut self, toast: &Toast) {
        println!("({}) {}", toast.kind.as_str(), toast.message);
    }

    fn show_fatal(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn show_profile(&mut self, view: &ProfileView) {
        println!(
            "{} {}, {} ({})",
            view.greeting.emoji(),
            view.greeting.label(),
            view.username,
            view.avatar_initial
        );
        println!(
            "  transcriptions={} projects={} downloads={} collaborations={}",
            view.stats.transcriptions,
            view.stats.projects,
            view.stats.downloads,
            view.stats.collaborations
        );
    }

    fn show_notifications(&mut self, notifications: &[Notification], unread: usize) {
        println!("notifications ({unread} unread):");
        for notification in notifications {
            let marker = if notification.read { ' ' } else { '*' };
            println!(
                " {marker} #{} [{}] {}: {} ({})",
                notification.id,
                notification.kind.as_str(),
                notification.title,
                notification.message,
                notification.time
            );
        }
    }

    fn show_recommendations(&mut self, recommendations: &[Recommendation]) {
        for recommendation in recommendations {
            println!(
                "  {} {} - {} ({})",
                recommendation.icon,
                recommendation.title,
                recommendation.description,
                recommendation.meta
            );
        }
    }

    fn show_selected_file(&mut self, file: &AudioFile, size_label: &str) {
        println!("selected {} ({size_label}, {})", file.name, file.media_type);
    }

    fn show_search_results(&mut self, results: &SearchResults) {
        println!("results for \"{}\":", results.query);
        for song in &results.songs {
            println!("  song    {} - {} ({:.2})", song.name, song.artist, song.score);
        }
        for project in &results.projects {
            println!("  project {} by {} ({:.2})", project.name, project.author, project.score);
        }
        for user in &results.users {
            println!("  user    {} ({:.2})", user.name, user.score);
        }
    }

    fn show_transcription_progress(&mut self, progress: &TranscriptionProgress) {
        println!("[{:>3}%] {}", progress.percent, progress.message);
    }

    fn show_transcription_result(&mut self, result: &TranscriptionResult) {
        println!(
            "{}: {} | {} | {} BPM | {}",
            result.file,
            result.key,
            result.duration,
            result.bpm,
            result.instruments.join(", ")
        );
    }

    fn set_date_label(&mut self, label: &str) {
        println!("{label}");
    }
}
