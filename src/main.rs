use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modassist::bridge::types::{CollectionInfo, SavegameSnapshot};
use modassist::bridge::{
    parse_message_graceful, serialize_message, Bridge, ParseResult, WindowTag,
};
use modassist::dom::Document;
use modassist::l10n::LocalizationRelay;
use modassist::views::savegame::{Badge, SavegameView};
use modassist::views::NotesView;
use modassist::Config;

#[derive(Parser)]
#[command(name = "modassist")]
#[command(
    author,
    version = "0.1.0",
    about = "Savegame inspector and host bridge for mod collections"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a savegame inspection from snapshot files
    Render {
        /// Collection snapshot JSON
        #[arg(long)]
        collection: PathBuf,

        /// Savegame analysis JSON
        #[arg(long)]
        savegame: PathBuf,

        /// Badge filter to pre-check (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// Run one window against a host process over stdin/stdout JSONL
    Listen {
        /// Window to run: savegame or notes
        #[arg(long, default_value = "savegame")]
        window: String,
    },

    /// Print the host channel contract
    Channels,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "modassist=info",
        1 => "modassist=debug",
        2 => "modassist=trace",
        _ => "trace",
    };

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    // stdout carries rendered markup or protocol traffic; logs go to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Config::load().await?;

    match cli.command {
        Commands::Render {
            collection,
            savegame,
            filters,
        } => cmd_render(&config, &collection, &savegame, &filters).await,
        Commands::Listen { window } => cmd_listen(&window).await,
        Commands::Channels => {
            cmd_channels();
            Ok(())
        }
    }
}

async fn load_snapshot<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot at {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot JSON at {}", path.display()))
}

async fn cmd_render(
    config: &Config,
    collection_path: &Path,
    savegame_path: &Path,
    filters: &[String],
) -> Result<()> {
    let collection: CollectionInfo = load_snapshot(collection_path).await?;
    let savegame: SavegameSnapshot = load_snapshot(savegame_path).await?;

    let (bridge, mut rx) = Bridge::new(WindowTag::Savegame);
    let document = Rc::new(RefCell::new(Document::new()));
    let relay = LocalizationRelay::new(Rc::clone(&document), bridge.outbound());
    let mut view = SavegameView::new(Rc::clone(&document), bridge.outbound(), relay);

    view.set_collection(collection);
    for name in config.default_filters.iter().chain(filters.iter()) {
        let Some(badge) = Badge::parse(name) else {
            let known: Vec<&str> = Badge::ALL.iter().map(Badge::as_str).collect();
            bail!("Unknown filter '{}'. Valid filters: {}", name, known.join(", "));
        };
        view.set_filter(badge, true);
    }
    view.render(&savegame);

    // One-shot mode has no host attached; markers render as their keys
    while let Ok(envelope) = rx.try_recv() {
        tracing::debug!(message = ?envelope.message, "no host attached, dropped");
    }

    println!("<main lang=\"{}\">", config.language);
    print!("{}", document.borrow().to_html());
    println!("</main>");
    Ok(())
}

async fn cmd_listen(window: &str) -> Result<()> {
    let tag = match window {
        "savegame" => WindowTag::Savegame,
        "notes" => WindowTag::Notes,
        other => bail!("Unknown window '{}'. Valid windows: savegame, notes", other),
    };

    let (bridge, mut rx) = Bridge::new(tag);
    let document = Rc::new(RefCell::new(Document::new()));
    let relay = LocalizationRelay::new(Rc::clone(&document), bridge.outbound());
    LocalizationRelay::attach(&relay, &bridge);

    // The bridge's listeners keep the controllers alive for the session
    if tag == WindowTag::Savegame {
        let view = Rc::new(RefCell::new(SavegameView::new(
            Rc::clone(&document),
            bridge.outbound(),
            Rc::clone(&relay),
        )));
        SavegameView::attach(view, &bridge);
    } else {
        let view = Rc::new(RefCell::new(NotesView::new(
            Rc::clone(&document),
            bridge.outbound(),
        )));
        NotesView::attach(view, &bridge);
    }

    tracing::info!(window = tag.as_str(), "listening on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read from host")? {
                    None => break,
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => match parse_message_graceful(&line) {
                        ParseResult::Ok(message) => bridge.dispatch(&message),
                        ParseResult::MissingType { raw } => {
                            tracing::warn!(raw = %raw, "host line without a type field");
                        }
                        ParseResult::UnknownChannel { channel, .. } => {
                            tracing::warn!(channel = %channel, "host message on unknown channel");
                        }
                        ParseResult::InvalidPayload { channel, error, .. } => {
                            tracing::warn!(channel = %channel, error = %error, "host message with invalid payload");
                        }
                        ParseResult::ParseError(err) => {
                            tracing::warn!(error = %err, "unparseable host line");
                        }
                    },
                }
            }
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                if envelope.reply.is_some() {
                    // The stdio link has no reply path; these windows never
                    // issue the blocking lookup.
                    tracing::warn!("blocking request over the stdio link dropped");
                    continue;
                }
                let line = serialize_message(&envelope.message)
                    .context("Failed to serialize outbound message")?;
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
    }

    Ok(())
}

const CHANNEL_CONTRACT: &[(&str, &str, &str)] = &[
    ("out", "toMain_log", "structured log line, fire-and-forget"),
    ("out", "toMain_getText_send", "request translations for a key set"),
    ("in", "fromMain_getText_return", "one resolved translation pair"),
    ("in", "fromMain_l10n_refresh", "re-collect markers and re-request"),
    ("out", "toMain_closeSubWindow", "close a sub window"),
    ("out", "toMain_setMoveFolder", "commit the pending move-folder choice"),
    ("out/sync", "toMain_homeDirRevamp", "blocking path display mapping"),
    ("out", "toMain_realFileLink", "forward resolved file mappings"),
    ("in", "fromMain_confirmList", "rows for the confirm window's file list"),
    ("in", "fromMain_collectionName", "collection metadata and notes"),
    ("in", "fromMain_saveInfo", "savegame analysis snapshot"),
    ("out", "toMain_selectInMain", "select composite keys in the main window"),
    ("out", "toMain_setNote", "persist one note field"),
];

fn cmd_channels() {
    println!("Host channel contract:");
    println!("{:-<76}", "");
    for (direction, name, semantics) in CHANNEL_CONTRACT {
        println!("  {direction:>8}  {name:<26}  {semantics}");
    }
}
