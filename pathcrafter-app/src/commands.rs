use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pathcrafter_app::{
    Ascendancy, BaseClass, GuideJob, GuideOutcome, GuideRequest, GuideView, Language, LeagueMode,
    Progress, Snapshot, poedb_settings, render_markdown,
};
use pathcrafter_common::Provider;
use pathcrafter_config::{PathcrafterConfig, save_settings};
use pathcrafter_llm::build_client;
use pathcrafter_poedb::{IdentifierResolver, ItemQuery, PageSource, PoedbFetcher};
use pathcrafter_runtime::PathcrafterHandle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const PROGRESS_BUFFER: usize = 16;

#[derive(Parser)]
#[command(name = "pathcrafter", version, about = "Path of Exile build guides from poedb.tw item data")]
pub struct Cli {
    /// Config file (default: ./pathcrafter.yaml, then the user config dir)
    #[arg(long, global = true, env = "PATHCRAFTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map an item name to its poedb page identifier
    Resolve { name: String },
    /// Resolve and fetch one item page
    Item { query: String },
    /// Show the current challenge league
    League,
    /// Generate a build guide
    Guide(GuideArgs),
    /// Render a saved snapshot
    Snapshot { path: PathBuf },
    /// Show or update the model ids
    Settings {
        #[arg(long)]
        chatgpt_model: Option<String>,
        #[arg(long)]
        gemini_model: Option<String>,
    },
}

#[derive(Args)]
pub struct GuideArgs {
    /// Item name or poedb.tw URL; omit for general advice
    item: Option<String>,
    #[arg(long, short)]
    class: Option<BaseClass>,
    #[arg(long, short)]
    ascendancy: Option<Ascendancy>,
    #[arg(long, default_value = "softcore")]
    mode: LeagueMode,
    /// Season label; fetched from poedb when omitted
    #[arg(long)]
    league: Option<String>,
    #[arg(long, short, default_value = "chatgpt")]
    provider: Provider,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    notes_file: Option<PathBuf>,
    #[arg(long, default_value = "ko")]
    lang: Language,
    /// Save a snapshot to this file, or into this directory under the default name
    #[arg(long)]
    save: Option<PathBuf>,
}

pub async fn run(
    command: Command,
    cfg: PathcrafterConfig,
    cfg_path: PathBuf,
    handle: PathcrafterHandle,
) -> Result<()> {
    match command {
        Command::Resolve { name } => resolve(&name),
        Command::Item { query } => item(&cfg, &query).await,
        Command::League => league(&cfg).await,
        Command::Guide(args) => guide(&cfg, args, &handle).await,
        Command::Snapshot { path } => {
            let snapshot = Snapshot::load(&path)?;
            println!("{}", render_markdown(&GuideView::from_snapshot(&snapshot)));
            Ok(())
        }
        Command::Settings {
            chatgpt_model,
            gemini_model,
        } => settings(cfg, &cfg_path, chatgpt_model, gemini_model),
    }
}

fn fetcher(cfg: &PathcrafterConfig) -> Result<PoedbFetcher> {
    PoedbFetcher::new(&poedb_settings(&cfg.poedb)).context("failed to set up the poedb fetcher")
}

fn resolve(name: &str) -> Result<()> {
    let resolver = IdentifierResolver::bundled()?;
    match resolver.resolve(name) {
        Some(r) if r.is_verified() => println!("{} (table)", r.identifier),
        Some(r) => println!("{} (guess, unverified)", r.identifier),
        None => bail!("no identifier found for '{name}'"),
    }
    Ok(())
}

async fn item(cfg: &PathcrafterConfig, query: &str) -> Result<()> {
    let target = match ItemQuery::parse(query) {
        None => bail!("empty item query"),
        Some(ItemQuery::Url(url)) => url,
        Some(ItemQuery::Name(name)) => IdentifierResolver::bundled()?
            .resolve_identifier(&name)
            .with_context(|| format!("no identifier found for '{name}'"))?,
    };
    let fetcher = fetcher(cfg)?;
    let record = fetcher.fetch_item_detailed(&target).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn league(cfg: &PathcrafterConfig) -> Result<()> {
    match fetcher(cfg)?.fetch_current_league().await.and_then(|l| l.label()) {
        Some(label) => println!("{label}"),
        None => println!("current league unknown"),
    }
    Ok(())
}

fn read_notes(args: &GuideArgs) -> Result<String> {
    match (&args.notes, &args.notes_file) {
        (Some(notes), _) => Ok(notes.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read notes from {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

async fn guide(cfg: &PathcrafterConfig, args: GuideArgs, handle: &PathcrafterHandle) -> Result<()> {
    for provider in cfg.llm.missing_api_keys() {
        eprintln!("warning: no API key configured for {provider}");
    }

    let fetcher = Arc::new(fetcher(cfg)?);
    let league_season = match args.league.clone() {
        Some(season) => season,
        None => fetcher
            .fetch_current_league()
            .await
            .and_then(|l| l.label())
            .unwrap_or_default(),
    };

    let request = GuideRequest {
        item_query: args.item.clone().unwrap_or_default(),
        base_class: args.class,
        ascendancy: args.ascendancy,
        league_mode: args.mode,
        league_season,
        provider: args.provider,
        user_notes: read_notes(&args)?,
        language: args.lang,
    };

    let llm = build_client(args.provider, &cfg.llm)?;
    let pages: Arc<dyn PageSource> = fetcher;
    let job = GuideJob::new(IdentifierResolver::bundled()?, pages, llm);

    let (tx, mut rx) = mpsc::channel::<Progress>(PROGRESS_BUFFER);
    let printer = handle.spawn(async move {
        while let Some(p) = rx.recv().await {
            eprintln!("[{:>3}%] {}", p.percent, p.message);
        }
    });

    let outcome = job.run(request, tx, handle.job_token()).await;
    let _ = printer.await;

    match outcome? {
        GuideOutcome::Cancelled => {
            eprintln!("cancelled");
            Ok(())
        }
        GuideOutcome::Completed(result) => {
            println!("{}", render_markdown(&GuideView::from_result(&result)));
            if let Some(target) = args.save.as_deref() {
                let snapshot = Snapshot::from_result(&result);
                let path = snapshot_path(target, &snapshot);
                snapshot.save(&path)?;
                eprintln!("snapshot saved to {}", path.display());
            }
            Ok(())
        }
    }
}

fn snapshot_path(target: &Path, snapshot: &Snapshot) -> PathBuf {
    if target.is_dir() {
        target.join(snapshot.default_file_name())
    } else {
        target.to_path_buf()
    }
}

fn settings(
    mut cfg: PathcrafterConfig,
    cfg_path: &Path,
    chatgpt_model: Option<String>,
    gemini_model: Option<String>,
) -> Result<()> {
    let changed = chatgpt_model.is_some() || gemini_model.is_some();
    if let Some(model) = chatgpt_model {
        cfg.llm.chatgpt_model = model;
    }
    if let Some(model) = gemini_model {
        cfg.llm.gemini_model = model;
    }
    if changed {
        save_settings(cfg_path, &cfg.llm)?;
        eprintln!("saved to {}", cfg_path.display());
    }
    let llm = cfg.llm.with_default_models();
    println!("ChatGPT model: {}", llm.chatgpt_model);
    println!("Gemini model:  {}", llm.gemini_model);
    for provider in [Provider::ChatGpt, Provider::Gemini] {
        let state = if llm.api_key_for(provider).is_some() {
            "set"
        } else {
            "missing"
        };
        println!("{provider} API key: {state}");
    }
    Ok(())
}
