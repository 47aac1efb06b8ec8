//! Command dispatch for the `offcache` binary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use offcache_core::{
    CacheRequest, CacheStorage, ClientRegistry, DiskStorage, HttpNetwork, OfflineCacheManager,
    ResponseSource, TracingObserver,
};
use tracing::info;

use crate::config::CliConfig;
use crate::format::{body_preview, format_bytes};

/// Characters of body shown by `fetch`
const BODY_PREVIEW_CHARS: usize = 120;

pub const USAGE: &str = "\
Usage: offcache <command>

Commands:
  install        Seed the current cache generation
  activate       Delete stale generations
  deploy         Install, then activate
  fetch <url>    Cache-first fetch of a URL
  buckets        List cache generations on disk
  help           Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Install,
    Activate,
    Deploy,
    Fetch(String),
    Buckets,
}

impl Command {
    /// Parse the arguments following the program name.
    /// `None` means help was asked for, or no command was given.
    pub fn parse(args: &[String]) -> Result<Option<Self>> {
        let Some(name) = args.first() else {
            return Ok(None);
        };
        let command = match name.as_str() {
            "install" => Command::Install,
            "activate" => Command::Activate,
            "deploy" => Command::Deploy,
            "buckets" => Command::Buckets,
            "help" | "--help" | "-h" => return Ok(None),
            "fetch" => match args.get(1) {
                Some(url) => Command::Fetch(url.clone()),
                None => bail!("fetch requires a URL"),
            },
            other => bail!("Unknown command: {}", other),
        };
        Ok(Some(command))
    }
}

pub struct CacheCli {
    manager: OfflineCacheManager,
    storage: Arc<DiskStorage>,
}

impl CacheCli {
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let store_dir = config.store_dir()?;
        let storage = Arc::new(
            DiskStorage::new(store_dir.clone())
                .with_context(|| format!("Failed to open cache store at {}", store_dir.display()))?,
        );
        let network = Arc::new(HttpNetwork::new().context("Failed to build HTTP client")?);

        let manager = OfflineCacheManager::new(
            config.cache_config(),
            storage.clone(),
            network,
            Arc::new(ClientRegistry::new()),
        )?
        .with_observer(Arc::new(TracingObserver));

        info!(version = manager.version(), store = %store_dir.display(), "Cache manager ready");
        Ok(Self { manager, storage })
    }
}

pub async fn run(command: Command, cli: &CacheCli) -> Result<()> {
    match command {
        Command::Install => install(cli).await,
        Command::Activate => activate(cli).await,
        Command::Deploy => {
            install(cli).await?;
            activate(cli).await
        }
        Command::Fetch(url) => fetch(cli, &url).await,
        Command::Buckets => buckets(cli).await,
    }
}

async fn install(cli: &CacheCli) -> Result<()> {
    let report = cli.manager.install().await?;
    println!(
        "Installed {}: {} stored, {} skipped",
        report.bucket,
        report.seeded.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {} ({})", skipped.url, skipped.error);
    }
    Ok(())
}

async fn activate(cli: &CacheCli) -> Result<()> {
    let report = cli.manager.activate().await?;
    if report.deleted.is_empty() {
        println!("Activated {}: no stale generations", report.current);
    } else {
        println!("Activated {}: deleted {}", report.current, report.deleted.join(", "));
    }
    Ok(())
}

async fn fetch(cli: &CacheCli, url: &str) -> Result<()> {
    let (response, source) = cli
        .manager
        .fetch_with_source(&CacheRequest::get(url))
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let source = match source {
        ResponseSource::Cache => "cache",
        ResponseSource::Network => "network",
    };
    println!(
        "{} from {} ({})",
        response.status,
        source,
        format_bytes(response.body.len())
    );
    println!("{}", body_preview(&response.body, BODY_PREVIEW_CHARS));
    Ok(())
}

async fn buckets(cli: &CacheCli) -> Result<()> {
    let names = cli.storage.keys().await?;
    if names.is_empty() {
        println!("No cache generations");
        return Ok(());
    }
    for name in names {
        let entries = cli.storage.entries(&name).await?;
        let bytes: usize = entries.iter().map(|e| e.response.body.len()).sum();
        let marker = if name == cli.manager.version() { "*" } else { " " };
        println!(
            "{} {} ({} entries, {})",
            marker,
            name,
            entries.len(),
            format_bytes(bytes)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&args(&["install"])).unwrap(), Some(Command::Install));
        assert_eq!(Command::parse(&args(&["deploy"])).unwrap(), Some(Command::Deploy));
        assert_eq!(
            Command::parse(&args(&["fetch", "https://host/"])).unwrap(),
            Some(Command::Fetch("https://host/".into()))
        );
    }

    #[test]
    fn test_parse_help_yields_no_command() {
        assert_eq!(Command::parse(&[]).unwrap(), None);
        assert_eq!(Command::parse(&args(&["help"])).unwrap(), None);
        assert_eq!(Command::parse(&args(&["--help"])).unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(&args(&["fetch"])).is_err());
        assert!(Command::parse(&args(&["explode"])).is_err());
    }

    #[tokio::test]
    async fn test_buckets_and_activate_against_temp_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            version: Some("v2".into()),
            cache_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let cli = CacheCli::from_config(&config).unwrap();
        cli.storage.open("v1").await.unwrap();
        cli.storage.open("v2").await.unwrap();

        run(Command::Buckets, &cli).await.unwrap();
        run(Command::Activate, &cli).await.unwrap();

        assert_eq!(cli.storage.keys().await.unwrap(), vec!["v2"]);
    }
}
