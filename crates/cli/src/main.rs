mod echo;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use futures::TryStreamExt;
use mangarelay_core::{
    FetchConfig, ImageProxy, LinkBase, MangaSource, OriginConfig, SourcePrefix, camelize_keys, decode_url, encode_url,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::echo::{format_size, print_banner, print_error, print_info, print_step, print_success, print_timing, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Browse a manga listing site and proxy its chapter images
#[derive(Parser, Debug)]
#[command(name = "mangarelay")]
#[command(version)]
#[command(about = "Browse manga listings, details and chapter images", long_about = None)]
struct Cli {
    #[command(flatten)]
    origin: OriginArgs,

    /// Enable step-by-step progress on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Origin site and HTTP client overrides
#[derive(Args, Debug)]
struct OriginArgs {
    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Listing page URL; search pages are resolved against it
    #[arg(long, global = true, value_name = "URL")]
    updates_url: Option<String>,

    /// Detail base for `cu-` ids; its host marks listing links as `cu-`
    #[arg(long, global = true, value_name = "URL")]
    chapter_base: Option<String>,

    /// Detail base for `mu-` ids
    #[arg(long, global = true, value_name = "URL")]
    manga_base: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recently updated manga
    Updates {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search manga by title
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show details and chapters of one manga
    Info {
        /// Manga id such as `mu-manga-ab1234`, or a `/mangas/...` link
        #[arg(value_name = "PREFIX-ID")]
        manga: String,
    },
    /// List the page images of a chapter
    Chapter {
        /// Chapter token, or a `/chapters/...` link
        token: String,
    },
    /// Download one image
    Image {
        /// Image token, or an `/images/...` link
        token: String,
        /// Output file (default: the image's own filename)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Turn an origin URL into a token
    Encode { url: String },
    /// Turn a token back into its origin URL
    Decode { token: String },
    /// Generate a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl OriginArgs {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    fn origin_config(&self) -> anyhow::Result<OriginConfig> {
        let mut origin = OriginConfig::default();
        if let Some(updates_url) = &self.updates_url {
            origin.updates_url = updates_url.clone();
        }
        if let Some(chapter_base) = &self.chapter_base {
            origin.set_chapter_base(chapter_base).context("Invalid --chapter-base")?;
        }
        if let Some(manga_base) = &self.manga_base {
            origin.manga_base = manga_base.clone();
        }
        Ok(origin)
    }

    fn source(&self) -> anyhow::Result<MangaSource> {
        MangaSource::from_config(self.fetch_config(), self.origin_config()?, LinkBase::default())
            .context("Failed to configure origin")
    }
}

/// Accepts either a bare id/token or a full internal link and keeps the last
/// path segment. Tokens never contain `/`.
fn last_segment(raw: &str) -> &str {
    raw.trim_end_matches('/').rsplit('/').next().unwrap_or(raw)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let value = camelize_keys(serde_json::to_value(value).context("Failed to serialize output")?);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let verbose = cli.verbose;
    if verbose {
        print_banner();
    }

    match cli.command {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mangarelay", &mut std::io::stdout());
        }
        Command::Encode { url } => println!("{}", encode_url(&url)),
        Command::Decode { token } => println!("{}", decode_url(last_segment(&token)).context("Failed to decode token")?),
        Command::Updates { page } => {
            let source = cli.origin.source()?;
            if verbose {
                print_step(1, 1, &format!("Fetching {}", source.updates_url(page).bright_white().underline()));
            }
            let started = Instant::now();
            let entries = source.updates(page).await.context("Failed to fetch updates")?;
            if verbose {
                print_timing("Fetch", started.elapsed());
                print_info(&format!("{} entries", entries.len()));
            }
            print_json(&entries)?;
        }
        Command::Search { query, page } => {
            let source = cli.origin.source()?;
            let url = source.search_url(&query, page)?;
            if verbose {
                print_step(1, 1, &format!("Searching {}", url.bright_white().underline()));
            }
            let started = Instant::now();
            let entries = source.search(&query, page).await.context("Failed to search")?;
            if verbose {
                print_timing("Fetch", started.elapsed());
                print_info(&format!("{} results", entries.len()));
            }
            print_json(&entries)?;
        }
        Command::Info { manga } => {
            let source = cli.origin.source()?;
            let manga = last_segment(&manga);
            let (prefix, id) =
                SourcePrefix::split_id(manga).with_context(|| format!("Not a manga id: {} (expected cu-... or mu-...)", manga))?;
            if verbose {
                print_step(1, 1, &format!("Fetching {}", source.detail_url(id, prefix)?.bright_white().underline()));
            }
            let started = Instant::now();
            let detail = source.detail(id, prefix).await.context("Failed to fetch manga")?;
            if verbose {
                print_timing("Fetch", started.elapsed());
                print_info(&format!("{} chapters", detail.chapters.len()));
            }
            print_json(&detail)?;
        }
        Command::Chapter { token } => {
            let source = cli.origin.source()?;
            if verbose {
                print_step(1, 1, "Fetching chapter page");
            }
            let images = source.chapter_images(last_segment(&token)).await.context("Failed to fetch chapter")?;
            if verbose {
                print_info(&format!("{} images", images.len()));
            }
            print_json(&images)?;
        }
        Command::Image { token, output } => {
            let source = cli.origin.source()?;
            let proxy = ImageProxy::new(source.fetcher().clone());

            if verbose {
                print_step(1, 2, "Opening image stream");
            }
            let mut asset = proxy.resolve(last_segment(&token)).await.context("Failed to fetch image")?;

            let path = match output {
                Some(path) => path,
                None if asset.filename.is_empty() => {
                    print_warning("Origin URL has no filename, saving as unknown.jpg");
                    PathBuf::from("unknown.jpg")
                }
                None => PathBuf::from(&asset.filename),
            };

            if verbose {
                print_step(2, 2, &format!("Writing {}", path.display().bright_white()));
                if let Some(content_type) = asset.headers.get("content-type") {
                    eprintln!("  {} {}", "Type:".dimmed(), content_type.bright_white());
                }
            }

            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            let mut written = 0;
            while let Some(chunk) = asset.chunks.try_next().await.context("Image download interrupted")? {
                file.write_all(&chunk)
                    .await
                    .with_context(|| format!("Failed to write to file: {}", path.display()))?;
                written += chunk.len();
            }
            file.flush().await?;

            print_success(&format!("Saved {} to {}", format_size(written), path.display().bright_white()));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("mu-manga-ab1234"), "mu-manga-ab1234");
        assert_eq!(last_segment("/mangas/mu-manga-ab1234"), "mu-manga-ab1234");
        assert_eq!(last_segment("/v1/chapters/aHR0cA==/"), "aHR0cA==");
    }

    #[test]
    fn test_origin_overrides() {
        let cli = Cli::parse_from([
            "mangarelay",
            "--chapter-base",
            "http://127.0.0.1:9000",
            "--timeout",
            "5",
            "updates",
            "--page",
            "2",
        ]);

        let origin = cli.origin.origin_config().unwrap();
        assert_eq!(origin.chapter_host, "127.0.0.1:9000");
        assert_eq!(cli.origin.fetch_config().timeout, 5);
        assert!(matches!(cli.command, Command::Updates { page: 2 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["mangarelay", "search", "one piece", "--manga-base", "http://localhost:1", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.origin.manga_base.as_deref(), Some("http://localhost:1"));
    }
}
