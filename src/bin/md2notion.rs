//! CLI binary for edgequake-md2notion.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `UploadConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2notion::{
    convert_file, convert_to_file, upload_file, ParentKind, ParentRef, ProgressCallback,
    UploadConfig, UploadProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar counting uploaded blocks, plus a log
/// line per chunk.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Converting Markdown…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, total_blocks: usize, total_chunks: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} blocks  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_blocks as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Uploading");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Uploading {total_blocks} blocks in {total_chunks} chunk(s)…"
            ))
        ));
    }

    fn on_page_created(&self, page_id: &str) {
        self.bar
            .println(format!("  {} Page created {}", green("✓"), dim(page_id)));
    }

    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, blocks: usize) {
        self.bar.println(format!(
            "  {} Request {:>3}/{:<3}  {}",
            green("✓"),
            chunk + 1,
            total_chunks,
            dim(&format!("{blocks:>3} blocks")),
        ));
        self.bar.inc(blocks as u64);
    }

    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Request {:>3}/{:<3}  {}",
            red("✗"),
            chunk + 1,
            total_chunks,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_upload_complete(&self, _page_id: &str, total_blocks: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} blocks uploaded successfully",
            green("✔"),
            bold(&total_blocks.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload under a Notion page
  md2notion notes.md --parent-type page --parent-id 0123456789abcdef0123456789abcdef

  # Upload into a database, images from ./figures hosted on Imgur
  md2notion notes.md --parent-type database --parent-id $DB --images figures

  # Convert only; print the Notion block JSON
  md2notion notes.md --dry-run

  # Convert only, skipping pandoc (heuristic KaTeX fixes only)
  md2notion notes.md --dry-run --no-pandoc -o blocks.json

ENVIRONMENT VARIABLES:
  NOTION_API_KEY          Notion integration token
  NOTION_PARENT_TYPE      database | page
  NOTION_PARENT_ID        Parent database or page id
  IMGUR_CLIENT_ID         Imgur client id for image uploads
  MD2NOTION_PANDOC        pandoc executable (default: pandoc)
  RUST_LOG                Override log filter (e.g. edgequake_md2notion=debug)

MATH:
  $…$ becomes an inline equation, a paragraph that is only $$…$$ becomes an
  equation block. Expressions are translated with pandoc, then patched for
  KaTeX; if pandoc is missing or fails, the patches are applied to the
  original source. Matrices (\begin{array}) are never sent to pandoc.
"#;

/// Upload Markdown with LaTeX math and images to Notion.
#[derive(Parser, Debug)]
#[command(
    name = "md2notion",
    version,
    about = "Upload Markdown with LaTeX math and images to Notion",
    long_about = "Convert a Markdown file into Notion blocks (paragraphs, KaTeX equations, \
images hosted on Imgur) and create a new Notion page from them, uploading in chunks of \
100 blocks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to upload.
    input: PathBuf,

    /// Notion integration token.
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    notion_token: Option<String>,

    /// Parent kind: database or page.
    #[arg(long, env = "NOTION_PARENT_TYPE", default_value = "page")]
    parent_type: ParentKind,

    /// Parent database or page id.
    #[arg(long, env = "NOTION_PARENT_ID")]
    parent_id: Option<String>,

    /// Page title (default depends on parent type).
    #[arg(long, env = "MD2NOTION_TITLE")]
    title: Option<String>,

    /// Folder containing the images referenced by the Markdown.
    #[arg(long = "images", env = "MD2NOTION_IMAGES", default_value = ".")]
    image_folder: PathBuf,

    /// Imgur client id used to host local images.
    #[arg(long, env = "IMGUR_CLIENT_ID", hide_env_values = true)]
    imgur_client_id: Option<String>,

    /// pandoc executable used to translate math.
    #[arg(long, env = "MD2NOTION_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// Skip pandoc; apply the KaTeX fixes to the source math directly.
    #[arg(long, env = "MD2NOTION_NO_PANDOC")]
    no_pandoc: bool,

    /// Per-expression pandoc timeout in seconds.
    #[arg(long, env = "MD2NOTION_PANDOC_TIMEOUT", default_value_t = 30)]
    pandoc_timeout: u64,

    /// Per-request HTTP timeout in seconds (Notion and Imgur).
    #[arg(long, env = "MD2NOTION_HTTP_TIMEOUT", default_value_t = 60)]
    http_timeout: u64,

    /// Convert only; print the Notion block JSON instead of uploading.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, write the block JSON to this file.
    #[arg(short, long, requires = "dry_run")]
    output: Option<PathBuf>,

    /// Print the upload result as JSON.
    #[arg(long, env = "MD2NOTION_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2NOTION_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2NOTION_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2NOTION_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs while it is visible.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn UploadProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        if let Some(ref output_path) = cli.output {
            let stats = convert_to_file(&cli.input, output_path, &config)
                .await
                .context("Conversion failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} blocks  →  {}",
                    green("✔"),
                    stats.total_blocks(),
                    bold(&output_path.display().to_string()),
                );
            }
        } else {
            let output = convert_file(&cli.input, &config)
                .await
                .context("Conversion failed")?;
            let json = serde_json::to_string_pretty(&output.blocks)
                .context("Failed to serialise blocks")?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
            if !cli.quiet {
                eprintln!(
                    "{}",
                    dim(&format!(
                        "{} paragraphs, {} equations, {} images, {} failed images",
                        output.stats.paragraph_blocks,
                        output.stats.equation_blocks,
                        output.stats.image_blocks,
                        output.stats.failed_images
                    ))
                );
            }
        }
        return Ok(());
    }

    // ── Upload ───────────────────────────────────────────────────────────
    let output = upload_file(&cli.input, &config)
        .await
        .context("Upload failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  page {}  {} blocks in {} chunk(s)",
            green("✔"),
            bold(&output.page_id),
            output.blocks_uploaded,
            output.chunks,
        );
        if output.stats.failed_images > 0 {
            eprintln!(
                "   {} {} image(s) replaced by placeholders",
                cyan("⚠"),
                output.stats.failed_images
            );
        }
    }

    Ok(())
}

/// Map CLI args to `UploadConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<UploadConfig> {
    let mut builder = UploadConfig::builder()
        .image_folder(cli.image_folder.clone())
        .pandoc_path(cli.pandoc.clone())
        .translate_math(!cli.no_pandoc)
        .pandoc_timeout_secs(cli.pandoc_timeout)
        .http_timeout_secs(cli.http_timeout);

    if let Some(ref token) = cli.notion_token {
        builder = builder.notion_token(token.trim());
    }
    if let Some(ref id) = cli.parent_id {
        builder = builder.parent(ParentRef {
            kind: cli.parent_type,
            id: id.trim().to_string(),
        });
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(ref id) = cli.imgur_client_id {
        builder = builder.imgur_client_id(id.trim());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
