//! CLI binary for charaka-pipeline.
//!
//! A thin shim over the library crate: one subcommand per stage, each mapping
//! its flags to a `PipelineConfig` and calling the matching `run::*` entry
//! point.

use anyhow::{Context, Result};
use charaka_pipeline::{
    run, BookInfo, ChapterLayout, DocumentAiClient, DocumentAiConfig, GoogleTranslateClient,
    IastTransliterator, LlmInterpreter, PageRange, PipelineConfig, ProgressCallback,
    StageProgressCallback,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per item.
struct CliProgressCallback {
    bar: ProgressBar,
    unit: &'static str,
}

impl CliProgressCallback {
    fn new(unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, unit })
    }
}

impl StageProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: &str, total: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  ⏱ {{elapsed_precise}}",
            self.unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix(stage.to_string());
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting {stage} of {total} {}…", self.unit))
        ));
    }

    fn on_item_complete(&self, _stage: &str, item: &str, index: usize, total: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(item)
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, _stage: &str, item: &str, index: usize, total: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            let mut cut: String = error.chars().take(79).collect();
            cut.push('…');
            cut
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            dim(item),
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_stage_complete(&self, stage: &str, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} {} done ({stage})",
                green("✔"),
                bold(&success_count.to_string()),
                self.unit
            );
        } else {
            eprintln!(
                "{} {}/{} {} done ({stage}, {} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                self.unit,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render pages 1-12 of Book/S1-Chapter5.pdf to PNG
  charaka extract --section 1 --chapter 5 --start-page 1 --end-page 12

  # OCR the rendered pages and segment them into verses
  charaka ocr --section 1 --chapter 5

  # Segment an existing OCR dump instead
  charaka segment-text --section 1 --chapter 5 ocr.txt

  # Transliterate and translate every verse
  charaka translate --section 1 --chapter 5

  # Interpret every verse group with a language model
  charaka interpret --section 1 --chapter 5 --provider anthropic

ENVIRONMENT VARIABLES:
  GOOGLE_ACCESS_TOKEN        OAuth token for Document AI (gcloud auth print-access-token)
  GOOGLE_TRANSLATE_API_KEY   API key for Cloud Translation (else the access token is used)
  DOCUMENTAI_PROJECT_ID      Document AI project
  DOCUMENTAI_LOCATION        Document AI location (default: us)
  DOCUMENTAI_PROCESSOR_ID    Document AI OCR processor
  ANTHROPIC_API_KEY          Key for the default interpretation provider
  EDGEQUAKE_PROVIDER         Override provider (anthropic, openai, gemini, ollama)
  EDGEQUAKE_MODEL            Override model ID
  RUST_LOG                   Override the log filter
"#;

/// Scanned Charaka Samhita chapters to verses, translations and commentary.
#[derive(Parser, Debug)]
#[command(
    name = "charaka",
    version,
    about = "Scanned Charaka Samhita chapters to verses, translations and commentary",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CHARAKA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CHARAKA_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "CHARAKA_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render pages of the chapter PDF to PNG images.
    Extract {
        #[command(flatten)]
        chapter: ChapterArgs,
        #[command(flatten)]
        document_ai: DocumentAiArgs,
        /// First page to extract (1-indexed).
        #[arg(long, default_value_t = 1)]
        start_page: u32,
        /// Last page to extract (inclusive).
        #[arg(long, default_value_t = 10)]
        end_page: u32,
    },
    /// OCR the chapter's page images and segment the text into verses.
    Ocr {
        #[command(flatten)]
        chapter: ChapterArgs,
        #[command(flatten)]
        document_ai: DocumentAiArgs,
    },
    /// Segment an existing text file into verses (no OCR).
    SegmentText {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// UTF-8 text file to segment.
        input: PathBuf,
    },
    /// Add IAST transliteration and a translation to every verse.
    Translate {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// Cloud Translation API key.
        #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// OAuth token, used when no API key is given.
        #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
        /// Target language code.
        #[arg(long, default_value = "en")]
        target_language: String,
    },
    /// Write a language-model commentary for every verse group.
    Interpret {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// LLM provider: anthropic, openai, gemini, ollama.
        #[arg(long, env = "EDGEQUAKE_PROVIDER", default_value = charaka_pipeline::config::DEFAULT_PROVIDER)]
        provider: String,
        /// LLM model ID.
        #[arg(long, env = "EDGEQUAKE_MODEL", default_value = charaka_pipeline::config::DEFAULT_MODEL)]
        model: String,
        /// Max output tokens per verse group.
        #[arg(long, default_value_t = 4000)]
        max_tokens: usize,
    },
}

/// Which chapter, and where the working tree lives.
#[derive(Args, Debug, Clone)]
struct ChapterArgs {
    /// Section (sthana) number.
    #[arg(long, default_value_t = 1)]
    section: u32,
    /// Chapter number.
    #[arg(long, default_value_t = 5)]
    chapter: u32,
    /// Volume number recorded in the output.
    #[arg(long, default_value_t = 1)]
    volume: u32,
    /// Book title recorded in the output.
    #[arg(long, default_value = "Charaka Samhita")]
    title: String,
    /// Chapter name recorded in the output.
    #[arg(long, default_value = "")]
    chapter_name: String,
    /// Folder holding Book/, ExtractedImage/, ExtractedFromOCR/ …
    #[arg(long, env = "CHARAKA_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct DocumentAiArgs {
    #[arg(long, env = "DOCUMENTAI_PROJECT_ID", default_value = "")]
    project_id: String,
    #[arg(long, env = "DOCUMENTAI_LOCATION", default_value = "us")]
    location: String,
    #[arg(long, env = "DOCUMENTAI_PROCESSOR_ID", default_value = "")]
    processor_id: String,
    /// OAuth token for Document AI.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

impl DocumentAiArgs {
    fn config(&self) -> DocumentAiConfig {
        DocumentAiConfig {
            project_id: self.project_id.clone(),
            location: self.location.clone(),
            processor_id: self.processor_id.clone(),
        }
    }
}

fn book_info(args: &ChapterArgs) -> BookInfo {
    BookInfo {
        title: args.title.clone(),
        volume: args.volume,
        section: args.section,
        chapter: args.chapter,
        chapter_name: args.chapter_name.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
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

    let started = Instant::now();
    match &cli.command {
        Command::Extract {
            chapter,
            document_ai,
            start_page,
            end_page,
        } => {
            let config = base_config(chapter, None)
                .pages(PageRange::new(*start_page, *end_page))
                .document_ai(document_ai.config())
                .build()
                .context("Invalid configuration")?;
            let client = DocumentAiClient::new(&config.document_ai, document_ai.access_token.as_deref())
                .context("Failed to set up Document AI")?;
            let summary = run::extract(&config, &client)
                .await
                .context("Page extraction failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}/{} pages  →  {}",
                    tick(summary.written.len() == summary.pages_requested),
                    summary.written.len(),
                    summary.pages_requested,
                    bold(&config.layout.image_dir(&config.book).display().to_string()),
                );
            }
        }

        Command::Ocr {
            chapter,
            document_ai,
        } => {
            let config = base_config(chapter, progress(&cli, "pages"))
                .document_ai(document_ai.config())
                .build()
                .context("Invalid configuration")?;
            let client = DocumentAiClient::new(&config.document_ai, document_ai.access_token.as_deref())
                .context("Failed to set up Document AI")?;
            let doc = run::ocr(&config, &client).await.context("OCR failed")?;
            if !cli.quiet {
                print_segmented(&config, doc.book.sanskrit_verses.len(), doc.book.verse_groups.len());
            }
        }

        Command::SegmentText { chapter, input } => {
            let config = base_config(chapter, None)
                .build()
                .context("Invalid configuration")?;
            let doc = run::segment_text_file(&config, input)
                .await
                .with_context(|| format!("Failed to segment {}", input.display()))?;
            if !cli.quiet {
                print_segmented(&config, doc.book.sanskrit_verses.len(), doc.book.verse_groups.len());
            }
        }

        Command::Translate {
            chapter,
            api_key,
            access_token,
            target_language,
        } => {
            let mut builder = base_config(chapter, progress(&cli, "verses"))
                .target_language(target_language.clone());
            if let Some(key) = api_key {
                builder = builder.translate_api_key(key.clone());
            }
            if let Some(token) = access_token {
                builder = builder.google_access_token(token.clone());
            }
            let config = builder.build().context("Invalid configuration")?;
            let translator = GoogleTranslateClient::new(
                config.translate_api_key.as_deref(),
                config.google_access_token.as_deref(),
            )
            .context("Failed to set up Cloud Translation")?;
            let summary = run::translate(&config, &IastTransliterator, &translator)
                .await
                .context("Translation failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}/{} translated, {}/{} transliterated  →  {}",
                    tick(summary.translated == summary.verses),
                    summary.translated,
                    summary.verses,
                    summary.transliterated,
                    summary.verses,
                    bold(&config.layout.translated_json(&config.book).display().to_string()),
                );
            }
        }

        Command::Interpret {
            chapter,
            provider,
            model,
            max_tokens,
        } => {
            let config = base_config(chapter, progress(&cli, "verse groups"))
                .provider_name(provider.clone())
                .model(model.clone())
                .max_tokens(*max_tokens)
                .build()
                .context("Invalid configuration")?;
            let interpreter =
                LlmInterpreter::from_config(&config).context("Failed to set up LLM provider")?;
            let doc = run::interpret(&config, &interpreter)
                .await
                .context("Interpretation failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} verse groups  →  {}",
                    green("✔"),
                    doc.translations.len(),
                    bold(&config.layout.interpretation_json(&config.book).display().to_string()),
                );
            }
        }
    }

    if !cli.quiet {
        eprintln!("   {}", dim(&format!("{}ms total", started.elapsed().as_millis())));
    }
    Ok(())
}

fn base_config(
    chapter: &ChapterArgs,
    progress: Option<ProgressCallback>,
) -> charaka_pipeline::PipelineConfigBuilder {
    let builder = PipelineConfig::builder()
        .book(book_info(chapter))
        .layout(ChapterLayout::rooted_at(&chapter.base_dir));
    match progress {
        Some(cb) => builder.progress_callback(cb),
        None => builder,
    }
}

fn progress(cli: &Cli, unit: &'static str) -> Option<ProgressCallback> {
    if cli.quiet || cli.no_progress {
        None
    } else {
        Some(CliProgressCallback::new(unit) as ProgressCallback)
    }
}

fn tick(ok: bool) -> String {
    if ok {
        green("✔")
    } else {
        cyan("⚠")
    }
}

fn print_segmented(config: &PipelineConfig, verses: usize, groups: usize) {
    eprintln!(
        "{}  {} verses, {} verse groups  →  {}",
        tick(verses > 0),
        verses,
        groups,
        bold(&config.layout.segmented_json(&config.book).display().to_string()),
    );
}
