//! CLI binary for edgequake-pdfsplit.
//!
//! A thin shim over the library crate that maps CLI flags to `SplitConfig`
//! and `InterpreterConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfsplit::interpret::interpret_all;
use edgequake_pdfsplit::{
    check_reset_target, inspect, interpreter_from_config, reset_workspace, split,
    InterpreterConfig, InterpreterKind,
    PageSelection, ProgressCallback, SplitConfig, SplitOutput, SplitProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Terminal progress callback: a spinner while text is extracted, then a
/// page bar while the rasteriser writes JPEGs.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Text");
        bar.set_message("Extracting text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_text_extracted(&self, paragraphs: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Text  {}  {}",
            green("✓"),
            dim(&format!("{paragraphs:>4} paragraphs")),
            dim(&format!("{text_len:>7} bytes")),
        ));
        self.bar.set_message("Opening PDF…");
    }

    fn on_render_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn on_page_rendered(&self, _page_num: usize, _total_pages: usize, _path: &Path) {
        self.bar.inc(1);
    }

    fn on_render_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split into ./output (wiped first)
  pdfsplit report.pdf

  # Custom output root, higher resolution pages
  pdfsplit report.pdf -o /tmp/report --scale 2

  # Keep whatever is already in the output tree
  pdfsplit --no-reset report.pdf

  The reset is refused when the output directory is /, $HOME, the current
  directory or one of its parents, or a directory holding the input PDF.

  # Inspect PDF metadata only
  pdfsplit --inspect-only report.pdf

  # Split, then ask a VLM what the charts on pages 3-5 say
  pdfsplit report.pdf --describe 3-5

  # Greedy question answering with a custom question
  pdfsplit report.pdf --describe 4 --interpreter docqa --question "What is the 2023 value?"

  # JSON output with per-page image paths and stats
  pdfsplit --json report.pdf > split.json

OUTPUT LAYOUT:
  <output-dir>/pdf_text.txt                 cleaned text, one line
  <output-dir>/graphs/                      graph CSVs (written by other tools)
  <output-dir>/pages_as_images/page_<n>.jpg one JPEG per page

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  OPENAI_API_KEY          OpenAI API key (for --describe)
  ANTHROPIC_API_KEY       Anthropic API key (for --describe)
  GEMINI_API_KEY          Google Gemini API key (for --describe)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Split PDF files into cleaned text and per-page JPEG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsplit",
    version,
    about = "Split PDF files into cleaned text and per-page JPEG images",
    long_about = "Split a PDF document into a single normalised text file and one JPEG per page. \
Optionally ask a vision LLM (OpenAI, Anthropic, Gemini, Ollama, …) what the charts on selected \
pages say.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Root of the output tree.
    #[arg(short, long, env = "PDFSPLIT_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSPLIT_PASSWORD")]
    password: Option<String>,

    /// Page render scale (0.25–8.0). 1.0 is one pixel per point (72 DPI).
    #[arg(long, env = "PDFSPLIT_SCALE", default_value_t = 1.0)]
    scale: f32,

    /// Do not wipe the output tree before splitting.
    #[arg(long, env = "PDFSPLIT_NO_RESET")]
    no_reset: bool,

    /// Output structured JSON instead of a summary.
    #[arg(long, env = "PDFSPLIT_JSON")]
    json: bool,

    /// Print PDF metadata only, no splitting.
    #[arg(long)]
    inspect_only: bool,

    /// Pages to describe with the chart interpreter: all, 5, 3-15, or 1,3,5.
    #[arg(long, env = "PDFSPLIT_DESCRIBE")]
    describe: Option<String>,

    /// Interpreter profile: captioning or docqa.
    #[arg(long, env = "PDFSPLIT_INTERPRETER", default_value = "captioning")]
    interpreter: InterpreterKind,

    /// Question asked about each described page.
    #[arg(long, env = "PDFSPLIT_QUESTION")]
    question: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "PDFSPLIT_PROVIDER",
        long_help = "LLM provider for --describe. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1).
    #[arg(long, env = "PDFSPLIT_MODEL")]
    model: Option<String>,

    /// Per-page LLM call timeout in seconds.
    #[arg(long, env = "PDFSPLIT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a pdfium shared library.
    #[arg(long, env = "PDFSPLIT_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "PDFSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSPLIT_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, &config).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // Parse before any work so a typo doesn't cost a full split.
    let describe = cli.describe.as_deref().map(parse_pages).transpose()?;
    check_output_target(&cli, &config)?;

    // ── Split ────────────────────────────────────────────────────────────
    if !cli.no_reset {
        reset_workspace(&config).with_context(|| {
            format!("Failed to reset output tree at {}", config.output_dir.display())
        })?;
    }

    let output = split(&cli.input, &config).context("Split failed")?;

    // ── Describe ─────────────────────────────────────────────────────────
    let descriptions = match describe {
        Some(selection) => describe_pages(&cli, &output, &selection)?,
        None => Vec::new(),
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::json!({
            "split": output,
            "descriptions": descriptions
                .iter()
                .map(|(page, answer)| serde_json::json!({ "page": page, "answer": answer }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise output")?
        );
        return Ok(());
    }

    for (page, answer) in &descriptions {
        println!("{} {}", bold(&format!("Page {page}:")), answer);
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} pages  {} bytes of text  {}ms  →  {}",
            green("✔"),
            output.stats.images_written,
            output.stats.text_len,
            output.stats.total_duration_ms,
            bold(&output.layout.root.display().to_string()),
        );
        eprintln!(
            "   {}  {}",
            dim(&output.text_path.display().to_string()),
            dim(&output.layout.pages_dir.display().to_string()),
        );
    }

    Ok(())
}

/// Refuse to wipe an output directory that holds more than previous output.
fn check_output_target(cli: &Cli, config: &SplitConfig) -> Result<()> {
    if cli.no_reset {
        return Ok(());
    }
    check_reset_target(config, &cli.input).with_context(|| {
        format!("Unsafe output directory {}", config.output_dir.display())
    })
}

/// Map CLI args to `SplitConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SplitConfig> {
    let mut builder = SplitConfig::builder()
        .output_dir(&cli.output_dir)
        .render_scale(cli.scale);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to `InterpreterConfig`.
fn build_interpreter_config(cli: &Cli) -> Result<InterpreterConfig> {
    let mut builder = InterpreterConfig::builder()
        .kind(cli.interpreter)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref q) = cli.question {
        builder = builder.question(q);
    }
    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }

    builder.build().context("Invalid interpreter configuration")
}

/// Run the chart interpreter over the selected rendered pages.
fn describe_pages(
    cli: &Cli,
    output: &SplitOutput,
    selection: &PageSelection,
) -> Result<Vec<(usize, String)>> {
    let page_nums = selection.to_page_numbers(output.pages.len());
    if page_nums.is_empty() {
        anyhow::bail!(
            "No pages selected by --describe (document has {} pages)",
            output.pages.len()
        );
    }

    let paths: Vec<PathBuf> = page_nums
        .iter()
        .map(|&n| output.layout.page_image_path(n))
        .collect();

    let interpreter_config = build_interpreter_config(cli)?;
    let interpreter =
        interpreter_from_config(&interpreter_config).context("Failed to set up interpreter")?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Describing {} pages ({})…",
                paths.len(),
                interpreter_config.kind
            ))
        );
    }

    let answers = interpret_all(interpreter.as_ref(), &paths).context("Describe failed")?;

    Ok(page_nums
        .into_iter()
        .zip(answers)
        .map(|(page, (_path, answer))| (page, answer))
        .collect())
}

/// Parse `--describe` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
