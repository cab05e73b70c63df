//! CLI entry point for `mboxsft`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mboxsft::config::Config;
use mboxsft::export::{jsonl, preview};
use mboxsft::extract::{extract_records, ExtractOptions};

/// Mine an MBOX archive for your own replies and write them as JSONL
/// fine-tuning records.
#[derive(Parser)]
#[command(name = "mboxsft", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract (email, your reply) pairs from an MBOX file
    Extract {
        /// MBOX file to read (e.g. a Gmail Takeout export)
        mbox: PathBuf,
        /// Your email address (identifies your replies)
        #[arg(long, env = "MBOXSFT_MY_EMAIL")]
        my_email: Option<String>,
        /// Output JSONL file, or `-` for stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Minimum reply length in characters
        #[arg(long)]
        min_chars: Option<usize>,
        /// Maximum reply length in characters
        #[arg(long)]
        max_chars: Option<usize>,
        /// Number of samples to preview on the console
        #[arg(long)]
        preview: Option<usize>,
        /// Print extraction statistics as JSON
        #[arg(long)]
        stats_json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = mboxsft::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Using default configuration");
    }

    match cli.command {
        Commands::Extract {
            mbox,
            my_email,
            out,
            min_chars,
            max_chars,
            preview,
            stats_json,
        } => {
            let owner = my_email.unwrap_or_else(|| config.extract.my_email.clone());
            let options = ExtractOptions::new(
                &owner,
                min_chars.unwrap_or(config.extract.min_chars),
                max_chars.unwrap_or(config.extract.max_chars),
            )?;
            let out = out.unwrap_or_else(|| config.output.path.clone());
            let preview_count = preview.unwrap_or(config.output.preview_count);
            cmd_extract(&mbox, &options, &out, preview_count, stats_json, &config)
        }
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = mboxsft::config::log_file_path(config);
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxsft.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Read the archive, select pairs, write records, and print the preview.
fn cmd_extract(
    mbox: &Path,
    options: &ExtractOptions,
    out: &Path,
    preview_count: usize,
    stats_json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let to_stdout = out.as_os_str() == "-";

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} Reading archive [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let messages = mboxsft::archive::load_archive(
        mbox,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();

    let extraction = extract_records(&messages, options);
    tracing::info!(elapsed = ?start.elapsed(), "Pipeline finished");

    // With `-o -` the records own stdout; everything else goes to stderr.
    let mut console: Box<dyn Write> = if to_stdout {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };

    if to_stdout {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        let bytes = jsonl::write_jsonl_to(&extraction.records, &mut lock)?;
        lock.flush()?;
        writeln!(
            console,
            "{}",
            preview::render_summary(extraction.records.len(), bytes, Path::new("<stdout>"))
        )?;
    } else {
        let bytes = jsonl::write_jsonl(&extraction.records, out)?;
        writeln!(
            console,
            "{}",
            preview::render_summary(extraction.records.len(), bytes, out)
        )?;
    }

    write!(
        console,
        "{}",
        preview::render_preview(
            &extraction.records,
            preview_count,
            config.output.preview_width
        )
    )?;

    if stats_json {
        writeln!(
            console,
            "{}",
            serde_json::to_string_pretty(&extraction.stats)?
        )?;
    }

    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxsft", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}
