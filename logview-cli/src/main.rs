// Logview CLI - browse, filter and summarize log files from the terminal

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logview_core::{
    errors_since, read_log_content, render_view, ErrorCountQuery, FileView, FilterCriteria,
    TableRow, ViewRequest,
};
use std::path::PathBuf;
use tracing::debug;

use crate::config::ViewerConfig;

#[derive(Parser)]
#[command(name = "logview")]
#[command(about = "Parse, filter and page through log files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page of a log file as a table
    View {
        /// Log file to view
        file: PathBuf,

        /// Viewer configuration (TOML)
        #[arg(long, short)]
        config: PathBuf,

        /// Keep rows containing this text in any field
        #[arg(long)]
        search: Option<String>,

        /// Keep rows whose level column equals this (case-insensitive)
        #[arg(long)]
        level: Option<String>,

        /// Keep rows at or after this ISO-8601 time
        #[arg(long)]
        from: Option<String>,

        /// Keep rows at or before this ISO-8601 time
        #[arg(long)]
        to: Option<String>,

        /// Page number (clamped to the available range)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(long, default_value = "50")]
        page_size: usize,
    },

    /// Count error/critical records at or after a reference time
    CountErrors {
        /// Log file to scan
        file: PathBuf,

        /// Viewer configuration (TOML)
        #[arg(long, short)]
        config: PathBuf,

        /// Reference time (ISO-8601; offset-less values use --timezone)
        #[arg(long)]
        since: String,

        /// IANA timezone for offset-less timestamps
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Emit sample log lines at every severity, for trying out a config
    Generate {
        /// How many lines to emit
        #[arg(long, default_value = "10")]
        lines: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("logview=warn".parse().unwrap())
                .add_directive("logview_core=warn".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::View {
            file,
            config,
            search,
            level,
            from,
            to,
            page,
            page_size,
        } => {
            let config = ViewerConfig::load(&config)?;
            let content = read_log_content(&file)?;
            let request = ViewRequest {
                boundaries: config.boundaries()?,
                parser: config.parser,
                criteria: FilterCriteria {
                    search,
                    level,
                    time_from: from,
                    time_to: to,
                },
                page_size,
                page_number: page,
            };

            let view = render_view(&content, &request)?;
            print_view(&view);
        }

        Commands::CountErrors {
            file,
            config,
            since,
            timezone,
        } => {
            let config = ViewerConfig::load(&config)?;
            let content = read_log_content(&file)?;
            let query = ErrorCountQuery::new(&since, &timezone)?;
            debug!("counting errors since {}", query.reference_time);

            let count = errors_since(&content, &config.parser, &config.boundaries()?, &query)?;
            println!("{}", count);
        }

        Commands::Generate { lines } => generate_sample(lines),
    }

    Ok(())
}

fn print_view(view: &FileView) {
    let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
    println!("{}", names.join(" | "));

    for row in &view.page.items {
        match row {
            TableRow::Fields(values) => {
                // The trailing traceback field may span lines; print it
                // indented under its row so the table stays readable.
                if let Some((traceback, fields)) = values.split_last() {
                    println!("{}", fields.join(" | "));
                    for line in traceback.lines() {
                        println!("    {}", line);
                    }
                }
            }
            TableRow::Degraded { message, raw } => {
                println!("!! {}", message);
                for line in raw.lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    println!(
        "page {}/{} ({} of {} rows matched)",
        view.page.number, view.page.total_pages, view.matched_rows, view.total_rows
    );
}

fn generate_sample(lines: usize) {
    let levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];
    let start = chrono::Utc::now() - chrono::Duration::minutes(lines as i64);

    for i in 0..lines {
        let level = levels[i % levels.len()];
        let time = start + chrono::Duration::minutes(i as i64);
        println!(
            "{} | {} | {} message {}",
            time.format("%Y-%m-%dT%H:%M:%S"),
            level,
            level.to_lowercase(),
            i + 1
        );
        if level == "ERROR" {
            println!("Traceback (most recent call last):");
            println!("  File \"app.py\", line {}, in handle", i + 1);
            println!("RuntimeError: sample failure");
        }
    }
}
