//! coco-passport - guest passport intake tooling
//!
//! Resolves free-text stay labels to canonical stay ids, decodes passport
//! MRZ and printed-page text, and turns the results into guest rows and
//! export sheets. Results go to stdout (or `--output`), logs to stderr.
//!
//! Module structure:
//! - `domain/` - Value types (StayResolution, MrzRecord, GuestProfile)
//! - `services/` - Parsers and mapping (StayIdResolver, MRZ, VIZ, export)
//! - `io/` - Stdin splitting and JSON-lines output
//! - `infra/` - Infrastructure (Config, Metrics)

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use coco_passport::domain::{GuestProfile, StayIntake};
use coco_passport::infra::{Config, Metrics};
use coco_passport::io::{open_output, read_all, read_lines, split_documents, JsonLinesWriter};
use coco_passport::services::export::{export_guests, export_tm30, status_line};
use coco_passport::services::tour::extract_stay_id_from_url;
use coco_passport::services::{mrz_parser, viz_parser, GuestRowBuilder, TourGuide, TourVideo};
use serde::Serialize;
use std::io;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// coco-passport - stay ids, MRZ/VIZ parsing and guest sheets
#[derive(Parser, Debug)]
#[command(name = "coco-passport", version, about)]
struct Args {
    /// Path to TOML configuration file
    ///
    /// Falls back to the COCO_CONFIG environment variable, then
    /// config/coco.toml. A missing file means built-in defaults.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Append output to this file instead of writing to stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Emit logs as JSON objects instead of text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve stay labels to stay ids (arguments, else one label per stdin line)
    Resolve { labels: Vec<String> },

    /// Parse MRZ documents from stdin, separated by blank lines
    Mrz,

    /// Extract printed-page passport fields from OCR text on stdin
    Viz,

    /// Build guest rows for one stay from MRZ documents on stdin
    Intake {
        /// Free-text stay label, e.g. "A4 van der Berg"
        #[arg(long)]
        stay: String,

        /// Default check-out date for every guest
        #[arg(long)]
        checkout: Option<String>,

        /// Year for check-out dates written without one ("Sept 11")
        #[arg(long)]
        reference_year: Option<i32>,

        /// Contact phone in E.164 format
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Value of the source column (defaults to [intake] source)
        #[arg(long)]
        source: Option<String>,

        /// Treat stdin as one OCR text blob instead of MRZ documents
        #[arg(long)]
        viz: bool,
    },

    /// Read guest rows (JSON lines) from stdin and write a TSV sheet
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Tsv)]
        format: ExportFormat,
    },

    /// Tour videos for a stay id or a registration URL
    Tour { target: String },

    /// Passport progress line for a stay
    Status {
        #[arg(long)]
        received: u32,

        #[arg(long)]
        total: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    /// Guest sheet with ISO birthdays
    Tsv,
    /// Immigration sheet, ASCII names and DD/MM/YYYY dates
    Tm30,
}

#[derive(Serialize)]
struct TourReply {
    stay_id: String,
    videos: Vec<TourVideo>,
    message: String,
}

fn micros_since(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

fn init_logging(json: bool) {
    // Logs go to stderr so stdout stays machine-readable
    // Default: INFO, use RUST_LOG=debug for per-item traces
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let config = Config::load_from_path(&config_path);

    let rooms = config.numbered_rooms().len() + config.named_rooms().len();
    info!(
        git_hash = env!("GIT_HASH"),
        config_file = %config.config_file(),
        rooms = %rooms,
        connectors = %config.connectors().len(),
        intake_source = %config.intake_source(),
        "config_loaded"
    );

    let metrics = Metrics::new();
    let mut out = JsonLinesWriter::new(open_output(args.output.as_deref())?);

    match args.command {
        Command::Resolve { labels } => {
            let labels = if labels.is_empty() { read_lines(io::stdin().lock())? } else { labels };
            let resolver = config.resolver();
            for label in &labels {
                let resolution = resolver.resolve(label);
                metrics.record_resolution(&resolution);
                debug!(input = %label, stay_id = %resolution.stay_id, "stay_resolved");
                out.write_record(&resolution)?;
            }
        }
        Command::Mrz => {
            let text = read_all(io::stdin().lock())?;
            for document in split_documents(&text) {
                let start = Instant::now();
                let record = mrz_parser::parse(&document);
                metrics.record_mrz(&record, micros_since(start));
                if let Some(error) = &record.error {
                    warn!(format = %record.format.as_str(), error = %error, "mrz_parse_failed");
                }
                out.write_record(&record)?;
            }
            info!(count = %out.written(), failures = %metrics.mrz_failures(), "mrz_batch_parsed");
        }
        Command::Viz => {
            let text = read_all(io::stdin().lock())?;
            let start = Instant::now();
            let fields = viz_parser::parse_viz(&text);
            metrics.record_viz(fields.has_name(), micros_since(start));
            if !fields.has_name() {
                warn!(chars = %text.len(), "viz_no_name_found");
            }
            out.write_record(&fields)?;
        }
        Command::Intake { stay, checkout, reference_year, phone, notes, source, viz } => {
            let intake = StayIntake {
                stay_label: stay,
                default_checkout: checkout,
                reference_year,
                phone,
                notes,
                source,
            };
            let resolver = config.resolver();
            let builder = GuestRowBuilder::new(&intake, &resolver, config.intake_source());
            metrics.record_resolution(&resolver.resolve(&intake.stay_label));
            if builder.stay_id().is_empty() {
                warn!(stay_label = %intake.stay_label, "intake_empty_stay_id");
            }
            if intake.default_checkout.is_some() && builder.check_out_date().is_none() {
                warn!(checkout = ?intake.default_checkout, "intake_checkout_unparsed");
            }

            let text = read_all(io::stdin().lock())?;
            if viz {
                let start = Instant::now();
                let fields = viz_parser::parse_viz(&text);
                metrics.record_viz(fields.has_name(), micros_since(start));
                metrics.record_guest_row(true);
                out.write_record(&builder.from_viz(&fields))?;
            } else {
                for document in split_documents(&text) {
                    let start = Instant::now();
                    let record = mrz_parser::parse(&document);
                    metrics.record_mrz(&record, micros_since(start));
                    match builder.from_mrz(&record) {
                        Ok(row) => {
                            metrics.record_guest_row(true);
                            out.write_record(&row)?;
                        }
                        Err(e) => {
                            metrics.record_guest_row(false);
                            warn!(stay_id = %builder.stay_id(), error = %e, "guest_row_rejected");
                        }
                    }
                }
            }
            info!(stay_id = %builder.stay_id(), rows = %out.written(), "intake_completed");
        }
        Command::Export { format } => {
            let lines = read_lines(io::stdin().lock())?;
            let guests = lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    serde_json::from_str::<GuestProfile>(line)
                        .with_context(|| format!("Invalid guest row #{}", i + 1))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let sheet = match format {
                ExportFormat::Tsv => export_guests(&guests),
                ExportFormat::Tm30 => export_tm30(&guests),
            };
            out.write_text(&sheet)?;
            info!(guests = %guests.len(), format = ?format, "export_written");
        }
        Command::Tour { target } => {
            let stay_id = if target.contains('/') {
                extract_stay_id_from_url(&target).unwrap_or_else(|| {
                    warn!(url = %target, "tour_stay_id_not_found");
                    String::new()
                })
            } else {
                target
            };
            let guide = TourGuide::new(config.tour_urls().clone());
            out.write_record(&TourReply {
                videos: guide.videos(&stay_id),
                message: guide.message(&stay_id),
                stay_id,
            })?;
        }
        Command::Status { received, total } => {
            out.write_text(&status_line(received, total))?;
        }
    }

    out.flush()?;
    metrics.report().log();
    Ok(())
}
