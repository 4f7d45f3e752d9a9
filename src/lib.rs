//! eafkit: a document model and interval toolkit for ELAN annotation files.
//!
//! ELAN stores time-aligned annotations as EAF XML: named tiers whose
//! annotations point into one shared millisecond timeline. eafkit loads
//! those files into a typed model, answers time queries over it, derives
//! new tiers (merged, glued, gaps-and-overlaps) and writes the result back.
//!
//! # Modules
//!
//! - [`eaf`]: the document model plus EAF, JSON and TextGrid adapters
//! - [`intervals`]: pure interval algorithms over resolved spans
//! - [`validation`]: document validation and error reporting
//! - [`inspect`]: summary reports for a document
//! - [`error`]: error types for eafkit operations

pub mod eaf;
pub mod error;
pub mod inspect;
pub mod intervals;
pub mod validation;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use eaf::{Document, Millis};
pub use error::EafError;

/// The eafkit CLI application.
#[derive(Parser)]
#[command(name = "eafkit")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` also works.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a document and its tiers.
    Inspect(InspectArgs),
    /// Validate a document for errors and warnings.
    Validate(ValidateArgs),
    /// Export a document as a Praat TextGrid.
    Textgrid(TextgridArgs),
    /// Write a JSON snapshot of a document.
    Json(JsonArgs),
    /// Merge several tiers into one new tier.
    Merge(MergeArgs),
    /// Glue near-adjacent annotations of a tier into a new tier.
    Glue(GlueArgs),
    /// Classify gaps, pauses and overlaps between two tiers.
    Gaps(GapsArgs),
    /// Keep only the annotations overlapping a time range.
    Extract(ExtractArgs),
    /// Move every annotation by a fixed number of milliseconds.
    Shift(ShiftArgs),
}

/// Report rendering.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Input document (.eaf, or .json snapshot).
    input: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Input document (.eaf, or .json snapshot).
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct TextgridArgs {
    input: PathBuf,

    /// Output TextGrid path.
    output: PathBuf,

    /// Tier to leave out (repeatable).
    #[arg(long = "exclude", value_name = "TIER")]
    excluded: Vec<String>,
}

#[derive(clap::Args)]
struct JsonArgs {
    input: PathBuf,

    /// Output JSON path.
    output: PathBuf,
}

#[derive(clap::Args)]
struct MergeArgs {
    input: PathBuf,

    /// Tier to merge (repeatable, at least one).
    #[arg(long = "tier", value_name = "TIER", required = true)]
    tiers: Vec<String>,

    /// Name of the merged tier [default: <tiers>_Merged].
    #[arg(long)]
    name: Option<String>,

    /// Gaps shorter than this many milliseconds are bridged.
    #[arg(long, default_value_t = intervals::merge::DEFAULT_MERGE_GAP)]
    gap: Millis,

    /// Output EAF path.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct GlueArgs {
    input: PathBuf,

    /// Tier whose annotations are glued.
    #[arg(long)]
    tier: String,

    /// Name of the glued tier [default: <tier>_glued].
    #[arg(long)]
    name: Option<String>,

    /// Annotations closer than this many milliseconds are glued.
    #[arg(long, default_value_t = intervals::glue::DEFAULT_GLUE_THRESHOLD)]
    threshold: Millis,

    /// Annotation value to drop before gluing (repeatable).
    #[arg(long = "skip-value", value_name = "VALUE")]
    skip_values: Vec<String>,

    /// Output EAF path.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct GapsArgs {
    input: PathBuf,

    /// First speaker tier.
    #[arg(long)]
    first: String,

    /// Second speaker tier.
    #[arg(long)]
    second: String,

    /// Only keep intervals shorter than this many milliseconds.
    #[arg(long)]
    max_len: Option<Millis>,

    /// Name of the created tier [default: <first>_<second>_go].
    #[arg(long)]
    name: Option<String>,

    /// Linguistic type of the created tier.
    #[arg(long)]
    tier_type: Option<String>,

    /// Write the document with a gaps-and-overlaps tier here; without it
    /// the intervals are only printed.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format of the printed intervals.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(clap::Args)]
struct ExtractArgs {
    input: PathBuf,

    /// Range start in milliseconds.
    #[arg(long)]
    start: Millis,

    /// Range end in milliseconds (inclusive).
    #[arg(long)]
    end: Millis,

    /// Output EAF path.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct ShiftArgs {
    input: PathBuf,

    /// Milliseconds to add to every timeslot (may be negative).
    #[arg(long, allow_hyphen_values = true)]
    by: Millis,

    /// Output EAF path.
    #[arg(short, long)]
    output: PathBuf,
}

/// Run the eafkit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), EafError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Textgrid(args)) => run_textgrid(args),
        Some(Commands::Json(args)) => run_json(args),
        Some(Commands::Merge(args)) => run_merge(args),
        Some(Commands::Glue(args)) => run_glue(args),
        Some(Commands::Gaps(args)) => run_gaps(args),
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::Shift(args)) => run_shift(args),
        None => {
            println!("eafkit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Document model and interval toolkit for ELAN annotation files.");
            println!();
            println!("Run 'eafkit --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Loads a document, choosing the reader by file extension.
fn load_document(path: &Path) -> Result<Document, EafError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    debug!("loading {}", path.display());
    if is_json {
        eaf::io_json::read_document_json(path)
    } else {
        eaf::io_eaf::read_eaf(path)
    }
}

fn save_document(path: &Path, doc: &Document) -> Result<(), EafError> {
    eaf::io_eaf::write_eaf(path, doc)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), EafError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| EafError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{json}");
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;
    let report = inspect::inspect_document(&doc);

    match args.output {
        ReportFormat::Json => print_json(&report),
        ReportFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_document(&doc, &opts);

    match args.output {
        ReportFormat::Json => print_json(&serde_json::json!({
            "error_count": report.error_count(),
            "warning_count": report.warning_count(),
            "issues": report.issues,
        }))?,
        ReportFormat::Text => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(EafError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

fn run_textgrid(args: TextgridArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;
    let excluded: BTreeSet<String> = args.excluded.into_iter().collect();
    for name in &excluded {
        if !doc.has_tier(name) {
            return Err(EafError::TierNotFound(name.clone()));
        }
    }

    eaf::io_textgrid::write_textgrid(&args.output, &doc, &excluded)?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn run_json(args: JsonArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;
    eaf::io_json::write_document_json(&args.output, &doc)?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), EafError> {
    let mut doc = load_document(&args.input)?;
    let name = doc.merge_tiers(args.tiers.as_slice(), args.name.as_deref(), args.gap)?;
    println!(
        "Merged {} tier(s) into '{}' ({} annotation(s))",
        args.tiers.len(),
        name,
        doc.annotations_of(&name)?.len()
    );
    save_document(&args.output, &doc)
}

fn run_glue(args: GlueArgs) -> Result<(), EafError> {
    let mut doc = load_document(&args.input)?;
    let skip: BTreeSet<String> = args.skip_values.into_iter().collect();
    let name = doc.glue_annotations(&args.tier, args.name.as_deref(), args.threshold, &skip)?;
    println!(
        "Glued '{}' into '{}' ({} annotation(s))",
        args.tier,
        name,
        doc.annotations_of(&name)?.len()
    );
    save_document(&args.output, &doc)
}

fn run_gaps(args: GapsArgs) -> Result<(), EafError> {
    let mut doc = load_document(&args.input)?;

    let result = match &args.output {
        Some(_) => doc.create_gaps_and_overlaps_tier(
            &args.first,
            &args.second,
            args.name.as_deref(),
            args.max_len,
            args.tier_type.as_deref(),
        )?,
        None => doc.gaps_and_overlaps(&args.first, &args.second, args.max_len)?,
    };

    match args.format {
        ReportFormat::Json => print_json(&result)?,
        ReportFormat::Text => {
            for span in result.labelled_spans() {
                println!("{}\t{}\t{}", span.start, span.end, span.value);
            }
        }
    }

    match &args.output {
        Some(path) => save_document(path, &doc),
        None => Ok(()),
    }
}

fn run_extract(args: ExtractArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;
    let part = doc.extract(args.start, args.end)?;
    save_document(&args.output, &part)
}

fn run_shift(args: ShiftArgs) -> Result<(), EafError> {
    let doc = load_document(&args.input)?;
    let shifted = doc.shift_annotations(args.by)?;
    save_document(&args.output, &shifted)
}
