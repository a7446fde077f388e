//! ptxprobe - Probe Pro Tools session files by heuristic inspection
//!
//! Loads one or more session files and runs the probing primitives over
//! them: marker name search, string table extraction, sample-position
//! guessing, and baseline/variant comparison.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ptxprobe_core::search::{SearchConfig, DEFAULT_CONTEXT_RADIUS};
use ptxprobe_core::{
    analyze_structure, load_file, BinaryDiff, DiffConfig, FieldConfig, FieldGuesser,
    FindingWriter, MarkerSearch, StatsWriter, StringTableScanner, StringsConfig,
    StructureConfig, TextWriter, DEFAULT_MARKER_TERMS,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Probe Pro Tools session files for markers, string tables and sample positions
#[derive(Parser, Debug)]
#[command(name = "ptxprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for marker names stored as UTF-8 or UTF-16LE
    Markers {
        #[command(flatten)]
        input: InputArgs,

        /// Marker name to search for (repeatable; defaults to Intro, Verse 1, Chorus, Outro)
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// Bytes of context kept on each side of a hit
        #[arg(long, default_value_t = DEFAULT_CONTEXT_RADIUS)]
        context: usize,
    },

    /// List printable ASCII strings
    Strings {
        #[command(flatten)]
        input: InputArgs,

        /// Minimum string length in bytes
        #[arg(long, default_value_t = 3)]
        min_len: usize,

        /// Maximum number of strings shown per file (0 = unlimited)
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// List 32-bit values that read as plausible sample positions
    Fields {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fields: FieldArgs,

        /// Maximum number of candidates shown per file (0 = unlimited)
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Header, string table and sample positions in one pass
    Structure {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fields: FieldArgs,

        /// Number of leading bytes shown
        #[arg(long, default_value_t = 100)]
        header_len: usize,

        /// Minimum string length in bytes
        #[arg(long, default_value_t = 3)]
        min_len: usize,

        /// Maximum number of strings shown per file (0 = unlimited)
        #[arg(long, default_value_t = 20)]
        limit_strings: usize,

        /// Maximum number of candidates shown per file (0 = unlimited)
        #[arg(long, default_value_t = 10)]
        limit_fields: usize,
    },

    /// Compare a baseline session against a variant
    Compare {
        /// Baseline file (for example an empty session)
        baseline: PathBuf,

        /// Variant file (for example the same session with markers added)
        variant: PathBuf,

        /// Bytes of context kept around the first difference
        #[arg(long, default_value_t = 20)]
        context: usize,

        /// Maximum number of trailing bytes shown
        #[arg(long, default_value_t = 50)]
        trailing_preview: usize,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Session files to analyze
    #[arg(conflicts_with = "directory")]
    files: Vec<PathBuf>,

    /// Analyze every matching file under this directory instead
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// File extension matched when walking a directory
    #[arg(long, default_value = "ptx")]
    extension: String,
}

#[derive(Args, Debug)]
struct FieldArgs {
    /// Sample rate used to convert counts to seconds
    #[arg(long, default_value_t = 44_100.0)]
    sample_rate: f64,

    /// Shortest plausible position in seconds (exclusive)
    #[arg(long, default_value_t = 10.0)]
    min_seconds: f64,

    /// Longest plausible position in seconds (exclusive)
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f64,

    /// Largest plausible raw value (exclusive)
    #[arg(long, default_value_t = 10_000_000)]
    max_raw: u32,
}

impl FieldArgs {
    fn config(&self) -> FieldConfig {
        FieldConfig::new()
            .sample_rate_hz(self.sample_rate)
            .seconds(self.min_seconds, self.max_seconds)
            .max_raw(self.max_raw)
    }
}

/// Output format for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Text,
    /// One JSON object per file
    Json,
}

/// Findings for one file, as emitted in JSON mode
#[derive(Serialize)]
struct FileReport<'a, T: Serialize> {
    path: &'a Path,
    size: usize,
    blake3: String,
    findings: T,
}

/// Tracks totals across a multi-file run
#[derive(Default)]
struct RunStats {
    findings: StatsWriter,
    files_ok: usize,
    files_failed: usize,
}

impl RunStats {
    fn print_summary(&self) {
        info!(
            "Summary: {} file(s) analyzed, {} unreadable, {} marker hit(s), {} string(s), {} candidate field(s)",
            self.files_ok,
            self.files_failed,
            self.findings.occurrence_count,
            self.findings.string_count,
            self.findings.field_count
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Markers {
            input,
            terms,
            context,
        } => run_markers(&cli, input, terms, *context),
        Command::Strings {
            input,
            min_len,
            limit,
        } => run_strings(&cli, input, *min_len, *limit),
        Command::Fields {
            input,
            fields,
            limit,
        } => run_fields(&cli, input, fields, *limit),
        Command::Structure {
            input,
            fields,
            header_len,
            min_len,
            limit_strings,
            limit_fields,
        } => {
            let config = StructureConfig {
                header_len: *header_len,
                strings: StringsConfig::new().min_len(*min_len),
                fields: fields.config(),
            };
            run_structure(&cli, input, &config, *limit_strings, *limit_fields)
        }
        Command::Compare {
            baseline,
            variant,
            context,
            trailing_preview,
        } => {
            let config = DiffConfig::new()
                .context_radius(*context)
                .trailing_preview(*trailing_preview);
            run_compare(&cli, baseline, variant, config)
        }
    }
}

/// Resolve the list of files a subcommand should analyze
fn collect_inputs(input: &InputArgs) -> Result<Vec<PathBuf>> {
    let Some(directory) = &input.directory else {
        if input.files.is_empty() {
            bail!("No input files given (pass files or --directory)");
        }
        return Ok(input.files.clone());
    };

    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || is_hidden(path) {
            continue;
        }

        if !has_extension(path, &input.extension) {
            trace!("Skipping {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    if files.is_empty() {
        warn!(
            "No .{} files found under {}",
            input.extension,
            directory.display()
        );
    }

    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
        .unwrap_or(false)
}

/// Short BLAKE3 digest of file content (first 16 hex chars)
fn fingerprint(data: &[u8]) -> String {
    blake3::hash(data).to_hex()[..16].to_string()
}

/// Load every input, run `analyze` on the ones that load, and keep going
/// past the ones that don't.
fn for_each_file<F>(inputs: &[PathBuf], stats: &mut RunStats, mut analyze: F) -> Result<()>
where
    F: FnMut(&Path, &Bytes, &mut RunStats) -> Result<()>,
{
    for path in inputs {
        match load_file(path) {
            Ok(data) => {
                analyze(path, &data, stats)?;
                stats.files_ok += 1;
            }
            Err(e) => {
                error!("{}", e);
                stats.files_failed += 1;
            }
        }
    }
    stats.print_summary();
    Ok(())
}

fn emit_json<T: Serialize>(path: &Path, data: &Bytes, findings: T) -> Result<()> {
    let report = FileReport {
        path,
        size: data.len(),
        blake3: fingerprint(data),
        findings,
    };
    let line = serde_json::to_string(&report)
        .with_context(|| format!("Failed to serialize findings for {}", path.display()))?;
    println!("{}", line);
    Ok(())
}

/// Items shown under a display cap (0 = all)
fn capped<T>(items: &[T], limit: usize) -> &[T] {
    if limit == 0 {
        items
    } else {
        &items[..limit.min(items.len())]
    }
}

fn write_more(writer: &mut TextWriter, total: usize, limit: usize) -> std::fmt::Result {
    if limit > 0 && total > limit {
        writer.line(format!("  ... and {} more", total - limit))?;
    }
    Ok(())
}

fn run_markers(cli: &Cli, input: &InputArgs, terms: &[String], context: usize) -> Result<()> {
    let inputs = collect_inputs(input)?;
    let terms: Vec<&str> = if terms.is_empty() {
        DEFAULT_MARKER_TERMS.to_vec()
    } else {
        terms.iter().map(String::as_str).collect()
    };
    let search = MarkerSearch::with_config(SearchConfig::new().context_radius(context));

    debug!("Searching for {:?}", terms);

    let mut stats = RunStats::default();
    for_each_file(&inputs, &mut stats, |path, data, stats| {
        let found = search.find(data, &terms);
        for occurrence in &found {
            stats.findings.write_occurrence(occurrence)?;
        }

        if cli.format == OutputFormat::Json {
            return emit_json(path, data, &found);
        }

        let mut out = TextWriter::new();
        out.line(format!("\n=== Analyzing {} ===", path.display()))?;
        if found.is_empty() {
            out.line("No marker names found")?;
        } else {
            out.line(format!("Found {} marker references:", found.len()))?;
            for occurrence in &found {
                out.line("")?;
                out.write_occurrence(occurrence)?;
            }
        }
        out.line(format!("File size: {} bytes", data.len()))?;
        print!("{}", out.finish());
        Ok(())
    })
}

fn run_strings(cli: &Cli, input: &InputArgs, min_len: usize, limit: usize) -> Result<()> {
    let inputs = collect_inputs(input)?;
    let scanner = StringTableScanner::with_config(StringsConfig::new().min_len(min_len));

    let mut stats = RunStats::default();
    for_each_file(&inputs, &mut stats, |path, data, stats| {
        let strings = scanner.extract(data);
        for string in &strings {
            stats.findings.write_string(string)?;
        }

        if cli.format == OutputFormat::Json {
            return emit_json(path, data, &strings);
        }

        let mut out = TextWriter::new();
        out.line(format!("\n=== Strings in {} ===", path.display()))?;
        out.line(format!("Found {} potential strings:", strings.len()))?;
        for string in capped(&strings, limit) {
            out.write_string(string)?;
        }
        write_more(&mut out, strings.len(), limit)?;
        print!("{}", out.finish());
        Ok(())
    })
}

fn run_fields(cli: &Cli, input: &InputArgs, fields: &FieldArgs, limit: usize) -> Result<()> {
    let guesser = FieldGuesser::with_config(fields.config())
        .context("Invalid sample-position settings")?;
    let inputs = collect_inputs(input)?;

    let mut stats = RunStats::default();
    for_each_file(&inputs, &mut stats, |path, data, stats| {
        let candidates = guesser.guess(data);
        for field in &candidates {
            stats.findings.write_field(field)?;
        }

        if cli.format == OutputFormat::Json {
            return emit_json(path, data, &candidates);
        }

        let mut out = TextWriter::new();
        out.line(format!("\n=== Sample positions in {} ===", path.display()))?;
        write_candidates(&mut out, &candidates, guesser.config().sample_rate_hz, limit)?;
        print!("{}", out.finish());
        Ok(())
    })
}

fn write_candidates(
    out: &mut TextWriter,
    candidates: &[ptxprobe_core::CandidateField],
    sample_rate: f64,
    limit: usize,
) -> std::fmt::Result {
    if candidates.is_empty() {
        return out.line("No plausible sample positions found");
    }
    out.line(format!(
        "Found {} potential sample positions (at {} Hz):",
        candidates.len(),
        sample_rate
    ))?;
    for field in capped(candidates, limit) {
        out.write_field(field)?;
    }
    write_more(out, candidates.len(), limit)
}

fn run_structure(
    cli: &Cli,
    input: &InputArgs,
    config: &StructureConfig,
    limit_strings: usize,
    limit_fields: usize,
) -> Result<()> {
    // Reject bad settings before touching any file
    FieldGuesser::with_config(config.fields.clone()).context("Invalid sample-position settings")?;
    let inputs = collect_inputs(input)?;

    let mut stats = RunStats::default();
    for_each_file(&inputs, &mut stats, |path, data, stats| {
        let report = analyze_structure(data, config)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;
        stats.findings.write_header(&report.header)?;
        for string in &report.strings {
            stats.findings.write_string(string)?;
        }
        for field in &report.fields {
            stats.findings.write_field(field)?;
        }

        if cli.format == OutputFormat::Json {
            return emit_json(path, data, &report);
        }

        let mut out = TextWriter::new();
        out.line(format!("\n=== Analyzing structure of {} ===", path.display()))?;
        out.line(format!("BLAKE3: {}", fingerprint(data)))?;

        out.line("\n--- File Header Analysis ---")?;
        out.write_header(&report.header)?;

        out.line("\n--- Looking for structural patterns ---")?;
        out.line(format!("Found {} potential strings:", report.strings.len()))?;
        for string in capped(&report.strings, limit_strings) {
            out.write_string(string)?;
        }
        write_more(&mut out, report.strings.len(), limit_strings)?;

        out.line("\n--- Looking for potential marker data ---")?;
        write_candidates(&mut out, &report.fields, config.fields.sample_rate_hz, limit_fields)?;

        print!("{}", out.finish());
        Ok(())
    })
}

/// What is known about a comparison that could not run
#[derive(Debug, Serialize)]
struct PartialCompare<'a> {
    baseline: &'a Path,
    variant: &'a Path,
    size_a: Option<usize>,
    size_b: Option<usize>,
    errors: Vec<String>,
}

impl<'a> PartialCompare<'a> {
    fn new(
        baseline: &'a Path,
        variant: &'a Path,
        loaded: &[ptxprobe_core::Result<Bytes>; 2],
    ) -> Self {
        let size = |r: &ptxprobe_core::Result<Bytes>| r.as_ref().ok().map(Bytes::len);
        Self {
            baseline,
            variant,
            size_a: size(&loaded[0]),
            size_b: size(&loaded[1]),
            errors: loaded
                .iter()
                .filter_map(|r| r.as_ref().err())
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Size lines for the files that were read
    fn lines(&self) -> Vec<String> {
        [(self.baseline, self.size_a), (self.variant, self.size_b)]
            .into_iter()
            .enumerate()
            .filter_map(|(n, (path, size))| {
                size.map(|size| format!("File {} size: {} bytes ({})", n + 1, size, path.display()))
            })
            .collect()
    }
}

fn load_pair(baseline: &Path, variant: &Path) -> [ptxprobe_core::Result<Bytes>; 2] {
    [load_file(baseline), load_file(variant)]
}

fn run_compare(cli: &Cli, baseline: &Path, variant: &Path, config: DiffConfig) -> Result<()> {
    let loaded = load_pair(baseline, variant);

    let (Ok(a), Ok(b)) = (&loaded[0], &loaded[1]) else {
        let partial = PartialCompare::new(baseline, variant, &loaded);
        for e in &partial.errors {
            error!("{}", e);
        }
        if cli.format == OutputFormat::Json {
            let json = serde_json::to_string(&partial)
                .context("Failed to serialize partial comparison")?;
            println!("{}", json);
        } else {
            for line in partial.lines() {
                println!("{}", line);
            }
        }
        warn!("Comparison skipped: not every file could be read");
        return Ok(());
    };

    let report = BinaryDiff::with_config(config).diff(a, b);

    if cli.format == OutputFormat::Json {
        #[derive(Serialize)]
        struct CompareReport<'a> {
            baseline: &'a Path,
            variant: &'a Path,
            blake3_a: String,
            blake3_b: String,
            report: &'a ptxprobe_core::DiffReport,
        }
        let json = serde_json::to_string(&CompareReport {
            baseline,
            variant,
            blake3_a: fingerprint(a),
            blake3_b: fingerprint(b),
            report: &report,
        })
        .context("Failed to serialize comparison")?;
        println!("{}", json);
        return Ok(());
    }

    let mut out = TextWriter::new();
    out.line(format!(
        "\n=== Comparing {} and {} ===",
        baseline.display(),
        variant.display()
    ))?;
    out.line(format!("File 1 BLAKE3: {}", fingerprint(a)))?;
    out.line(format!("File 2 BLAKE3: {}", fingerprint(b)))?;
    out.write_diff(&report)?;
    print!("{}", out.finish());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn input_args(files: Vec<PathBuf>, directory: Option<PathBuf>) -> InputArgs {
        InputArgs {
            files,
            directory,
            extension: "ptx".to_string(),
        }
    }

    #[test]
    fn test_collect_inputs_walks_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("empty_test");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("empty_test.ptx"), b"a").unwrap();
        fs::write(temp_dir.path().join("markers.PTX"), b"b").unwrap();
        fs::write(temp_dir.path().join(".hidden.ptx"), b"c").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"d").unwrap();

        let files =
            collect_inputs(&input_args(vec![], Some(temp_dir.path().to_path_buf()))).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["empty_test.ptx", "markers.PTX"]);
    }

    #[test]
    fn test_collect_inputs_requires_something() {
        assert!(collect_inputs(&input_args(vec![], None)).is_err());

        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(collect_inputs(&input_args(vec![], Some(missing))).is_err());
    }

    #[test]
    fn test_collect_inputs_passes_files_through() {
        let files = vec![PathBuf::from("a.ptx"), PathBuf::from("b.ptx")];
        assert_eq!(collect_inputs(&input_args(files.clone(), None)).unwrap(), files);
    }

    #[test]
    fn test_unreadable_files_do_not_abort_run() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.ptx");
        fs::write(&good, b"\0Chorus\0").unwrap();
        let inputs = vec![temp_dir.path().join("missing.ptx"), good];

        let mut stats = RunStats::default();
        let mut seen = Vec::new();
        for_each_file(&inputs, &mut stats, |path, data, _| {
            seen.push((path.to_path_buf(), data.len()));
            Ok(())
        })
        .unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_ok, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, 8);
    }

    #[test]
    fn test_partial_compare_reports_readable_side() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.ptx");
        let variant = temp_dir.path().join("variant.ptx");
        fs::write(&variant, b"\0Chorus\0").unwrap();

        let loaded = load_pair(&missing, &variant);
        assert!(loaded[0].is_err());
        let partial = PartialCompare::new(&missing, &variant, &loaded);

        assert_eq!(partial.size_a, None);
        assert_eq!(partial.size_b, Some(8));
        assert_eq!(partial.errors.len(), 1);
        assert_eq!(
            partial.lines(),
            vec![format!("File 2 size: 8 bytes ({})", variant.display())]
        );

        let json = serde_json::to_value(&partial).unwrap();
        assert!(json["size_a"].is_null());
        assert_eq!(json["size_b"], 8);
        assert!(json["errors"][0].as_str().unwrap().contains("missing.ptx"));
    }

    #[test]
    fn test_capped() {
        let items = [1, 2, 3, 4];
        assert_eq!(capped(&items, 0), &items);
        assert_eq!(capped(&items, 2), &[1, 2]);
        assert_eq!(capped(&items, 10), &items);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("/tmp/session.ptx"), "ptx"));
        assert!(has_extension(Path::new("/tmp/session.PTX"), ".ptx"));
        assert!(!has_extension(Path::new("/tmp/session.ptf"), "ptx"));
        assert!(!has_extension(Path::new("/tmp/ptx"), "ptx"));
    }

    #[test]
    fn test_fingerprint() {
        let hash1 = fingerprint(b"hello");
        let hash2 = fingerprint(b"hello");
        let hash3 = fingerprint(b"world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 16);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
