//! CLI entry point for treescribe

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use termcolor::{ColorChoice, StandardStream};
use treescribe::{
    ConfigError, DEFAULT_MAX_FILE_SIZE, IGNORE_FILE_NAME, IncludeFilter, OutputConfig, PatternSet,
    RuleOrigin, TreeFormatter, WalkerConfig, check_root, relative_within, scan, to_json,
    write_json,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "treescribe")]
#[command(about = "Print a directory tree with the contents of every file embedded")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Write the result to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Ignore file with gitignore-style rules (default: <PATH>/.trscrignore)
    #[arg(long = "ignore-file", value_name = "FILE")]
    ignore_file: Option<PathBuf>,

    /// Extra ignore rule, applied after the ignore file (can be used multiple times)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Only show files matching PATTERN; a trailing / selects directories
    /// (can be used multiple times)
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    include: Vec<String>,

    /// Maximum bytes of content embedded per file (default: 1MB)
    /// Larger files are truncated. Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE")]
    max_file_size: Option<String>,

    /// Descend only N levels deep (N >= 1)
    #[arg(
        short = 'L',
        long = "level",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    level: Option<usize>,

    /// Follow symbolic links
    #[arg(short = 'l', long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Print the tree without file contents
    #[arg(short = 't', long = "tree-only")]
    tree_only: bool,

    /// Show file sizes next to filenames
    #[arg(short = 's', long = "size")]
    size: bool,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Number of parallel workers for reading files
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log skipped paths and rule decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Assemble the rule set: built-in defaults, the output file, the ignore
/// file, then `--exclude` rules. Later rules override earlier ones.
fn build_rules(args: &Args, root: &Path) -> Result<PatternSet, ConfigError> {
    let mut builder = PatternSet::builder().with_defaults();

    if let Some(output) = &args.output {
        if let Some(relative) = relative_within(root, output) {
            log::debug!("excluding output file {}", relative);
            builder.exclude_path(&relative)?;
        }
    }

    match &args.ignore_file {
        Some(path) => builder.add_file(path, true)?,
        None => builder.add_file(&root.join(IGNORE_FILE_NAME), false)?,
    };

    for (i, pattern) in args.exclude.iter().enumerate() {
        builder.add_line(RuleOrigin::CommandLine, i + 1, pattern)?;
    }

    Ok(builder.build())
}

fn run(args: &Args) -> Result<()> {
    let max_file_size = match &args.max_file_size {
        Some(size) => parse_file_size(size)
            .map_err(|e| anyhow!("invalid --max-file-size '{}': {}", size, e))?,
        None => DEFAULT_MAX_FILE_SIZE,
    };

    let root = args.path.clone();
    check_root(&root)?;

    let config = WalkerConfig {
        rules: build_rules(args, &root)?,
        include: IncludeFilter::new(&args.include)?,
        max_file_size,
        follow_symlinks: args.follow_symlinks,
        max_depth: args.level,
        load_content: !args.tree_only,
        parallel_workers: args.jobs,
        root,
    };

    let tree = scan(&config)?;

    let formatter = TreeFormatter::new(OutputConfig {
        use_color: args.output.is_none() && !args.json && should_use_color(args.color),
        show_content: !args.tree_only,
        show_size: args.size,
        show_summary: true,
    });

    match &args.output {
        Some(path) => {
            let text = if args.json {
                to_json(&tree)?
            } else {
                formatter.format(&tree)
            };
            fs::write(path, text)
                .with_context(|| format!("cannot write output to {}", path.display()))?;
            eprintln!("Done. See {}", path.display());
        }
        None if args.json => {
            let mut stdout = io::stdout().lock();
            write_json(&tree, &mut stdout).context("error writing output")?;
        }
        None => {
            let mut stdout = StandardStream::stdout(ColorChoice::Always);
            formatter
                .print(&tree, &mut stdout)
                .context("error writing output")?;
            stdout.flush().context("error writing output")?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("treescribe: {:#}", e);
        process::exit(1);
    }
}
