//! Binary entry point for the `lz4s` command-line tool.
//!
//! Dispatches compress, decompress, verify, and folder-benchmark
//! operations over the library codec.  Output filenames are derived from
//! the input path and format extension when not given explicitly, and the
//! stream format is inferred from a compressed file's extension where
//! possible.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use walkdir::WalkDir;

use lz4s::cli::{set_display_level, MB};
use lz4s::displaylevel;
use lz4s::stream::{self, CodecStats};
use lz4s::Format;

#[derive(Parser)]
#[command(name = "lz4s", version = lz4s::VERSION, about = "Streaming LZ4-style codec with a bounded window")]
struct Cli {
    /// Increase verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a file.
    Compress {
        input: PathBuf,
        /// Output path; defaults to the input path plus the format extension.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stream format to write.
        #[arg(short, long, default_value = "lz4s")]
        format: Format,
    },
    /// Decompress a file.
    Decompress {
        input: PathBuf,
        /// Output path; defaults to the input path minus the format extension.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stream format to expect; inferred from the input extension when omitted.
        #[arg(short, long)]
        format: Option<Format>,
    },
    /// Decode a compressed file and compare it byte-for-byte with the original.
    Verify {
        original: PathBuf,
        compressed: PathBuf,
        /// Stream format; inferred from the compressed extension when omitted.
        #[arg(short, long)]
        format: Option<Format>,
    },
    /// Round-trip every file under a directory and print a summary table.
    BenchFolder {
        dir: PathBuf,
        /// Stream format to benchmark.
        #[arg(short, long, default_value = "lz4s")]
        format: Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.quiet {
        1
    } else {
        2 + u32::from(cli.verbose)
    };
    set_display_level(level);

    match cli.command {
        Command::Compress {
            input,
            output,
            format,
        } => {
            let output = output.unwrap_or_else(|| appended_extension(&input, format));
            let stats = stream::compress_file(&input, &output, format)
                .with_context(|| format!("compressing {}", input.display()))?;
            displaylevel!(
                2,
                "{} -> {} : {} -> {} bytes ({:.2}%)\n",
                input.display(),
                output.display(),
                stats.bytes_read,
                stats.bytes_written,
                stats.ratio() * 100.0
            );
        }
        Command::Decompress {
            input,
            output,
            format,
        } => {
            let format = resolve_format(format, &input)?;
            let output = match output {
                Some(path) => path,
                None => stripped_extension(&input, format)?,
            };
            let stats = stream::decompress_file(&input, &output, format)
                .with_context(|| format!("decompressing {}", input.display()))?;
            displaylevel!(
                2,
                "{} -> {} : {} bytes restored\n",
                input.display(),
                output.display(),
                stats.bytes_written
            );
        }
        Command::Verify {
            original,
            compressed,
            format,
        } => {
            let format = resolve_format(format, &compressed)?;
            match stream::verify_round_trip(&original, &compressed, format)
                .with_context(|| format!("verifying {}", compressed.display()))?
            {
                None => displaylevel!(2, "{} : OK\n", compressed.display()),
                Some(mismatch) => bail!("{}: {mismatch}", compressed.display()),
            }
        }
        Command::BenchFolder { dir, format } => bench_folder(&dir, format)?,
    }
    Ok(())
}

fn resolve_format(explicit: Option<Format>, path: &Path) -> Result<Format> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    Format::from_path(path).with_context(|| {
        format!(
            "cannot infer a format from {}; pass --format",
            path.display()
        )
    })
}

fn appended_extension(input: &Path, format: Format) -> PathBuf {
    PathBuf::from(format!("{}.{}", input.display(), format.extension()))
}

fn stripped_extension(input: &Path, format: Format) -> Result<PathBuf> {
    let name = input.to_string_lossy();
    match name.strip_suffix(&format!(".{}", format.extension())) {
        Some(base) if !base.is_empty() => Ok(PathBuf::from(base)),
        _ => bail!(
            "cannot determine an output filename for {}; pass --output",
            input.display()
        ),
    }
}

/// Compress and decompress every regular file under `dir` in memory,
/// checking each round trip and reporting per-file and total figures.
fn bench_folder(dir: &Path, format: Format) -> Result<()> {
    println!(
        "{:<40} {:>12} {:>12} {:>8} {:>10} {:>10}  {}",
        "file", "size", "packed", "ratio", "comp MB/s", "dec MB/s", "check"
    );

    let mut totals = CodecStats::default();
    let mut total_compress_time = 0.0f64;
    let mut total_decompress_time = 0.0f64;
    let mut failures = 0usize;

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let data = match std::fs::read(entry.path()) {
            Ok(data) => data,
            Err(e) => {
                displaylevel!(1, "skipping {}: {e}\n", entry.path().display());
                continue;
            }
        };

        let start = Instant::now();
        let mut compressed = Vec::new();
        let stats = stream::compress(&mut data.as_slice(), &mut compressed, format)?;
        let compress_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let mut decoded = Vec::new();
        stream::decompress(compressed.as_slice(), &mut decoded, format)?;
        let decompress_time = start.elapsed().as_secs_f64();

        let ok = decoded == data;
        if !ok {
            failures += 1;
        }

        let name = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or_else(|_| entry.path())
            .display()
            .to_string();
        println!(
            "{:<40} {:>12} {:>12} {:>7.2}% {:>10.1} {:>10.1}  {}",
            name,
            stats.bytes_read,
            stats.bytes_written,
            stats.ratio() * 100.0,
            throughput(stats.bytes_read, compress_time),
            throughput(stats.bytes_read, decompress_time),
            if ok { "ok" } else { "FAILED" }
        );

        totals.bytes_read += stats.bytes_read;
        totals.bytes_written += stats.bytes_written;
        total_compress_time += compress_time;
        total_decompress_time += decompress_time;
    }

    println!(
        "{:<40} {:>12} {:>12} {:>7.2}% {:>10.1} {:>10.1}",
        "total",
        totals.bytes_read,
        totals.bytes_written,
        totals.ratio() * 100.0,
        throughput(totals.bytes_read, total_compress_time),
        throughput(totals.bytes_read, total_decompress_time)
    );

    if failures > 0 {
        bail!("{failures} file(s) failed to round-trip");
    }
    Ok(())
}

fn throughput(bytes: u64, seconds: f64) -> f64 {
    bytes as f64 / MB as f64 / seconds.max(1e-9)
}
