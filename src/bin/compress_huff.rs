use std::{fs::{self, File}, io::BufReader, process::ExitCode, time::Instant};

use clap::Parser;
use serde::Serialize;
use simple_huff::{compress, preprocess_compress, properties::CodecProperties, CompressOutcome, HeaderFormat, HuffError};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Compress a file with a static Huffman code")]
struct Args {
    /// The file to compress
    source_name: String,
    /// The destination of the compressed file
    dest_name: String,
    /// Header format, `counts` or `tree` (overrides the properties file)
    #[arg(short, long)]
    format: Option<HeaderFormat>,
    /// Write the output even when it is not smaller than the input
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Properties file holding `headerformat` and `force`
    #[arg(short, long)]
    properties: Option<String>,
    /// Print a JSON report on stdout
    #[arg(short, long, default_value_t = false)]
    stats: bool,
}

#[derive(Serialize, Debug)]
struct CompressionReport {
    source: String,
    dest: String,
    header_format: HeaderFormat,
    original_bits: u64,
    compressed_bits: u64,
    savings: i64,
    #[serde(flatten)]
    outcome: CompressOutcome,
    elapsed_ns: u128,
}

fn run(args: &Args) -> Result<CompressionReport, HuffError> {
    let props = match &args.properties {
        Some(path) => CodecProperties::load(File::open(path)?)?,
        None => CodecProperties::default(),
    };
    let header_format = args.format.unwrap_or(props.header_format);
    let force = args.force || props.force;

    let comp_time = Instant::now();

    let session = preprocess_compress(BufReader::new(File::open(&args.source_name)?), header_format)?;

    let mut out = Vec::new();
    let outcome = compress(&session, BufReader::new(File::open(&args.source_name)?), &mut out, force)?;
    if let CompressOutcome::Written { .. } = outcome {
        fs::write(&args.dest_name, out)?;
    }

    Ok(CompressionReport {
        source: args.source_name.clone(),
        dest: args.dest_name.clone(),
        header_format,
        original_bits: session.original_bits(),
        compressed_bits: session.compressed_bits(),
        savings: session.savings(),
        outcome,
        elapsed_ns: comp_time.elapsed().as_nanos(),
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            if let CompressOutcome::Declined { .. } = report.outcome {
                eprintln!(
                    "{} was not written: compressed size {} bits is not smaller than {} bits (use --force)",
                    report.dest, report.compressed_bits, report.original_bits
                );
            }
            if args.stats {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("could not serialize the report: {}", e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("compressing {} failed: {}", args.source_name, e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
