use std::{fs::{self, File}, io::BufReader, process::ExitCode, time::Instant};

use clap::Parser;
use serde::Serialize;
use simple_huff::{uncompress, HuffError};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Restore a file compressed by compress_huff")]
struct Args {
    /// The Huffman-compressed file
    source_name: String,
    /// The destination of the restored file
    dest_name: String,
    /// Print a JSON report on stdout
    #[arg(short, long, default_value_t = false)]
    stats: bool,
}

#[derive(Serialize, Debug)]
struct DecompressionReport {
    source: String,
    dest: String,
    output_bits: u64,
    elapsed_ns: u128,
}

fn run(args: &Args) -> Result<DecompressionReport, HuffError> {
    let decomp_time = Instant::now();

    // Nothing reaches the destination unless the whole stream decodes
    let mut out = Vec::new();
    let output_bits = uncompress(BufReader::new(File::open(&args.source_name)?), &mut out)?;
    fs::write(&args.dest_name, out)?;

    Ok(DecompressionReport {
        source: args.source_name.clone(),
        dest: args.dest_name.clone(),
        output_bits,
        elapsed_ns: decomp_time.elapsed().as_nanos(),
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
            if args.stats {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("could not serialize the report: {}", e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("decompressing {} failed: {}", args.source_name, e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
