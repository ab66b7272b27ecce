//! # gtfkit
//!
//! GTF record toolkit: attribute tables and cross-gene overlaps.
//!
//! ## Usage
//!
//! ```bash
//! gtfkit [-j THREADS] [-L LEVEL] <COMMAND> [OPTIONS]
//!
//! Commands:
//!   overlapping  Find transcripts whose body/TSS/TTS overlaps another gene
//!   tabulate     Convert a GTF to tabulated format
//! ```
//!
//! ## Examples
//!
//! ### TTS (+/- 2 bp) overlapping a transcript of another gene, same strand
//!
//! ```bash
//! gtfkit overlapping -i simple.gtf -c simple.chromInfo -o out.gtf -t tts -u 2 -d 2 -s
//! ```
//!
//! ### Annotate every transcript with its overlapping partners
//!
//! ```bash
//! gtfkit overlapping -i simple.gtf -c simple.chromInfo -o out.gtf -a
//! ```
//!
//! ### Unique transcript/gene pairs as a table
//!
//! ```bash
//! gtfkit tabulate -i simple.gtf -o pairs.tsv -k transcript_id,gene_id -u
//! ```
use clap::Parser;
use colored::Colorize;
use gtfkit::{overlapping, tabulate, Args, Command, OverlapConfig, RunStats, TabulateConfig};

fn main() {
    let args = Args::parse();

    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(args.level)
        .init()
    {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    if let Err(e) = args.check() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("{:?}", args);
    log::info!("Using {} threads", args.threads);

    let stats: RunStats = match &args.command {
        Command::Overlapping(sub) => {
            let config = OverlapConfig::from_args(sub, args.threads)?;
            overlapping::run(&config)?
        }
        Command::Tabulate(sub) => {
            let config = TabulateConfig::from_args(sub, args.threads);
            tabulate::run(&config)?
        }
    };

    log::info!("Elapsed: {:.4?} secs", stats.elapsed.as_secs_f32());
    log::info!("Memory: {:.2} MB", stats.mem_delta_mb);

    Ok(())
}
