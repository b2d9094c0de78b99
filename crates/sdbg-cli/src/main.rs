use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sdbg_lib::builder::parse::read_sequences;
use sdbg_lib::dispatch_kmer_storage;
use sdbg_lib::{
    AsciiEdgeWriter, AsciiLabelWriter, BuildConfiguration, BuildStats, CountingVisitor,
    GraphBuilder, PackedEdgeWriter,
};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

#[derive(Parser)]
#[command(name = "sdbg")]
#[command(version = "0.1.0")]
#[command(about = "Succinct de Bruijn graph edge-sequence builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One row per edge: first-flag, edge string, edge-label flag
    Ascii,
    /// Label column only; repeated labels lowercased
    Labels,
    /// One byte per edge: 3-bit symbol, first-flag, edge-label flag
    Packed,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the edge sequence from a FASTA/FASTQ file
    Build {
        /// Input FASTA/FASTQ file (may be gzipped)
        #[arg(short, long)]
        input: String,

        /// Edge length (2..=63)
        #[arg(short, long)]
        k: u32,

        /// Output file (defaults to <input>.boss)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "ascii")]
        format: OutputFormat,

        /// Also index the reverse complement of every edge
        #[arg(long)]
        rev_comp: bool,

        /// Number of threads (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report table and dummy counts without writing output
    Stats {
        /// Input FASTA/FASTQ file (may be gzipped)
        #[arg(short, long)]
        input: String,

        /// Edge length (2..=63)
        #[arg(short, long)]
        k: u32,

        /// Also index the reverse complement of every edge
        #[arg(long)]
        rev_comp: bool,

        /// Number of threads (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, k, output, format, rev_comp, threads, verbose } => {
            build_command(input, k, output, format, rev_comp, threads, verbose)?;
        }
        Commands::Stats { input, k, rev_comp, threads } => {
            stats_command(input, k, rev_comp, threads)?;
        }
    }

    Ok(())
}

fn build_command(
    input: String,
    k: u32,
    output: Option<String>,
    format: OutputFormat,
    rev_comp: bool,
    threads: usize,
    verbose: bool,
) -> anyhow::Result<()> {
    let sequences = read_sequences(&input)?;
    info!("Read {} sequences from {}", sequences.len(), input);

    let config = BuildConfiguration {
        k,
        num_threads: threads,
        add_reverse_complements: rev_comp,
        verbose,
    };
    let builder = GraphBuilder::new(config)?;

    let out_path = output.unwrap_or_else(|| format!("{input}.boss"));
    let file = File::create(&out_path)
        .with_context(|| format!("Failed to create output file: {out_path}"))?;
    let writer = BufWriter::new(file);

    let stats = dispatch_kmer_storage!(k, S => {
        match format {
            OutputFormat::Ascii => {
                let mut v = AsciiEdgeWriter::<S, _>::new(writer, k);
                let stats = builder.build_from_sequences::<S, _>(&sequences, &mut v)?;
                v.flush()?;
                stats
            }
            OutputFormat::Labels => {
                let mut v = AsciiLabelWriter::<S, _>::new(writer, k);
                let stats = builder.build_from_sequences::<S, _>(&sequences, &mut v)?;
                v.flush()?;
                stats
            }
            OutputFormat::Packed => {
                let mut v = PackedEdgeWriter::<S, _>::new(writer, k);
                let stats = builder.build_from_sequences::<S, _>(&sequences, &mut v)?;
                v.flush()?;
                stats
            }
        }
    });

    print_stats(&stats);
    info!("Wrote {}", out_path);
    Ok(())
}

fn stats_command(input: String, k: u32, rev_comp: bool, threads: usize) -> anyhow::Result<()> {
    let sequences = read_sequences(&input)?;
    info!("Read {} sequences from {}", sequences.len(), input);

    let config = BuildConfiguration {
        k,
        num_threads: threads,
        add_reverse_complements: rev_comp,
        verbose: false,
    };
    let builder = GraphBuilder::new(config)?;

    let stats = dispatch_kmer_storage!(k, S => {
        let mut counts = CountingVisitor::new();
        builder.build_from_sequences::<S, _>(&sequences, &mut counts)?
    });

    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &BuildStats) {
    info!("Edges: {}", stats.num_edges);
    info!("Incoming-dummy seeds: {}", stats.num_dummy_seeds);
    info!("Dummy slots: {}", stats.num_dummy_slots);
    info!(
        "Events: {} ({} standard, {} incoming dummies, {} outgoing dummies)",
        stats.total_events(),
        stats.standard,
        stats.in_dummies,
        stats.out_dummies
    );
    info!("Node groups: {}", stats.groups);
}
