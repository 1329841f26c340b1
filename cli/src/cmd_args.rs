//! Everything necessary for command line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Recover the bits-per-symbol mapping and the generator polynomials of a convolutional
/// encoder from a captured stream of modulation symbols, without knowing either in
/// advance.
#[derive(Debug, Parser)]
#[command(version, author, about, long_about = None)]
pub struct CmdArgs {
    /// Path to the captured symbol file. Each byte is one symbol.
    pub symbol_file: PathBuf,
    /// Force this exact bits-per-symbol instead of auto-detecting it from the capture.
    #[arg(short, long)]
    pub bps: Option<u32>,
    /// Evaluate only the tagging at this lexicographic index instead of enumerating all
    /// of them.
    #[arg(short, long)]
    pub tagging: Option<u64>,
    /// Write the demodulated bit stream for the evaluated tagging to this path.
    #[arg(short, long)]
    pub dump: Option<PathBuf>,
    /// Force the encoder parameters `k,n,K` (input streams, codeword length, constraint
    /// length) instead of recovering them.
    #[arg(short, long, value_delimiter = ',', num_args = 3)]
    pub params: Option<Vec<usize>>,
    /// Evaluate every tagging, not just Gray-coded ones.
    #[arg(short = 'g', long)]
    pub no_gray: bool,
    /// Report every evaluated hypothesis, not just the ones classified likely.
    #[arg(short, long)]
    pub all: bool,
}
