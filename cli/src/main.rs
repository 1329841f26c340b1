use anyhow::Context;
use clap::Parser;
use blindrec_core::{CcCrack, Params, RankDef};

mod cmd_args;

use cmd_args::CmdArgs;

/// Main function.
///
/// Progress and diagnostic messages (the files being read, the tagging count, "no
/// candidates found") go to the error channel, matching `work()` in the reference
/// tool; only the final candidate listing is written to stdout. On success with at
/// least one candidate: exit code SUCCESS. Construction or recovery failures, and a
/// run that completes but recovers zero candidates, exit FAILURE.
fn main() -> anyhow::Result<()> {
    let args = CmdArgs::parse();
    let params = params_from_args(&args)?;

    eprintln!("reading symbol file: \"{}\"", args.symbol_file.display());

    let cccrack = CcCrack::new(&args.symbol_file, params)
        .with_context(|| format!("Failed to open \"{}\"", args.symbol_file.display()))?;

    if cccrack.params().tagging.is_none() {
        let count = cccrack.tagging_count().context("Failed to scan capture")?;
        eprintln!("running on all {count} different taggings");
    } else {
        eprintln!("running on the forced tagging");
    }

    let candidates = cccrack.run().context("Recovery run failed")?;

    if candidates.is_empty() {
        anyhow::bail!("no candidates found");
    }

    println!("Found {} likely candidate(s):", candidates.len());
    println!();
    for (i, candidate) in candidates.iter().enumerate() {
        print_candidate(i, candidate);
    }

    Ok(())
}

/// Builds a [`Params`] from the parsed command line arguments, validating `--params`.
fn params_from_args(args: &CmdArgs) -> anyhow::Result<Params> {
    let (k, n, big_k) = match &args.params {
        Some(values) => match values.as_slice() {
            [k, n, big_k] => (Some(*k), Some(*n), Some(*big_k)),
            _ => anyhow::bail!("--params expects exactly three values: k,n,K"),
        },
        None => (None, None, None),
    };

    let params = Params {
        bps: args.bps,
        tagging: args.tagging,
        dumpfile: args.dump.clone(),
        k,
        n,
        big_k,
        no_gray: args.no_gray,
        all: args.all,
    };
    params.validate().context("Invalid parameters")?;
    Ok(params)
}

/// Prints one candidate's recovered tagging, H and G polynomials: decimal and octal for
/// both, and additionally G as a binary matrix with `K` columns per output polynomial.
fn print_candidate(index: usize, candidate: &RankDef) {
    println!("--- candidate {index} ---");
    println!(
        "tagging id: {}  bps: {}  gray: {}",
        candidate.tagging().tagging_id(),
        candidate.tagging().bps(),
        candidate.tagging().is_gray()
    );
    println!(
        "k = {}  n = {}  K = {}  n_a = {}  muT = {}",
        candidate.k(),
        candidate.n(),
        candidate.big_k(),
        candidate.n_a(),
        candidate.mu_t()
    );

    println!("H (parity-check polynomials):");
    for (i, h) in candidate.h_poly().iter().enumerate() {
        print_polynomial_row(i, h);
    }

    println!("G (generator polynomials):");
    for (i, g) in candidate.g_poly().iter().enumerate() {
        print_polynomial_row(i, g);
    }
    print_generator_matrix(candidate);
    println!();
}

fn print_polynomial_row(index: usize, polynomials: &[u64]) {
    print!("  [{index}]");
    for p in polynomials {
        print!("  dec={p} oct={p:o}");
    }
    println!();
}

fn print_generator_matrix(candidate: &RankDef) {
    let big_k = candidate.big_k();
    if big_k == 0 {
        return;
    }
    println!("G as a binary matrix ({big_k} columns per output polynomial):");
    for (i, g) in candidate.g_poly().iter().enumerate() {
        print!("  [{i}]");
        for p in g {
            for tau in (0..big_k).rev() {
                print!("{}", (p >> tau) & 1);
            }
            print!(" ");
        }
        println!();
    }
}
