//! Blind parameter recovery for convolutional encoders.
//!
//! Given a captured stream of modulation symbols and no knowledge of how those symbols
//! were mapped onto bits, this crate recovers the most likely bits-per-symbol mapping
//! (the "tagging"), the encoder's codeword length, and its generator polynomials, purely
//! from the linear-algebraic structure the encoder leaves behind over GF(2). It has no
//! file-format or command-line surface of its own; see the accompanying `cli` crate for
//! that.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

pub mod analyzer;
pub mod error;
pub mod evaluator;
pub mod gf2;
pub mod rankdef;
pub mod symtag;

pub use error::Error;
pub use rankdef::RankDef;
pub use symtag::Tagging;

/// Configuration for one recovery run.
///
/// Everything here is optional except the symbol file itself: every `None`/`false` value
/// means "search", and every `Some`/`true` value narrows or widens that search.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Force this exact bits-per-symbol instead of auto-detecting it from the capture.
    pub bps: Option<u32>,
    /// Evaluate only the tagging at this lexicographic index instead of enumerating all
    /// of them.
    pub tagging: Option<u64>,
    /// If set, write the demodulated bit stream for the evaluated tagging(s) to this path.
    pub dumpfile: Option<PathBuf>,
    /// Force the number of input streams instead of sweeping it.
    pub k: Option<usize>,
    /// Force the codeword length instead of recovering it from the second deficiency.
    pub n: Option<usize>,
    /// Force the constraint length instead of sweeping it.
    pub big_k: Option<usize>,
    /// Evaluate every tagging, not just Gray-coded ones.
    pub no_gray: bool,
    /// Report every evaluated hypothesis, not just the ones classified `likely`.
    pub all: bool,
}

impl Params {
    /// Checks internal consistency. Construction-time only; this never re-validates
    /// against the symbol file itself (that happens in [`SymbolTagger::new`]).
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(bps) = self.bps {
            if bps == 0 || bps > 6 {
                return Err(Error::InvalidParams(format!(
                    "bps must be in 1..=6, got {bps}"
                )));
            }
        }
        if let Some(big_k) = self.big_k {
            if big_k == 0 {
                return Err(Error::InvalidParams("K must be nonzero".to_string()));
            }
        }
        if let (Some(k), Some(n)) = (self.k, self.n) {
            if k == 0 || k >= n {
                return Err(Error::InvalidParams(format!(
                    "k must be in 1..n, got k={k}, n={n}"
                )));
            }
        }
        if self.k.is_some() != self.big_k.is_some() {
            return Err(Error::InvalidParams(
                "k and K must be forced together or not at all".to_string(),
            ));
        }
        Ok(())
    }
}

/// A read-only view over one forced or recovered tagging together with its memory-mapped
/// symbol capture; the entry point for a recovery run.
pub struct CcCrack {
    symbols: Mmap,
    params: Params,
}

impl CcCrack {
    /// Memory-maps `path` and validates `params`.
    pub fn new(path: &Path, params: Params) -> Result<Self, Error> {
        params.validate()?;
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and outlives no borrow of the backing file;
        // the usual caveat is concurrent truncation by another process, which this tool
        // accepts the same way the rest of the ecosystem does for read-only mmap of
        // input files it does not otherwise coordinate access to.
        let symbols = unsafe { Mmap::map(&file)? };
        Ok(Self { symbols, params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of distinct taggings that would be considered for the current `bps` (or the
    /// auto-detected one, once the capture has been scanned).
    pub fn tagging_count(&self) -> Result<u64, Error> {
        let tagger = symtag::SymbolTagger::new(&self.symbols, self.params.bps)?;
        Ok(tagger.tagging_count())
    }

    /// Runs the full recovery search and returns every candidate found, in the order their
    /// taggings were enumerated.
    pub fn run(&self) -> Result<Vec<RankDef>, Error> {
        let tagger = symtag::SymbolTagger::new(&self.symbols, self.params.bps)?;
        let mut candidates = Vec::new();
        let mut dump_written = false;

        tagger.enumerate(self.params.tagging, |tagging| {
            let bits = tagger.demodulate(tagging);

            if !dump_written {
                if let Some(path) = &self.params.dumpfile {
                    write_dumpfile(path, &bits)?;
                    dump_written = true;
                }
            }

            let mut found = analyzer::analyze_tagging(&bits, tagging, &self.params)?;
            candidates.append(&mut found);
            Ok(())
        });

        Ok(candidates)
    }
}

/// Packs one-byte-per-bit `bits` MSB-first into bytes and writes them to `path`.
fn write_dumpfile(path: &Path, bits: &[u8]) -> Result<(), Error> {
    let mut packed = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit != 0 {
            packed[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    let mut file = File::create(path)?;
    file.write_all(&packed)?;
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn params_reject_bps_out_of_range() {
        let params = Params {
            bps: Some(7),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_reject_k_without_big_k() {
        let params = Params {
            k: Some(1),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_reject_k_greater_equal_n() {
        let params = Params {
            k: Some(2),
            n: Some(2),
            big_k: Some(3),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_default_is_valid() {
        assert!(Params::default().validate().is_ok());
    }
}
