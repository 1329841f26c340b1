//! The per-tagging rank-deficiency record: the dual (parity-check) vectors recovered at
//! the first deficiency, the codeword length recovered at the second, and — once a
//! `(k, K)` hypothesis has been evaluated against it — the recovered generator
//! polynomials.

use crate::symtag::Tagging;

/// State accumulated while probing one tagging for rank deficiencies, and the generator
/// polynomials recovered once a `(k, K)` hypothesis is evaluated against it.
#[derive(Debug, Clone)]
pub struct RankDef {
    tagging: Tagging,
    /// Row width at which the first rank deficiency was observed.
    n_a: usize,
    /// Codeword length, known only after the second deficiency (`0` until then).
    n: usize,
    /// Hypothesized number of input streams for this candidate.
    k: usize,
    /// Hypothesized constraint length (`K` in spec terms).
    big_k: usize,
    /// `muT` computed for this `(k, K)` hypothesis.
    mu_t: usize,
    /// Dual (parity-check) vectors recovered at the first deficiency, one per null column.
    h: Vec<Vec<u8>>,
    /// `h` regrouped into per-output-stream polynomials, one `u64` bitmask per stream.
    h_poly: Vec<Vec<u64>>,
    /// Generator vectors recovered for this hypothesis.
    g: Vec<Vec<u8>>,
    /// `g` regrouped into per-input-stream polynomials.
    g_poly: Vec<Vec<u64>>,
    /// True once the number of recovered generator polynomials equals `k`.
    likely: bool,
}

impl RankDef {
    /// Records the first rank deficiency: `n_a` is the row width at which it occurred and
    /// `h` are the dual vectors read off the null columns of the reduced matrix.
    pub fn from_first_deficiency(tagging: Tagging, n_a: usize, h: Vec<Vec<u8>>) -> Self {
        Self {
            tagging,
            n_a,
            n: 0,
            k: 0,
            big_k: 0,
            mu_t: 0,
            h,
            h_poly: Vec::new(),
            g: Vec::new(),
            g_poly: Vec::new(),
            likely: false,
        }
    }

    /// Records the second deficiency. Per the reference tool's own implementation, this
    /// does *not* rediscover `h` from a freshly reduced matrix at `l`; it keeps the dual
    /// vectors already recovered at the first deficiency and only derives `n` from the
    /// gap between the two deficiencies.
    pub fn set_second_deficiency(&mut self, l: usize) {
        self.n = l - self.n_a;
    }

    /// Records a user-forced codeword length, bypassing the search for a second
    /// deficiency entirely.
    pub fn set_forced_n(&mut self, n: usize) {
        self.n = n;
    }

    pub fn tagging(&self) -> &Tagging {
        &self.tagging
    }

    pub fn n_a(&self) -> usize {
        self.n_a
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn big_k(&self) -> usize {
        self.big_k
    }

    pub fn mu_t(&self) -> usize {
        self.mu_t
    }

    pub fn h(&self) -> &[Vec<u8>] {
        &self.h
    }

    pub fn h_poly(&self) -> &[Vec<u64>] {
        &self.h_poly
    }

    pub fn g(&self) -> &[Vec<u8>] {
        &self.g
    }

    pub fn g_poly(&self) -> &[Vec<u64>] {
        &self.g_poly
    }

    pub fn likely(&self) -> bool {
        self.likely
    }

    /// Attaches the result of evaluating one `(k, K)` hypothesis: the hypothesis
    /// parameters, the regrouped `h_poly`, and whatever generators were recovered.
    pub fn set_hypothesis_result(
        &mut self,
        k: usize,
        big_k: usize,
        mu_t: usize,
        h_poly: Vec<Vec<u64>>,
        g: Vec<Vec<u8>>,
        g_poly: Vec<Vec<u64>>,
    ) {
        self.k = k;
        self.big_k = big_k;
        self.mu_t = mu_t;
        self.h_poly = h_poly;
        self.likely = g_poly.len() == k;
        self.g = g;
        self.g_poly = g_poly;
    }
}
