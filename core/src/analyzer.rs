//! Drives the two-deficiency search for one tagging: widen the observation window until
//! the window matrix first loses rank (recovering the dual vectors), keep widening until
//! it loses rank a second time (recovering the codeword length), then test `(k, K)`
//! hypotheses against what was found.

use crate::error::Error;
use crate::evaluator::{enumerate_configs, evaluate_hypothesis, Hypothesis};
use crate::gf2::Gf2Matrix;
use crate::rankdef::RankDef;
use crate::symtag::Tagging;
use crate::Params;

/// The hard-coded height-cap multiplier of `Hmax = 5*W`.
const HMAX_FACTOR: usize = 5;

/// Builds the `height x l` matrix of disjoint `l`-bit rows read off `bits` (row-major, the
/// first `l` bits form row 0, the next `l` bits row 1, and so on) and reduces it in column
/// form, returning the reduced matrix and the transform needed to read off null-space
/// (dual) vectors.
fn window_matrix(bits: &[u8], l: usize, height: usize) -> Result<(Gf2Matrix, Gf2Matrix), Error> {
    let mut m = Gf2Matrix::try_new(height, l)?;
    for r in 0..height {
        for c in 0..l {
            if bits[r * l + c] != 0 {
                m.set(r, c, true);
            }
        }
    }
    let transform = m
        .gauss_jordan_cols(true)?
        .ok_or_else(|| Error::InternalInvariant("gauss_jordan_cols(true) returned None".into()))?;
    Ok((m, transform))
}

/// Reads the dual (null-space) vectors of a column-form-reduced window matrix: one vector
/// of length `l` per null column, taken as that column's row of the transform.
fn extract_duals(reduced: &Gf2Matrix, transform: &Gf2Matrix) -> Vec<Vec<u8>> {
    (0..reduced.cols())
        .filter(|&c| reduced.col_is_null(c))
        .map(|c| transform.copy_row(c))
        .collect()
}

/// Analyzes one tagging, returning every `likely` (or, with `params.all`, every evaluated)
/// candidate recovered from it.
///
/// Non-Gray taggings are skipped unless `params.no_gray` is set. A window width `W =
/// min(floor(sqrt(len)), 100)` and a height cap `Hmax = 5*W` bound the search: widths
/// `l = 2..W` are tried, each reshaping `bits` into disjoint `height x l` rows (`height =
/// min(len/l, Hmax)`) and column-reducing it. The first rank deficiency fixes `n_a = l` and
/// the dual vectors (from that matrix's null columns, never recomputed later); a second
/// deficiency at width `l2` fixes `n = l2 - n_a` without rebuilding the dual vectors — both
/// choices preserved exactly as the reference tool's own two-deficiency protocol works, not
/// "fixed".
pub fn analyze_tagging(
    bits: &[u8],
    tagging: &Tagging,
    params: &Params,
) -> Result<Vec<RankDef>, Error> {
    if let Some(forced) = params.tagging {
        if forced != tagging.tagging_id() {
            return Ok(Vec::new());
        }
    }
    if !tagging.is_gray() && !params.no_gray {
        return Ok(Vec::new());
    }

    let len = bits.len();
    let w = ((len as f64).sqrt().floor() as usize).min(100);
    if w < 3 {
        return Ok(Vec::new());
    }
    let h_max = HMAX_FACTOR * w;

    let mut rankdef: Option<RankDef> = None;

    for l in 2..w {
        let height = (len / l).min(h_max);
        if height == 0 || height < l {
            continue;
        }
        let (reduced, transform) = window_matrix(bits, l, height)?;
        if reduced.rank() == l {
            continue;
        }

        match rankdef.as_mut() {
            None => {
                let h = extract_duals(&reduced, &transform);
                let mut rd = RankDef::from_first_deficiency(tagging.clone(), l, h);
                if let Some(forced_n) = params.n {
                    rd.set_forced_n(forced_n);
                    rankdef = Some(rd);
                    break;
                }
                rankdef = Some(rd);
            }
            Some(rd) => {
                rd.set_second_deficiency(l);
                break;
            }
        }
    }

    let Some(rankdef) = rankdef else {
        return Ok(Vec::new());
    };
    let n = rankdef.n();
    if n == 0 {
        return Ok(Vec::new());
    }

    // A forced K == 1 hypothesis is silently skipped, the same way the unforced sweep
    // skips every K <= 1 candidate it would otherwise generate (see `enumerate_configs`).
    let hypotheses: Vec<Hypothesis> = match (params.k, params.big_k) {
        (Some(k), Some(big_k)) if big_k > 1 => {
            let mu_t = k * (big_k - 1);
            vec![Hypothesis { k, big_k, mu_t }]
        }
        (Some(_), Some(_)) => Vec::new(),
        _ => enumerate_configs(rankdef.n_a(), n),
    };

    let mut candidates = Vec::new();
    for hyp in hypotheses {
        let mut candidate = rankdef.clone();
        evaluate_hypothesis(&mut candidate, n, hyp)?;
        if candidate.likely() || params.all {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtag::tests_support::trivial_tagging;

    #[test]
    fn short_capture_below_window_floor_yields_no_candidates() {
        // len=8 -> W=floor(sqrt(8))=2 < 3, search window is empty.
        let bits = vec![0u8, 1, 0, 1, 1, 0, 1, 0];
        let tagging = trivial_tagging(1);
        let params = Params::default();
        let candidates = analyze_tagging(&bits, &tagging, &params).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn all_zero_stream_has_no_deficiency_at_any_width() {
        // An all-zero stream is rank-deficient at every width >= 1 (every column is the
        // zero column), so a deficiency is always found immediately at l=2 -- this just
        // checks the search terminates cleanly and produces internally consistent output
        // rather than panicking on the degenerate all-null matrix.
        let bits = vec![0u8; 400];
        let tagging = trivial_tagging(1);
        let params = Params::default();
        let candidates = analyze_tagging(&bits, &tagging, &params).unwrap();
        for c in &candidates {
            assert_eq!(c.g_poly().len(), c.g().len());
        }
    }

    #[test]
    fn forced_tagging_mismatch_short_circuits() {
        let bits = vec![0u8; 400];
        let tagging = trivial_tagging(1);
        let params = Params {
            tagging: Some(tagging.tagging_id() + 1),
            ..Default::default()
        };
        let candidates = analyze_tagging(&bits, &tagging, &params).unwrap();
        assert!(candidates.is_empty());
    }
}
