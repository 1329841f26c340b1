//! Bit-per-symbol auto-detection, bijective symbol-to-bits tagging enumeration, and
//! demodulation of a captured ASCII-digit symbol stream against a chosen tagging.

use crate::error::Error;

const MAX_BPS: u32 = 6;
const SYM_BASE: u8 = b'0';
const SYM_MAX: u8 = SYM_BASE + 63;

/// One candidate bijection from symbol values to `bps`-bit patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagging {
    /// `dict[symbol] = bit pattern`, length `2^bps`.
    dict: Vec<u8>,
    bps: u32,
    tagging_id: u64,
    is_gray: bool,
}

impl Tagging {
    pub fn bps(&self) -> u32 {
        self.bps
    }

    pub fn dict(&self) -> &[u8] {
        &self.dict
    }

    /// Sequential index of this bijection in strict lexicographic `dict` order.
    pub fn tagging_id(&self) -> u64 {
        self.tagging_id
    }

    /// True if consecutive entries of `dict` always differ by exactly one bit.
    pub fn is_gray(&self) -> bool {
        self.is_gray
    }
}

/// Scans a captured byte stream, auto-detects (or validates a forced) bits-per-symbol,
/// and enumerates every tagging consistent with it.
///
/// Each captured byte is an ASCII digit symbol in `'0'..='0'+63`; its value is `byte - '0'`.
pub struct SymbolTagger<'a> {
    symbols: &'a [u8],
    bps: u32,
}

impl<'a> SymbolTagger<'a> {
    /// Builds a tagger over `symbols`.
    ///
    /// When `forced_bps` is `Some`, every symbol in the capture is validated against it
    /// (`byte` in `['0', '0'+63]` and `byte - '0' < 2^forced_bps`) — unlike the reference
    /// implementation, which skips this validation entirely once `bps` is forced, silently
    /// admitting streams with out-of-range bytes past the prefix. That asymmetry serves no
    /// purpose here (there is no legacy caller depending on it), so this tagger validates
    /// forced and auto-detected `bps` through the same rule.
    ///
    /// When `forced_bps` is `None`, `bps` is inferred by scanning from the start: begin
    /// with `bps = 1, symcnt = 2`; for each byte, stop at the first one outside
    /// `['0', '0'+63]`; otherwise, while `byte - '0' >= symcnt`, double `symcnt` and
    /// increment `bps`. The valid prefix (every byte scanned before the stopping byte)
    /// becomes the effective symbol stream under the *final* `bps` reached. A zero-length
    /// valid prefix is [`Error::InvalidCapture`].
    pub fn new(symbols: &'a [u8], forced_bps: Option<u32>) -> Result<Self, Error> {
        if let Some(bps) = forced_bps {
            if bps == 0 || bps > MAX_BPS {
                return Err(Error::InvalidParams(format!(
                    "bps must be in 1..={MAX_BPS}, got {bps}"
                )));
            }
            let mask = (1u32 << bps) - 1;
            let valid = !symbols.is_empty()
                && symbols
                    .iter()
                    .all(|&s| (SYM_BASE..=SYM_MAX).contains(&s) && ((s - SYM_BASE) as u32) <= mask);
            if !valid {
                return Err(Error::InvalidCapture);
            }
            return Ok(Self { symbols, bps });
        }

        let mut bps: u32 = 1;
        let mut symcnt: u32 = 2;
        let mut prefix_len = 0usize;
        for &byte in symbols {
            if !(SYM_BASE..=SYM_MAX).contains(&byte) {
                break;
            }
            let value = (byte - SYM_BASE) as u32;
            while value >= symcnt {
                symcnt *= 2;
                bps += 1;
            }
            prefix_len += 1;
        }
        if prefix_len == 0 {
            return Err(Error::InvalidCapture);
        }
        Ok(Self {
            symbols: &symbols[..prefix_len],
            bps,
        })
    }

    pub fn bps(&self) -> u32 {
        self.bps
    }

    /// Number of distinct bijections for this `bps`: `(2^bps)!`.
    ///
    /// This is a plain wrapping `u64` multiply, not an arbitrary-precision factorial: for
    /// `bps >= 6` (`64!`) it silently overflows, matching the reference tool's own
    /// `uint64_t` factorial, which exhibits the identical wraparound. Callers that need an
    /// exact count for large `bps` must not rely on this value; this crate only ever
    /// enumerates taggings directly, never multiplies through this count.
    pub fn tagging_count(&self) -> u64 {
        let n = 1u64 << self.bps;
        (1..=n).fold(1u64, |acc, k| acc.wrapping_mul(k))
    }

    /// Enumerates every bijection `dict: [0, 2^bps) -> [0, 2^bps)` in strict lexicographic
    /// order of `dict`, invoking `on_tagging` for each. If `forced_tagging_id` is `Some`,
    /// only that single tagging is built and passed.
    ///
    /// Errors returned by `on_tagging` are local to that tagging: they are discarded and
    /// enumeration continues with the next bijection, matching the per-tagging error
    /// propagation policy used throughout this crate.
    pub fn enumerate<F>(&self, forced_tagging_id: Option<u64>, mut on_tagging: F)
    where
        F: FnMut(&Tagging) -> Result<(), Error>,
    {
        let n = 1usize << self.bps;
        let mut dict = vec![0u8; n];
        let mut used = vec![false; n];
        let mut tagging_id = 0u64;

        if let Some(forced) = forced_tagging_id {
            if let Some(dict) = Self::nth_permutation(n, forced) {
                let tagging = self.build_tagging(dict, forced);
                let _ = on_tagging(&tagging);
            }
            return;
        }

        Self::permute(&mut dict, &mut used, 0, &mut tagging_id, &mut |dict, id| {
            let tagging = self.build_tagging(dict.to_vec(), id);
            let _ = on_tagging(&tagging);
        });
    }

    fn build_tagging(&self, dict: Vec<u8>, tagging_id: u64) -> Tagging {
        let is_gray = dict.windows(2).all(|w| (w[0] ^ w[1]).count_ones() == 1);
        Tagging {
            dict,
            bps: self.bps,
            tagging_id,
            is_gray,
        }
    }

    fn permute(
        dict: &mut [u8],
        used: &mut [bool],
        depth: usize,
        tagging_id: &mut u64,
        emit: &mut impl FnMut(&[u8], u64),
    ) {
        let n = dict.len();
        if depth == n {
            emit(dict, *tagging_id);
            *tagging_id += 1;
            return;
        }
        for value in 0..n {
            if used[value] {
                continue;
            }
            used[value] = true;
            dict[depth] = value as u8;
            Self::permute(dict, used, depth + 1, tagging_id, emit);
            used[value] = false;
        }
    }

    /// Direct construction of the bijection at lexicographic index `id`, for the forced
    /// `--tagging` path — avoids enumerating every preceding permutation just to discard
    /// it.
    fn nth_permutation(n: usize, mut id: u64) -> Option<Vec<u8>> {
        let mut factorial = vec![1u64; n + 1];
        for i in 1..=n {
            factorial[i] = factorial[i - 1].wrapping_mul(i as u64);
        }
        if n >= 1 && id >= factorial[n] && factorial[n] != 0 {
            return None;
        }
        let mut pool: Vec<u8> = (0..n as u8).collect();
        let mut dict = Vec::with_capacity(n);
        for i in (0..n).rev() {
            let f = factorial[i];
            let idx = if f == 0 { 0 } else { (id / f) as usize };
            if idx >= pool.len() {
                return None;
            }
            id %= if f == 0 { 1 } else { f };
            dict.push(pool.remove(idx));
        }
        Some(dict)
    }

    /// Demodulates the captured symbols against `tagging`, producing one byte per bit
    /// (`0`/`1`), most-significant bit of each symbol's pattern first.
    pub fn demodulate(&self, tagging: &Tagging) -> Vec<u8> {
        let mask = (1u32 << self.bps) - 1;
        let mut bits = Vec::with_capacity(self.symbols.len() * self.bps as usize);
        for &byte in self.symbols {
            let sym = ((byte.wrapping_sub(SYM_BASE)) as u32 & mask) as usize;
            let pattern = tagging.dict[sym];
            for b in (0..self.bps).rev() {
                bits.push((pattern >> b) & 1);
            }
        }
        bits
    }
}

/// Minimal `Tagging` construction for tests in other modules that need a placeholder
/// tagging to attach a `RankDef` to, without driving a full enumeration.
#[cfg(test)]
pub(crate) mod tests_support {
    use super::Tagging;

    pub(crate) fn trivial_tagging(bps: u32) -> Tagging {
        let n = 1usize << bps;
        Tagging {
            dict: (0..n as u8).collect(),
            bps,
            tagging_id: 0,
            is_gray: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(values: &[u8]) -> Vec<u8> {
        values.iter().map(|&v| SYM_BASE + v).collect()
    }

    #[test]
    fn bps_one_has_two_taggings() {
        let symbols = digits(&[0, 1, 0, 1]);
        let tagger = SymbolTagger::new(&symbols, None).unwrap();
        assert_eq!(tagger.bps(), 1);
        assert_eq!(tagger.tagging_count(), 2);
    }

    #[test]
    fn bps_two_has_twenty_four_taggings_in_lex_order() {
        let symbols = digits(&[0, 1, 2, 3, 0, 1]);
        let tagger = SymbolTagger::new(&symbols, None).unwrap();
        assert_eq!(tagger.tagging_count(), 24);
        let mut seen = Vec::new();
        tagger.enumerate(None, |t| {
            seen.push(t.dict().to_vec());
            Ok(())
        });
        assert_eq!(seen.len(), 24);
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(seen, sorted);
    }

    #[test]
    fn bps_auto_detect_grows_across_the_scan() {
        // First two bytes fit bps=1, the third (value 2) forces growth to bps=2 -- and
        // the *whole* prefix (all four bytes) is then read back under the final bps.
        let symbols = digits(&[0, 1, 2, 0]);
        let tagger = SymbolTagger::new(&symbols, None).unwrap();
        assert_eq!(tagger.bps(), 2);
    }

    #[test]
    fn forced_tagging_id_yields_single_candidate() {
        let symbols = digits(&[0, 1, 2, 3]);
        let tagger = SymbolTagger::new(&symbols, None).unwrap();
        let mut count = 0;
        tagger.enumerate(Some(5), |_| {
            count += 1;
            Ok(())
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn gray_dict_is_detected() {
        let symbols = digits(&[0, 1, 2, 3]);
        let tagger = SymbolTagger::new(&symbols, None).unwrap();
        let mut any_gray = false;
        tagger.enumerate(None, |t| {
            if t.dict() == [0, 1, 3, 2] {
                any_gray = t.is_gray();
            }
            Ok(())
        });
        assert!(any_gray);
    }

    #[test]
    fn forced_bps_rejects_out_of_range_symbol() {
        let symbols = digits(&[0, 1, 4]);
        assert!(matches!(
            SymbolTagger::new(&symbols, Some(1)),
            Err(Error::InvalidCapture)
        ));
    }

    #[test]
    fn forced_bps_rejects_non_ascii_digit_byte() {
        let symbols = [b'0', 0xFF, b'1'];
        assert!(matches!(
            SymbolTagger::new(&symbols, Some(2)),
            Err(Error::InvalidCapture)
        ));
    }

    #[test]
    fn empty_input_is_invalid_capture() {
        assert!(matches!(
            SymbolTagger::new(&[], None),
            Err(Error::InvalidCapture)
        ));
    }

    #[test]
    fn bps_seven_is_rejected() {
        let symbols = digits(&[0, 1]);
        assert!(matches!(
            SymbolTagger::new(&symbols, Some(7)),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn demodulate_is_msb_first() {
        let symbols = digits(&[2]);
        let tagger = SymbolTagger::new(&symbols, Some(2)).unwrap();
        let mut bits = Vec::new();
        tagger.enumerate(None, |t| {
            if t.dict() == [0, 1, 2, 3] {
                bits = tagger.demodulate(t);
            }
            Ok(())
        });
        assert_eq!(bits, vec![1, 0]);
    }
}
