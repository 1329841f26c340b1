//! A dense GF(2) matrix, packed one bit per column into `u64` words, with the column- and
//! row-form reduction kernels the rest of this crate builds on.

use crate::error::Error;

/// A dense matrix over GF(2), stored row-major with each row packed into `u64` words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gf2Matrix {
    rows: usize,
    cols: usize,
    words_per_row: usize,
    data: Vec<u64>,
    rank: usize,
}

impl Gf2Matrix {
    /// Allocates a zeroed `rows x cols` matrix.
    pub fn try_new(rows: usize, cols: usize) -> Result<Self, Error> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidParams(
                "matrix dimensions must be nonzero".into(),
            ));
        }
        let words_per_row = cols.div_ceil(64);
        let mut data = Vec::new();
        data.try_reserve_exact(rows * words_per_row)
            .map_err(|e| Error::Allocation(e.to_string()))?;
        data.resize(rows * words_per_row, 0);
        Ok(Self {
            rows,
            cols,
            words_per_row,
            data,
            rank: 0,
        })
    }

    /// Allocates the `n x n` identity matrix.
    pub fn try_eye(n: usize) -> Result<Self, Error> {
        let mut m = Self::try_new(n, n)?;
        for i in 0..n {
            m.set(i, i, true);
        }
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn word_index(&self, row: usize, col: usize) -> (usize, usize) {
        (row * self.words_per_row + col / 64, col % 64)
    }

    /// Reads the bit at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        debug_assert!(row < self.rows && col < self.cols);
        let (word, bit) = self.word_index(row, col);
        (self.data[word] >> bit) & 1 != 0
    }

    /// Sets the bit at `(row, col)` to `value`.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        debug_assert!(row < self.rows && col < self.cols);
        let (word, bit) = self.word_index(row, col);
        if value {
            self.data[word] |= 1u64 << bit;
        } else {
            self.data[word] &= !(1u64 << bit);
        }
    }

    /// XORs `value` into the bit at `(row, col)`.
    pub fn xor_into(&mut self, row: usize, col: usize, value: bool) {
        if value {
            let (word, bit) = self.word_index(row, col);
            self.data[word] ^= 1u64 << bit;
        }
    }

    fn row_words(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.words_per_row;
        start..start + self.words_per_row
    }

    /// Swaps two rows whole.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (ra, rb) = (self.row_words(a), self.row_words(b));
        for (wa, wb) in ra.zip(rb) {
            self.data.swap(wa, wb);
        }
    }

    /// XORs row `src` into row `dst` (`dst ^= src`).
    pub fn xor_rows(&mut self, dst: usize, src: usize) {
        if dst == src {
            for w in self.row_words(dst) {
                self.data[w] = 0;
            }
            return;
        }
        let src_words: Vec<u64> = self.data[self.row_words(src)].to_vec();
        for (w, sv) in self.row_words(dst).zip(src_words) {
            self.data[w] ^= sv;
        }
    }

    /// Swaps two columns bit by bit.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            let va = self.get(r, a);
            let vb = self.get(r, b);
            self.set(r, a, vb);
            self.set(r, b, va);
        }
    }

    /// XORs column `src` into column `dst` bit by bit.
    pub fn xor_cols(&mut self, dst: usize, src: usize) {
        for r in 0..self.rows {
            let sv = self.get(r, src);
            self.xor_into(r, dst, sv);
        }
    }

    /// True if every bit in the row is zero.
    pub fn row_is_null(&self, row: usize) -> bool {
        self.data[self.row_words(row)].iter().all(|&w| w == 0)
    }

    /// True if every bit in the column is zero.
    pub fn col_is_null(&self, col: usize) -> bool {
        (0..self.rows).all(|r| !self.get(r, col))
    }

    /// Copies a row out as one byte per bit (`0` or `1`), column order.
    pub fn copy_row(&self, row: usize) -> Vec<u8> {
        (0..self.cols).map(|c| self.get(row, c) as u8).collect()
    }

    /// Copies a column out as one byte per bit (`0` or `1`), row order.
    pub fn copy_col(&self, col: usize) -> Vec<u8> {
        (0..self.rows).map(|r| self.get(r, col) as u8).collect()
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Result<Self, Error> {
        let mut out = Self::try_new(self.cols, self.rows)?;
        for r in 0..self.rows {
            for c in 0..self.cols {
                if self.get(r, c) {
                    out.set(c, r, true);
                }
            }
        }
        Ok(out)
    }

    /// Column-form Gauss-Jordan elimination.
    ///
    /// Precondition: `cols <= rows`. For pivot position `i = 0..cols`: if the diagonal
    /// entry `(i, i)` is zero, a row below it with a `1` in column `i` is swapped into
    /// place (row swaps never touch the transform). If no such row exists, column `i` is
    /// already entirely zero (every earlier pivot step clears column `i`'s entries above
    /// row `i`, so failing to find one below it means the whole column is null) and the
    /// pivot search moves on without incrementing rank. Otherwise, every *later* column `j`
    /// with a `1` in row `i` gets column `i` XORed into it, mirrored as `row i` XORed into
    /// `row j` of the transform when tracked — so a null column `i` of the reduced matrix
    /// has, in row `i` of the transform, the exact combination of *original* columns that
    /// sums to zero.
    pub fn gauss_jordan_cols(&mut self, track: bool) -> Result<Option<Gf2Matrix>, Error> {
        if self.cols > self.rows {
            return Err(Error::InternalInvariant(format!(
                "gauss_jordan_cols precondition violated: cols ({}) > rows ({})",
                self.cols, self.rows
            )));
        }
        let mut transform = if track {
            Some(Self::try_eye(self.cols)?)
        } else {
            None
        };
        let mut rank = 0;
        for i in 0..self.cols {
            if !self.get(i, i) {
                match (i + 1..self.rows).find(|&j| self.get(j, i)) {
                    Some(j) => self.swap_rows(i, j),
                    None => continue,
                }
            }
            for j in (i + 1)..self.cols {
                if self.get(i, j) {
                    self.xor_cols(j, i);
                    if let Some(t) = transform.as_mut() {
                        t.xor_rows(j, i);
                    }
                }
            }
            rank += 1;
        }
        self.rank = rank;
        Ok(transform)
    }

    /// Row-form Gauss-Jordan elimination: the symmetric dual of `gauss_jordan_cols` with
    /// the roles of row and column exchanged throughout (column swaps to seat a pivot,
    /// row eliminated via later-row XOR, transform mirrored via column XOR). Precondition:
    /// `rows <= cols`. A null row `i` of the reduced matrix has, in row `i` of the
    /// transform, the combination of original rows that sums to the zero row.
    pub fn gauss_jordan_rows(&mut self, track: bool) -> Result<Option<Gf2Matrix>, Error> {
        if self.rows > self.cols {
            return Err(Error::InternalInvariant(format!(
                "gauss_jordan_rows precondition violated: rows ({}) > cols ({})",
                self.rows, self.cols
            )));
        }
        let mut transform = if track {
            Some(Self::try_eye(self.rows)?)
        } else {
            None
        };
        let mut rank = 0;
        for i in 0..self.rows {
            if !self.get(i, i) {
                match (i + 1..self.cols).find(|&j| self.get(i, j)) {
                    Some(j) => self.swap_cols(i, j),
                    None => continue,
                }
            }
            for j in (i + 1)..self.rows {
                if self.get(j, i) {
                    self.xor_rows(j, i);
                    if let Some(t) = transform.as_mut() {
                        t.xor_cols(j, i);
                    }
                }
            }
            rank += 1;
        }
        self.rank = rank;
        Ok(transform)
    }

    /// Rank established by the last call to either `gauss_jordan_*` method; `0` if neither
    /// has run yet.
    pub fn rank(&self) -> usize {
        self.rank
    }
}
