//! Area-weighted column resampling.
//!
//! Source frame `j` of `N` covers `[j/N, (j+1)/N)` and output column `a` of
//! `W` covers `[a/W, (a+1)/W)`. Scaling both by `N*W` puts every interval
//! edge on an integer, so the overlap of a frame and a column is an exact
//! integer count of units and a column's contributions always sum to `N`
//! units. A column value is `floor(sum(units * value) / N)`.

use super::IndexMatrix;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub source: u32,
    pub units: u32,
}

/// Precomputed contributions for one `(source_len, target_len)` pair.
#[derive(Debug, Clone)]
pub struct ResampleMap {
    source_len: usize,
    target_len: usize,
    offsets: Vec<usize>,
    contributions: Vec<Contribution>,
}

impl ResampleMap {
    pub fn new(source_len: usize, target_len: usize) -> Self {
        let (n, w) = (source_len as u64, target_len as u64);
        let mut offsets = Vec::with_capacity(target_len + 1);
        let mut contributions = Vec::with_capacity(source_len + target_len);
        offsets.push(0);

        if n > 0 {
            for a in 0..w {
                let (col_start, col_end) = (a * n, (a + 1) * n);
                let first = col_start / w;
                let last = (col_end - 1) / w;
                for j in first..=last.min(n - 1) {
                    let (src_start, src_end) = (j * w, (j + 1) * w);
                    let overlap = col_end.min(src_end).saturating_sub(col_start.max(src_start));
                    if overlap > 0 {
                        contributions.push(Contribution {
                            source: j as u32,
                            units: overlap as u32,
                        });
                    }
                }
                offsets.push(contributions.len());
            }
        } else {
            offsets.resize(target_len + 1, 0);
        }

        Self {
            source_len,
            target_len,
            offsets,
            contributions,
        }
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    pub fn column(&self, index: usize) -> &[Contribution] {
        &self.contributions[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Weight of each contribution in column `index`, as fractions.
    pub fn weights(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let denom = self.source_len.max(1) as f64;
        self.column(index)
            .iter()
            .map(move |c| (c.source as usize, c.units as f64 / denom))
    }

    pub fn is_identity(&self) -> bool {
        self.source_len == self.target_len
    }

    pub fn apply(&self, matrix: &IndexMatrix) -> IndexMatrix {
        let bins = matrix.bins();
        if matrix.is_empty() || self.source_len != matrix.len() {
            return IndexMatrix::new(bins);
        }
        if self.is_identity() {
            return matrix.clone();
        }

        let denom = self.source_len as u64;
        let mut out = IndexMatrix::with_capacity(bins, self.target_len);
        let mut acc = vec![0u64; bins];
        for a in 0..self.target_len {
            acc.fill(0);
            for c in self.column(a) {
                let units = c.units as u64;
                for (slot, &v) in acc.iter_mut().zip(matrix.frame(c.source as usize)) {
                    *slot += units * v as u64;
                }
            }
            let column = out.push_zeroed();
            for (dst, &sum) in column.iter_mut().zip(&acc) {
                *dst = (sum / denom).min(255) as u8;
            }
        }
        out
    }
}

/// Maps keyed by `(source_len, target_len)`; a new pair supersedes nothing,
/// it simply gets its own entry.
#[derive(Debug, Default)]
pub struct ResampleCache {
    entries: HashMap<(usize, usize), Arc<ResampleMap>>,
}

impl ResampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, source_len: usize, target_len: usize) -> Arc<ResampleMap> {
        Arc::clone(
            self.entries
                .entry((source_len, target_len))
                .or_insert_with(|| Arc::new(ResampleMap::new(source_len, target_len))),
        )
    }

    pub fn resample(&mut self, matrix: &IndexMatrix, target_len: usize) -> IndexMatrix {
        if target_len == 0 {
            return IndexMatrix::new(matrix.bins());
        }
        self.get(matrix.len(), target_len).apply(matrix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
