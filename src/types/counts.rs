// Copyright (c) 2024-2025  Ministerio de Fomento
//                          Instituto de Ciencias de la Construcción Eduardo Torroja (IETcc-CSIC)

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Author(s): Rafael Villar Burke <pachi@ietcc.csic.es>

/*!
Operation counters
==================

Mapping from operation kind to a non-negative count, with pointwise merge,
scaling and weighted totals. Counts use 64-bit integers throughout: cascaded
loop multipliers on synthetic inputs overflow 32 bits easily, and all
arithmetic saturates rather than wraps.
*/

use crate::types::opkind::{OperationKind, KIND_COUNT};

/// Counter of operations by kind. Every kind is always present (default 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationCount {
    counts: [u64; KIND_COUNT],
}

impl OperationCount {
    /// Empty counter
    pub fn new() -> Self {
        Default::default()
    }

    /// Add `n` operations of `kind`
    pub fn add(&mut self, kind: OperationKind, n: u64) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(n);
    }

    /// Count recorded for `kind`
    pub fn get(&self, kind: OperationKind) -> u64 {
        self.counts[kind.index()]
    }

    /// Pointwise addition of another counter into this one
    pub fn merge(&mut self, other: &OperationCount) {
        for (slot, v) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot = slot.saturating_add(*v);
        }
    }

    /// New counter with every count multiplied by `factor`.
    ///
    /// Zeros stay zero, so `scale(0)` yields the empty counter.
    pub fn scale(&self, factor: u64) -> OperationCount {
        let mut counts = [0u64; KIND_COUNT];
        for (slot, v) in counts.iter_mut().zip(self.counts.iter()) {
            *slot = v.saturating_mul(factor);
        }
        OperationCount { counts }
    }

    /// Total number of operations, unweighted
    pub fn total_raw(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Total weighted work: sum over kinds of count × weight
    pub fn total_weighted(&self) -> u64 {
        OperationKind::all().fold(0u64, |acc, kind| {
            acc.saturating_add(self.get(kind).saturating_mul(kind.weight()))
        })
    }

    /// Non-zero entries, in kind declaration order
    pub fn summary(&self) -> Vec<(OperationKind, u64)> {
        OperationKind::all()
            .filter_map(|kind| match self.get(kind) {
                0 => None,
                n => Some((kind, n)),
            })
            .collect()
    }

    /// True when no operation has been recorded
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&v| v == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OperationKind::*;

    fn sample() -> OperationCount {
        let mut c = OperationCount::new();
        c.add(Addition, 3);
        c.add(IoOperation, 2);
        c.add(FunctionCall, 1);
        c
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut c = sample();
        c.merge(&OperationCount::new());
        assert_eq!(c, sample());
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let a = sample();
        let mut b = OperationCount::new();
        b.add(Division, 7);
        b.add(Addition, 1);
        let mut c = OperationCount::new();
        c.add(NetworkOperation, 4);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);

        let mut ab_c = ab.clone();
        ab_c.merge(&c);
        let mut bc = b.clone();
        bc.merge(&c);
        let mut a_bc = a.clone();
        a_bc.merge(&bc);
        assert_eq!(ab_c, a_bc);
    }

    #[test]
    fn scale_homogeneity() {
        let c = sample();
        assert_eq!(c.scale(3).scale(4), c.scale(12));
        assert_eq!(c.scale(0), OperationCount::new());
        assert_eq!(c.scale(1), c);
    }

    #[test]
    fn weighted_total() {
        let c = sample();
        // 3×1 + 2×50 + 1×5
        assert_eq!(c.total_weighted(), 108);
        assert_eq!(c.total_raw(), 6);
    }

    #[test]
    fn summary_skips_zeros_in_order() {
        let c = sample();
        let summary = c.summary();
        assert_eq!(
            summary,
            vec![(Addition, 3), (FunctionCall, 1), (IoOperation, 2)]
        );
    }

    #[test]
    fn saturation_instead_of_overflow() {
        let mut c = OperationCount::new();
        c.add(NetworkOperation, u64::max_value());
        c.add(NetworkOperation, 10);
        assert_eq!(c.get(NetworkOperation), u64::max_value());
        assert_eq!(c.scale(2).get(NetworkOperation), u64::max_value());
        assert_eq!(c.total_weighted(), u64::max_value());
    }
}
