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
Syntax walkers
==============

The three walkers share one counting contract: statements are tallied under a
cascading loop multiplier threaded as a parameter, function bodies start at
multiplier 1, and a function whose body calls its own short name has its whole
counter scaled by the default recursion depth after the walk.
*/

pub(crate) mod brace;
pub(crate) mod indent;
pub(crate) mod textual;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::DEFAULT_RECURSION_DEPTH;
use crate::loopest::{EstimateOrigin, LoopEstimate};
use crate::types::{FunctionAnalysis, OperationCount, OperationKind};

/// Cooperative cancellation flag checked between function analyses
pub type CancelFlag = AtomicBool;

/// Whether a cancellation flag is present and raised
pub(crate) fn cancelled(cancel: Option<&CancelFlag>) -> bool {
    cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false)
}

/// Assumption line recorded when a walk stops early
pub(crate) fn cancel_note(analyzed: usize) -> String {
    format!(
        "Analysis cancelled after {} functions; results are partial",
        analyzed
    )
}

/// What a walker hands back to the orchestrator
#[derive(Debug, Default)]
pub(crate) struct WalkOutput {
    pub functions: Vec<FunctionAnalysis>,
    pub global: OperationCount,
    pub assumptions: Vec<String>,
}

impl WalkOutput {
    /// Function records sorted into definition order
    pub fn sort_functions(&mut self) {
        self.functions.sort_by_key(|f| f.line);
    }
}

/// Accumulator for one function body (or for the global scope)
#[derive(Debug, Default)]
pub(crate) struct Acc {
    pub counts: OperationCount,
    pub max_depth: u64,
    pub called: Vec<String>,
}

impl Acc {
    pub fn new() -> Self {
        Default::default()
    }

    /// Record `n` operations of `kind` under the current multiplier
    pub fn add(&mut self, kind: OperationKind, mult: u64, n: u64) {
        self.counts.add(kind, mult.saturating_mul(n));
    }

    /// Record a call to `name`, first occurrence order
    pub fn call(&mut self, name: &str) {
        if !self.called.iter().any(|c| c == name) {
            self.called.push(name.to_string());
        }
    }

    /// Record that the walk entered a loop at nesting `depth`
    pub fn enter_loop(&mut self, depth: u64) {
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }
}

/// Seal a function record: recursion scaling happens here, after the body
/// walk, so the whole counter is multiplied at once.
pub(crate) fn finish_function(
    qualified: String,
    short: &str,
    line: usize,
    acc: Acc,
    assumptions: &mut Vec<String>,
) -> FunctionAnalysis {
    let is_recursive = acc.called.iter().any(|c| c == short);
    let operations = if is_recursive {
        assumptions.push(format!(
            "Function '{}' is recursive, scaling its counts by depth {}",
            qualified, DEFAULT_RECURSION_DEPTH
        ));
        acc.counts.scale(DEFAULT_RECURSION_DEPTH)
    } else {
        acc.counts
    };
    FunctionAnalysis {
        name: qualified,
        line,
        operations,
        max_loop_nesting: acc.max_depth,
        is_recursive,
        called_names: acc.called,
    }
}

/// Assumption line for a loop-bound estimate
pub(crate) fn loop_note(row: usize, keyword: &str, est: &LoopEstimate) -> String {
    match est.origin {
        EstimateOrigin::Resolved => format!(
            "Line {}: {} resolved to {} iterations",
            row + 1,
            keyword,
            est.iterations
        ),
        EstimateOrigin::Default => format!(
            "Line {}: {} bound not statically known, assuming {} iterations",
            row + 1,
            keyword,
            est.iterations
        ),
        EstimateOrigin::RangeLen => format!(
            "Line {}: range(len(...)) size unknown, assuming {} iterations",
            row + 1,
            est.iterations
        ),
        EstimateOrigin::BinarySearch => format!(
            "Line {}: binary-search loop shape, assuming {} iterations",
            row + 1,
            est.iterations
        ),
    }
}

/// Arithmetic kind and repetition for an operator spelling.
///
/// Exponentiation is charged as ten multiplications; unknown binary operators
/// (bitwise and shifts) fall back to a single addition.
pub(crate) fn arith_counts(op: &str) -> (OperationKind, u64) {
    match op {
        "+" => (OperationKind::Addition, 1),
        "-" => (OperationKind::Subtraction, 1),
        "*" | "@" => (OperationKind::Multiplication, 1),
        "**" => (OperationKind::Multiplication, 10),
        "/" | "//" | "%" => (OperationKind::Division, 1),
        _ => (OperationKind::Addition, 1),
    }
}
