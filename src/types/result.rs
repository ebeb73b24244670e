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
Analysis result
===============

Aggregate result of one analysis call: the per-function records in definition
order, the counter for statements outside any function, and the assumptions
log in recording order.
*/

use itertools::Itertools;

use crate::detect::Language;
use crate::energy;
use crate::types::{CarbonBreakdown, FunctionAnalysis, OperationCount};

/// Number of functions reported as hotspots
pub const HOTSPOT_COUNT: usize = 5;

/// Result of analyzing one source file
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Detected language, `None` when detection failed
    pub language: Option<Language>,
    /// Path of the analyzed file, when one was provided
    pub file_path: Option<String>,
    /// Function records, in definition order
    pub functions: Vec<FunctionAnalysis>,
    /// Operations of statements not enclosed in any function or class
    pub global_operations: OperationCount,
    /// Heuristic decisions taken during the walk, in recording order
    pub assumptions: Vec<String>,
}

impl AnalysisResult {
    /// Empty result for a language and optional path
    pub fn new(language: Option<Language>, file_path: Option<String>) -> Self {
        AnalysisResult {
            language,
            file_path,
            ..Default::default()
        }
    }

    /// Record a heuristic decision
    pub fn note<T: Into<String>>(&mut self, assumption: T) {
        self.assumptions.push(assumption.into());
    }

    /// Merge of the global counter and every function counter
    pub fn total_operations(&self) -> OperationCount {
        let mut total = self.global_operations.clone();
        for f in &self.functions {
            total.merge(&f.operations);
        }
        total
    }

    /// Weighted total over the whole file
    pub fn total_weighted_ops(&self) -> u64 {
        self.total_operations().total_weighted()
    }

    /// Estimated energy for one execution of the file \[J\]
    pub fn energy_joules(&self) -> f64 {
        energy::energy_joules(self.total_weighted_ops())
    }

    /// Estimated energy for one execution of the file \[kWh\]
    pub fn energy_kwh(&self) -> f64 {
        energy::energy_kwh(self.energy_joules())
    }

    /// Estimated emissions for one execution of the file \[gCO2\]
    pub fn carbon_grams(&self) -> f64 {
        energy::carbon_grams(self.energy_joules())
    }

    /// Daily three-tier deployment breakdown
    pub fn breakdown(&self) -> CarbonBreakdown {
        energy::breakdown(self.total_weighted_ops())
    }

    /// Top functions by weighted operations, definition order breaking ties
    pub fn hotspots(&self) -> Vec<&FunctionAnalysis> {
        self.functions
            .iter()
            .sorted_by(|a, b| b.weighted_ops().cmp(&a.weighted_ops()))
            .take(HOTSPOT_COUNT)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind::*;

    fn result_with(weights: &[u64]) -> AnalysisResult {
        let mut res = AnalysisResult::new(Some(Language::Python), None);
        for (i, &n) in weights.iter().enumerate() {
            let mut f = FunctionAnalysis::new(format!("f{}", i), i + 1);
            f.operations.add(Addition, n);
            res.functions.push(f);
        }
        res
    }

    #[test]
    fn total_is_global_plus_functions() {
        let mut res = result_with(&[3, 4]);
        res.global_operations.add(IoOperation, 2);
        let total = res.total_operations();
        assert_eq!(total.get(Addition), 7);
        assert_eq!(total.get(IoOperation), 2);
        assert_eq!(res.total_weighted_ops(), 7 + 2 * 50);
    }

    #[test]
    fn hotspots_top_five_stable_on_ties() {
        let res = result_with(&[5, 9, 9, 1, 7, 7, 2]);
        let hot: Vec<&str> = res.hotspots().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(hot, vec!["f1", "f2", "f4", "f5", "f0"]);
    }

    #[test]
    fn hotspots_shorter_than_five() {
        let res = result_with(&[1, 2]);
        assert_eq!(res.hotspots().len(), 2);
    }

    #[test]
    fn assumptions_keep_recording_order() {
        let mut res = AnalysisResult::default();
        res.note("first");
        res.note("second");
        assert_eq!(res.assumptions, vec!["first", "second"]);
    }
}
