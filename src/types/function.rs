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

//! Per-function analysis record

use crate::energy;
use crate::types::OperationCount;

/// Estimated footprint of a single function or method.
///
/// Methods carry a `Class.method` qualified name. Line numbers are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionAnalysis {
    /// Qualified name (`name` or `Class.method`)
    pub name: String,
    /// 1-based line of the definition
    pub line: usize,
    /// Operations attributed to one call of the function
    pub operations: OperationCount,
    /// Deepest loop nesting found in the body
    pub max_loop_nesting: u64,
    /// Whether a call with the function's own short name appears in its body
    pub is_recursive: bool,
    /// Short names of the calls found in the body, first occurrence order
    pub called_names: Vec<String>,
}

impl FunctionAnalysis {
    /// New empty record for a definition at `line`
    pub fn new<T: Into<String>>(name: T, line: usize) -> Self {
        FunctionAnalysis {
            name: name.into(),
            line,
            ..Default::default()
        }
    }

    /// Weighted operation total for one call
    pub fn weighted_ops(&self) -> u64 {
        self.operations.total_weighted()
    }

    /// Estimated energy for one call \[J\]
    pub fn energy_joules(&self) -> f64 {
        energy::energy_joules(self.weighted_ops())
    }

    /// Estimated energy for one call \[kWh\]
    pub fn energy_kwh(&self) -> f64 {
        energy::energy_kwh(self.energy_joules())
    }

    /// Estimated emissions for one call \[gCO2\]
    pub fn carbon_grams(&self) -> f64 {
        energy::carbon_grams(self.energy_joules())
    }
}
