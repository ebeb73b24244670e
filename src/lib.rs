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
WattTrace
=========

Static estimation of the computational work, energy use and CO2 emissions of
source code, per function and across deployment tiers.

The analyzer reads one source file, recognizes function and class definitions,
walks their syntax (tree-sitter grammars, with a line-based fallback when no
tree is available) and accumulates weighted operation counts under a cascading
loop multiplier. Counts convert to joules, kWh and grams of CO2 with fixed
model constants, so results are comparable across analyses but are estimates
only: nothing is executed and no real power is measured.

*/

#![deny(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

#[macro_use]
extern crate serde_derive;

mod analyzer;
mod classify;
pub mod constants;
mod consttable;
mod detect;
mod energy;
pub mod error;
mod loopest;
mod node;
mod registry;
mod report;
pub mod types;
mod walker;

pub use analyzer::{CarbonAnalyzer, UNDETECTED_NOTE};
pub use classify::{classify, CallClass};
pub use consttable::{ConstSnapshot, ConstTable};
pub use detect::{detect, Language};
pub use energy::{breakdown, carbon_grams, energy_joules, energy_kwh};
pub use loopest::{
    brace_for_iterations, default_estimate, python_for_iterations, while_iterations,
    EstimateOrigin, LoopEstimate, BINARY_SEARCH_ITERATIONS,
};
pub use node::{SyntaxNode, TsNode};
pub use registry::ParserRegistry;
pub use report::{to_serializable, SerializedFunction, SerializedHotspot, SerializedReport};

/// Version number
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
