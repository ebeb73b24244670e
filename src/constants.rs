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
Model constants
===============

Process-wide constants of the energy and carbon estimation model.

These values are the calibration surface of the estimator: analyses performed
with the same constants are comparable with each other, and nothing else is
guaranteed (the analyzer does not measure real power draw).
*/

/// Energy attributed to one weighted operation \[J\]
pub const ENERGY_PER_OP_JOULES: f64 = 3e-9;

/// Joules per kilowatt-hour
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Average grid carbon intensity \[gCO2/kWh\]
pub const CARBON_G_PER_KWH: f64 = 475.0;

/// Iteration count assumed for loops whose bound cannot be resolved statically
pub const DEFAULT_LOOP_ITERATIONS: u64 = 100;

/// Scale factor applied to the whole counter of a syntactically recursive function
pub const DEFAULT_RECURSION_DEPTH: u64 = 10;

/// Daily executions assumed on an end-user device
pub const ASSUMED_DAILY_USER_EXECUTIONS: u64 = 1_000;

/// Daily requests assumed on the server side
pub const ASSUMED_DAILY_SERVER_REQUESTS: u64 = 10_000;

/// Datacenter Power Usage Effectiveness overhead
pub const SERVER_PUE: f64 = 1.58;

/// Network transfer energy per served request \[J\]
pub const NETWORK_ENERGY_PER_REQUEST_J: f64 = 0.001;

/// Device-level power overhead (screen, peripherals) over pure compute
pub const DEVICE_POWER_OVERHEAD: f64 = 1.2;

/// Energy multiplier of a development environment run over a production run
pub const DEV_ENVIRONMENT_MULTIPLIER: f64 = 5.0;

/// Human-readable notes about the model constants behind an analysis.
///
/// Seeded into the assumptions log of every analysis with a detected language
/// so reports stay auditable.
pub fn model_assumptions() -> Vec<String> {
    vec![
        format!(
            "Energy model: {:e} J per weighted operation, {} gCO2/kWh grid intensity",
            ENERGY_PER_OP_JOULES, CARBON_G_PER_KWH
        ),
        format!(
            "Defaults: {} iterations for unresolved loops, recursion depth {}",
            DEFAULT_LOOP_ITERATIONS, DEFAULT_RECURSION_DEPTH
        ),
    ]
}
