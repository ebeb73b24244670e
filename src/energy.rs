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
Energy and carbon accounting
============================

Pure conversions from weighted operation counts to joules, kWh and grams of
CO2, and the derivation of the daily three-tier deployment breakdown. All tier
figures derive from a single base joules value computed once at f64 precision.
*/

use log::warn;

use crate::constants::*;
use crate::types::{CarbonBreakdown, CategoryFootprint};

/// Energy attributed to a weighted operation count \[J\]
pub fn energy_joules(weighted_ops: u64) -> f64 {
    clamp_finite(weighted_ops as f64 * ENERGY_PER_OP_JOULES)
}

/// Joules expressed as kWh
pub fn energy_kwh(joules: f64) -> f64 {
    clamp_finite(joules / JOULES_PER_KWH)
}

/// Emissions for an energy quantity in joules \[gCO2\]
pub fn carbon_grams(joules: f64) -> f64 {
    clamp_finite(energy_kwh(joules) * CARBON_G_PER_KWH)
}

/// Daily three-tier breakdown for a weighted operation total.
pub fn breakdown(weighted_ops: u64) -> CarbonBreakdown {
    let base_j = energy_joules(weighted_ops);

    let user_j = clamp_finite(base_j * DEVICE_POWER_OVERHEAD * ASSUMED_DAILY_USER_EXECUTIONS as f64);
    let dev_j = clamp_finite(base_j * DEV_ENVIRONMENT_MULTIPLIER);
    let server_j = clamp_finite(
        base_j * SERVER_PUE * ASSUMED_DAILY_SERVER_REQUESTS as f64
            + NETWORK_ENERGY_PER_REQUEST_J * ASSUMED_DAILY_SERVER_REQUESTS as f64,
    );
    let total_j = user_j + dev_j + server_j;

    CarbonBreakdown {
        user_end: CategoryFootprint::new(
            "User End",
            format!(
                "{} daily executions × {}x device overhead",
                ASSUMED_DAILY_USER_EXECUTIONS, DEVICE_POWER_OVERHEAD
            ),
            user_j,
            carbon_grams(user_j),
        ),
        developer_end: CategoryFootprint::new(
            "Developer End",
            format!(
                "Development environment at {}x the production run",
                DEV_ENVIRONMENT_MULTIPLIER
            ),
            dev_j,
            carbon_grams(dev_j),
        ),
        server_side: CategoryFootprint::new(
            "Server Side",
            format!(
                "{} daily requests at PUE {} plus network transfer",
                ASSUMED_DAILY_SERVER_REQUESTS, SERVER_PUE
            ),
            server_j,
            carbon_grams(server_j),
        ),
        total: CategoryFootprint::new(
            "Total",
            "Sum of user, developer and server tiers",
            total_j,
            carbon_grams(total_j),
        ),
    }
}

/// Clamp non-finite intermediate values to zero.
fn clamp_finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        warn!("non-finite energy value clamped to 0.0");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_conversions() {
        let j = energy_joules(1_000_000);
        assert!((j - 3e-3).abs() < 1e-12);
        let kwh = energy_kwh(3_600_000.0);
        assert!((kwh - 1.0).abs() < 1e-12);
        assert!((carbon_grams(3_600_000.0) - 475.0).abs() < 1e-9);
    }

    #[test]
    fn zero_ops_zero_energy() {
        assert_eq!(energy_joules(0), 0.0);
        let b = breakdown(0);
        assert_eq!(b.user_end.energy_joules, 0.0);
        assert_eq!(b.developer_end.energy_joules, 0.0);
        // server tier keeps the network term even with zero compute
        assert!((b.server_side.energy_joules - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tier_total_is_sum_of_parts() {
        let b = breakdown(123_456_789);
        let sum = b.user_end.energy_joules
            + b.developer_end.energy_joules
            + b.server_side.energy_joules;
        assert!((b.total.energy_joules - sum).abs() < 1e-9 * sum.max(1.0));
        let csum =
            b.user_end.carbon_grams + b.developer_end.carbon_grams + b.server_side.carbon_grams;
        assert!((b.total.carbon_grams - csum).abs() < 1e-6 * csum.max(1.0));
    }

    #[test]
    fn tier_factors_applied() {
        let b = breakdown(1_000_000_000);
        let base = energy_joules(1_000_000_000);
        assert!((b.user_end.energy_joules - base * 1.2 * 1000.0).abs() < 1e-9);
        assert!((b.developer_end.energy_joules - base * 5.0).abs() < 1e-9);
        assert!((b.server_side.energy_joules - (base * 1.58 * 10_000.0 + 10.0)).abs() < 1e-9);
    }
}
