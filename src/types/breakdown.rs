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

//! Deployment tier footprints

/// Daily energy and emissions attributed to one deployment tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFootprint {
    /// Tier label (`User End`, `Developer End`, `Server Side`, `Total`)
    pub label: String,
    /// Human-readable statement of the factors applied
    pub description: String,
    /// Daily energy \[J\]
    pub energy_joules: f64,
    /// Daily emissions \[gCO2\]
    pub carbon_grams: f64,
}

impl CategoryFootprint {
    /// Constructor
    pub fn new<T: Into<String>, U: Into<String>>(
        label: T,
        description: U,
        energy_joules: f64,
        carbon_grams: f64,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            energy_joules,
            carbon_grams,
        }
    }
}

/// Daily footprint split across the three deployment tiers.
///
/// The `total` tier is the pointwise sum of the other three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonBreakdown {
    /// End-user device tier
    pub user_end: CategoryFootprint,
    /// Developer environment tier
    pub developer_end: CategoryFootprint,
    /// Server-side tier (compute + network, PUE applied)
    pub server_side: CategoryFootprint,
    /// Pointwise sum of the three tiers
    pub total: CategoryFootprint,
}
