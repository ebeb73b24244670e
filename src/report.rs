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
Serializable report
===================

Stable structured form of an analysis result. Field names and shapes are the
output schema: non-zero operation summaries keyed by canonical kind names,
per-function records in definition order, hotspots with a percentage of the
total weighted work, and the assumptions log.
*/

use std::collections::BTreeMap;

use crate::types::{AnalysisResult, FunctionAnalysis, OperationCount};

/// Serializable analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedReport {
    /// Language tag (`unknown` when detection failed)
    pub language: String,
    /// Analyzed file path, when one was given
    pub file_path: Option<String>,
    /// Non-zero operation counts over the whole file
    pub total_operations: BTreeMap<String, u64>,
    /// Weighted operation total
    pub total_weighted_operations: u64,
    /// Energy for one execution \[J\]
    pub energy_joules: f64,
    /// Energy for one execution \[kWh\]
    #[serde(rename = "energy_kWh")]
    pub energy_kwh: f64,
    /// Emissions for one execution \[gCO2\]
    #[serde(rename = "carbon_grams_CO2")]
    pub carbon_grams_co2: f64,
    /// Per-function records, definition order
    pub functions: Vec<SerializedFunction>,
    /// Top five functions by weighted operations
    pub hotspot_functions: Vec<SerializedHotspot>,
    /// Heuristic decisions, recording order
    pub assumptions: Vec<String>,
}

/// Serializable per-function record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFunction {
    /// Qualified function name
    pub name: String,
    /// 1-based definition line
    pub line: usize,
    /// Weighted operations of one call
    pub weighted_ops: u64,
    /// Energy of one call \[J\]
    pub energy_joules: f64,
    /// Emissions of one call \[gCO2\]
    #[serde(rename = "carbon_grams_CO2")]
    pub carbon_grams_co2: f64,
    /// Whether the function calls itself syntactically
    pub is_recursive: bool,
    /// Deepest loop nesting in the body
    pub max_loop_nesting: u64,
    /// Non-zero operation counts
    pub operations: BTreeMap<String, u64>,
}

/// Serializable hotspot entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedHotspot {
    /// Qualified function name
    pub name: String,
    /// Weighted operations of one call
    pub weighted_ops: u64,
    /// Share of the file's weighted total, rounded to two decimals
    pub percentage: f64,
}

impl SerializedReport {
    /// Pretty-printed JSON text of the report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Deterministic serializable form of an analysis result
pub fn to_serializable(result: &AnalysisResult) -> SerializedReport {
    let total = result.total_operations();
    let total_weighted = total.total_weighted();

    let hotspot_functions = result
        .hotspots()
        .into_iter()
        .map(|f| SerializedHotspot {
            name: f.name.clone(),
            weighted_ops: f.weighted_ops(),
            percentage: percentage(f.weighted_ops(), total_weighted),
        })
        .collect();

    SerializedReport {
        language: result
            .language
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        file_path: result.file_path.clone(),
        total_operations: summary_map(&total),
        total_weighted_operations: total_weighted,
        energy_joules: result.energy_joules(),
        energy_kwh: result.energy_kwh(),
        carbon_grams_co2: result.carbon_grams(),
        functions: result.functions.iter().map(serialize_function).collect(),
        hotspot_functions,
        assumptions: result.assumptions.clone(),
    }
}

fn serialize_function(f: &FunctionAnalysis) -> SerializedFunction {
    SerializedFunction {
        name: f.name.clone(),
        line: f.line,
        weighted_ops: f.weighted_ops(),
        energy_joules: f.energy_joules(),
        carbon_grams_co2: f.carbon_grams(),
        is_recursive: f.is_recursive,
        max_loop_nesting: f.max_loop_nesting,
        operations: summary_map(&f.operations),
    }
}

fn summary_map(counts: &OperationCount) -> BTreeMap<String, u64> {
    counts
        .summary()
        .into_iter()
        .map(|(kind, n)| (kind.to_string(), n))
        .collect()
}

/// Share of `part` in `total` as a percentage with two decimals
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Language;
    use crate::types::{FunctionAnalysis, OperationKind};

    fn sample_result() -> AnalysisResult {
        let mut res = AnalysisResult::new(Some(Language::Python), Some("x.py".to_string()));
        let mut f = FunctionAnalysis::new("f", 1);
        f.operations.add(OperationKind::IoOperation, 2);
        res.functions.push(f);
        let mut g = FunctionAnalysis::new("g", 5);
        g.operations.add(OperationKind::Addition, 4);
        res.functions.push(g);
        res.note("a note");
        res
    }

    #[test]
    fn report_shape() {
        let report = to_serializable(&sample_result());
        assert_eq!(report.language, "python");
        assert_eq!(report.file_path.as_deref(), Some("x.py"));
        assert_eq!(report.total_weighted_operations, 104);
        assert_eq!(report.total_operations.get("io_operation"), Some(&2));
        assert_eq!(report.total_operations.get("addition"), Some(&4));
        assert_eq!(report.total_operations.get("division"), None);
        assert_eq!(report.functions.len(), 2);
        assert_eq!(report.assumptions, vec!["a note"]);
    }

    #[test]
    fn hotspot_percentages_round_to_two_decimals() {
        let report = to_serializable(&sample_result());
        assert_eq!(report.hotspot_functions.len(), 2);
        assert_eq!(report.hotspot_functions[0].name, "f");
        assert!((report.hotspot_functions[0].percentage - 96.15).abs() < 1e-9);
        assert!((report.hotspot_functions[1].percentage - 3.85).abs() < 1e-9);
    }

    #[test]
    fn zero_total_zero_percentage() {
        let mut res = AnalysisResult::new(Some(Language::C), None);
        res.functions.push(FunctionAnalysis::new("empty", 1));
        let report = to_serializable(&res);
        assert_eq!(report.hotspot_functions[0].percentage, 0.0);
        assert!(report.total_operations.is_empty());
    }

    #[test]
    fn json_field_names_follow_schema() {
        let json = serde_json::to_value(&to_serializable(&sample_result())).unwrap();
        assert!(json.get("energy_kWh").is_some());
        assert!(json.get("carbon_grams_CO2").is_some());
        assert!(json.get("hotspot_functions").is_some());
        assert!(json["functions"][0].get("carbon_grams_CO2").is_some());
    }

    #[test]
    fn json_text_roundtrips() {
        let report = to_serializable(&sample_result());
        let parsed: SerializedReport = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(parsed, report);
    }
}
