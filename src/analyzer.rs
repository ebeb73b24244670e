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
Analysis orchestrator
=====================

Entry point of the analyzer: detects the language, obtains a parse tree from
the registry, picks the matching walker and assembles the `AnalysisResult`.
There are no fatal errors inside an analysis: undetectable languages and
parse failures degrade to well formed results with an explanatory assumption.
*/

use std::path::Path;
use std::sync::atomic::AtomicBool;

use log::debug;

use crate::constants::model_assumptions;
use crate::detect::{detect, Language};
use crate::node::TsNode;
use crate::registry::ParserRegistry;
use crate::types::AnalysisResult;
use crate::walker::{brace, indent, textual, WalkOutput};

/// Assumption recorded when no language can be detected
pub const UNDETECTED_NOTE: &str = "Language could not be detected — no analysis performed";

/// Carbon footprint analyzer.
///
/// Owns the parser registry; one value serves any number of sequential
/// analyses. Each call owns all of its intermediate state, so results never
/// observe each other.
#[derive(Default)]
pub struct CarbonAnalyzer {
    registry: ParserRegistry,
}

impl CarbonAnalyzer {
    /// New analyzer with an empty parser registry
    pub fn new() -> Self {
        Default::default()
    }

    /// One-time registry setup, idempotent and non-fatal on failure
    pub fn initialize(&mut self, extension_root: &Path) {
        self.registry.initialize(extension_root);
    }

    /// Estimate the footprint of a source text using a parse tree when one
    /// can be produced, falling back to the textual walker otherwise.
    pub fn estimate(
        &mut self,
        source: &str,
        path: Option<&Path>,
        lang_override: Option<Language>,
    ) -> AnalysisResult {
        self.run(source, path, lang_override, None, false)
    }

    /// `estimate` with a cooperative cancellation flag checked between
    /// function analyses; a raised flag yields a partial result.
    pub fn estimate_with_cancel(
        &mut self,
        source: &str,
        path: Option<&Path>,
        lang_override: Option<Language>,
        cancel: &AtomicBool,
    ) -> AnalysisResult {
        self.run(source, path, lang_override, Some(cancel), false)
    }

    /// Estimate without a parse tree: always the textual fallback walker
    pub fn estimate_sync(
        &mut self,
        source: &str,
        path: Option<&Path>,
        lang_override: Option<Language>,
    ) -> AnalysisResult {
        self.run(source, path, lang_override, None, true)
    }

    /// Release cached parsers
    pub fn dispose(&mut self) {
        self.registry.dispose();
    }

    fn run(
        &mut self,
        source: &str,
        path: Option<&Path>,
        lang_override: Option<Language>,
        cancel: Option<&AtomicBool>,
        force_fallback: bool,
    ) -> AnalysisResult {
        let path_string = path.map(|p| p.display().to_string());
        let lang = match detect(source, path, lang_override) {
            Some(lang) => lang,
            None => {
                let mut result = AnalysisResult::new(None, path_string);
                result.note(UNDETECTED_NOTE);
                return result;
            }
        };

        let mut result = AnalysisResult::new(Some(lang), path_string);
        for note in model_assumptions() {
            result.note(note);
        }

        let output = if force_fallback {
            result.note(format!("Line-based analysis of {} source, no parse tree", lang));
            textual::analyze(source, lang, cancel)
        } else {
            match self.registry.parse(lang, source) {
                Some(tree) => {
                    let root = TsNode::new(tree.root_node(), source);
                    if lang == Language::Python {
                        indent::analyze(&root, cancel)
                    } else {
                        brace::analyze(&root, lang, cancel)
                    }
                }
                None => {
                    debug!("no parse tree for {}, falling back to line analysis", lang);
                    result.note(format!(
                        "Parse tree unavailable for {}, line-based fallback analysis used",
                        lang
                    ));
                    textual::analyze(source, lang, cancel)
                }
            }
        };

        merge_output(&mut result, output);
        result
    }
}

fn merge_output(result: &mut AnalysisResult, output: WalkOutput) {
    result.functions = output.functions;
    result.global_operations = output.global;
    for note in output.assumptions {
        result.note(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undetectable_input_yields_single_assumption() {
        let mut analyzer = CarbonAnalyzer::new();
        let result = analyzer.estimate("just some words", None, None);
        assert!(result.language.is_none());
        assert!(result.functions.is_empty());
        assert_eq!(result.assumptions, vec![UNDETECTED_NOTE.to_string()]);
    }

    #[test]
    fn empty_source_with_known_extension_has_no_undetected_note() {
        let mut analyzer = CarbonAnalyzer::new();
        let result = analyzer.estimate("", Some(Path::new("empty.py")), None);
        assert_eq!(result.language, Some(Language::Python));
        assert!(result.functions.is_empty());
        assert_eq!(result.total_weighted_ops(), 0);
        assert!(result.assumptions.iter().all(|a| a != UNDETECTED_NOTE));
    }

    #[test]
    fn cancellation_yields_partial_result() {
        let mut analyzer = CarbonAnalyzer::new();
        let cancel = AtomicBool::new(true);
        let result = analyzer.estimate_with_cancel(
            "def a():\n    x = 1\n\ndef b():\n    y = 2\n",
            None,
            Some(Language::Python),
            &cancel,
        );
        assert!(result.functions.is_empty());
        assert!(result.assumptions.iter().any(|a| a.contains("cancelled")));
    }
}
