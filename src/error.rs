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
Error handling
==============

Error handling types and helpers
*/

use std::fmt;

/// Custom Result
pub type Result<T> = std::result::Result<T, WattError>;

/// Errors defined for the watttrace library
///
/// A single analysis never fails: undetectable languages, missing grammars and
/// parse failures all degrade to a well formed `AnalysisResult`. These errors
/// only surface from the parser registry plumbing.
#[derive(Debug)]
pub enum WattError {
    /// Error when a tree-sitter grammar version is incompatible with the runtime
    GrammarVersion(String),
    /// Error when the parser produced no tree for a source text
    ParseFailure(String),
    /// Error when an operation kind name is not one of the twelve known kinds
    OperationKindUnknown(String),
    /// Error when a language tag is not known
    LanguageUnknown(String),
}

impl fmt::Display for WattError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use WattError::*;
        match self {
            GrammarVersion(detail) => write!(f, "Incompatible grammar: {}", detail),
            ParseFailure(detail) => write!(f, "Could not parse source: {}", detail),
            OperationKindUnknown(kind) => write!(f, "Unknown operation kind: \"{}\"", kind),
            LanguageUnknown(tag) => write!(f, "Unknown language tag: \"{}\"", tag),
        }
    }
}

impl std::error::Error for WattError {}

impl From<tree_sitter::LanguageError> for WattError {
    fn from(err: tree_sitter::LanguageError) -> Self {
        WattError::GrammarVersion(err.to_string())
    }
}
