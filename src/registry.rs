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
Parser registry
===============

Explicit registry of tree-sitter parsers, one per language, created lazily and
cached for the lifetime of the analyzer that owns it. Grammars are linked
statically; `initialize` only records the extension root and probes the
conventional grammar-bundle layout for diagnostics, so a missing directory is
never an error. `dispose` drops every cached parser and returns the registry
to its uninitialized state.
*/

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tree_sitter::{Parser, Tree};

use crate::detect::Language;
use crate::error::{Result, WattError};

/// Cache of per-language parsers
#[derive(Default)]
pub struct ParserRegistry {
    initialized: bool,
    extension_root: Option<PathBuf>,
    parsers: HashMap<Language, Parser>,
}

impl ParserRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Default::default()
    }

    /// One-time setup, idempotent.
    ///
    /// Records where grammar bundles would live for a WASM-based deployment
    /// and logs which candidate paths exist. With statically linked grammars
    /// this is diagnostic only.
    pub fn initialize(&mut self, extension_root: &Path) {
        if self.initialized {
            return;
        }
        self.extension_root = Some(extension_root.to_path_buf());
        self.initialized = true;
        for lang in &["python", "java", "c", "cpp", "javascript", "typescript"] {
            match probe_grammar_bundle(extension_root, lang) {
                Some(path) => debug!("grammar bundle for {} found at {}", lang, path.display()),
                None => debug!("no grammar bundle for {}, using the linked grammar", lang),
            }
        }
    }

    /// Whether `initialize` has run and `dispose` has not
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Parse a source text, caching the parser for the language.
    ///
    /// `None` means the grammar could not be used or the parser gave up; the
    /// caller is expected to fall back to the textual walker.
    pub fn parse(&mut self, lang: Language, source: &str) -> Option<Tree> {
        match self.try_parse(lang, source) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!("parse failed for {}: {}", lang, e);
                None
            }
        }
    }

    /// Fallible variant of [`parse`](ParserRegistry::parse)
    pub fn try_parse(&mut self, lang: Language, source: &str) -> Result<Tree> {
        if !self.parsers.contains_key(&lang) {
            let mut parser = Parser::new();
            parser.set_language(&grammar(lang))?;
            self.parsers.insert(lang, parser);
        }
        self.parsers
            .get_mut(&lang)
            .and_then(|p| p.parse(source, None))
            .ok_or_else(|| WattError::ParseFailure(lang.to_string()))
    }

    /// Drop all cached parsers and mark the registry uninitialized
    pub fn dispose(&mut self) {
        self.parsers.clear();
        self.extension_root = None;
        self.initialized = false;
    }
}

/// Statically linked grammar for a language
fn grammar(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

/// First existing candidate of the conventional grammar-bundle layout
fn probe_grammar_bundle(root: &Path, name: &str) -> Option<PathBuf> {
    let candidates = [
        root.join("parsers").join(format!("tree-sitter-{}.wasm", name)),
        root.join("parsers").join(format!("{}.wasm", name)),
        root.join("node_modules")
            .join("tree-sitter-wasms")
            .join("out")
            .join(format!("tree-sitter-{}.wasm", name)),
    ];
    candidates.iter().find(|p| p.exists()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_language() {
        let mut reg = ParserRegistry::new();
        let cases = [
            (Language::Python, "def f():\n    pass\n", "module"),
            (Language::C, "int main() { return 0; }", "translation_unit"),
            (Language::Cpp, "int main() { return 0; }", "translation_unit"),
            (Language::Java, "class A { void m() {} }", "program"),
            (Language::JavaScript, "function f() { return 1; }", "program"),
            (Language::TypeScript, "function f(): number { return 1; }", "program"),
        ];
        for (lang, src, root_kind) in &cases {
            let tree = reg.parse(*lang, src).expect("parse");
            assert_eq!(&tree.root_node().kind(), root_kind);
        }
    }

    #[test]
    fn initialize_and_dispose_are_idempotent() {
        let mut reg = ParserRegistry::new();
        assert!(!reg.is_initialized());
        reg.initialize(Path::new("/nonexistent"));
        reg.initialize(Path::new("/other"));
        assert!(reg.is_initialized());
        reg.dispose();
        assert!(!reg.is_initialized());
        // still usable after dispose, parsers rebuild lazily
        assert!(reg.parse(Language::Python, "x = 1\n").is_some());
    }
}
