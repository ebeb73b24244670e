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
Language detection
==================

Canonical language tags and the detector that maps a path extension or a
content sample onto one. Precedence: explicit override, then path extension,
then content heuristics. When nothing matches, detection fails and the
orchestrator produces an empty result.
*/

use std::path::Path;

use regex::Regex;
use strum_macros::{Display, EnumString};

/// Languages the analyzer understands
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Language {
    /// Python (indentation dialect)
    #[strum(serialize = "python")]
    Python,
    /// Java
    #[strum(serialize = "java")]
    Java,
    /// C. Note that `.h` headers map here even when they hold C++ (known limitation)
    #[strum(serialize = "c")]
    C,
    /// C++
    #[strum(serialize = "cpp")]
    Cpp,
    /// JavaScript
    #[strum(serialize = "javascript")]
    JavaScript,
    /// TypeScript (classified with the JavaScript call sets)
    #[strum(serialize = "typescript")]
    TypeScript,
}

impl Language {
    /// Language for a path extension, lowercased
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            "js" | "mjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Guess the language from a content sample.
    ///
    /// Heuristics are checked in a fixed order, the first match wins.
    pub fn from_content(source: &str) -> Option<Language> {
        let def_re = Regex::new(r"(?m)^\s*(async\s+)?def\s+\w+\s*\(").unwrap();
        let colon_eol_re = Regex::new(r"(?m):\s*$").unwrap();
        if def_re.is_match(source) && colon_eol_re.is_match(source) {
            return Some(Language::Python);
        }

        let java_re = Regex::new(r"public\s+(static\s+)?class").unwrap();
        if java_re.is_match(source) {
            return Some(Language::Java);
        }

        if source.contains("#include <") {
            if source.contains("printf") {
                return Some(Language::C);
            }
            if source.contains("cout") || source.contains("std::") {
                return Some(Language::Cpp);
            }
        }

        let ts_decl_re = Regex::new(r"\binterface\s+\w+|\btype\s+\w+\s*=").unwrap();
        let ts_ann_re = Regex::new(r":\s*\w+").unwrap();
        if ts_decl_re.is_match(source) && ts_ann_re.is_match(source) {
            return Some(Language::TypeScript);
        }

        if source.contains("function") || source.contains("=>") || source.contains("console.log") {
            return Some(Language::JavaScript);
        }

        None
    }

    /// True for the brace-scoped family
    pub fn is_brace_family(self) -> bool {
        self != Language::Python
    }

    /// Parse a canonical language tag, with a crate error on failure
    pub fn from_name(name: &str) -> crate::error::Result<Language> {
        name.parse()
            .map_err(|_| crate::error::WattError::LanguageUnknown(name.to_string()))
    }
}

/// Detect the language of a source text.
///
/// Precedence: `override` > path extension > content heuristics. `None` means
/// detection failed and no analysis should run.
pub fn detect(source: &str, path: Option<&Path>, lang_override: Option<Language>) -> Option<Language> {
    if lang_override.is_some() {
        return lang_override;
    }
    if let Some(lang) = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
    {
        return Some(lang);
    }
    Language::from_content(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_table() {
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("h"), Some(Language::C));
        assert_eq!(Language::from_extension("hpp"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn content_heuristics_in_order() {
        assert_eq!(
            Language::from_content("def foo():\n    pass\n"),
            Some(Language::Python)
        );
        assert_eq!(
            Language::from_content("public class Main {}"),
            Some(Language::Java)
        );
        assert_eq!(
            Language::from_content("#include <stdio.h>\nint main() { printf(\"x\"); }"),
            Some(Language::C)
        );
        assert_eq!(
            Language::from_content("#include <iostream>\nint main() { std::cout << 1; }"),
            Some(Language::Cpp)
        );
        assert_eq!(
            Language::from_content("interface Foo { bar: number }"),
            Some(Language::TypeScript)
        );
        assert_eq!(
            Language::from_content("const f = (x) => x + 1;"),
            Some(Language::JavaScript)
        );
        assert_eq!(Language::from_content(""), None);
        assert_eq!(Language::from_content("just some words"), None);
    }

    #[test]
    fn precedence_override_extension_content() {
        let src = "def foo():\n    pass\n";
        let path = Path::new("x.java");
        assert_eq!(
            detect(src, Some(path), Some(Language::C)),
            Some(Language::C)
        );
        assert_eq!(detect(src, Some(path), None), Some(Language::Java));
        assert_eq!(detect(src, None, None), Some(Language::Python));
        assert_eq!(detect("", None, None), None);
    }

    #[test]
    fn language_tags() {
        assert_eq!(Language::Python.to_string(), "python");
        assert_eq!(Language::Cpp.to_string(), "cpp");
        assert_eq!("typescript".parse::<Language>(), Ok(Language::TypeScript));
    }
}
