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
Loop-bound estimation
=====================

Static estimation of loop iteration counts from header text and the constant
table. Works on the raw text of the relevant header parts, so the same rules
serve the tree walkers and the textual fallback. Whenever a bound cannot be
resolved, the canonical default of 100 iterations applies.
*/

use regex::Regex;

use crate::constants::DEFAULT_LOOP_ITERATIONS;
use crate::consttable::ConstTable;

/// Iterations estimated for binary-search shaped loops (≈ log2 10^6)
pub const BINARY_SEARCH_ITERATIONS: u64 = 20;

/// How an iteration count was obtained
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EstimateOrigin {
    /// Statically resolved from literals or known constants
    Resolved,
    /// Canonical default, nothing could be resolved
    Default,
    /// `range(len(...))`, collection size unknown
    RangeLen,
    /// `low <= high` binary-search idiom
    BinarySearch,
}

/// Estimated iteration count of one loop
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoopEstimate {
    /// Estimated iterations, non-negative
    pub iterations: u64,
    /// Provenance of the estimate
    pub origin: EstimateOrigin,
}

impl LoopEstimate {
    fn resolved(n: i64) -> Self {
        LoopEstimate {
            iterations: n.max(0) as u64,
            origin: EstimateOrigin::Resolved,
        }
    }
}

/// The canonical default estimate
pub fn default_estimate() -> LoopEstimate {
    LoopEstimate {
        iterations: DEFAULT_LOOP_ITERATIONS,
        origin: EstimateOrigin::Default,
    }
}

/// Estimate iterations of an indentation-dialect `for x in ITER` loop from
/// the iterable text.
pub fn python_for_iterations(iterable: &str, table: &ConstTable) -> LoopEstimate {
    let it = iterable.trim().trim_end_matches(':').trim();

    if let Some(args) = call_args(it, "range") {
        return range_iterations(&args, table);
    }
    if let Some(args) = call_args(it, "enumerate") {
        if let Some(first) = args.first() {
            if first.trim().starts_with("range") {
                return python_for_iterations(first, table);
            }
        }
        return default_estimate();
    }
    if call_args(it, "zip").is_some() {
        return default_estimate();
    }

    if let Some(inner) = delimited(it, '[', ']').or_else(|| delimited(it, '(', ')')) {
        return LoopEstimate::resolved(count_elements(&inner) as i64);
    }
    if let Some(inner) = delimited(it, '{', '}') {
        // dict and set literals have the same top-level element count
        return LoopEstimate::resolved(count_elements(&inner) as i64);
    }
    if let Some(inner) = string_literal(it) {
        return LoopEstimate::resolved(inner.chars().count() as i64);
    }
    if is_identifier(it) {
        if let Some(v) = table.get(it) {
            return LoopEstimate::resolved(v);
        }
        return default_estimate();
    }

    default_estimate()
}

fn range_iterations(args: &[String], table: &ConstTable) -> LoopEstimate {
    match args.len() {
        1 => {
            let arg = args[0].trim();
            if arg.starts_with("len") && call_args(arg, "len").is_some() {
                return LoopEstimate {
                    iterations: DEFAULT_LOOP_ITERATIONS,
                    origin: EstimateOrigin::RangeLen,
                };
            }
            match table.resolve(arg) {
                Some(n) => LoopEstimate::resolved(n),
                None => default_estimate(),
            }
        }
        2 => match (table.resolve(&args[0]), table.resolve(&args[1])) {
            (Some(a), Some(b)) => LoopEstimate::resolved(b.saturating_sub(a)),
            _ => default_estimate(),
        },
        3 => match (
            table.resolve(&args[0]),
            table.resolve(&args[1]),
            table.resolve(&args[2]),
        ) {
            (Some(a), Some(b), Some(s)) if s != 0 => {
                let n = ((b - a) as f64 / s as f64).ceil();
                LoopEstimate::resolved(if n.is_finite() { n as i64 } else { 0 })
            }
            _ => default_estimate(),
        },
        _ => default_estimate(),
    }
}

/// Estimate iterations of a `while COND` loop from the condition and body
/// text (shared by the indentation and brace dialects).
pub fn while_iterations(cond: &str, body: &str, table: &ConstTable) -> LoopEstimate {
    let c = strip_parens(cond.trim().trim_end_matches(';'));
    let cmp_re = Regex::new(r"^([A-Za-z_]\w*)\s*(<=|<|>=|>)\s*(.+)$").unwrap();
    let caps = match cmp_re.captures(&c) {
        Some(caps) => caps,
        None => return default_estimate(),
    };
    let var = caps.get(1).unwrap().as_str();
    let op = caps.get(2).unwrap().as_str();
    let rhs = caps.get(3).unwrap().as_str().trim();

    match op {
        "<" | "<=" => {
            if op == "<=" && is_identifier(rhs) && table.resolve(rhs).is_none() {
                return LoopEstimate {
                    iterations: BINARY_SEARCH_ITERATIONS,
                    origin: EstimateOrigin::BinarySearch,
                };
            }
            let n = match table.resolve(rhs) {
                Some(n) => n,
                None => return default_estimate(),
            };
            if let Some(step) = increment_step(var, body, table) {
                if step > 0 {
                    return LoopEstimate::resolved((n / step).max(1));
                }
            }
            // with no step found, only the strict `x < N` shape resolves directly
            if op == "<" {
                LoopEstimate::resolved(n)
            } else {
                default_estimate()
            }
        }
        ">" | ">=" => match (table.get(var), table.resolve(rhs)) {
            (Some(start), Some(low)) => LoopEstimate::resolved((start - low).max(1)),
            _ => default_estimate(),
        },
        _ => default_estimate(),
    }
}

/// Positive step of `var += S` (or `var++`) found in a loop body
fn increment_step(var: &str, body: &str, table: &ConstTable) -> Option<i64> {
    let escaped = regex::escape(var);
    let aug_re = Regex::new(&format!(r"{}\s*\+=\s*([^;\n]+)", escaped)).unwrap();
    if let Some(caps) = aug_re.captures(body) {
        return table.resolve(caps.get(1).unwrap().as_str().trim());
    }
    let inc_re = Regex::new(&format!(r"{}\s*\+\+|\+\+\s*{}", escaped, escaped)).unwrap();
    if inc_re.is_match(body) {
        return Some(1);
    }
    None
}

/// Estimate iterations of a brace-dialect `for (init; cond; update)` header.
pub fn brace_for_iterations(
    init: &str,
    cond: &str,
    update: &str,
    table: &ConstTable,
) -> LoopEstimate {
    // grammars that wrap the condition in an expression statement keep the `;`
    let c = strip_parens(cond.trim().trim_end_matches(';'));
    let cmp_re = Regex::new(r"^([A-Za-z_]\w*)\s*(<=|<|>=|>|!=)\s*(.+)$").unwrap();
    let caps = match cmp_re.captures(&c) {
        Some(caps) => caps,
        None => return default_estimate(),
    };
    let var = caps.get(1).unwrap().as_str();
    let op = caps.get(2).unwrap().as_str();
    let end = match table.resolve(caps.get(3).unwrap().as_str().trim()) {
        Some(v) => v,
        None => return default_estimate(),
    };

    let start = match init_start_value(init, table).or_else(|| table.get(var)) {
        Some(v) => v,
        None => return default_estimate(),
    };
    let step = match update_step(update, table) {
        Some(s) if s != 0 => s,
        _ => return default_estimate(),
    };

    let diff = match op {
        "<" => end - start,
        "<=" => end - start + 1,
        ">" => start - end,
        ">=" => start - end + 1,
        _ => return default_estimate(),
    };
    let ok_direction = match op {
        "<" | "<=" => step > 0,
        _ => step < 0,
    };
    if !ok_direction {
        return default_estimate();
    }
    let magnitude = step.abs();
    let iters = if diff <= 0 {
        0
    } else {
        (diff + magnitude - 1) / magnitude
    };
    LoopEstimate::resolved(iters)
}

/// Start value from a `for` initializer (`int i = 0`, `i = 0`, first declarator)
fn init_start_value(init: &str, table: &ConstTable) -> Option<i64> {
    let assign_re = Regex::new(r"([A-Za-z_]\w*)\s*=\s*([^,;]+)").unwrap();
    let caps = assign_re.captures(init)?;
    table.resolve(caps.get(2).unwrap().as_str().trim())
}

/// Signed step from a `for` update clause (`i++`, `i--`, `i += S`, `i -= S`)
fn update_step(update: &str, table: &ConstTable) -> Option<i64> {
    let u = update.trim();
    let aug_re = Regex::new(r"[A-Za-z_]\w*\s*(\+=|-=)\s*(.+)").unwrap();
    if let Some(caps) = aug_re.captures(u) {
        let step = table.resolve(caps.get(2).unwrap().as_str().trim())?;
        return match caps.get(1).unwrap().as_str() {
            "+=" => Some(step),
            _ => Some(-step),
        };
    }
    if u.contains("++") {
        return Some(1);
    }
    if u.contains("--") {
        return Some(-1);
    }
    None
}

// --------------------------- text helpers --------------------------

/// Arguments of a call `name(...)` spanning the whole text
fn call_args(text: &str, name: &str) -> Option<Vec<String>> {
    let rest = text.strip_prefix(name)?.trim_start();
    let inner = delimited(rest, '(', ')')?;
    if inner.trim().is_empty() {
        return Some(vec![]);
    }
    Some(split_top_level(&inner))
}

/// Inner text when `text` is exactly `<open>...<close>` with balanced nesting
fn delimited(text: &str, open: char, close: char) -> Option<String> {
    let t = text.trim();
    if !t.starts_with(open) || !t.ends_with(close) || t.len() < 2 {
        return None;
    }
    let mut depth = 0i32;
    let mut in_str: Option<char> = None;
    for (i, c) in t.char_indices() {
        match in_str {
            Some(q) => {
                if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => in_str = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth -= 1;
                    if depth == 0 && i + c.len_utf8() != t.len() {
                        return None;
                    }
                }
                _ => {}
            },
        }
    }
    Some(t[open.len_utf8()..t.len() - close.len_utf8()].to_string())
}

/// Split on commas at nesting depth zero, quotes respected
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_str: Option<char> = None;
    let mut current = String::new();
    for c in text.chars() {
        match in_str {
            Some(q) => {
                current.push(c);
                if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    current.push(c);
                    in_str = Some(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current = String::new();
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Non-empty elements at the top level of a collection literal body
fn count_elements(inner: &str) -> usize {
    split_top_level(inner).iter().filter(|s| !s.is_empty()).count()
}

/// Content of a plain string literal, quotes excluded
fn string_literal(text: &str) -> Option<String> {
    let t = text.trim();
    for q in &['"', '\''] {
        if t.len() >= 2 && t.starts_with(*q) && t.ends_with(*q) {
            let inner = &t[1..t.len() - 1];
            if !inner.contains(*q) {
                return Some(inner.to_string());
            }
        }
    }
    None
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip balanced outer parentheses and whitespace
fn strip_parens(text: &str) -> String {
    let mut t = text.trim().to_string();
    while let Some(inner) = delimited(&t, '(', ')') {
        t = inner.trim().to_string();
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConstTable {
        let mut t = ConstTable::new();
        t.set("N", 50);
        t.set("start", 40);
        t
    }

    #[test]
    fn range_forms() {
        let t = table();
        assert_eq!(python_for_iterations("range(10)", &t).iterations, 10);
        assert_eq!(python_for_iterations("range(N)", &t).iterations, 50);
        assert_eq!(python_for_iterations("range(2, 12)", &t).iterations, 10);
        assert_eq!(python_for_iterations("range(0, 10, 3)", &t).iterations, 4);
        assert_eq!(python_for_iterations("range(10, 0, -2)", &t).iterations, 5);
        assert_eq!(python_for_iterations("range(-3)", &t).iterations, 0);
        let rl = python_for_iterations("range(len(xs))", &t);
        assert_eq!(rl.iterations, 100);
        assert_eq!(rl.origin, EstimateOrigin::RangeLen);
        assert_eq!(
            python_for_iterations("range(unknown)", &t).origin,
            EstimateOrigin::Default
        );
    }

    #[test]
    fn enumerate_zip_and_literals() {
        let t = table();
        assert_eq!(
            python_for_iterations("enumerate(range(7))", &t).iterations,
            7
        );
        assert_eq!(
            python_for_iterations("enumerate(items)", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(
            python_for_iterations("zip(a, b)", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(python_for_iterations("[1, 2, 3]", &t).iterations, 3);
        assert_eq!(python_for_iterations("(1, 2)", &t).iterations, 2);
        assert_eq!(python_for_iterations("[]", &t).iterations, 0);
        assert_eq!(
            python_for_iterations("{'a': 1, 'b': 2}", &t).iterations,
            2
        );
        assert_eq!(python_for_iterations("\"hello\"", &t).iterations, 5);
        assert_eq!(python_for_iterations("N", &t).iterations, 50);
        assert_eq!(
            python_for_iterations("items", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(
            python_for_iterations("[x for x in y]", &t).iterations,
            1
        );
    }

    #[test]
    fn while_shapes() {
        let t = table();
        assert_eq!(while_iterations("i < N", "i += 2", &t).iterations, 25);
        assert_eq!(while_iterations("i < N", "x = 1", &t).iterations, 50);
        assert_eq!(while_iterations("(i < 10)", "i += 1", &t).iterations, 10);
        assert_eq!(while_iterations("i <= N", "i += 2", &t).iterations, 25);
        // a resolvable `<=` bound with no step in the body stays at the default
        assert_eq!(
            while_iterations("i <= 10", "x = 1", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(while_iterations("i <= N", "x = 1", &t).iterations, 100);
        assert_eq!(while_iterations("start > 5", "", &t).iterations, 35);
        let bs = while_iterations("low <= high", "mid = low + high", &t);
        assert_eq!(bs.iterations, BINARY_SEARCH_ITERATIONS);
        assert_eq!(bs.origin, EstimateOrigin::BinarySearch);
        assert_eq!(
            while_iterations("flag", "x = 1", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(
            while_iterations("i < limit", "i += 1", &t).origin,
            EstimateOrigin::Default
        );
    }

    #[test]
    fn brace_for_headers() {
        let t = table();
        assert_eq!(
            brace_for_iterations("int i = 0", "i < 3", "i++", &t).iterations,
            3
        );
        assert_eq!(
            brace_for_iterations("int i = 0", "i <= 3", "i++", &t).iterations,
            4
        );
        assert_eq!(
            brace_for_iterations("int i = 0", "i < 10", "i += 3", &t).iterations,
            4
        );
        assert_eq!(
            brace_for_iterations("int i = 10", "i > 0", "i--", &t).iterations,
            10
        );
        assert_eq!(
            brace_for_iterations("int i = 10", "i >= 0", "i -= 2", &t).iterations,
            6
        );
        assert_eq!(
            brace_for_iterations("int i = 0", "i < N", "i++", &t).iterations,
            50
        );
        // wrong step direction never terminates statically
        assert_eq!(
            brace_for_iterations("int i = 0", "i < 3", "i--", &t).origin,
            EstimateOrigin::Default
        );
        assert_eq!(
            brace_for_iterations("", "i < unknown", "i++", &t).origin,
            EstimateOrigin::Default
        );
        // start picked up from the surrounding scope when the init is empty
        assert_eq!(
            brace_for_iterations("", "start < 44", "start++", &t).iterations,
            4
        );
    }

    #[test]
    fn helper_edges() {
        assert_eq!(strip_parens("((x < 3))"), "x < 3");
        assert!(is_identifier("foo_1"));
        assert!(!is_identifier("a.b"));
        assert_eq!(string_literal("'ab'"), Some("ab".to_string()));
        assert_eq!(delimited("(a, (b, c))", '(', ')'), Some("a, (b, c)".to_string()));
        assert_eq!(delimited("(a) + (b)", '(', ')'), None);
    }
}
