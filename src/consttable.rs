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
Constant table
==============

Scope-shadowable mapping from identifier to a statically known integer, plus
the resolver that reduces simple expressions to integers. The table is owned
by one analysis: function scopes snapshot it on entry and restore on exit
(copy-on-enter, LIFO).

Resolution is deliberately silent: anything that cannot be reduced (unknown
names, division by zero, calls other than `len`) resolves to `None` and the
caller falls back to its default.
*/

use std::collections::HashMap;

use crate::constants::DEFAULT_LOOP_ITERATIONS;

/// Saved table contents for scope restoration
#[derive(Debug, Clone)]
pub struct ConstSnapshot(HashMap<String, i64>);

/// Per-analysis table of statically known integer constants
#[derive(Debug, Clone, Default)]
pub struct ConstTable {
    map: HashMap<String, i64>,
}

impl ConstTable {
    /// Empty table
    pub fn new() -> Self {
        Default::default()
    }

    /// Known value of an identifier
    pub fn get(&self, name: &str) -> Option<i64> {
        self.map.get(name).copied()
    }

    /// Record a known value, shadowing any previous one
    pub fn set<T: Into<String>>(&mut self, name: T, value: i64) {
        self.map.insert(name.into(), value);
    }

    /// Snapshot the table before entering a function scope
    pub fn snapshot(&self) -> ConstSnapshot {
        ConstSnapshot(self.map.clone())
    }

    /// Restore the snapshot taken at scope entry
    pub fn restore(&mut self, snap: ConstSnapshot) {
        self.map = snap.0;
    }

    /// Record an assignment `name = expr` when the right side resolves
    pub fn record_assignment(&mut self, name: &str, expr: &str) {
        if let Some(v) = self.resolve(expr) {
            self.set(name, v);
        }
    }

    /// Statically reduce an expression to an integer.
    pub fn resolve(&self, expr: &str) -> Option<i64> {
        let tokens = tokenize(expr)?;
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            table: self,
        };
        let value = parser.expr()?;
        if parser.pos == tokens.len() {
            Some(value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    FloorDiv,
    Percent,
    LParen,
    RParen,
    Comma,
}

fn tokenize(expr: &str) -> Option<Vec<Tok>> {
    let mut out = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                out.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                // `**` does not reduce statically
                if chars.get(i + 1) == Some(&'*') {
                    return None;
                }
                out.push(Tok::Star);
                i += 1;
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    out.push(Tok::FloorDiv);
                    i += 2;
                } else {
                    out.push(Tok::Slash);
                    i += 1;
                }
            }
            '%' => {
                out.push(Tok::Percent);
                i += 1;
            }
            '(' => {
                out.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                out.push(Tok::RParen);
                i += 1;
            }
            ',' => {
                out.push(Tok::Comma);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() {
                    let d = chars[i];
                    let is_exp_sign = (d == '+' || d == '-')
                        && i > start
                        && matches!(chars[i - 1], 'e' | 'E')
                        && !literal_is_radix_prefixed(&chars[start..i]);
                    if d.is_ascii_alphanumeric() || d == '_' || d == '.' || is_exp_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                out.push(Tok::Num(parse_int_literal(&literal)?));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                out.push(Tok::Ident(ident));
            }
            _ => return None,
        }
    }
    Some(out)
}

fn literal_is_radix_prefixed(chars: &[char]) -> bool {
    chars.len() >= 2 && chars[0] == '0' && matches!(chars[1], 'x' | 'X' | 'o' | 'O' | 'b' | 'B')
}

/// Parse an integer literal: `0x`/`0o`/`0b` radix prefixes, `_` digit
/// separators, Java/C style trailing type suffixes, floats truncated.
fn parse_int_literal(lit: &str) -> Option<i64> {
    let cleaned: String = lit.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex.trim_end_matches(|c| c == 'u' || c == 'l'), 16).ok();
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct.trim_end_matches(|c| c == 'u' || c == 'l'), 8).ok();
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin.trim_end_matches(|c| c == 'u' || c == 'l'), 2).ok();
    }

    let trimmed = lower.trim_end_matches(|c| matches!(c, 'u' | 'l' | 'f' | 'd'));
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('.') || trimmed.contains('e') {
        let f: f64 = trimmed.parse().ok()?;
        if f.is_finite() && f.abs() < i64::max_value() as f64 {
            return Some(f.trunc() as i64);
        }
        return None;
    }
    trimmed.parse().ok()
}

struct ExprParser<'a> {
    tokens: &'a [Tok],
    pos: usize,
    table: &'a ConstTable,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Tok> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expr(&mut self) -> Option<i64> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Tok::Plus) => {
                    self.pos += 1;
                    acc = acc.checked_add(self.term()?)?;
                }
                Some(Tok::Minus) => {
                    self.pos += 1;
                    acc = acc.checked_sub(self.term()?)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn term(&mut self) -> Option<i64> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Tok::Star) => {
                    self.pos += 1;
                    acc = acc.checked_mul(self.unary()?)?;
                }
                Some(Tok::Slash) | Some(Tok::FloorDiv) => {
                    self.pos += 1;
                    acc = floor_div(acc, self.unary()?)?;
                }
                Some(Tok::Percent) => {
                    self.pos += 1;
                    acc = floor_mod(acc, self.unary()?)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn unary(&mut self) -> Option<i64> {
        match self.peek() {
            Some(Tok::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Tok::Minus) => {
                self.pos += 1;
                self.unary()?.checked_neg()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<i64> {
        match self.next()?.clone() {
            Tok::Num(n) => Some(n),
            Tok::Ident(name) => {
                if self.peek() == Some(&Tok::LParen) {
                    // `len(...)` is the only call that resolves, as a heuristic
                    if name == "len" {
                        self.skip_parenthesized()?;
                        Some(DEFAULT_LOOP_ITERATIONS as i64)
                    } else {
                        None
                    }
                } else {
                    self.table.get(&name)
                }
            }
            Tok::LParen => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Tok::RParen) => Some(inner),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn skip_parenthesized(&mut self) -> Option<()> {
        debug_assert_eq!(self.peek(), Some(&Tok::LParen));
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Tok::LParen => depth += 1,
                Tok::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(());
                    }
                }
                _ => {}
            }
        }
    }
}

/// Floor division, `None` on a zero divisor
fn floor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let q = a.checked_div(b)?;
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Floor modulo matching the sign of the divisor, `None` on zero
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        Some(r + b)
    } else {
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConstTable {
        let mut t = ConstTable::new();
        t.set("N", 50);
        t.set("STEP", 2);
        t
    }

    #[test]
    fn literal_forms() {
        let t = ConstTable::new();
        assert_eq!(t.resolve("42"), Some(42));
        assert_eq!(t.resolve("1_000"), Some(1000));
        assert_eq!(t.resolve("0x1F"), Some(31));
        assert_eq!(t.resolve("0o17"), Some(15));
        assert_eq!(t.resolve("0b1010"), Some(10));
        assert_eq!(t.resolve("100L"), Some(100));
        assert_eq!(t.resolve("10u"), Some(10));
        assert_eq!(t.resolve("3.7"), Some(3));
        assert_eq!(t.resolve("1e3"), Some(1000));
    }

    #[test]
    fn identifiers_and_arithmetic() {
        let t = table();
        assert_eq!(t.resolve("N"), Some(50));
        assert_eq!(t.resolve("N + 10"), Some(60));
        assert_eq!(t.resolve("N * STEP"), Some(100));
        assert_eq!(t.resolve("(N - 10) * 2"), Some(80));
        assert_eq!(t.resolve("N / 3"), Some(16));
        assert_eq!(t.resolve("N // 3"), Some(16));
        assert_eq!(t.resolve("-7 // 2"), Some(-4));
        assert_eq!(t.resolve("N % 7"), Some(1));
        assert_eq!(t.resolve("-N"), Some(-50));
        assert_eq!(t.resolve("+N"), Some(50));
    }

    #[test]
    fn unresolvable_forms() {
        let t = table();
        assert_eq!(t.resolve("M"), None);
        assert_eq!(t.resolve("N / 0"), None);
        assert_eq!(t.resolve("N % 0"), None);
        assert_eq!(t.resolve("foo()"), None);
        assert_eq!(t.resolve("N +"), None);
        assert_eq!(t.resolve("2 ** 8"), None);
        assert_eq!(t.resolve("a.b"), None);
        assert_eq!(t.resolve(""), None);
    }

    #[test]
    fn len_call_resolves_to_default() {
        let t = table();
        assert_eq!(t.resolve("len(items)"), Some(100));
        assert_eq!(t.resolve("len(a(b, c))"), Some(100));
    }

    #[test]
    fn scope_snapshot_restore() {
        let mut t = table();
        let snap = t.snapshot();
        t.set("N", 7);
        t.set("local", 1);
        assert_eq!(t.get("N"), Some(7));
        t.restore(snap);
        assert_eq!(t.get("N"), Some(50));
        assert_eq!(t.get("local"), None);
    }

    #[test]
    fn record_assignment_only_when_resolvable() {
        let mut t = table();
        t.record_assignment("total", "N * 2");
        assert_eq!(t.get("total"), Some(100));
        t.record_assignment("other", "unknown_name");
        assert_eq!(t.get("other"), None);
    }
}
