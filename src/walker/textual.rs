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
Textual fallback walker
=======================

Line-oriented analysis used when no parse tree is available. Definitions are
found with regular expressions, scope is approximated by indentation (python)
or balanced braces (everything else), and the loop cascade is kept with the
same estimator the tree walkers use. Intentionally less precise than the tree
walkers, but it agrees with them on the simple single-loop shapes.
*/

use regex::Regex;

use crate::classify::classify;
use crate::constants::DEFAULT_LOOP_ITERATIONS;
use crate::consttable::ConstTable;
use crate::detect::Language;
use crate::loopest::{
    brace_for_iterations, default_estimate, python_for_iterations, while_iterations,
};
use crate::types::OperationKind::*;
use crate::walker::{
    cancel_note, cancelled, finish_function, loop_note, Acc, CancelFlag, WalkOutput,
};

/// Analyze source text without a parse tree
pub(crate) fn analyze(source: &str, lang: Language, cancel: Option<&CancelFlag>) -> WalkOutput {
    if lang == Language::Python {
        analyze_indent(source, cancel)
    } else {
        analyze_brace(source, lang, cancel)
    }
}

// --------------------------- indentation dialect --------------------------

struct IndentScan {
    consts: ConstTable,
    out: WalkOutput,
    lang: Language,
}

fn analyze_indent(source: &str, cancel: Option<&CancelFlag>) -> WalkOutput {
    let stripped = strip_python_comments(source);
    let lines: Vec<&str> = stripped.lines().collect();

    let mut scan = IndentScan {
        consts: ConstTable::new(),
        out: WalkOutput::default(),
        lang: Language::Python,
    };

    // module-level constant pre-pass
    let assign_re = Regex::new(r"^([A-Za-z_]\w*)\s*=\s*([^=].*)$").unwrap();
    for line in &lines {
        if let Some(caps) = assign_re.captures(line) {
            scan.consts.record_assignment(
                caps.get(1).unwrap().as_str(),
                caps.get(2).unwrap().as_str().trim(),
            );
        }
    }

    let def_re = Regex::new(r"^(\s*)(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap();
    let class_re = Regex::new(r"^(\s*)class\s+([A-Za-z_]\w*)").unwrap();

    // locate definitions, qualifying methods with the enclosing class
    let mut stack: Vec<(usize, bool, String)> = Vec::new(); // (indent, is_class, name)
    let mut defs: Vec<(usize, usize, String, String)> = Vec::new(); // (line, indent, qualified, short)
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ind = indent_width(line);
        while stack.last().map(|(i, _, _)| *i >= ind).unwrap_or(false) {
            stack.pop();
        }
        if let Some(caps) = class_re.captures(line) {
            stack.push((ind, true, caps.get(2).unwrap().as_str().to_string()));
        } else if let Some(caps) = def_re.captures(line) {
            let short = caps.get(2).unwrap().as_str().to_string();
            let qualified = match stack.last() {
                Some((_, true, class)) => format!("{}.{}", class, short),
                _ => short.clone(),
            };
            stack.push((ind, false, short.clone()));
            defs.push((idx, ind, qualified, short));
        }
    }

    // one record per definition
    for (idx, ind, qualified, short) in &defs {
        if cancelled(cancel) {
            scan.out
                .assumptions
                .push(cancel_note(scan.out.functions.len()));
            break;
        }
        let end = block_end(&lines, *idx, *ind);
        let snap = scan.consts.snapshot();
        let mut acc = Acc::new();
        scan.indent_block(&lines, idx + 1, end, &mut acc, 1, 0);
        scan.consts.restore(snap);
        let record = finish_function(
            qualified.clone(),
            short,
            idx + 1,
            acc,
            &mut scan.out.assumptions,
        );
        scan.out.functions.push(record);
    }

    // everything outside a definition feeds the global counter
    let mut global = Acc::new();
    scan.indent_block(&lines, 0, lines.len(), &mut global, 1, 0);

    let mut out = scan.out;
    out.global = global.counts;
    out.sort_functions();
    out
}

impl IndentScan {
    /// Walk `lines[start..end]` sequentially; loop bodies recurse with the
    /// multiplied cascade and definition bodies are skipped.
    fn indent_block(
        &mut self,
        lines: &[&str],
        start: usize,
        end: usize,
        acc: &mut Acc,
        mult: u64,
        depth: u64,
    ) {
        let def_re = Regex::new(r"^\s*(?:async\s+)?def\s+[A-Za-z_]\w*\s*\(").unwrap();
        let for_re = Regex::new(r"^\s*(?:async\s+)?for\s+.+?\s+in\s+(.+?)\s*:\s*(.*)$").unwrap();
        let while_re = Regex::new(r"^\s*while\s+(.+?)\s*:\s*(.*)$").unwrap();
        let branch_re = Regex::new(r"^\s*(?:if|elif)\s+(.+?)\s*:\s*(.*)$").unwrap();
        let with_re = Regex::new(r"^\s*(?:async\s+)?with\s+(.+?)\s*:\s*(.*)$").unwrap();
        let plain_clause_re = Regex::new(r"^\s*(?:else|try|finally|except\b.*)\s*:\s*(.*)$").unwrap();

        let mut i = start;
        while i < end {
            let line = lines[i];
            if line.trim().is_empty() {
                i += 1;
                continue;
            }
            let ind = indent_width(line);

            if def_re.is_match(line) {
                i = block_end(lines, i, ind).min(end);
                continue;
            }
            if let Some(caps) = for_re.captures(line) {
                let est = python_for_iterations(caps.get(1).unwrap().as_str(), &self.consts);
                self.out.assumptions.push(loop_note(i, "for-loop", &est));
                acc.add(Comparison, mult, est.iterations);
                acc.enter_loop(depth + 1);
                let inner = mult.saturating_mul(est.iterations);
                let inline = caps.get(2).unwrap().as_str();
                if !inline.is_empty() {
                    self.count_line(inline, acc, inner);
                }
                let body_end = block_end(lines, i, ind).min(end);
                self.indent_block(lines, i + 1, body_end, acc, inner, depth + 1);
                i = body_end;
                continue;
            }
            if let Some(caps) = while_re.captures(line) {
                let body_end = block_end(lines, i, ind).min(end);
                let body_text = lines[i + 1..body_end].join("\n");
                let est = while_iterations(caps.get(1).unwrap().as_str(), &body_text, &self.consts);
                self.out.assumptions.push(loop_note(i, "while-loop", &est));
                acc.add(Comparison, mult, est.iterations);
                acc.enter_loop(depth + 1);
                let inner = mult.saturating_mul(est.iterations);
                let inline = caps.get(2).unwrap().as_str();
                if !inline.is_empty() {
                    self.count_line(inline, acc, inner);
                }
                self.indent_block(lines, i + 1, body_end, acc, inner, depth + 1);
                i = body_end;
                continue;
            }
            if let Some(caps) = branch_re.captures(line) {
                acc.add(ConditionalBranch, mult, 1);
                self.count_line(caps.get(1).unwrap().as_str(), acc, mult);
                let inline = caps.get(2).unwrap().as_str();
                if !inline.is_empty() {
                    self.count_line(inline, acc, mult);
                }
                i += 1;
                continue;
            }
            if let Some(caps) = with_re.captures(line) {
                self.count_line(caps.get(1).unwrap().as_str(), acc, mult);
                let inline = caps.get(2).unwrap().as_str();
                if !inline.is_empty() {
                    self.count_line(inline, acc, mult);
                }
                i += 1;
                continue;
            }
            if let Some(caps) = plain_clause_re.captures(line) {
                let inline = caps.get(1).unwrap().as_str();
                if !inline.is_empty() {
                    self.count_line(inline, acc, mult);
                }
                i += 1;
                continue;
            }
            if line.trim_start().starts_with("class ") {
                i += 1;
                continue;
            }
            self.count_line(line, acc, mult);
            i += 1;
        }
    }

    fn count_line(&mut self, line: &str, acc: &mut Acc, mult: u64) {
        count_statement_text(line, self.lang, &mut self.consts, acc, mult);
    }
}

/// First line after `header` whose indentation returns to `header_indent` or less
fn block_end(lines: &[&str], header: usize, header_indent: usize) -> usize {
    let mut i = header + 1;
    while i < lines.len() {
        let line = lines[i];
        if !line.trim().is_empty() && indent_width(line) <= header_indent {
            return i;
        }
        i += 1;
    }
    lines.len()
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Strip `#` comments and triple-quoted blocks, preserving line structure
fn strip_python_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut in_triple: Option<char> = None;
    let mut in_single: Option<char> = None;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = in_triple {
            if c == q && bytes.get(i + 1) == Some(&q) && bytes.get(i + 2) == Some(&q) {
                in_triple = None;
                i += 3;
                continue;
            }
            if c == '\n' {
                out.push('\n');
            }
            i += 1;
            continue;
        }
        if let Some(q) = in_single {
            out.push(c);
            if c == '\\' {
                if let Some(&next) = bytes.get(i + 1) {
                    out.push(next);
                    i += 2;
                    continue;
                }
            }
            if c == q || c == '\n' {
                in_single = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => {
                if bytes.get(i + 1) == Some(&c) && bytes.get(i + 2) == Some(&c) {
                    in_triple = Some(c);
                    i += 3;
                } else {
                    in_single = Some(c);
                    out.push(c);
                    i += 1;
                }
            }
            '#' => {
                while i < bytes.len() && bytes[i] != '\n' {
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

// --------------------------- brace dialect --------------------------

struct BraceScan {
    consts: ConstTable,
    out: WalkOutput,
    lang: Language,
}

fn analyze_brace(source: &str, lang: Language, cancel: Option<&CancelFlag>) -> WalkOutput {
    let stripped = strip_brace_comments(source);

    let mut scan = BraceScan {
        consts: ConstTable::new(),
        out: WalkOutput::default(),
        lang,
    };

    // constant pre-pass: #define NAME N and initialized declarations
    let define_re = Regex::new(r"(?m)^\s*#define\s+([A-Za-z_]\w*)\s+(.+)$").unwrap();
    for caps in define_re.captures_iter(&stripped) {
        scan.consts.record_assignment(
            caps.get(1).unwrap().as_str(),
            caps.get(2).unwrap().as_str().trim(),
        );
    }
    let decl_re =
        Regex::new(r"(?m)^\s*(?:const|final|static|let|var|\w[\w\s\*<>,\[\]]*?)\s+([A-Za-z_]\w*)\s*=\s*([^;,=][^;,]*)[;,]")
            .unwrap();
    for caps in decl_re.captures_iter(&stripped) {
        scan.consts.record_assignment(
            caps.get(1).unwrap().as_str(),
            caps.get(2).unwrap().as_str().trim(),
        );
    }

    // class spans for method qualification
    let class_re = Regex::new(r"\bclass\s+([A-Za-z_]\w*)").unwrap();
    let mut classes: Vec<(usize, usize, String)> = Vec::new(); // (start, end, name)
    for caps in class_re.captures_iter(&stripped) {
        let name = caps.get(1).unwrap().as_str().to_string();
        if let Some(open) = stripped[caps.get(0).unwrap().end()..].find('{') {
            let open_at = caps.get(0).unwrap().end() + open;
            if let Some(close_at) = matching_brace(&stripped, open_at) {
                classes.push((open_at, close_at, name));
            }
        }
    }

    // function headers: (header_start, name, body_open)
    let mut found: Vec<(usize, String, usize)> = Vec::new();
    for re in function_header_regexes(lang) {
        for caps in re.captures_iter(&stripped) {
            let whole = caps.get(0).unwrap();
            let name = caps.get(1).unwrap().as_str().to_string();
            if is_header_keyword(&name) {
                continue;
            }
            // every header pattern ends on the opening brace
            if stripped.as_bytes().get(whole.end() - 1) == Some(&b'{') {
                found.push((whole.start(), name, whole.end() - 1));
            }
        }
    }
    found.sort_by_key(|(start, _, _)| *start);
    found.dedup_by_key(|(_, _, open)| *open);

    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut functions: Vec<(usize, String, usize, usize)> = Vec::new(); // (start, name, body_open, body_close)
    for (start, name, open) in found {
        if let Some(close) = matching_brace(&stripped, open) {
            spans.push((start, close));
            functions.push((start, name, open, close));
        }
    }

    for (start, name, open, close) in &functions {
        if cancelled(cancel) {
            scan.out
                .assumptions
                .push(cancel_note(scan.out.functions.len()));
            break;
        }
        // blank out nested function spans so they only count in their own record
        let mut body = stripped[open + 1..*close].to_string();
        for (other_start, other_close) in &spans {
            if other_start > open && *other_close < *close {
                blank_range(&mut body, other_start - open - 1, other_close - open);
            }
        }

        let qualified = match classes
            .iter()
            .filter(|(cs, ce, _)| cs < start && *ce > *close)
            .min_by_key(|(cs, ce, _)| ce - cs)
        {
            Some((_, _, class)) => format!("{}.{}", class, name),
            None => name.clone(),
        };

        let line = stripped[..*start].matches('\n').count() + 1;
        let snap = scan.consts.snapshot();
        let mut acc = Acc::new();
        scan.brace_segments(&body, &mut acc, 1);
        scan.consts.restore(snap);
        let record = finish_function(qualified, name, line, acc, &mut scan.out.assumptions);
        scan.out.functions.push(record);
    }

    // residue outside every function span feeds the global counter
    let mut residue = stripped.clone();
    for (start, close) in &spans {
        blank_range(&mut residue, *start, *close + 1);
    }
    let mut global = Acc::new();
    scan.brace_segments(&residue, &mut global, 1);

    let mut out = scan.out;
    out.global = global.counts;
    out.sort_functions();
    out
}

/// Header patterns per language; capture 1 is the function name
fn function_header_regexes(lang: Language) -> Vec<Regex> {
    match lang {
        Language::JavaScript | Language::TypeScript => vec![
            Regex::new(r"(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\([^)]*\)[^{;]*\{")
                .unwrap(),
            Regex::new(
                r"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?\([^)]*\)\s*=>\s*\{",
            )
            .unwrap(),
            Regex::new(r"(?m)^\s*(?:async\s+)?([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*\{").unwrap(),
        ],
        Language::Java => vec![Regex::new(
            r"(?m)^\s*(?:(?:public|private|protected|static|final|synchronized|abstract|default)\s+)*[\w<>\[\],\.\s]+\s+\b([A-Za-z_]\w*)\s*\([^)]*\)\s*(?:throws\s+[\w,\s\.]+)?\{",
        )
        .unwrap()],
        _ => vec![Regex::new(
            r"(?m)^[^\n;{}#=]*?\b([A-Za-z_][\w:]*)\s*\([^;{}]*\)\s*\{",
        )
        .unwrap()],
    }
}

fn is_header_keyword(name: &str) -> bool {
    matches!(
        name,
        "if" | "else" | "for" | "while" | "do" | "switch" | "catch" | "return" | "new"
            | "function" | "throw" | "delete" | "typeof" | "sizeof"
    )
}

/// Index of the `}` matching the `{` at `open`, string-aware
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes.get(open), Some(&b'{'));
    let mut depth = 0i64;
    let mut in_str: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match in_str {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q || (b == b'\n' && q != b'`') {
                    in_str = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => in_str = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Overwrite a byte range with spaces, newlines and length preserved
fn blank_range(text: &mut String, start: usize, end: usize) {
    let (s, e) = (start.min(text.len()), end.min(text.len()));
    let mut bytes = std::mem::take(text).into_bytes();
    for b in &mut bytes[s..e] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
    *text = String::from_utf8(bytes).unwrap_or_default();
}

#[derive(Debug)]
enum Frame {
    Loop(u64),
    Plain,
}

impl BraceScan {
    /// Linear scan of a brace-scoped body: statements are split on `;`, `{`,
    /// `}` and newlines at parenthesis depth zero, and a stack of loop frames
    /// keeps the cascading multiplier.
    fn brace_segments(&mut self, text: &str, acc: &mut Acc, base_mult: u64) {
        let for_re = Regex::new(r"\bfor\s*\((.*)\)\s*$").unwrap();
        let foreach_re = Regex::new(r"\bfor\s*(?:await\s*)?\(.*?\b(?:in|of)\b|\bfor\s*\([^;)]*:").unwrap();
        let while_re = Regex::new(r"\bwhile\s*\((.*)\)\s*$").unwrap();
        let if_re = Regex::new(r"^\s*(?:\}\s*)?(?:else\s+)?if\s*\((.*)\)\s*$").unwrap();
        let switch_re = Regex::new(r"\bswitch\s*\((.*)\)\s*$").unwrap();
        let case_re = Regex::new(r"^\s*(?:case\b.*|default\s*)$").unwrap();
        let header_pending_re =
            Regex::new(r"(?:\b(?:for|while|if|switch)\s*\(.*\)|\belse|\bdo|\btry)\s*$").unwrap();

        let mut stack: Vec<Frame> = Vec::new();
        let mut buf = String::new();
        let mut paren = 0i64;
        let mut in_str: Option<char> = None;
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;

        macro_rules! multiplier {
            () => {
                stack
                    .iter()
                    .fold(base_mult, |m, f| match f {
                        Frame::Loop(n) => m.saturating_mul(*n),
                        Frame::Plain => m,
                    })
            };
        }

        while i < chars.len() {
            let c = chars[i];
            if let Some(q) = in_str {
                buf.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        buf.push(next);
                        i += 2;
                        continue;
                    }
                }
                // only template literals span lines
                if c == q || (c == '\n' && q != '`') {
                    in_str = None;
                }
                i += 1;
                continue;
            }
            match c {
                '"' | '\'' | '`' => {
                    in_str = Some(c);
                    buf.push(c);
                }
                '(' => {
                    paren += 1;
                    buf.push(c);
                }
                ')' => {
                    paren -= 1;
                    buf.push(c);
                }
                '{' if paren == 0 => {
                    let header = buf.trim().to_string();
                    buf.clear();
                    let mult = multiplier!();
                    if foreach_re.is_match(&header) {
                        let est = default_estimate();
                        self.out.assumptions.push(loop_note(
                            line_of(&chars, i),
                            "foreach-loop",
                            &est,
                        ));
                        acc.add(Comparison, mult, est.iterations);
                        stack.push(Frame::Loop(est.iterations));
                        acc.enter_loop(loop_depth(&stack));
                    } else if let Some(caps) = for_re.captures(&header) {
                        let inner = caps.get(1).unwrap().as_str();
                        let parts = split_for_header(inner);
                        let est = brace_for_iterations(
                            &parts.0,
                            &parts.1,
                            &parts.2,
                            &self.consts,
                        );
                        self.out
                            .assumptions
                            .push(loop_note(line_of(&chars, i), "for-loop", &est));
                        self.count_segment(&parts.0, acc, mult);
                        acc.add(Comparison, mult, est.iterations);
                        let inner_mult = mult.saturating_mul(est.iterations);
                        self.count_segment(&parts.2, acc, inner_mult);
                        stack.push(Frame::Loop(est.iterations));
                        acc.enter_loop(loop_depth(&stack));
                    } else if let Some(caps) = while_re.captures(&header) {
                        let body_end = matching_from(&chars, i);
                        let body: String = chars[i + 1..body_end].iter().collect();
                        let est = while_iterations(
                            caps.get(1).unwrap().as_str(),
                            &body,
                            &self.consts,
                        );
                        self.out
                            .assumptions
                            .push(loop_note(line_of(&chars, i), "while-loop", &est));
                        acc.add(Comparison, mult, est.iterations);
                        stack.push(Frame::Loop(est.iterations));
                        acc.enter_loop(loop_depth(&stack));
                    } else if header == "do" || header.ends_with(" do") {
                        let est = default_estimate();
                        self.out.assumptions.push(loop_note(
                            line_of(&chars, i),
                            "do-while-loop",
                            &est,
                        ));
                        acc.add(Comparison, mult, est.iterations);
                        stack.push(Frame::Loop(est.iterations));
                        acc.enter_loop(loop_depth(&stack));
                    } else if let Some(caps) = if_re.captures(&header) {
                        acc.add(ConditionalBranch, mult, 1);
                        self.count_segment(caps.get(1).unwrap().as_str(), acc, mult);
                        stack.push(Frame::Plain);
                    } else if let Some(caps) = switch_re.captures(&header) {
                        acc.add(ConditionalBranch, mult, 1);
                        self.count_segment(caps.get(1).unwrap().as_str(), acc, mult);
                        stack.push(Frame::Plain);
                    } else {
                        if !header.is_empty()
                            && !matches!(header.as_str(), "else" | "try" | "finally")
                            && !header.starts_with("catch")
                        {
                            self.count_segment(&header, acc, mult);
                        }
                        stack.push(Frame::Plain);
                    }
                }
                '}' if paren == 0 => {
                    let segment = buf.trim().to_string();
                    buf.clear();
                    if !segment.is_empty() {
                        self.flush_segment(&segment, acc, multiplier!(), &case_re);
                    }
                    stack.pop();
                }
                ';' | '\n' if paren == 0 => {
                    if c == '\n' && header_pending_re.is_match(buf.trim_end()) {
                        // header waiting for its `{` on the next line
                        buf.push(' ');
                        i += 1;
                        continue;
                    }
                    let segment = buf.trim().to_string();
                    buf.clear();
                    if !segment.is_empty() {
                        self.flush_segment(&segment, acc, multiplier!(), &case_re);
                    }
                }
                _ => buf.push(c),
            }
            i += 1;
        }
        let segment = buf.trim().to_string();
        if !segment.is_empty() {
            self.flush_segment(&segment, acc, multiplier!(), &case_re);
        }
    }

    /// One brace-less statement segment, headers without blocks included
    fn flush_segment(&mut self, segment: &str, acc: &mut Acc, mult: u64, case_re: &Regex) {
        if case_re.is_match(segment.trim_end_matches(':')) && segment.trim_end().ends_with(':') {
            acc.add(Comparison, mult, 1);
            return;
        }
        // `while (...)` with no block is a do-while tail, already estimated
        let dowhile_re = Regex::new(r"^\s*while\s*\(.*\)\s*$").unwrap();
        if dowhile_re.is_match(segment) {
            return;
        }
        // single-statement loop body: for (...) stmt;
        let inline_for_re = Regex::new(r"^\s*for\s*\((.*)\)\s*(.+)$").unwrap();
        if let Some(caps) = inline_for_re.captures(segment) {
            let parts = split_for_header(caps.get(1).unwrap().as_str());
            let est = brace_for_iterations(&parts.0, &parts.1, &parts.2, &self.consts);
            self.count_segment(&parts.0, acc, mult);
            acc.add(Comparison, mult, est.iterations);
            let inner = mult.saturating_mul(est.iterations);
            self.count_segment(&parts.2, acc, inner);
            self.count_segment(caps.get(2).unwrap().as_str(), acc, inner);
            acc.enter_loop(1);
            return;
        }
        // single-statement branch: if (...) stmt;
        let inline_if_re = Regex::new(r"^\s*(?:else\s+)?if\s*\((.*?)\)\s*(.*)$").unwrap();
        if let Some(caps) = inline_if_re.captures(segment) {
            acc.add(ConditionalBranch, mult, 1);
            self.count_segment(caps.get(1).unwrap().as_str(), acc, mult);
            let rest = caps.get(2).unwrap().as_str();
            if !rest.is_empty() {
                self.count_segment(rest, acc, mult);
            }
            return;
        }
        self.count_segment(segment, acc, mult);
    }

    fn count_segment(&mut self, segment: &str, acc: &mut Acc, mult: u64) {
        count_statement_text(segment, self.lang, &mut self.consts, acc, mult);
    }
}

/// `init; cond; update` split of a brace for-header
fn split_for_header(inner: &str) -> (String, String, String) {
    let mut parts = vec![String::new()];
    let mut depth = 0i64;
    for c in inner.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                parts.last_mut().unwrap().push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                parts.last_mut().unwrap().push(c);
            }
            ';' if depth == 0 => parts.push(String::new()),
            _ => parts.last_mut().unwrap().push(c),
        }
    }
    let mut it = parts.into_iter();
    let init = it.next().unwrap_or_default();
    let cond = it.next().unwrap_or_default();
    let update = it.next().unwrap_or_default();
    (init, cond, update)
}

fn loop_depth(stack: &[Frame]) -> u64 {
    stack
        .iter()
        .filter(|f| matches!(f, Frame::Loop(_)))
        .count() as u64
}

fn line_of(chars: &[char], pos: usize) -> usize {
    chars[..pos].iter().filter(|&&c| c == '\n').count()
}

fn matching_from(chars: &[char], open: usize) -> usize {
    let mut depth = 0i64;
    let mut i = open;
    let mut in_str: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        match in_str {
            Some(q) => {
                if c == '\\' {
                    i += 1;
                } else if c == q || (c == '\n' && q != '`') {
                    in_str = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => in_str = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    chars.len()
}

/// Strip `/* ... */` and `// ...` comments, preserving line structure
fn strip_brace_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut in_str: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = in_str {
            out.push(c);
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                    i += 2;
                    continue;
                }
            }
            if c == q || (c == '\n' && q != '`') {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                in_str = Some(c);
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        i += 2;
                        break;
                    }
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

// --------------------------- shared line tally --------------------------

/// Python builtins with dedicated cost heuristics, mirroring the tree walker
const PY_SORT_NAMES: [&str; 2] = ["sorted", "sort"];
const PY_REDUCER_NAMES: [&str; 5] = ["sum", "min", "max", "any", "all"];

const CALL_KEYWORDS: [&str; 20] = [
    "if", "elif", "while", "for", "switch", "catch", "return", "def", "lambda", "with", "and",
    "or", "not", "in", "is", "assert", "del", "else", "do", "function",
];

/// Tally operators, calls and accesses of one statement's text
fn count_statement_text(
    text: &str,
    lang: Language,
    consts: &mut ConstTable,
    acc: &mut Acc,
    mult: u64,
) {
    if text.trim_start().starts_with('#') {
        return;
    }
    let cleaned = blank_strings(text);

    // calls, classified with the same sets as the tree walkers
    let call_re = Regex::new(r"([A-Za-z_$][\w$\.:]*)\s*\(").unwrap();
    for caps in call_re.captures_iter(&cleaned) {
        let dotted = caps.get(1).unwrap().as_str();
        let short = dotted
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(dotted);
        if is_call_keyword(short) {
            continue;
        }
        acc.call(short);
        if lang == Language::Python && PY_SORT_NAMES.contains(&short) {
            let cost = DEFAULT_LOOP_ITERATIONS.saturating_mul(7);
            acc.add(Comparison, mult, cost);
            acc.add(Assignment, mult, cost);
        } else if lang == Language::Python && PY_REDUCER_NAMES.contains(&short) {
            acc.add(Addition, mult, DEFAULT_LOOP_ITERATIONS);
            acc.add(Comparison, mult, DEFAULT_LOOP_ITERATIONS);
        } else if lang == Language::Python && short == "append" && dotted.contains('.') {
            acc.add(MemoryAllocation, mult, 1);
        } else {
            acc.add(classify(lang, short, dotted).operation(), mult, 1);
        }
    }

    // allocations through `new`
    if lang.is_brace_family() {
        let new_re = Regex::new(r"\bnew\s+[A-Za-z_$]").unwrap();
        for _ in new_re.find_iter(&cleaned) {
            acc.add(MemoryAllocation, mult, 1);
        }
        let delete_re = Regex::new(r"\bdelete\b").unwrap();
        for _ in delete_re.find_iter(&cleaned) {
            acc.add(MemoryAllocation, mult, 1);
        }
    } else {
        let word_bool_re = Regex::new(r"\b(?:and|or)\b").unwrap();
        for _ in word_bool_re.find_iter(&cleaned) {
            acc.add(Comparison, mult, 1);
        }
        let word_not_re = Regex::new(r"\bnot\b").unwrap();
        for _ in word_not_re.find_iter(&cleaned) {
            acc.add(Addition, mult, 1);
        }
    }

    scan_operators(&cleaned, lang, acc, mult);
    record_simple_assignment(&cleaned, consts);
}

fn is_call_keyword(name: &str) -> bool {
    CALL_KEYWORDS.contains(&name)
}

/// Feed `name = <const>` statements into the table as the scan advances
fn record_simple_assignment(cleaned: &str, consts: &mut ConstTable) {
    let assign_re = Regex::new(r"^\s*(?:[\w\[\]<>,\*\s]+\s+)?([A-Za-z_]\w*)\s*=\s*([^=].*)$").unwrap();
    if let Some(caps) = assign_re.captures(cleaned) {
        consts.record_assignment(
            caps.get(1).unwrap().as_str(),
            caps.get(2).unwrap().as_str().trim_end_matches(';').trim(),
        );
    }
}

/// Character-level operator tally.
fn scan_operators(text: &str, lang: Language, acc: &mut Acc, mult: u64) {
    let chars: Vec<char> = text.chars().collect();
    let stream_io = lang == Language::Cpp
        && ["cout", "cerr", "cin", "clog"].iter().any(|s| text.contains(s));
    let mut i = 0;
    let mut prev_nonspace: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let consumed = match (c, next) {
            ('=', Some('=')) | ('!', Some('=')) => {
                acc.add(Comparison, mult, 1);
                // swallow the strict-equality third char
                if chars.get(i + 2) == Some(&'=') {
                    3
                } else {
                    2
                }
            }
            ('<', Some('=')) | ('>', Some('=')) => {
                acc.add(Comparison, mult, 1);
                2
            }
            ('<', Some('<')) | ('>', Some('>')) => {
                if stream_io {
                    acc.add(IoOperation, mult, 1);
                } else {
                    acc.add(Addition, mult, 1);
                }
                2
            }
            ('=', Some('>')) => 2,
            ('-', Some('>')) => 2,
            ('<', _) | ('>', _) => {
                acc.add(Comparison, mult, 1);
                1
            }
            ('&', Some('&')) | ('|', Some('|')) => {
                acc.add(Comparison, mult, 1);
                2
            }
            ('+', Some('=')) => {
                acc.add(Assignment, mult, 1);
                acc.add(Addition, mult, 1);
                2
            }
            ('-', Some('=')) => {
                acc.add(Assignment, mult, 1);
                acc.add(Subtraction, mult, 1);
                2
            }
            ('*', Some('=')) => {
                acc.add(Assignment, mult, 1);
                acc.add(Multiplication, mult, 1);
                2
            }
            ('/', Some('=')) | ('%', Some('=')) => {
                acc.add(Assignment, mult, 1);
                acc.add(Division, mult, 1);
                2
            }
            ('+', Some('+')) => {
                acc.add(Addition, mult, 1);
                acc.add(Assignment, mult, 1);
                2
            }
            ('-', Some('-')) => {
                acc.add(Subtraction, mult, 1);
                acc.add(Assignment, mult, 1);
                2
            }
            ('*', Some('*')) => {
                acc.add(Multiplication, mult, 10);
                2
            }
            ('/', Some('/')) => {
                acc.add(Division, mult, 1);
                2
            }
            ('+', _) => {
                acc.add(Addition, mult, 1);
                1
            }
            ('-', _) => {
                acc.add(Subtraction, mult, 1);
                1
            }
            ('*', _) => {
                if lang == Language::Python || !matches!(prev_nonspace, Some('(') | Some(',') | Some('=') | None)
                {
                    acc.add(Multiplication, mult, 1);
                }
                1
            }
            ('/', _) => {
                acc.add(Division, mult, 1);
                1
            }
            ('%', _) => {
                acc.add(Division, mult, 1);
                1
            }
            ('=', _) => {
                acc.add(Assignment, mult, 1);
                1
            }
            ('?', _) => {
                if lang.is_brace_family() && next != Some('.') && next != Some('?') {
                    acc.add(ConditionalBranch, mult, 1);
                }
                1
            }
            ('[', _) => {
                if matches!(prev_nonspace, Some(p) if p.is_ascii_alphanumeric() || p == '_' || p == ')' || p == ']')
                {
                    acc.add(ArrayAccess, mult, 1);
                }
                1
            }
            _ => 1,
        };
        if !c.is_whitespace() {
            prev_nonspace = Some(c);
        }
        i += consumed;
    }
}

/// Replace quoted spans with blanks so their contents never count
fn blank_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_str: Option<char> = None;
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match in_str {
            Some(q) => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == q {
                    in_str = None;
                }
                i += 1;
            }
            None => {
                if c == '"' || c == '\'' || c == '`' {
                    in_str = Some(c);
                } else {
                    out.push(c);
                }
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;

    #[test]
    fn python_single_loop_matches_tree_contract() {
        let src = "def f():\n    for i in range(10):\n        print(i)\n";
        let out = analyze(src, Language::Python, None);
        assert_eq!(out.functions.len(), 1);
        let f = &out.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.line, 1);
        assert_eq!(f.max_loop_nesting, 1);
        assert!(!f.is_recursive);
        assert_eq!(f.operations.get(OperationKind::IoOperation), 10);
        assert!(f.operations.get(OperationKind::Comparison) >= 10);
    }

    #[test]
    fn python_nested_loops_cascade() {
        let src = "def h():\n    for i in range(4):\n        for j in range(5):\n            print(j)\n";
        let out = analyze(src, Language::Python, None);
        let f = &out.functions[0];
        assert_eq!(f.operations.get(OperationKind::IoOperation), 20);
        assert!(f.operations.get(OperationKind::Comparison) >= 24);
        assert_eq!(f.max_loop_nesting, 2);
    }

    #[test]
    fn python_module_constant_resolves_bound() {
        let src = "N = 50\ndef g():\n    for i in range(N):\n        x = i + 1\n";
        let out = analyze(src, Language::Python, None);
        let g = &out.functions[0];
        assert!(g.operations.get(OperationKind::Comparison) >= 50);
        assert_eq!(g.operations.get(OperationKind::Addition), 50);
        assert_eq!(g.operations.get(OperationKind::Assignment), 50);
        assert!(out
            .assumptions
            .iter()
            .any(|a| a.contains("for-loop resolved to 50 iterations")));
    }

    #[test]
    fn c_for_loop_counts() {
        let src = "int main() {\n    for (int i = 0; i < 3; i++) { printf(\"x\"); }\n    return 0;\n}\n";
        let out = analyze(src, Language::C, None);
        assert_eq!(out.functions.len(), 1);
        let main = &out.functions[0];
        assert_eq!(main.name, "main");
        assert_eq!(main.operations.get(OperationKind::IoOperation), 3);
        assert!(main.operations.get(OperationKind::Comparison) >= 3);
        assert_eq!(main.max_loop_nesting, 1);
    }

    #[test]
    fn python_recursion_detected_and_scaled() {
        let src = "def fib(n):\n    if n < 2:\n        return n\n    return fib(n-1) + fib(n-2)\n";
        let out = analyze(src, Language::Python, None);
        let fib = &out.functions[0];
        assert!(fib.is_recursive);
        for (_, count) in fib.operations.summary() {
            assert_eq!(count % 10, 0);
        }
    }

    #[test]
    fn comment_stripping() {
        let stripped = strip_python_comments("x = 1  # note\n\"\"\"doc\nblock\"\"\"\ny = 2\n");
        assert!(stripped.contains("x = 1"));
        assert!(!stripped.contains("note"));
        assert!(!stripped.contains("doc"));
        assert!(stripped.contains("y = 2"));

        let stripped = strip_brace_comments("int a; /* gone\nstill gone */ int b; // tail\n");
        assert!(stripped.contains("int a;"));
        assert!(stripped.contains("int b;"));
        assert!(!stripped.contains("gone"));
        assert!(!stripped.contains("tail"));
    }

    #[test]
    fn java_method_qualified_by_class() {
        let src = "public class Calc {\n    public int twice(int x) {\n        return x + x;\n    }\n}\n";
        let out = analyze(src, Language::Java, None);
        assert_eq!(out.functions.len(), 1);
        assert_eq!(out.functions[0].name, "Calc.twice");
        assert_eq!(
            out.functions[0].operations.get(OperationKind::Addition),
            1
        );
    }

    #[test]
    fn global_statements_counted_outside_functions() {
        let src = "x = 1\ndef f():\n    y = 2\n";
        let out = analyze(src, Language::Python, None);
        assert_eq!(out.global.get(OperationKind::Assignment), 1);
        assert_eq!(
            out.functions[0].operations.get(OperationKind::Assignment),
            1
        );
    }
}
