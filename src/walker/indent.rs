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
Indentation-dialect walker
==========================

Tree walker for the python grammar. Definitions are recognized at module
level, inside classes (qualified as `Class.method`) and nested in other
functions; their bodies are walked at multiplier 1 and everything else lands
in the global counter.
*/

use crate::classify::classify;
use crate::constants::DEFAULT_LOOP_ITERATIONS;
use crate::consttable::ConstTable;
use crate::detect::Language;
use crate::loopest::{python_for_iterations, while_iterations, LoopEstimate};
use crate::node::SyntaxNode;
use crate::types::OperationKind::*;
use crate::walker::{
    arith_counts, cancel_note, cancelled, finish_function, loop_note, Acc, CancelFlag, WalkOutput,
};

/// Python builtins charged with the n·log n sorting heuristic
const SORT_NAMES: [&str; 2] = ["sorted", "sort"];
/// Python builtins charged as linear reductions over the default length
const REDUCER_NAMES: [&str; 5] = ["sum", "min", "max", "any", "all"];

struct IndentWalker {
    consts: ConstTable,
    out: WalkOutput,
    global: Acc,
}

/// Analyze a python module tree
pub(crate) fn analyze<N: SyntaxNode>(root: &N, cancel: Option<&CancelFlag>) -> WalkOutput {
    let mut walker = IndentWalker {
        consts: ConstTable::new(),
        out: WalkOutput::default(),
        global: Acc::new(),
    };
    walker.seed_module_constants(root);
    for child in root.named_children() {
        if cancelled(cancel) {
            walker.out.assumptions.push(cancel_note(walker.out.functions.len()));
            break;
        }
        walker.top_level(&child, None);
    }
    let mut out = walker.out;
    out.global = walker.global.counts;
    out.sort_functions();
    out
}

impl IndentWalker {
    /// Pre-pass: module-level `NAME = <const expr>` assignments
    fn seed_module_constants<N: SyntaxNode>(&mut self, root: &N) {
        for stmt in root.named_children() {
            if stmt.kind() != "expression_statement" {
                continue;
            }
            for expr in stmt.named_children() {
                if expr.kind() != "assignment" {
                    continue;
                }
                if let (Some(left), Some(right)) =
                    (expr.child_by_field("left"), expr.child_by_field("right"))
                {
                    if left.kind() == "identifier" {
                        self.consts.record_assignment(&left.text(), &right.text());
                    }
                }
            }
        }
    }

    /// Dispatch one module- or class-level node
    fn top_level<N: SyntaxNode>(&mut self, node: &N, class_prefix: Option<&str>) {
        match node.kind() {
            "function_definition" => self.function(node, class_prefix),
            "decorated_definition" => {
                if let Some(def) = node.child_by_field("definition") {
                    self.top_level(&def, class_prefix);
                }
            }
            "class_definition" => {
                let class_name = node
                    .child_by_field("name")
                    .map(|n| n.text())
                    .unwrap_or_default();
                if let Some(body) = node.child_by_field("body") {
                    for stmt in body.named_children() {
                        match stmt.kind() {
                            "function_definition" | "decorated_definition"
                            | "class_definition" => self.top_level(&stmt, Some(&class_name)),
                            _ => self.into_global(&stmt),
                        }
                    }
                }
            }
            _ => self.into_global(node),
        }
    }

    /// Count a statement outside any function into the global accumulator
    fn into_global<N: SyntaxNode>(&mut self, node: &N) {
        let mut acc = std::mem::take(&mut self.global);
        self.stmt(node, &mut acc, 1, 0);
        self.global = acc;
    }

    /// Analyze one function definition
    fn function<N: SyntaxNode>(&mut self, node: &N, class_prefix: Option<&str>) {
        let short = match node.child_by_field("name") {
            Some(n) => n.text(),
            None => return,
        };
        let qualified = match class_prefix {
            Some(class) => format!("{}.{}", class, short),
            None => short.clone(),
        };
        let line = node.start_row() + 1;

        let snap = self.consts.snapshot();
        let mut acc = Acc::new();
        if let Some(body) = node.child_by_field("body") {
            self.block(&body, &mut acc, 1, 0);
        }
        self.consts.restore(snap);

        let record = finish_function(qualified, &short, line, acc, &mut self.out.assumptions);
        self.out.functions.push(record);
    }

    fn block<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        for stmt in node.named_children() {
            self.stmt(&stmt, acc, mult, depth);
        }
    }

    fn stmt<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        match node.kind() {
            // nested definitions define callable scope, their bodies do not run here
            "function_definition" | "class_definition" | "decorated_definition" => {
                self.top_level(node, None)
            }
            "for_statement" => self.for_statement(node, acc, mult, depth),
            "while_statement" => self.while_statement(node, acc, mult, depth),
            "if_statement" | "elif_clause" => {
                acc.add(ConditionalBranch, mult, 1);
                if let Some(cond) = node.child_by_field("condition") {
                    self.expr(&cond, acc, mult);
                }
                if let Some(cons) = node.child_by_field("consequence") {
                    self.block(&cons, acc, mult, depth);
                }
                for child in node.named_children() {
                    match child.kind() {
                        "elif_clause" => self.stmt(&child, acc, mult, depth),
                        "else_clause" => self.else_clause(&child, acc, mult, depth),
                        _ => {}
                    }
                }
            }
            "else_clause" => self.else_clause(node, acc, mult, depth),
            "try_statement" => {
                for child in node.named_children() {
                    match child.kind() {
                        "block" => self.block(&child, acc, mult, depth),
                        "except_clause" | "except_group_clause" | "finally_clause"
                        | "else_clause" => {
                            for sub in child.named_children() {
                                if sub.kind() == "block" {
                                    self.block(&sub, acc, mult, depth);
                                } else {
                                    self.expr(&sub, acc, mult);
                                }
                            }
                        }
                        _ => self.stmt(&child, acc, mult, depth),
                    }
                }
            }
            "with_statement" => {
                for child in node.named_children() {
                    if child.kind() == "block" {
                        self.block(&child, acc, mult, depth);
                    } else {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "expression_statement" | "return_statement" | "assert_statement"
            | "delete_statement" | "yield_statement" => {
                if node.kind() == "delete_statement" {
                    acc.add(MemoryAllocation, mult, 1);
                }
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "raise_statement" => {
                acc.add(FunctionCall, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "pass_statement" | "break_statement" | "continue_statement" | "import_statement"
            | "import_from_statement" | "future_import_statement" | "global_statement"
            | "nonlocal_statement" | "comment" => {}
            _ => {
                // unknown statement kinds recurse at the current multiplier
                for child in node.named_children() {
                    self.stmt(&child, acc, mult, depth);
                }
            }
        }
    }

    fn for_statement<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        let est = match node.child_by_field("right") {
            Some(right) => python_for_iterations(&right.text(), &self.consts),
            None => crate::loopest::default_estimate(),
        };
        self.out
            .assumptions
            .push(loop_note(node.start_row(), "for-loop", &est));
        self.loop_body(node, acc, mult, depth, est);
    }

    fn while_statement<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        let cond_text = node
            .child_by_field("condition")
            .map(|c| c.text())
            .unwrap_or_default();
        let body_text = node
            .child_by_field("body")
            .map(|b| b.text())
            .unwrap_or_default();
        let est = while_iterations(&cond_text, &body_text, &self.consts);
        self.out
            .assumptions
            .push(loop_note(node.start_row(), "while-loop", &est));
        self.loop_body(node, acc, mult, depth, est);
    }

    /// Loop header cost and cascade: N comparisons at the current multiplier,
    /// body and else-clause walked at multiplier × N and multiplier.
    fn loop_body<N: SyntaxNode>(
        &mut self,
        node: &N,
        acc: &mut Acc,
        mult: u64,
        depth: u64,
        est: LoopEstimate,
    ) {
        acc.add(Comparison, mult, est.iterations);
        acc.enter_loop(depth + 1);
        let inner = mult.saturating_mul(est.iterations);
        if let Some(body) = node.child_by_field("body") {
            self.block(&body, acc, inner, depth + 1);
        }
        if let Some(alt) = node.child_by_field("alternative") {
            self.else_clause(&alt, acc, mult, depth);
        } else {
            // some grammars emit the loop else as a sibling clause
            for child in node.named_children() {
                if child.kind() == "else_clause" {
                    self.else_clause(&child, acc, mult, depth);
                }
            }
        }
    }

    fn else_clause<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        match node.child_by_field("body") {
            Some(body) => self.block(&body, acc, mult, depth),
            None => self.block(node, acc, mult, depth),
        }
    }

    fn expr<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        match node.kind() {
            "assignment" => {
                acc.add(Assignment, mult, 1);
                if let Some(left) = node.child_by_field("left") {
                    match left.kind() {
                        "identifier" => {
                            if let Some(right) = node.child_by_field("right") {
                                self.consts.record_assignment(&left.text(), &right.text());
                            }
                        }
                        _ => self.expr(&left, acc, mult),
                    }
                }
                if let Some(right) = node.child_by_field("right") {
                    self.expr(&right, acc, mult);
                }
            }
            "augmented_assignment" => {
                acc.add(Assignment, mult, 1);
                if let Some(op) = node.child_by_field("operator") {
                    let spelling = op.text();
                    let (kind, n) = arith_counts(spelling.trim_end_matches('='));
                    acc.add(kind, mult, n);
                }
                if let Some(left) = node.child_by_field("left") {
                    if left.kind() != "identifier" {
                        self.expr(&left, acc, mult);
                    }
                }
                if let Some(right) = node.child_by_field("right") {
                    self.expr(&right, acc, mult);
                }
            }
            "named_expression" => {
                acc.add(Assignment, mult, 1);
                if let Some(value) = node.child_by_field("value") {
                    self.expr(&value, acc, mult);
                }
            }
            "binary_operator" => {
                if let Some(op) = node.child_by_field("operator") {
                    let (kind, n) = arith_counts(&op.text());
                    acc.add(kind, mult, n);
                }
                for field in &["left", "right"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "boolean_operator" => {
                acc.add(Comparison, mult, 1);
                for field in &["left", "right"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "not_operator" | "unary_operator" => {
                acc.add(Addition, mult, 1);
                if let Some(arg) = node.child_by_field("argument") {
                    self.expr(&arg, acc, mult);
                }
            }
            "comparison_operator" => {
                let operands = node.named_children();
                let ops = operands.len().saturating_sub(1).max(1) as u64;
                acc.add(Comparison, mult, ops);
                for operand in operands {
                    self.expr(&operand, acc, mult);
                }
            }
            "call" => self.call(node, acc, mult),
            "attribute" => {
                if let Some(object) = node.child_by_field("object") {
                    self.expr(&object, acc, mult);
                }
            }
            "subscript" => {
                acc.add(ArrayAccess, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "list" | "set" | "tuple" | "pattern_list" | "expression_list" => {
                let elems = node.named_children();
                if !elems.is_empty() && matches!(node.kind(), "list" | "set" | "tuple") {
                    acc.add(MemoryAllocation, mult, 1);
                    acc.add(Assignment, mult, elems.len() as u64);
                }
                for elem in elems {
                    self.expr(&elem, acc, mult);
                }
            }
            "dictionary" => {
                acc.add(MemoryAllocation, mult, 1);
                for child in node.named_children() {
                    if child.kind() == "pair" {
                        acc.add(Assignment, mult, 1);
                    }
                    self.expr(&child, acc, mult);
                }
            }
            "pair" => {
                for field in &["key", "value"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "string" => {
                for child in node.named_children() {
                    if child.kind() == "interpolation" {
                        acc.add(FunctionCall, mult, 1);
                        for sub in child.named_children() {
                            self.expr(&sub, acc, mult);
                        }
                    }
                }
            }
            "conditional_expression" => {
                acc.add(ConditionalBranch, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => self.comprehension(node, acc, mult),
            "lambda" => {
                acc.add(FunctionCall, mult, 1);
                if let Some(body) = node.child_by_field("body") {
                    self.expr(&body, acc, mult);
                }
            }
            "await" | "parenthesized_expression" | "yield" | "expression_statement" => {
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "identifier" | "integer" | "float" | "true" | "false" | "none" | "ellipsis"
            | "string_content" | "escape_sequence" | "type" | "comment" => {}
            _ => {
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
        }
    }

    fn call<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        let func = node.child_by_field("function");
        let (short, dotted, is_attribute) = match &func {
            Some(f) if f.kind() == "identifier" => (f.text(), f.text(), false),
            Some(f) if f.kind() == "attribute" => {
                if let Some(object) = f.child_by_field("object") {
                    self.expr(&object, acc, mult);
                }
                let short = f
                    .child_by_field("attribute")
                    .map(|a| a.text())
                    .unwrap_or_default();
                (short, f.text(), true)
            }
            Some(f) => {
                self.expr(f, acc, mult);
                (String::new(), f.text(), false)
            }
            None => (String::new(), String::new(), false),
        };

        if !short.is_empty() {
            acc.call(&short);
        }

        if SORT_NAMES.contains(&short.as_str()) {
            // n·log n heuristic over the default collection size
            let cost = DEFAULT_LOOP_ITERATIONS.saturating_mul(7);
            acc.add(Comparison, mult, cost);
            acc.add(Assignment, mult, cost);
        } else if REDUCER_NAMES.contains(&short.as_str()) {
            acc.add(Addition, mult, DEFAULT_LOOP_ITERATIONS);
            acc.add(Comparison, mult, DEFAULT_LOOP_ITERATIONS);
        } else if is_attribute && short == "append" {
            acc.add(MemoryAllocation, mult, 1);
        } else {
            let class = classify(Language::Python, &short, &dotted);
            acc.add(class.operation(), mult, 1);
        }

        if let Some(args) = node.child_by_field("arguments") {
            for arg in args.named_children() {
                self.expr(&arg, acc, mult);
            }
        }
    }

    /// Comprehension: one allocation, then body, filter and one comparison
    /// per iteration of the product of its `for` clauses.
    fn comprehension<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        acc.add(MemoryAllocation, mult, 1);
        let mut product: u64 = 1;
        for clause in node.named_children() {
            if clause.kind() == "for_in_clause" {
                let est = match clause.child_by_field("right") {
                    Some(right) => python_for_iterations(&right.text(), &self.consts),
                    None => crate::loopest::default_estimate(),
                };
                self.out
                    .assumptions
                    .push(loop_note(clause.start_row(), "comprehension", &est));
                product = product.saturating_mul(est.iterations);
            }
        }
        let inner = mult.saturating_mul(product);
        acc.add(Comparison, mult, product);
        for child in node.named_children() {
            match child.kind() {
                "for_in_clause" => {}
                "if_clause" => {
                    for sub in child.named_children() {
                        self.expr(&sub, acc, inner);
                    }
                }
                _ => self.expr(&child, acc, inner),
            }
        }
    }
}
