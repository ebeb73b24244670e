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
Brace-dialect walker
====================

Tree walker for the C-style grammars (c, cpp, java, javascript, typescript).
One counting core serves all five languages; per-grammar differences are
confined to node-kind names and the function-name extraction.
*/

use crate::classify::classify;
use crate::consttable::ConstTable;
use crate::detect::Language;
use crate::loopest::{brace_for_iterations, default_estimate, while_iterations, LoopEstimate};
use crate::node::SyntaxNode;
use crate::types::OperationKind::*;
use crate::walker::{
    arith_counts, cancel_note, cancelled, finish_function, loop_note, Acc, CancelFlag, WalkOutput,
};

struct BraceWalker {
    lang: Language,
    consts: ConstTable,
    out: WalkOutput,
    global: Acc,
}

/// Analyze a brace-family tree
pub(crate) fn analyze<N: SyntaxNode>(
    root: &N,
    lang: Language,
    cancel: Option<&CancelFlag>,
) -> WalkOutput {
    let mut walker = BraceWalker {
        lang,
        consts: ConstTable::new(),
        out: WalkOutput::default(),
        global: Acc::new(),
    };
    walker.seed_constants(root);
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

impl BraceWalker {
    /// Pre-pass over top-level declarations and `#define`s
    fn seed_constants<N: SyntaxNode>(&mut self, scope: &N) {
        for node in scope.named_children() {
            match node.kind() {
                "preproc_def" => {
                    if let (Some(name), Some(value)) =
                        (node.child_by_field("name"), node.child_by_field("value"))
                    {
                        self.consts.record_assignment(&name.text(), &value.text());
                    }
                }
                "declaration" | "field_declaration" | "local_variable_declaration"
                | "lexical_declaration" | "variable_declaration" => {
                    self.seed_declarators(&node);
                }
                "class_declaration" | "class_specifier" | "struct_specifier"
                | "namespace_definition" | "interface_declaration" => {
                    if let Some(body) = node.child_by_field("body") {
                        self.seed_constants(&body);
                    }
                }
                "export_statement" => {
                    if let Some(decl) = node.child_by_field("declaration") {
                        if matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
                            self.seed_declarators(&decl);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn seed_declarators<N: SyntaxNode>(&mut self, decl: &N) {
        for child in decl.named_children() {
            if !matches!(child.kind(), "init_declarator" | "variable_declarator") {
                continue;
            }
            let name = child
                .child_by_field("declarator")
                .or_else(|| child.child_by_field("name"));
            let value = child.child_by_field("value");
            if let (Some(name), Some(value)) = (name, value) {
                if matches!(name.kind(), "identifier") {
                    self.consts.record_assignment(&name.text(), &value.text());
                }
            }
        }
    }

    /// Dispatch one top-level (or class-member) node
    fn top_level<N: SyntaxNode>(&mut self, node: &N, class_prefix: Option<&str>) {
        match node.kind() {
            "function_definition" => {
                if let Some((name, body)) = c_style_function(node) {
                    self.named_function(qualify(class_prefix, &name), name, node.start_row(), &body);
                }
            }
            "method_declaration" | "constructor_declaration" => {
                let name = node
                    .child_by_field("name")
                    .map(|n| n.text())
                    .unwrap_or_default();
                if let Some(body) = node.child_by_field("body") {
                    self.named_function(qualify(class_prefix, &name), name, node.start_row(), &body);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                let name = node
                    .child_by_field("name")
                    .map(|n| n.text())
                    .unwrap_or_default();
                if let Some(body) = node.child_by_field("body") {
                    self.named_function(qualify(class_prefix, &name), name, node.start_row(), &body);
                }
            }
            "method_definition" => {
                let name = node
                    .child_by_field("name")
                    .map(|n| n.text())
                    .unwrap_or_default();
                if let Some(body) = node.child_by_field("body") {
                    self.named_function(qualify(class_prefix, &name), name, node.start_row(), &body);
                }
            }
            "class_declaration" | "class_specifier" | "struct_specifier"
            | "interface_declaration" => {
                let class_name = node
                    .child_by_field("name")
                    .map(|n| n.text())
                    .unwrap_or_default();
                if let Some(body) = node.child_by_field("body") {
                    for member in body.named_children() {
                        match member.kind() {
                            "function_definition" | "method_declaration"
                            | "constructor_declaration" | "method_definition"
                            | "class_declaration" | "class_specifier" | "struct_specifier" => {
                                self.top_level(&member, Some(&class_name))
                            }
                            _ => self.into_global(&member),
                        }
                    }
                }
            }
            "namespace_definition" | "template_declaration" => {
                let children = match node.child_by_field("body") {
                    Some(body) => body.named_children(),
                    None => node.named_children(),
                };
                for child in children {
                    self.top_level(&child, class_prefix);
                }
            }
            "export_statement" => {
                if let Some(decl) = node.child_by_field("declaration") {
                    self.top_level(&decl, class_prefix);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for decl in node.named_children() {
                    if decl.kind() != "variable_declarator" {
                        continue;
                    }
                    let value = decl.child_by_field("value");
                    let is_function_value = value
                        .as_ref()
                        .map(|v| {
                            matches!(
                                v.kind(),
                                "arrow_function" | "function_expression" | "function"
                            )
                        })
                        .unwrap_or(false);
                    if is_function_value {
                        let name = decl
                            .child_by_field("name")
                            .map(|n| n.text())
                            .unwrap_or_default();
                        let value = value.unwrap();
                        if let Some(body) = value.child_by_field("body") {
                            self.named_function(
                                qualify(class_prefix, &name),
                                name,
                                node.start_row(),
                                &body,
                            );
                        }
                    } else {
                        self.into_global(&decl);
                    }
                }
            }
            "preproc_def" | "preproc_function_def" | "preproc_include" | "preproc_ifdef"
            | "comment" | "package_declaration" | "import_declaration" | "import_statement"
            | "using_declaration" | "type_alias_declaration" | "enum_declaration" => {}
            _ => self.into_global(node),
        }
    }

    fn into_global<N: SyntaxNode>(&mut self, node: &N) {
        let mut acc = std::mem::take(&mut self.global);
        self.stmt(node, &mut acc, 1, 0);
        self.global = acc;
    }

    /// Walk one function body into its own record
    fn named_function<N: SyntaxNode>(&mut self, qualified: String, short: String, row: usize, body: &N) {
        let snap = self.consts.snapshot();
        let mut acc = Acc::new();
        self.stmt(body, &mut acc, 1, 0);
        self.consts.restore(snap);

        let short_name = short.rsplit("::").next().unwrap_or(&short).to_string();
        let record = finish_function(
            qualified,
            &short_name,
            row + 1,
            acc,
            &mut self.out.assumptions,
        );
        self.out.functions.push(record);
    }

    fn block<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        for stmt in node.named_children() {
            self.stmt(&stmt, acc, mult, depth);
        }
    }

    fn stmt<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        match node.kind() {
            "compound_statement" | "statement_block" | "block" => {
                self.block(node, acc, mult, depth)
            }
            // nested definitions are their own records, not executed here
            "function_definition" | "function_declaration" | "method_declaration"
            | "constructor_declaration" | "method_definition" | "class_declaration"
            | "class_specifier" | "struct_specifier" => self.top_level(node, None),
            "declaration" | "local_variable_declaration" | "field_declaration"
            | "lexical_declaration" | "variable_declaration" => {
                self.declaration(node, acc, mult)
            }
            "variable_declarator" | "init_declarator" => self.declarator(node, acc, mult),
            "for_statement" => self.for_statement(node, acc, mult, depth),
            "enhanced_for_statement" | "for_in_statement" | "for_range_loop"
            | "for_range_statement" | "range_based_for_statement" => {
                let est = default_estimate();
                self.out
                    .assumptions
                    .push(loop_note(node.start_row(), "foreach-loop", &est));
                for field in &["value", "right"] {
                    if let Some(iterable) = node.child_by_field(field) {
                        self.expr(&iterable, acc, mult);
                        break;
                    }
                }
                self.cascade(node, acc, mult, depth, est);
            }
            "while_statement" => {
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
                self.cascade(node, acc, mult, depth, est);
            }
            "do_statement" => {
                let est = default_estimate();
                self.out
                    .assumptions
                    .push(loop_note(node.start_row(), "do-while-loop", &est));
                self.cascade(node, acc, mult, depth, est);
            }
            "if_statement" => {
                acc.add(ConditionalBranch, mult, 1);
                if let Some(cond) = node.child_by_field("condition") {
                    self.expr(&cond, acc, mult);
                }
                if let Some(cons) = node.child_by_field("consequence") {
                    self.stmt(&cons, acc, mult, depth);
                }
                if let Some(alt) = node.child_by_field("alternative") {
                    if alt.kind() == "else_clause" {
                        for child in alt.named_children() {
                            self.stmt(&child, acc, mult, depth);
                        }
                    } else {
                        self.stmt(&alt, acc, mult, depth);
                    }
                }
            }
            "switch_statement" | "switch_expression" => {
                acc.add(ConditionalBranch, mult, 1);
                if let Some(cond) = node.child_by_field("condition") {
                    self.expr(&cond, acc, mult);
                }
                if let Some(body) = node.child_by_field("body") {
                    for child in body.named_children() {
                        match child.kind() {
                            "case_statement" | "switch_case" | "switch_default"
                            | "switch_block_statement_group" => {
                                acc.add(Comparison, mult, 1);
                                for sub in child.named_children() {
                                    self.stmt(&sub, acc, mult, depth);
                                }
                            }
                            _ => self.stmt(&child, acc, mult, depth),
                        }
                    }
                }
            }
            "try_statement" | "catch_clause" | "finally_clause" => {
                for child in node.named_children() {
                    self.stmt(&child, acc, mult, depth);
                }
            }
            "labeled_statement" => {
                for child in node.named_children() {
                    if child.kind() != "identifier" && child.kind() != "statement_identifier" {
                        self.stmt(&child, acc, mult, depth);
                    }
                }
            }
            "throw_statement" => {
                acc.add(FunctionCall, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "return_statement" | "expression_statement" => {
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "break_statement" | "continue_statement" | "empty_statement" | "comment"
            | "preproc_include" | "preproc_def" | "preproc_call" | "package_declaration"
            | "import_declaration" | "import_statement" | "using_declaration"
            | "goto_statement" => {}
            _ => self.expr(node, acc, mult),
        }
    }

    /// Loop cascade shared by every loop form: N comparisons at the current
    /// multiplier, body at multiplier × N.
    fn cascade<N: SyntaxNode>(
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
            self.stmt(&body, acc, inner, depth + 1);
        }
    }

    fn for_statement<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64, depth: u64) {
        let init = node
            .child_by_field("initializer")
            .or_else(|| node.child_by_field("init"));
        let update = node
            .child_by_field("update")
            .or_else(|| node.child_by_field("increment"));
        let cond = node.child_by_field("condition");

        let est = brace_for_iterations(
            &init.as_ref().map(|n| n.text()).unwrap_or_default(),
            &cond.as_ref().map(|n| n.text()).unwrap_or_default(),
            &update.as_ref().map(|n| n.text()).unwrap_or_default(),
            &self.consts,
        );
        self.out
            .assumptions
            .push(loop_note(node.start_row(), "for-loop", &est));

        // the initializer runs once at the enclosing multiplier
        if let Some(init) = init {
            self.stmt(&init, acc, mult, depth);
        }

        acc.add(Comparison, mult, est.iterations);
        acc.enter_loop(depth + 1);
        let inner = mult.saturating_mul(est.iterations);
        if let Some(update) = update {
            self.expr(&update, acc, inner);
        }
        if let Some(body) = node.child_by_field("body") {
            self.stmt(&body, acc, inner, depth + 1);
        }
    }

    fn declaration<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        for child in node.named_children() {
            if matches!(child.kind(), "init_declarator" | "variable_declarator") {
                self.declarator(&child, acc, mult);
            }
        }
    }

    fn declarator<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        let name = node
            .child_by_field("declarator")
            .or_else(|| node.child_by_field("name"));
        if let Some(value) = node.child_by_field("value") {
            acc.add(Assignment, mult, 1);
            if let Some(name) = name {
                if name.kind() == "identifier" {
                    self.consts.record_assignment(&name.text(), &value.text());
                }
            }
            self.expr(&value, acc, mult);
        }
    }

    fn expr<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        match node.kind() {
            "assignment_expression" | "augmented_assignment_expression" => {
                acc.add(Assignment, mult, 1);
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_else(|| "=".to_string());
                if op != "=" {
                    let (kind, n) = arith_counts(op.trim_end_matches('='));
                    acc.add(kind, mult, n);
                }
                if let Some(left) = node.child_by_field("left") {
                    if left.kind() == "identifier" {
                        if op == "=" {
                            if let Some(right) = node.child_by_field("right") {
                                self.consts.record_assignment(&left.text(), &right.text());
                            }
                        }
                    } else {
                        self.expr(&left, acc, mult);
                    }
                }
                if let Some(right) = node.child_by_field("right") {
                    self.expr(&right, acc, mult);
                }
            }
            "binary_expression" => {
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_default();
                match op.as_str() {
                    "&&" | "||" | "and" | "or" => acc.add(Comparison, mult, 1),
                    "<" | ">" | "<=" | ">=" | "==" | "!=" | "===" | "!==" => {
                        acc.add(Comparison, mult, 1)
                    }
                    "<<" | ">>" if self.lang == Language::Cpp && self.is_stream_io(node) => {
                        acc.add(IoOperation, mult, 1)
                    }
                    _ => {
                        let (kind, n) = arith_counts(&op);
                        acc.add(kind, mult, n);
                    }
                }
                for field in &["left", "right"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "unary_expression" => {
                acc.add(Addition, mult, 1);
                for field in &["argument", "operand"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                        break;
                    }
                }
            }
            "update_expression" => {
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_default();
                let kind = if op == "--" { Subtraction } else { Addition };
                acc.add(kind, mult, 1);
                acc.add(Assignment, mult, 1);
                if let Some(arg) = node.child_by_field("argument") {
                    if arg.kind() != "identifier" {
                        self.expr(&arg, acc, mult);
                    }
                }
            }
            "ternary_expression" | "conditional_expression" => {
                acc.add(ConditionalBranch, mult, 1);
                for field in &["condition", "consequence", "alternative"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "call_expression" => self.call(node, acc, mult),
            "method_invocation" => self.method_invocation(node, acc, mult),
            "object_creation_expression" | "new_expression" => {
                acc.add(MemoryAllocation, mult, 1);
                if let Some(ty) = node
                    .child_by_field("type")
                    .or_else(|| node.child_by_field("constructor"))
                {
                    acc.call(&ty.text());
                }
                if let Some(args) = node.child_by_field("arguments") {
                    for arg in args.named_children() {
                        self.expr(&arg, acc, mult);
                    }
                }
            }
            "delete_expression" => {
                acc.add(MemoryAllocation, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "subscript_expression" | "array_access" => {
                acc.add(ArrayAccess, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "field_expression" | "member_expression" | "field_access" => {
                for field in &["object", "argument"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                        break;
                    }
                }
            }
            "array" | "array_initializer" | "initializer_list" => {
                let elems = node.named_children();
                if !elems.is_empty() {
                    acc.add(MemoryAllocation, mult, 1);
                    acc.add(Assignment, mult, elems.len() as u64);
                }
                for elem in elems {
                    self.expr(&elem, acc, mult);
                }
            }
            "object" => {
                acc.add(MemoryAllocation, mult, 1);
                for child in node.named_children() {
                    if child.kind() == "pair" {
                        acc.add(Assignment, mult, 1);
                        for field in &["key", "value"] {
                            if let Some(sub) = child.child_by_field(field) {
                                self.expr(&sub, acc, mult);
                            }
                        }
                    } else {
                        self.expr(&child, acc, mult);
                    }
                }
            }
            "array_creation_expression" => {
                acc.add(MemoryAllocation, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "template_string" => {
                for child in node.named_children() {
                    if child.kind() == "template_substitution" {
                        acc.add(FunctionCall, mult, 1);
                        for sub in child.named_children() {
                            self.expr(&sub, acc, mult);
                        }
                    }
                }
            }
            "cast_expression" | "sizeof_expression" => {
                acc.add(FunctionCall, mult, 1);
                for field in &["value", "operand", "expression"] {
                    if let Some(child) = node.child_by_field(field) {
                        self.expr(&child, acc, mult);
                        break;
                    }
                }
            }
            "arrow_function" | "function_expression" | "function" | "lambda_expression" => {
                acc.add(FunctionCall, mult, 1);
                if let Some(body) = node.child_by_field("body") {
                    self.stmt(&body, acc, mult, 0);
                }
            }
            "throw_expression" => {
                acc.add(FunctionCall, mult, 1);
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "parenthesized_expression" | "argument_list" | "arguments" | "expression_list"
            | "comma_expression" | "sequence_expression" | "spread_element"
            | "non_null_expression" | "as_expression" | "await_expression"
            | "pointer_expression" | "reference_expression" => {
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
            "identifier" | "field_identifier" | "property_identifier" | "type_identifier"
            | "number" | "number_literal" | "decimal_integer_literal" | "decimal_floating_point_literal"
            | "hex_integer_literal" | "string" | "string_literal" | "char_literal"
            | "character_literal" | "template_literal_type" | "true" | "false" | "null"
            | "null_literal" | "undefined" | "this" | "super" | "comment" => {}
            _ => {
                for child in node.named_children() {
                    self.expr(&child, acc, mult);
                }
            }
        }
    }

    /// `cout <<`-style stream operands on either side of a shift
    fn is_stream_io<N: SyntaxNode>(&self, node: &N) -> bool {
        let text = node.text();
        ["cout", "cerr", "cin", "clog"]
            .iter()
            .any(|s| text.contains(s))
    }

    fn call<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        let func = node.child_by_field("function");
        let (short, dotted) = match &func {
            Some(f) if f.kind() == "identifier" => (f.text(), f.text()),
            Some(f) if matches!(f.kind(), "member_expression" | "field_expression") => {
                for field in &["object", "argument"] {
                    if let Some(object) = f.child_by_field(field) {
                        self.expr(&object, acc, mult);
                        break;
                    }
                }
                let short = f
                    .child_by_field("property")
                    .or_else(|| f.child_by_field("field"))
                    .map(|p| p.text())
                    .unwrap_or_default();
                (short, f.text())
            }
            Some(f) if f.kind() == "qualified_identifier" => {
                let text = f.text();
                let short = text.rsplit("::").next().unwrap_or(&text).to_string();
                (short, text)
            }
            Some(f) => {
                self.expr(f, acc, mult);
                (String::new(), f.text())
            }
            None => (String::new(), String::new()),
        };

        if !short.is_empty() {
            acc.call(&short);
        }
        let class = classify(self.lang, &short, &dotted);
        acc.add(class.operation(), mult, 1);

        if let Some(args) = node.child_by_field("arguments") {
            for arg in args.named_children() {
                self.expr(&arg, acc, mult);
            }
        }
    }

    fn method_invocation<N: SyntaxNode>(&mut self, node: &N, acc: &mut Acc, mult: u64) {
        if let Some(object) = node.child_by_field("object") {
            self.expr(&object, acc, mult);
        }
        let short = node
            .child_by_field("name")
            .map(|n| n.text())
            .unwrap_or_default();
        if !short.is_empty() {
            acc.call(&short);
        }
        let class = classify(self.lang, &short, &node.text());
        acc.add(class.operation(), mult, 1);

        if let Some(args) = node.child_by_field("arguments") {
            for arg in args.named_children() {
                self.expr(&arg, acc, mult);
            }
        }
    }
}

/// Join a class prefix and a member name
fn qualify(class_prefix: Option<&str>, name: &str) -> String {
    match class_prefix {
        Some(class) if !class.is_empty() => format!("{}.{}", class, name.replace("::", ".")),
        _ => name.replace("::", "."),
    }
}

/// Name and body of a c/cpp `function_definition`
fn c_style_function<N: SyntaxNode>(node: &N) -> Option<(String, N)> {
    let body = node.child_by_field("body")?;
    let mut current = node.child_by_field("declarator")?;
    let mut seen_function_declarator = false;
    loop {
        match current.kind() {
            "function_declarator" => {
                seen_function_declarator = true;
                current = current.child_by_field("declarator")?;
            }
            "pointer_declarator" | "parenthesized_declarator" | "reference_declarator" => {
                current = current
                    .child_by_field("declarator")
                    .or_else(|| current.named_children().into_iter().next())?;
            }
            "identifier" | "field_identifier" | "qualified_identifier" | "destructor_name"
            | "operator_name" => {
                if !seen_function_declarator {
                    return None;
                }
                return Some((current.text(), body));
            }
            _ => {
                current = current.child_by_field("declarator")?;
            }
        }
    }
}
