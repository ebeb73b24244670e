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
Syntax node capability trait
============================

The walkers are written against this small capability set instead of a parse
library, so any tree source can back them. The only concrete implementation
adapts `tree_sitter::Node`, carrying the source text alongside the node to
recover spans.
*/

/// Capabilities a parse-tree node must expose to the walkers
pub trait SyntaxNode: Sized {
    /// Grammar kind name of the node
    fn kind(&self) -> &str;
    /// Named children, in order
    fn named_children(&self) -> Vec<Self>;
    /// All children including anonymous tokens (operators, keywords)
    fn children(&self) -> Vec<Self>;
    /// Child for a grammar field name
    fn child_by_field(&self, field: &str) -> Option<Self>;
    /// Source text covered by the node
    fn text(&self) -> String;
    /// 0-based starting row of the node
    fn start_row(&self) -> usize;

    /// True for a named (non-token) node
    fn is_named(&self) -> bool {
        true
    }
}

/// `tree_sitter::Node` adapter
#[derive(Copy, Clone)]
pub struct TsNode<'t> {
    node: tree_sitter::Node<'t>,
    src: &'t str,
}

impl<'t> TsNode<'t> {
    /// Wrap a tree-sitter node together with its source text
    pub fn new(node: tree_sitter::Node<'t>, src: &'t str) -> Self {
        TsNode { node, src }
    }
}

impl<'t> SyntaxNode for TsNode<'t> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|n| TsNode::new(n, self.src))
            .collect()
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|n| TsNode::new(n, self.src))
            .collect()
    }

    fn child_by_field(&self, field: &str) -> Option<Self> {
        self.node
            .child_by_field_name(field)
            .map(|n| TsNode::new(n, self.src))
    }

    fn text(&self) -> String {
        self.node
            .utf8_text(self.src.as_bytes())
            .unwrap_or_default()
            .to_string()
    }

    fn start_row(&self) -> usize {
        self.node.start_position().row
    }

    fn is_named(&self) -> bool {
        self.node.is_named()
    }
}
