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

//! Operation categories and weights

use strum_macros::{Display, EnumString};

use crate::error::WattError;

/// Category of computational work recognized by the walkers.
///
/// Closed set: the serialized form of each variant is its snake_case name and
/// is part of the output schema.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
pub enum OperationKind {
    /// Arithmetic addition (also the catch-all for cheap unary/bitwise work)
    #[strum(serialize = "addition")]
    Addition,
    /// Arithmetic subtraction
    #[strum(serialize = "subtraction")]
    Subtraction,
    /// Multiplication (and matrix product)
    #[strum(serialize = "multiplication")]
    Multiplication,
    /// Division and remainder
    #[strum(serialize = "division")]
    Division,
    /// Binding a value to a name or slot
    #[strum(serialize = "assignment")]
    Assignment,
    /// Relational or boolean test
    #[strum(serialize = "comparison")]
    Comparison,
    /// Indexed element access
    #[strum(serialize = "array_access")]
    ArrayAccess,
    /// Plain function or method call
    #[strum(serialize = "function_call")]
    FunctionCall,
    /// Heap allocation or deallocation
    #[strum(serialize = "memory_allocation")]
    MemoryAllocation,
    /// Branch of control flow
    #[strum(serialize = "conditional_branch")]
    ConditionalBranch,
    /// Input/output call
    #[strum(serialize = "io_operation")]
    IoOperation,
    /// Network call
    #[strum(serialize = "network_operation")]
    NetworkOperation,
}

/// Number of operation kinds
pub const KIND_COUNT: usize = 12;

/// Every kind, in declaration order
pub const ALL_KINDS: [OperationKind; KIND_COUNT] = [
    OperationKind::Addition,
    OperationKind::Subtraction,
    OperationKind::Multiplication,
    OperationKind::Division,
    OperationKind::Assignment,
    OperationKind::Comparison,
    OperationKind::ArrayAccess,
    OperationKind::FunctionCall,
    OperationKind::MemoryAllocation,
    OperationKind::ConditionalBranch,
    OperationKind::IoOperation,
    OperationKind::NetworkOperation,
];

impl OperationKind {
    /// All kinds, in declaration order
    pub fn all() -> impl Iterator<Item = OperationKind> {
        ALL_KINDS.iter().copied()
    }

    /// Relative cost weight of one operation of this kind
    pub fn weight(self) -> u64 {
        use OperationKind::*;
        match self {
            Addition => 1,
            Subtraction => 1,
            Multiplication => 2,
            Division => 3,
            Assignment => 1,
            Comparison => 1,
            ArrayAccess => 2,
            FunctionCall => 5,
            MemoryAllocation => 10,
            ConditionalBranch => 1,
            IoOperation => 50,
            NetworkOperation => 100,
        }
    }

    /// Position in the counter array
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Parse a canonical snake_case name into a kind
    pub fn from_name(name: &str) -> Result<Self, WattError> {
        name.parse()
            .map_err(|_| WattError::OperationKindUnknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_closed_and_ordered() {
        let all: Vec<_> = OperationKind::all().collect();
        assert_eq!(all.len(), KIND_COUNT);
        assert_eq!(all[0], OperationKind::Addition);
        assert_eq!(all[11], OperationKind::NetworkOperation);
        // index() is dense over 0..12
        for (i, k) in all.iter().enumerate() {
            assert_eq!(k.index(), i);
        }
    }

    #[test]
    fn weights_match_model() {
        assert_eq!(OperationKind::Addition.weight(), 1);
        assert_eq!(OperationKind::Multiplication.weight(), 2);
        assert_eq!(OperationKind::Division.weight(), 3);
        assert_eq!(OperationKind::ArrayAccess.weight(), 2);
        assert_eq!(OperationKind::FunctionCall.weight(), 5);
        assert_eq!(OperationKind::MemoryAllocation.weight(), 10);
        assert_eq!(OperationKind::IoOperation.weight(), 50);
        assert_eq!(OperationKind::NetworkOperation.weight(), 100);
    }

    #[test]
    fn name_roundtrip() {
        for kind in OperationKind::all() {
            let name = kind.to_string();
            assert_eq!(OperationKind::from_name(&name).unwrap(), kind);
        }
        assert!(OperationKind::from_name("teleportation").is_err());
    }
}
