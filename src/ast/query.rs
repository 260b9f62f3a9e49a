// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Queries, segments and selectors

use super::expression::ExpressionNode;
use super::SourceSpan;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node a query starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryRoot {
    /// `$`, the document root
    Root,
    /// `@`, the node currently being filtered
    Current,
}

/// Whether a segment looks at children only or at all descendants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// `[...]`, `.name`, `.*`
    Child,
    /// `..[...]`, `..name`, `..*`
    Descendant,
}

/// Optional bounds of an array slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceBounds {
    /// First index, inclusive
    pub start: Option<i64>,
    /// Last index, exclusive
    pub end: Option<i64>,
    /// Distance between selected indices
    pub step: Option<i64>,
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorNode {
    /// Object member by name
    Name(String),
    /// Array element by index, negative counts from the end
    Index(i64),
    /// Every member or element
    Wildcard,
    /// Range of array elements
    Slice(SliceBounds),
    /// Children for which the expression holds
    Filter(Box<ExpressionNode>),
}

/// A parsed segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentNode {
    /// Child or descendant
    pub kind: SegmentKind,
    /// Selectors in source order
    pub selectors: SmallVec<[SelectorNode; 1]>,
}

/// A parsed query, either the whole path or a filter sub-query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNode {
    /// Starting node
    pub root: QueryRoot,
    /// Segments in source order
    pub segments: Vec<SegmentNode>,
    /// Location in the source text
    pub span: SourceSpan,
}
