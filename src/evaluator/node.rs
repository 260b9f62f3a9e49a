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

//! Located nodes and normalized paths

use serde_json::Value;
use std::fmt::{self, Write};

/// One step from a node to its child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathElement<'a> {
    /// Object member name
    Name(&'a str),
    /// Array index
    Index(usize),
}

/// Location of a node, relative to the document root
///
/// Displays in the normalized path form, for example `$['store']['book'][0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPath<'a> {
    elements: Vec<PathElement<'a>>,
}

impl<'a> NormalizedPath<'a> {
    /// Path of the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Steps from the root, in order
    pub fn elements(&self) -> &[PathElement<'a>] {
        &self.elements
    }

    /// Number of steps from the root
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this is the path of the root itself
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn with(&self, element: PathElement<'a>) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend_from_slice(&self.elements);
        elements.push(element);
        Self { elements }
    }
}

impl fmt::Display for NormalizedPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('$')?;
        for element in &self.elements {
            match element {
                PathElement::Name(name) => {
                    f.write_str("['")?;
                    write_escaped(f, name)?;
                    f.write_str("']")?;
                }
                PathElement::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for c in name.chars() {
        match c {
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c if u32::from(c) < 0x20 => write!(f, "\\u{:04x}", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// How the evaluator tracks where a node was found
///
/// Top-level evaluation records [`NormalizedPath`]s; filter sub-queries only
/// need the values and use `()`.
pub trait Location<'a>: Clone {
    /// Location of the member `name` of the node at `self`
    fn member(&self, name: &'a str) -> Self;

    /// Location of the element `index` of the node at `self`
    fn element(&self, index: usize) -> Self;
}

impl<'a> Location<'a> for NormalizedPath<'a> {
    fn member(&self, name: &'a str) -> Self {
        self.with(PathElement::Name(name))
    }

    fn element(&self, index: usize) -> Self {
        self.with(PathElement::Index(index))
    }
}

impl<'a> Location<'a> for () {
    #[inline]
    fn member(&self, _name: &'a str) -> Self {}

    #[inline]
    fn element(&self, _index: usize) -> Self {}
}

/// A matched value with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    /// Where the value was found
    pub path: NormalizedPath<'a>,
    /// The matched value
    pub value: &'a Value,
}

/// Ordered result of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeList<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> NodeList<'a> {
    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the query matched nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the nodes in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Node<'a>> {
        self.nodes.iter()
    }

    /// The first node, if any
    pub fn first(&self) -> Option<&Node<'a>> {
        self.nodes.first()
    }

    /// The matched values without their locations
    pub fn values(&self) -> Vec<&'a Value> {
        self.nodes.iter().map(|node| node.value).collect()
    }

    /// Normalized paths of the matched nodes, rendered
    pub fn paths(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.path.to_string()).collect()
    }

    /// Take the nodes out of the list
    pub fn into_vec(self) -> Vec<Node<'a>> {
        self.nodes
    }
}

impl<'a> From<Vec<Node<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Self { nodes }
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Node<'a>;
    type IntoIter = std::vec::IntoIter<Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'l, 'a> IntoIterator for &'l NodeList<'a> {
    type Item = &'l Node<'a>;
    type IntoIter = std::slice::Iter<'l, Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
