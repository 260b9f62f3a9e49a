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

//! Segment and selector application

use super::Evaluator;
use super::node::Location;
use crate::ast::{SegmentKind, SliceBounds};
use crate::compiler::{Segment, Selector};
use serde_json::Value;

impl Evaluator {
    /// Apply `segments` left to right, starting from `start`
    pub(crate) fn select<'a, L: Location<'a>>(
        &self,
        segments: &[Segment],
        root: &'a Value,
        start: Vec<(L, &'a Value)>,
    ) -> Vec<(L, &'a Value)> {
        segments.iter().fold(start, |nodes, segment| {
            self.apply_segment(segment, root, nodes)
        })
    }

    fn apply_segment<'a, L: Location<'a>>(
        &self,
        segment: &Segment,
        root: &'a Value,
        input: Vec<(L, &'a Value)>,
    ) -> Vec<(L, &'a Value)> {
        let mut output = Vec::new();
        for (location, value) in input {
            match segment.kind {
                SegmentKind::Child => {
                    for selector in &segment.selectors {
                        self.apply_selector(selector, root, &location, value, &mut output);
                    }
                }
                SegmentKind::Descendant => {
                    for (location, value) in self.descendants(location, value) {
                        for selector in &segment.selectors {
                            self.apply_selector(selector, root, &location, value, &mut output);
                        }
                    }
                }
            }
        }
        output
    }

    /// The node and all of its descendants, in document order
    ///
    /// Iterative, so deep documents cannot exhaust the call stack. Nodes
    /// deeper than the configured maximum are not visited.
    fn descendants<'a, L: Location<'a>>(
        &self,
        location: L,
        value: &'a Value,
    ) -> Vec<(L, &'a Value)> {
        let max_depth = self.config.max_depth;
        let mut visited = Vec::new();
        let mut truncated = false;
        let mut stack = vec![(location, value, 0usize)];

        while let Some((location, value, depth)) = stack.pop() {
            match value {
                Value::Array(elements) if !elements.is_empty() => {
                    if depth < max_depth {
                        for (index, element) in elements.iter().enumerate().rev() {
                            stack.push((location.element(index), element, depth + 1));
                        }
                    } else {
                        truncated = true;
                    }
                }
                Value::Object(members) if !members.is_empty() => {
                    if depth < max_depth {
                        for (name, member) in members.iter().rev() {
                            stack.push((location.member(name), member, depth + 1));
                        }
                    } else {
                        truncated = true;
                    }
                }
                _ => {}
            }
            visited.push((location, value));
        }

        if truncated {
            log::warn!("descendant traversal truncated at depth {max_depth}");
        }
        visited
    }

    fn apply_selector<'a, L: Location<'a>>(
        &self,
        selector: &Selector,
        root: &'a Value,
        location: &L,
        value: &'a Value,
        output: &mut Vec<(L, &'a Value)>,
    ) {
        match selector {
            Selector::Name(name) => {
                if let Value::Object(members) = value
                    && let Some((name, member)) = members.get_key_value(name.as_str())
                {
                    output.push((location.member(name), member));
                }
            }
            Selector::Index(index) => {
                if let Value::Array(elements) = value
                    && let Some(index) = normalize_index(*index, elements.len())
                {
                    output.push((location.element(index), &elements[index]));
                }
            }
            Selector::Wildcard => output.extend(children(location, value)),
            Selector::Slice(bounds) => {
                if let Value::Array(elements) = value {
                    output.extend(
                        slice_indices(elements.len(), bounds)
                            .into_iter()
                            .map(|index| (location.element(index), &elements[index])),
                    );
                }
            }
            Selector::Filter(predicate) => {
                output.extend(
                    children(location, value)
                        .filter(|(_, child)| self.test(predicate, root, child)),
                );
            }
        }
    }
}

/// Members of an object or elements of an array, in stored order
fn children<'a, 'l, L: Location<'a>>(
    location: &'l L,
    value: &'a Value,
) -> Box<dyn Iterator<Item = (L, &'a Value)> + 'l>
where
    'a: 'l,
{
    match value {
        Value::Object(members) => Box::new(
            members
                .iter()
                .map(move |(name, member)| (location.member(name), member)),
        ),
        Value::Array(elements) => Box::new(
            elements
                .iter()
                .enumerate()
                .map(move |(index, element)| (location.element(index), element)),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

/// Resolve a possibly negative index against an array length
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Indices selected by a slice, in selection order
pub(crate) fn slice_indices(len: usize, bounds: &SliceBounds) -> Vec<usize> {
    let step = bounds.step.unwrap_or(1);
    let Ok(len) = i64::try_from(len) else {
        return Vec::new();
    };
    let normalize = |bound: i64| if bound >= 0 { bound } else { len + bound };

    let mut indices = Vec::new();
    if step > 0 {
        let lower = bounds.start.map_or(0, normalize).clamp(0, len);
        let upper = bounds.end.map_or(len, normalize).clamp(0, len);
        let mut index = lower;
        while index < upper {
            indices.push(index as usize);
            index += step;
        }
    } else if step < 0 {
        let upper = bounds.start.map_or(len - 1, normalize).clamp(-1, len - 1);
        let lower = bounds.end.map_or(-len - 1, normalize).clamp(-1, len - 1);
        let mut index = upper;
        while lower < index {
            indices.push(index as usize);
            index += step;
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bounds(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> SliceBounds {
        SliceBounds { start, end, step }
    }

    #[rstest]
    #[case(0, Some(0))]
    #[case(2, Some(2))]
    #[case(3, None)]
    #[case(-1, Some(2))]
    #[case(-3, Some(0))]
    #[case(-4, None)]
    fn test_normalize_index(#[case] index: i64, #[case] expected: Option<usize>) {
        assert_eq!(normalize_index(index, 3), expected);
    }

    #[rstest]
    #[case(bounds(Some(1), Some(4), Some(1)), vec![1, 2, 3])]
    #[case(bounds(None, None, Some(-1)), vec![4, 3, 2, 1, 0])]
    #[case(bounds(Some(0), Some(5), Some(0)), vec![])]
    #[case(bounds(None, None, Some(2)), vec![0, 2, 4])]
    #[case(bounds(Some(-2), None, None), vec![3, 4])]
    #[case(bounds(Some(3), Some(0), Some(-2)), vec![3, 1])]
    #[case(bounds(Some(-10), Some(10), None), vec![0, 1, 2, 3, 4])]
    #[case(bounds(Some(10), None, Some(-1)), vec![4, 3, 2, 1, 0])]
    #[case(bounds(Some(4), Some(1), None), vec![])]
    fn test_slice_indices(#[case] bounds: SliceBounds, #[case] expected: Vec<usize>) {
        assert_eq!(slice_indices(5, &bounds), expected);
    }

    #[test]
    fn test_slice_of_empty_array() {
        assert_eq!(slice_indices(0, &bounds(None, None, Some(-1))), Vec::<usize>::new());
    }
}
