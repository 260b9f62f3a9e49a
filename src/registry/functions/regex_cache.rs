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
//! Cached compilation of I-Regexp (RFC 9485) patterns

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::num::NonZeroUsize;

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// How a pattern is applied to the input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The whole input must match
    Full,
    /// Any substring may match
    Search,
}

/// Invalid patterns are cached as `None` as well.
static REGEX_CACHE: Lazy<Mutex<LruCache<(MatchMode, String), Option<Regex>>>> =
    Lazy::new(|| Mutex::new(LruCache::new(CACHE_CAPACITY)));

/// Compile `pattern` for the given mode, or `None` if it is not a valid pattern
pub fn compiled_regex(pattern: &str, mode: MatchMode) -> Option<Regex> {
    let key = (mode, pattern.to_string());
    if let Some(cached) = REGEX_CACHE.lock().get(&key) {
        return cached.clone();
    }

    let translated = translate_iregexp(pattern);
    let source = match mode {
        MatchMode::Full => format!(r"\A(?:{translated})\z"),
        MatchMode::Search => translated,
    };

    let compiled = match Regex::new(&source) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::debug!("Ignoring invalid regular expression {pattern:?}: {err}");
            None
        }
    };

    REGEX_CACHE.lock().put(key, compiled.clone());
    compiled
}

/// Rewrite an I-Regexp into the `regex` crate dialect.
///
/// The only divergence that matters is `.`, which in I-Regexp matches any
/// character except line feed and carriage return.
fn translate_iregexp(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    let mut in_class = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                translated.push(ch);
                if let Some(escaped) = chars.next() {
                    translated.push(escaped);
                }
            }
            '[' if !in_class => {
                in_class = true;
                translated.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                translated.push(ch);
            }
            '.' if !in_class => translated.push_str(r"[^\n\r]"),
            _ => translated.push(ch),
        }
    }

    translated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_excludes_line_breaks() {
        assert_eq!(translate_iregexp("a.b"), r"a[^\n\r]b");
        assert_eq!(translate_iregexp(r"a\.b"), r"a\.b");
        assert_eq!(translate_iregexp("[.]"), "[.]");
    }

    #[test]
    fn test_full_and_search_modes() {
        let full = compiled_regex("b.r", MatchMode::Full).unwrap();
        assert!(full.is_match("bar"));
        assert!(!full.is_match("bard"));

        let search = compiled_regex("b.r", MatchMode::Search).unwrap();
        assert!(search.is_match("a bard"));
        assert!(!search.is_match("b\nr"));
    }

    #[test]
    fn test_invalid_pattern_is_none() {
        assert!(compiled_regex("(", MatchMode::Full).is_none());
        assert!(compiled_regex("(", MatchMode::Full).is_none());
    }
}
