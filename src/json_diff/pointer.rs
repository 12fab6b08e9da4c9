// Copyright 2024 The jsonapi-assert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::Error;

pub(crate) const JSON_POINTER_REGEX: &str = r"^(/([^~/]|~[01])*)*$";

static POINTER_SYNTAX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(JSON_POINTER_REGEX));

/// Marker segment addressing the position after the last array element.
pub const END_OF_LIST: &str = "-";

/// A JSON pointer, e.g. `/data/0/attributes`.
///
/// The empty pointer addresses the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    segments: Vec<String>,
}

/// A single step used to extend a [`Pointer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    Idx(usize),
    Field(&'a str),
}

// Lets callers pass either a `&str` or an already parsed `Pointer`.
pub trait JSONPointer {
    fn pointer(&self) -> Result<Pointer, Error>;
}

impl JSONPointer for str {
    fn pointer(&self) -> Result<Pointer, Error> {
        Pointer::parse(self)
    }
}

impl JSONPointer for String {
    fn pointer(&self) -> Result<Pointer, Error> {
        Pointer::parse(self)
    }
}

impl JSONPointer for Pointer {
    fn pointer(&self) -> Result<Pointer, Error> {
        Ok(self.clone())
    }
}

impl<'a> fmt::Display for Key<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Idx(idx) => write!(f, "{}", idx),
            Key::Field(key) => write!(f, "{}", key),
        }
    }
}

impl Pointer {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses and unescapes a pointer string.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonapi_assert::Pointer;
    ///
    /// let pointer = Pointer::parse("/data/0/attributes").unwrap();
    /// assert_eq!(pointer.segments(), ["data", "0", "attributes"]);
    /// assert!(Pointer::parse("").unwrap().is_root());
    /// assert!(Pointer::parse("data").is_err());
    /// ```
    pub fn parse(pointer: &str) -> Result<Self, Error> {
        let re = POINTER_SYNTAX.as_ref().map_err(regex::Error::clone)?;

        if !re.is_match(pointer) {
            return Err(Error::InvalidPointer(pointer.to_string()));
        }

        if pointer.is_empty() {
            return Ok(Self::root());
        }

        let segments = pointer[1..].split('/').map(unescape).collect();

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn append(&self, next: Key<'_>) -> Pointer {
        let mut copy = self.segments.clone();
        copy.push(next.to_string());
        Pointer { segments: copy }
    }

    pub fn parent(&self) -> Option<Pointer> {
        if self.is_root() {
            return None;
        }

        Some(Pointer {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Resolves the pointer against `value`.
    ///
    /// Fails with [`Error::PointerNotFound`] carrying the first prefix that
    /// could not be resolved and the deepest one that could.
    pub fn resolve<'v>(&self, value: &'v Value) -> Result<&'v Value, Error> {
        let mut current = value;

        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(list) => parse_index(segment).and_then(|idx| list.get(idx)),
                _ => None,
            };

            match next {
                Some(next) => current = next,
                None => {
                    return Err(Error::PointerNotFound {
                        pointer: self.to_string(),
                        missing: self.prefix(depth + 1).to_string(),
                        resolved: self.prefix(depth).to_string(),
                    })
                }
            }
        }

        Ok(current)
    }

    fn prefix(&self, len: usize) -> Pointer {
        Pointer {
            segments: self.segments[..len].to_vec(),
        }
    }
}

/// Resolves `pointer` against `value`, see [`Pointer::resolve`].
pub fn resolve<'v>(value: &'v Value, pointer: &Pointer) -> Result<&'v Value, Error> {
    pointer.resolve(value)
}

// Array indexes are canonical decimals: `0`, `12`, never `01`. The end of
// list marker never resolves to an element.
fn parse_index(segment: &str) -> Option<usize> {
    if segment == END_OF_LIST || segment.is_empty() {
        return None;
    }

    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }

    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    segment.parse().ok()
}

fn unescape(segment: &str) -> String {
    if !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace('~', "~0").replace('/', "~1")
}

impl FromStr for Pointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}
