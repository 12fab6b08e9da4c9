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

pub(crate) mod misc;
pub mod pointer;
pub mod render;

use pointer::{Key, Pointer};
use serde_json::{Map, Value};
use std::fmt;

use crate::normalize::canonicalize;

/// How object members are compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareMode {
    /// The actual object may not have members the expected one lacks.
    Strict,
    /// The actual object may have extra members.
    Loose,
}

/// How should numbers be compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumericMode {
    /// Different numeric types aren't considered equal.
    Strict,
    /// All numeric types are converted to float before comparison.
    AssumeFloat,
}

/// Configuration of a subset comparison.
///
/// The policy is fixed for a whole evaluation, nested levels are compared
/// with the same settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComparisonPolicy {
    compare_mode: CompareMode,
    numeric_mode: NumericMode,
    ordered: bool,
    exhaustive: bool,
}

impl ComparisonPolicy {
    /// Create a new [`ComparisonPolicy`] using the given [`CompareMode`].
    ///
    /// Lists are unordered and non exhaustive, numbers are compared strictly.
    pub fn new(compare_mode: CompareMode) -> Self {
        Self {
            compare_mode,
            numeric_mode: NumericMode::Strict,
            ordered: false,
            exhaustive: false,
        }
    }

    pub fn strict() -> Self {
        Self::new(CompareMode::Strict)
    }

    pub fn loose() -> Self {
        Self::new(CompareMode::Loose)
    }

    /// Change the policy's compare mode.
    pub fn compare_mode(mut self, compare_mode: CompareMode) -> Self {
        self.compare_mode = compare_mode;
        self
    }

    /// Change the policy's numeric mode.
    pub fn numeric_mode(mut self, numeric_mode: NumericMode) -> Self {
        self.numeric_mode = numeric_mode;
        self
    }

    /// Require expected list elements to appear in the same relative order.
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Require every element of an actual list to be matched.
    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.compare_mode == CompareMode::Strict
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Why a comparison failed at a given location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The list under evaluation, or the expected one, is empty.
    EmptyList,
    /// Expected and actual are different kinds of JSON values.
    TypeMismatch,
    /// Expected and actual are the same kind but not equal.
    NotEqual,
    /// The expected member is absent from the actual object.
    MissingKey,
    /// The actual object has a member the expected one lacks.
    UnexpectedKey,
    /// No actual element matches the expected element at `index`.
    NoMatch { index: usize },
    /// The expected element at `index` only matches before an earlier match.
    OutOfOrder { index: usize },
    /// The actual list has `count` elements nothing expected matched.
    UnexpectedElements { count: usize },
}

/// The first discrepancy found by [`evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Location of the discrepancy.
    pub pointer: Pointer,
    /// The expected value there, absent for unexpected members.
    pub expected: Option<Value>,
    /// The actual value there, absent for missing members.
    pub actual: Option<Value>,
    pub reason: Reason,
}

/// Outcome of [`evaluate`]. A mismatch is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched,
    Mismatched(Mismatch),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            MatchResult::Matched => None,
            MatchResult::Mismatched(mismatch) => Some(mismatch),
        }
    }

    pub fn failure_path(&self) -> Option<&Pointer> {
        self.mismatch().map(|m| &m.pointer)
    }

    pub fn expected_at_failure(&self) -> Option<&Value> {
        self.mismatch().and_then(|m| m.expected.as_ref())
    }

    pub fn actual_at_failure(&self) -> Option<&Value> {
        self.mismatch().and_then(|m| m.actual.as_ref())
    }
}

/// Checks whether `expected` is contained in `actual`.
///
/// See [`evaluate_at`].
pub fn evaluate(expected: &Value, actual: &Value, policy: &ComparisonPolicy) -> MatchResult {
    evaluate_at(expected, actual, &Pointer::root(), policy)
}

/// Checks whether `expected` is contained in `actual`, the latter found at
/// `pointer`. Mismatch locations are reported relative to the same root as
/// `pointer`.
///
/// Integer ids of resource objects are compared by their string form on both
/// sides. An empty actual list is always a mismatch, as is an empty expected
/// list compared with any list.
pub fn evaluate_at(
    expected: &Value,
    actual: &Value,
    pointer: &Pointer,
    policy: &ComparisonPolicy,
) -> MatchResult {
    let expected = canonicalize(expected);
    let actual = canonicalize(actual);

    let empty_actual = actual.as_array().map_or(false, Vec::is_empty);
    let empty_expected = expected.as_array().map_or(false, Vec::is_empty) && actual.is_array();

    if empty_actual || empty_expected {
        return MatchResult::Mismatched(Mismatch {
            pointer: pointer.clone(),
            expected: Some(expected.clone()),
            actual: Some(actual.clone()),
            reason: Reason::EmptyList,
        });
    }

    match subset(&expected, &actual, pointer.clone(), policy) {
        Ok(()) => MatchResult::Matched,
        Err(mismatch) => MatchResult::Mismatched(mismatch),
    }
}

fn subset(
    expected: &Value,
    actual: &Value,
    pointer: Pointer,
    policy: &ComparisonPolicy,
) -> Result<(), Mismatch> {
    let folder = SubsetFolder {
        actual,
        pointer,
        policy,
    };

    fold_json(expected, &folder)
}

#[derive(Debug)]
struct SubsetFolder<'a> {
    actual: &'a Value,
    pointer: Pointer,
    policy: &'a ComparisonPolicy,
}

macro_rules! direct_compare {
    ($name:ident) => {
        fn $name(&self, expected: &Value) -> Result<(), Mismatch> {
            if self.actual != expected {
                return Err(self.differs(expected));
            }
            Ok(())
        }
    };
}

impl<'a> SubsetFolder<'a> {
    direct_compare!(on_null);
    direct_compare!(on_bool);
    direct_compare!(on_string);

    fn on_number(&self, expected: &Value) -> Result<(), Mismatch> {
        let is_equal = match self.policy.numeric_mode {
            NumericMode::Strict => self.actual == expected,
            NumericMode::AssumeFloat => {
                self.actual.is_number() && self.actual.as_f64() == expected.as_f64()
            }
        };

        if !is_equal {
            return Err(self.differs(expected));
        }
        Ok(())
    }

    fn on_array(&self, expected: &Value, list: &[Value]) -> Result<(), Mismatch> {
        let Some(actual) = self.actual.as_array() else {
            return Err(self.differs(expected));
        };

        if self.policy.ordered {
            self.in_order(list, actual)?;
        } else {
            self.in_any_order(list, actual)?;
        }

        // every expected element consumed exactly one actual element
        if self.policy.exhaustive && actual.len() > list.len() {
            return Err(Mismatch {
                pointer: self.pointer.clone(),
                expected: Some(expected.clone()),
                actual: Some(self.actual.clone()),
                reason: Reason::UnexpectedElements {
                    count: actual.len() - list.len(),
                },
            });
        }

        Ok(())
    }

    // First fit, one to one: an actual element is consumed by the first
    // expected element it matches.
    fn in_any_order(&self, list: &[Value], actual: &[Value]) -> Result<(), Mismatch> {
        let mut used = vec![false; actual.len()];

        for (index, item) in list.iter().enumerate() {
            let found = actual
                .iter()
                .enumerate()
                .position(|(pos, candidate)| !used[pos] && self.contains(item, candidate, pos));

            match found {
                Some(pos) => used[pos] = true,
                None => return Err(self.missing_element(item, Reason::NoMatch { index })),
            }
        }

        Ok(())
    }

    // Single left to right scan, a passed element is never revisited.
    fn in_order(&self, list: &[Value], actual: &[Value]) -> Result<(), Mismatch> {
        let mut cursor = 0;

        for (index, item) in list.iter().enumerate() {
            let mut found = false;

            while cursor < actual.len() {
                let pos = cursor;
                cursor += 1;

                if self.contains(item, &actual[pos], pos) {
                    found = true;
                    break;
                }
            }

            if !found {
                let anywhere = actual
                    .iter()
                    .enumerate()
                    .any(|(pos, candidate)| self.contains(item, candidate, pos));

                let reason = if anywhere {
                    Reason::OutOfOrder { index }
                } else {
                    Reason::NoMatch { index }
                };

                return Err(self.missing_element(item, reason));
            }
        }

        Ok(())
    }

    fn on_object(&self, expected: &Value, map: &Map<String, Value>) -> Result<(), Mismatch> {
        let Some(actual) = self.actual.as_object() else {
            return Err(self.differs(expected));
        };

        for (key, item) in map {
            let pointer = self.pointer.append(Key::Field(key));

            match actual.get(key) {
                Some(actual) => subset(item, actual, pointer, self.policy)?,
                None => {
                    return Err(Mismatch {
                        pointer,
                        expected: Some(item.clone()),
                        actual: None,
                        reason: Reason::MissingKey,
                    })
                }
            }
        }

        if self.policy.is_strict() {
            if let Some((key, extra)) = actual.iter().find(|(key, _)| !map.contains_key(*key)) {
                return Err(Mismatch {
                    pointer: self.pointer.append(Key::Field(key)),
                    expected: None,
                    actual: Some(extra.clone()),
                    reason: Reason::UnexpectedKey,
                });
            }
        }

        Ok(())
    }

    fn contains(&self, expected: &Value, candidate: &Value, pos: usize) -> bool {
        subset(
            expected,
            candidate,
            self.pointer.append(Key::Idx(pos)),
            self.policy,
        )
        .is_ok()
    }

    fn differs(&self, expected: &Value) -> Mismatch {
        let reason = if same_kind(expected, self.actual) {
            Reason::NotEqual
        } else {
            Reason::TypeMismatch
        };

        Mismatch {
            pointer: self.pointer.clone(),
            expected: Some(expected.clone()),
            actual: Some(self.actual.clone()),
            reason,
        }
    }

    fn missing_element(&self, item: &Value, reason: Reason) -> Mismatch {
        Mismatch {
            pointer: self.pointer.clone(),
            expected: Some(item.clone()),
            actual: Some(self.actual.clone()),
            reason,
        }
    }
}

fn same_kind(lhs: &Value, rhs: &Value) -> bool {
    std::mem::discriminant(lhs) == std::mem::discriminant(rhs)
}

fn fold_json(json: &Value, folder: &SubsetFolder<'_>) -> Result<(), Mismatch> {
    match json {
        Value::Null => folder.on_null(json),
        Value::Bool(_) => folder.on_bool(json),
        Value::Number(_) => folder.on_number(json),
        Value::String(_) => folder.on_string(json),
        Value::Array(list) => folder.on_array(json, list),
        Value::Object(map) => folder.on_object(json, map),
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reason::EmptyList => write!(f, "list is empty"),
            Reason::TypeMismatch => write!(f, "values have different types"),
            Reason::NotEqual => write!(f, "values are not equal"),
            Reason::MissingKey => write!(f, "key not present"),
            Reason::UnexpectedKey => write!(f, "unexpected key"),
            Reason::NoMatch { index } => write!(f, "no value matches expected element {}", index),
            Reason::OutOfOrder { index } => write!(f, "expected element {} is out of order", index),
            Reason::UnexpectedElements { count } => write!(f, "{} unexpected values", count),
        }
    }
}
