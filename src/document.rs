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

use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AssertionError, Error};
use crate::json_diff::misc::stringify;
use crate::json_diff::pointer::{JSONPointer, Pointer};
use crate::json_diff::{evaluate_at, render, ComparisonPolicy, MatchResult, Mismatch};

/// An immutable, addressable JSON document.
///
/// # Examples
///
/// ```
/// use jsonapi_assert::{ComparisonPolicy, Document};
/// use serde_json::json;
///
/// let document = Document::parse(r#"{"data": [{"type": "posts", "id": "1"}]}"#).unwrap();
/// assert_eq!(document.at("/data/0/id").unwrap(), &json!("1"));
///
/// let expected = json!([{"type": "posts", "id": 1}]);
/// assert!(document
///     .assert_subset("/data", &expected, &ComparisonPolicy::strict())
///     .is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parses raw JSON content.
    pub fn parse(raw: impl AsRef<[u8]>) -> Result<Self, Error> {
        let root = serde_json::from_slice(raw.as_ref())?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Returns a new document for `raw`, this one is left untouched.
    pub fn with_content(&self, raw: impl AsRef<[u8]>) -> Result<Self, Error> {
        Self::parse(raw)
    }

    /// Returns the value at `pointer`.
    pub fn at<P: JSONPointer + ?Sized>(&self, pointer: &P) -> Result<&Value, Error> {
        pointer.pointer()?.resolve(&self.root)
    }

    pub fn has<P: JSONPointer + ?Sized>(&self, pointer: &P) -> bool {
        self.at(pointer).is_ok()
    }

    /// Compares `expected` with the value at `pointer`.
    pub fn evaluate<P: JSONPointer + ?Sized>(
        &self,
        pointer: &P,
        expected: &Value,
        policy: &ComparisonPolicy,
    ) -> Result<MatchResult, Error> {
        let pointer = pointer.pointer()?;
        let actual = pointer.resolve(&self.root)?;
        Ok(evaluate_at(expected, actual, &pointer, policy))
    }

    /// Asserts that the value at `pointer` contains `expected`.
    ///
    /// On mismatch the failure detail ends with the whole document.
    pub fn assert_subset<P: JSONPointer + ?Sized>(
        &self,
        pointer: &P,
        expected: &Value,
        policy: &ComparisonPolicy,
    ) -> Result<(), AssertionError> {
        let pointer = pointer.pointer()?;
        let actual = pointer.resolve(&self.root)?;

        match evaluate_at(expected, actual, &pointer, policy) {
            MatchResult::Matched => Ok(()),
            MatchResult::Mismatched(mismatch) => {
                Err(self.failure(expected, actual, &pointer, policy, &mismatch))
            }
        }
    }

    fn failure(
        &self,
        expected: &Value,
        actual: &Value,
        pointer: &Pointer,
        policy: &ComparisonPolicy,
        mismatch: &Mismatch,
    ) -> AssertionError {
        render::render(expected, actual, pointer, policy, mismatch)
            .with_context(&format!("within JSON API document:\n{}", self))
            .into()
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", stringify(&self.root))
    }
}
