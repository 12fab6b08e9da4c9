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

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod document;
mod domain;
mod error;
mod http;
pub mod json_diff;
mod normalize;

pub use document::Document;
pub use domain::{Identifiable, ResourceId, ResourceIdentifier, MEDIA_TYPE};
pub use error::{AssertionError, Error, Failure};
pub use http::HttpMessage;
pub use json_diff::pointer::{JSONPointer, Key, Pointer};
pub use json_diff::render::{headline, render};
pub use json_diff::{
    evaluate, evaluate_at, CompareMode, ComparisonPolicy, MatchResult, Mismatch, NumericMode,
    Reason,
};
pub use normalize::{canonicalize, NormalizationInput, Normalizer};

/// Asserts that `expected` is a subset of the JSON in `raw` at `pointer`.
///
/// Shorthand for parsing a [`Document`] and calling
/// [`Document::assert_subset`].
///
/// # Examples
///
/// ```
/// use jsonapi_assert::{assert_subset, ComparisonPolicy};
/// use serde_json::json;
///
/// let raw = r#"{"data": {"type": "posts", "id": "1", "attributes": {"title": "Hello"}}}"#;
///
/// let expected = json!({"type": "posts", "id": 1});
///
/// assert!(assert_subset(raw, "/data", &expected, &ComparisonPolicy::loose()).is_ok());
/// assert!(assert_subset(raw, "/data", &expected, &ComparisonPolicy::strict()).is_err());
/// ```
pub fn assert_subset<P: JSONPointer + ?Sized>(
    raw: &str,
    pointer: &P,
    expected: &serde_json::Value,
    policy: &ComparisonPolicy,
) -> Result<(), AssertionError> {
    Document::parse(raw)?.assert_subset(pointer, expected, policy)
}
