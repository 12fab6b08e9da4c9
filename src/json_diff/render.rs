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

//! Text descriptions of failed comparisons.

use serde_json::Value;
use std::fmt;

use super::misc::{stringify, Indent};
use super::pointer::Pointer;
use super::{ComparisonPolicy, Mismatch, Reason};
use crate::domain::ResourceIdentifier;
use crate::error::Failure;

/// The one line summary of a failed assertion against the list or member at
/// `pointer`.
pub fn headline(
    expected: &Value,
    pointer: &Pointer,
    policy: &ComparisonPolicy,
    mismatch: &Mismatch,
) -> String {
    if mismatch.reason == Reason::EmptyList {
        return format!("the document has an empty list at [{}]", pointer);
    }

    match expected {
        Value::Array(list) if policy.is_ordered() => {
            if list.iter().all(ResourceIdentifier::is_identifier) {
                format!("the member at [{}] matches the resource identifiers", pointer)
            } else {
                format!("the member at [{}] matches the structure", pointer)
            }
        }
        Value::Array(_) => format!("the list at [{}] only contains the values", pointer),
        _ => format!("the member at [{}] matches the subset", pointer),
    }
}

/// Renders the failure of `expected` against `actual`, found at `pointer`.
///
/// The detail holds the expected structure followed by what was found where
/// the comparison failed.
pub fn render(
    expected: &Value,
    actual: &Value,
    pointer: &Pointer,
    policy: &ComparisonPolicy,
    mismatch: &Mismatch,
) -> Failure {
    let headline = headline(expected, pointer, policy, mismatch);

    let actual_is_empty = actual.as_array().map_or(false, Vec::is_empty);

    let detail = if mismatch.reason == Reason::EmptyList && actual_is_empty {
        format!("{}\n\nlist is empty", stringify(expected))
    } else {
        format!("{}\n\n{}", stringify(expected), mismatch)
    };

    Failure::new(headline, detail)
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json_to_string = |json: &Value| stringify(json).indent(8);

        match (&self.reason, &self.expected, &self.actual) {
            (Reason::MissingKey, Some(expected), _) => {
                writeln!(f, "key not present at [{}]:", self.pointer)?;
                writeln!(f, "    expected:")?;
                write!(f, "{}", json_to_string(expected))?;
            }
            (Reason::UnexpectedKey, _, Some(actual)) => {
                writeln!(f, "unexpected key at [{}]:", self.pointer)?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (Reason::EmptyList, _, Some(actual)) => {
                writeln!(f, "the expected list at [{}] is empty:", self.pointer)?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (Reason::NoMatch { index }, Some(expected), Some(actual)) => {
                writeln!(
                    f,
                    "no value in the list at [{}] matches expected element {}:",
                    self.pointer, index
                )?;
                writeln!(f, "    expected:")?;
                writeln!(f, "{}", json_to_string(expected))?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (Reason::OutOfOrder { index }, Some(expected), Some(actual)) => {
                writeln!(
                    f,
                    "expected element {} is out of order in the list at [{}]:",
                    index, self.pointer
                )?;
                writeln!(f, "    expected:")?;
                writeln!(f, "{}", json_to_string(expected))?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (Reason::UnexpectedElements { count }, _, Some(actual)) => {
                writeln!(
                    f,
                    "the list at [{}] has {} unexpected values:",
                    self.pointer, count
                )?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (reason, Some(expected), Some(actual)) => {
                writeln!(f, "{} at [{}]:", reason, self.pointer)?;
                writeln!(f, "    expected:")?;
                writeln!(f, "{}", json_to_string(expected))?;
                writeln!(f, "    actual:")?;
                write!(f, "{}", json_to_string(actual))?;
            }
            (reason, _, _) => write!(f, "{} at [{}]", reason, self.pointer)?,
        }

        Ok(())
    }
}
