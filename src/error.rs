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

use std::fmt;

use thiserror::Error;

/// Fatal errors: the assertion cannot be evaluated at all.
///
/// A structural mismatch is never reported through this type, see
/// [`AssertionError::Failed`].
#[derive(Debug, Error)]
pub enum Error {
    /// The content is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The pointer string is not a valid JSON pointer.
    #[error("invalid JSON pointer [{0}]")]
    InvalidPointer(String),
    /// The pointer is valid but does not resolve against the document.
    #[error("pointer [{pointer}] does not exist: [{missing}] not found, nearest member is [{resolved}]")]
    PointerNotFound {
        /// The full pointer that was requested.
        pointer: String,
        /// The shortest prefix of `pointer` that does not resolve.
        missing: String,
        /// The deepest prefix of `pointer` that does resolve.
        resolved: String,
    },
    /// The normalizer has no mapping for the given input.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    #[error(transparent)]
    Regex(#[from] regex::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The rendered description of a failed assertion.
///
/// `headline` is the one line summary, `detail` the supporting body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub headline: String,
    pub detail: String,
}

impl Failure {
    pub fn new(headline: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            detail: detail.into(),
        }
    }

    /// Appends a trailing section to the detail.
    pub(crate) fn with_context(mut self, context: &str) -> Self {
        if !self.detail.is_empty() {
            self.detail.push_str("\n\n");
        }
        self.detail.push_str(context);
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.headline)
        } else {
            write!(f, "{}\n{}", self.headline, self.detail)
        }
    }
}

/// Outcome of an assertion that did not pass.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The assertion could not be evaluated.
    #[error(transparent)]
    Invalid(#[from] Error),
    /// The assertion was evaluated and did not hold.
    #[error("{0}")]
    Failed(Failure),
}

impl AssertionError {
    /// Returns the failure headline, if the assertion was evaluated.
    pub fn headline(&self) -> Option<&str> {
        match self {
            AssertionError::Failed(failure) => Some(failure.headline.as_str()),
            AssertionError::Invalid(_) => None,
        }
    }
}

impl From<Failure> for AssertionError {
    fn from(failure: Failure) -> Self {
        AssertionError::Failed(failure)
    }
}
