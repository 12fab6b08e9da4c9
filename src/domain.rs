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

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;

/// The media type of JSON:API documents.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// An identifier as exposed by a domain object, e.g. a route key.
///
/// Integers and strings are interchangeable once normalized: both render to
/// their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Integer(i64),
    String(String),
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Integer(id) => write!(f, "{}", id),
            ResourceId::String(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Integer(id)
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        ResourceId::Integer(i64::from(id))
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Integer(i64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::String(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::String(id)
    }
}

/// A `{type, id}` pair referencing a resource without its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into().to_string(),
        }
    }

    /// Checks whether `value` has exactly the identifier shape, `type` and `id`.
    pub fn is_identifier(value: &Value) -> bool {
        match value.as_object() {
            Some(obj) => {
                obj.len() == 2
                    && obj.get("type").map_or(false, Value::is_string)
                    && obj.get("id").map_or(false, |id| id.is_string() || id.is_i64())
            }
            None => false,
        }
    }
}

impl From<ResourceIdentifier> for Value {
    fn from(identifier: ResourceIdentifier) -> Self {
        json!({
            "type": identifier.resource_type,
            "id": identifier.id,
        })
    }
}

/// A domain object exposing a stable identifier.
///
/// `resource_type` is optional: when absent, the type the caller expects to
/// see is used instead.
pub trait Identifiable {
    fn resource_id(&self) -> ResourceId;

    fn resource_type(&self) -> Option<String> {
        None
    }
}

impl Identifiable for ResourceIdentifier {
    fn resource_id(&self) -> ResourceId {
        ResourceId::String(self.id.clone())
    }

    fn resource_type(&self) -> Option<String> {
        Some(self.resource_type.clone())
    }
}
