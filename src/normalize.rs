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

//! Conversion of the shapes callers pass as "expected" into plain JSON.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{Identifiable, ResourceId, ResourceIdentifier};
use crate::error::Error;
use crate::json_diff::misc::describe;

/// Every input shape the [`Normalizer`] understands.
pub enum NormalizationInput {
    /// A JSON value, used as is.
    Value(Value),
    /// A bare identifier of a resource of the expected type.
    Id(ResourceId),
    /// Bare identifiers, in order.
    Ids(Vec<ResourceId>),
    /// A domain object exposing its identifier.
    Model(Box<dyn Identifiable>),
    /// Domain objects exposing their identifiers, in order.
    Models(Vec<Box<dyn Identifiable>>),
}

impl NormalizationInput {
    /// Serializes any domain value into its JSON form.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(NormalizationInput::Value)
            .map_err(|err| Error::UnsupportedValue(err.to_string()))
    }

    pub fn models<I, T>(models: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Identifiable + 'static,
    {
        NormalizationInput::Models(
            models
                .into_iter()
                .map(|m| Box::new(m) as Box<dyn Identifiable>)
                .collect(),
        )
    }

    pub fn model<T: Identifiable + 'static>(model: T) -> Self {
        NormalizationInput::Model(Box::new(model))
    }
}

impl From<Value> for NormalizationInput {
    fn from(value: Value) -> Self {
        NormalizationInput::Value(value)
    }
}

impl From<ResourceId> for NormalizationInput {
    fn from(id: ResourceId) -> Self {
        NormalizationInput::Id(id)
    }
}

impl From<i64> for NormalizationInput {
    fn from(id: i64) -> Self {
        NormalizationInput::Id(id.into())
    }
}

impl From<i32> for NormalizationInput {
    fn from(id: i32) -> Self {
        NormalizationInput::Id(id.into())
    }
}

impl From<&str> for NormalizationInput {
    fn from(id: &str) -> Self {
        NormalizationInput::Id(id.into())
    }
}

impl From<String> for NormalizationInput {
    fn from(id: String) -> Self {
        NormalizationInput::Id(id.into())
    }
}

impl From<ResourceIdentifier> for NormalizationInput {
    fn from(identifier: ResourceIdentifier) -> Self {
        NormalizationInput::Value(identifier.into())
    }
}

macro_rules! ids_from_vec {
    ($($id:ty),*) => {
        $(
            impl From<Vec<$id>> for NormalizationInput {
                fn from(ids: Vec<$id>) -> Self {
                    NormalizationInput::Ids(ids.into_iter().map(ResourceId::from).collect())
                }
            }
        )*
    };
}

ids_from_vec!(i64, i32, &str, String, ResourceId);

impl From<Vec<ResourceIdentifier>> for NormalizationInput {
    fn from(identifiers: Vec<ResourceIdentifier>) -> Self {
        NormalizationInput::Value(Value::Array(
            identifiers.into_iter().map(Value::from).collect(),
        ))
    }
}

/// Turns [`NormalizationInput`] into canonical JSON.
///
/// Bare identifiers and domain objects become `{type, id}` objects and need
/// the resource type the caller expects to see.
#[derive(Debug, Clone, Default)]
pub struct Normalizer<'a> {
    expected_type: Option<&'a str>,
}

impl<'a> Normalizer<'a> {
    pub fn new() -> Self {
        Self {
            expected_type: None,
        }
    }

    /// Sets the resource type used for bare identifiers.
    pub fn expecting_type(mut self, resource_type: &'a str) -> Self {
        self.expected_type = Some(resource_type);
        self
    }

    /// Normalizes any supported input.
    ///
    /// JSON values pass through [`canonicalize`]; identifiers and models are
    /// expanded to resource identifier objects.
    pub fn normalize(&self, input: NormalizationInput) -> Result<Value, Error> {
        match input {
            NormalizationInput::Value(value) => Ok(canonicalize(&value)),
            NormalizationInput::Id(id) => self.identifier(None, id),
            NormalizationInput::Ids(ids) => ids
                .into_iter()
                .map(|id| self.identifier(None, id))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            NormalizationInput::Model(model) => self.model(model.as_ref()),
            NormalizationInput::Models(models) => models
                .iter()
                .map(|model| self.model(model.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    /// Normalizes input that must be a list of resource identifiers.
    ///
    /// JSON scalars are read as bare ids, objects must carry `type` and `id`.
    pub fn identifiers(&self, input: NormalizationInput) -> Result<Vec<Value>, Error> {
        match input {
            NormalizationInput::Value(Value::Array(list)) => list
                .iter()
                .map(|value| self.json_identifier(value))
                .collect(),
            NormalizationInput::Value(value) => Ok(vec![self.json_identifier(&value)?]),
            other => match self.normalize(other)? {
                Value::Array(list) => Ok(list),
                single => Ok(vec![single]),
            },
        }
    }

    fn json_identifier(&self, value: &Value) -> Result<Value, Error> {
        match value {
            Value::String(id) => self.identifier(None, ResourceId::String(id.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(id) => self.identifier(None, ResourceId::Integer(id)),
                None => Err(Error::UnsupportedValue(format!(
                    "{} {} is not a resource identifier",
                    describe(value),
                    n
                ))),
            },
            Value::Object(obj) if obj.contains_key("type") && obj.contains_key("id") => {
                Ok(canonicalize(value))
            }
            other => Err(Error::UnsupportedValue(format!(
                "{} is not a resource identifier",
                describe(other)
            ))),
        }
    }

    fn model(&self, model: &dyn Identifiable) -> Result<Value, Error> {
        self.identifier(model.resource_type(), model.resource_id())
    }

    fn identifier(&self, resource_type: Option<String>, id: ResourceId) -> Result<Value, Error> {
        let resource_type = match (resource_type, self.expected_type) {
            (Some(resource_type), _) => resource_type,
            (None, Some(expected)) => expected.to_string(),
            (None, None) => {
                return Err(Error::UnsupportedValue(format!(
                    "identifier {} needs an expected resource type",
                    id
                )))
            }
        };

        Ok(ResourceIdentifier::new(resource_type, id).into())
    }
}

/// Rewrites ids of resource objects to their decimal string form.
///
/// Integer ids become strings and numeric string ids lose leading zeros,
/// other string ids are kept verbatim. An object is treated as a resource
/// when its `type` member is a string. The rest of the tree is copied
/// unchanged.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(list) => Value::Array(list.iter().map(canonicalize).collect()),
        Value::Object(obj) => {
            let is_resource = obj.get("type").map_or(false, Value::is_string);
            let mut copy = Map::with_capacity(obj.len());

            for (key, member) in obj {
                let member = match member {
                    Value::Number(n) if is_resource && key == "id" && !n.is_f64() => {
                        Value::String(n.to_string())
                    }
                    Value::String(id) if is_resource && key == "id" && is_decimal(id) => {
                        Value::String(decimal(id))
                    }
                    _ => canonicalize(member),
                };
                copy.insert(key.clone(), member);
            }

            Value::Object(copy)
        }
        scalar => scalar.clone(),
    }
}

fn is_decimal(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

// "007" -> "7", "0" stays "0"
fn decimal(id: &str) -> String {
    match id.trim_start_matches('0') {
        "" => "0".to_string(),
        digits => digits.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Post {
        route_key: i64,
    }

    impl Identifiable for Post {
        fn resource_id(&self) -> ResourceId {
            ResourceId::Integer(self.route_key)
        }
    }

    struct Comment(&'static str);

    impl Identifiable for Comment {
        fn resource_id(&self) -> ResourceId {
            self.0.into()
        }

        fn resource_type(&self) -> Option<String> {
            Some("comments".to_string())
        }
    }

    #[derive(Serialize)]
    struct Attributes {
        title: &'static str,
        published: bool,
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            canonicalize(&json!({ "type": "posts", "id": 1 })),
            json!({ "type": "posts", "id": "1" })
        );
        assert_eq!(
            canonicalize(&json!({ "data": [{ "type": "posts", "id": 2, "attributes": { "id": 3 } }] })),
            json!({ "data": [{ "type": "posts", "id": "2", "attributes": { "id": 3 } }] })
        );
        // not a resource, left alone
        assert_eq!(canonicalize(&json!({ "id": 1 })), json!({ "id": 1 }));
        assert_eq!(
            canonicalize(&json!({ "type": "posts", "id": 1.5 })),
            json!({ "type": "posts", "id": 1.5 })
        );
    }

    #[test]
    fn test_canonicalize_numeric_string_ids() {
        assert_eq!(
            canonicalize(&json!({ "type": "posts", "id": "01" })),
            json!({ "type": "posts", "id": "1" })
        );
        assert_eq!(
            canonicalize(&json!({ "type": "posts", "id": "000" })),
            json!({ "type": "posts", "id": "0" })
        );
        assert_eq!(
            canonicalize(&json!({ "type": "posts", "id": "12345678901234567890123" })),
            json!({ "type": "posts", "id": "12345678901234567890123" })
        );
        // non numeric ids are kept verbatim
        for id in ["01a", " 1", "-1", "", "abc"] {
            assert_eq!(
                canonicalize(&json!({ "type": "posts", "id": id })),
                json!({ "type": "posts", "id": id })
            );
        }
    }

    #[test]
    fn test_normalize_ids() {
        let normalizer = Normalizer::new().expecting_type("posts");

        assert_eq!(
            normalizer.normalize(1.into()).unwrap(),
            json!({ "type": "posts", "id": "1" })
        );
        assert_eq!(
            normalizer.normalize("1".into()).unwrap(),
            json!({ "type": "posts", "id": "1" })
        );
        assert_eq!(
            normalizer.normalize(vec![2, 1, 3].into()).unwrap(),
            json!([
                { "type": "posts", "id": "2" },
                { "type": "posts", "id": "1" },
                { "type": "posts", "id": "3" },
            ])
        );
    }

    #[test]
    fn test_normalize_models() {
        let normalizer = Normalizer::new().expecting_type("posts");

        let input = NormalizationInput::models(vec![Post { route_key: 2 }, Post { route_key: 1 }]);
        assert_eq!(
            normalizer.normalize(input).unwrap(),
            json!([{ "type": "posts", "id": "2" }, { "type": "posts", "id": "1" }])
        );

        // a model's own type wins over the expected one
        let input = NormalizationInput::model(Comment("abc"));
        assert_eq!(
            normalizer.normalize(input).unwrap(),
            json!({ "type": "comments", "id": "abc" })
        );
    }

    #[test]
    fn test_normalize_requires_expected_type() {
        let result = Normalizer::new().normalize(1.into());
        assert!(matches!(result, Err(Error::UnsupportedValue(_))));

        let input = NormalizationInput::model(Comment("abc"));
        assert!(Normalizer::new().normalize(input).is_ok());
    }

    #[test]
    fn test_normalize_value_passes_through() {
        let normalizer = Normalizer::new();
        let value = json!({ "data": { "attributes": { "title": "Hello" } } });
        assert_eq!(normalizer.normalize(value.clone().into()).unwrap(), value);
    }

    #[test]
    fn test_normalize_serialized() {
        let input = NormalizationInput::serialized(&Attributes {
            title: "Hello",
            published: true,
        })
        .unwrap();
        assert_eq!(
            Normalizer::new().normalize(input).unwrap(),
            json!({ "title": "Hello", "published": true })
        );
    }

    #[test]
    fn test_identifiers() {
        let normalizer = Normalizer::new().expecting_type("posts");

        let identifiers = normalizer
            .identifiers(json!([1, "2", { "type": "posts", "id": 3 }]).into())
            .unwrap();
        assert_eq!(
            identifiers,
            vec![
                json!({ "type": "posts", "id": "1" }),
                json!({ "type": "posts", "id": "2" }),
                json!({ "type": "posts", "id": "3" }),
            ]
        );

        let identifiers = normalizer.identifiers(Vec::<i64>::new().into()).unwrap();
        assert!(identifiers.is_empty());
    }

    #[test]
    fn test_identifiers_unsupported_values() {
        let normalizer = Normalizer::new().expecting_type("posts");

        for value in [json!([true]), json!([null]), json!([1.5]), json!([{ "title": "x" }])] {
            match normalizer.identifiers(value.into()) {
                Err(Error::UnsupportedValue(_)) => {}
                other => panic!("unexpected result {:?}", other),
            }
        }

        match normalizer.identifiers(json!([false]).into()) {
            Err(err) => assert_eq!(
                err.to_string(),
                "unsupported value: boolean is not a resource identifier"
            ),
            Ok(_) => panic!("booleans are not identifiers"),
        }
    }
}
