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

use std::collections::HashMap;

use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde_json::Value;

use crate::document::Document;
use crate::domain::MEDIA_TYPE;
use crate::error::{AssertionError, Error, Failure};
use crate::json_diff::pointer::JSONPointer;
use crate::json_diff::ComparisonPolicy;
use crate::normalize::{NormalizationInput, Normalizer};

const DATA: &str = "/data";

/// An HTTP response under test.
///
/// Status and media type are checked before the body is looked at; the body
/// is parsed into a [`Document`] only when an assertion needs it. Every
/// `with_*` method returns a new message.
///
/// # Examples
///
/// ```
/// use jsonapi_assert::HttpMessage;
/// use std::collections::HashMap;
///
/// let http = HttpMessage::new(
///     200,
///     Some("application/vnd.api+json".to_string()),
///     Some(r#"{"data": [{"type": "posts", "id": "1"}, {"type": "posts", "id": "2"}]}"#.to_string()),
///     HashMap::new(),
/// )
/// .will_see_type("posts");
///
/// assert!(http.assert_fetched_to_many(vec![2, 1]).is_ok());
/// assert!(http.assert_fetched_to_many_in_order(vec![2, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HttpMessage {
    status: u16,
    media_type: Option<String>,
    content: Option<String>,
    headers: HashMap<String, String>,
    expected_type: Option<String>,
}

impl HttpMessage {
    pub fn new(
        status: u16,
        media_type: Option<String>,
        content: Option<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            status,
            media_type,
            content,
            headers: lowercase_keys(headers),
            expected_type: None,
        }
    }

    /// Reads status, headers and body of a response.
    pub async fn from_response(response: Response) -> Result<Self, Error> {
        let status = response.status().as_u16();
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect::<HashMap<_, _>>();
        let content = response.text().await?;
        let content = if content.is_empty() { None } else { Some(content) };

        Ok(Self::new(status, media_type, content, headers))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn with_status(&self, status: u16) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn with_media_type(&self, media_type: impl Into<String>) -> Self {
        Self {
            media_type: Some(media_type.into()),
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..self.clone()
        }
    }

    pub fn with_headers(&self, headers: HashMap<String, String>) -> Self {
        Self {
            headers: lowercase_keys(headers),
            ..self.clone()
        }
    }

    /// Sets the resource type bare identifiers are expanded with.
    pub fn will_see_type(&self, resource_type: impl Into<String>) -> Self {
        Self {
            expected_type: Some(resource_type.into()),
            ..self.clone()
        }
    }

    /// Parses the body.
    pub fn document(&self) -> Result<Document, Error> {
        Document::parse(self.content.as_deref().unwrap_or_default())
    }

    pub fn assert_status(&self, expected: u16) -> Result<(), AssertionError> {
        if self.status != expected {
            return Err(Failure::new(
                format!("status {} is {}", self.status, expected),
                self.context(),
            )
            .into());
        }
        Ok(())
    }

    /// Compares media types ignoring case and parameters.
    pub fn assert_media_type(&self, expected: &str) -> Result<(), AssertionError> {
        let matches = self
            .media_type
            .as_deref()
            .map_or(false, |actual| essence(actual) == essence(expected));

        if !matches {
            return Err(Failure::new(
                format!(
                    "media type {} is {}",
                    self.media_type.as_deref().unwrap_or("(none)"),
                    expected
                ),
                self.context(),
            )
            .into());
        }
        Ok(())
    }

    pub fn assert_json_api(&self) -> Result<(), AssertionError> {
        self.assert_media_type(MEDIA_TYPE)
    }

    pub fn assert_header(&self, name: &str, expected: &str) -> Result<(), AssertionError> {
        match self.header(name) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(Failure::new(
                format!("header {} is {}", name, expected),
                format!("got {}", actual),
            )
            .into()),
            None => Err(Failure::new(
                format!("header {} is {}", name, expected),
                "header not present",
            )
            .into()),
        }
    }

    /// Asserts the body contains `expected` at `pointer`.
    pub fn assert_subset<P: JSONPointer + ?Sized>(
        &self,
        pointer: &P,
        expected: impl Into<NormalizationInput>,
        policy: &ComparisonPolicy,
    ) -> Result<(), AssertionError> {
        let expected = self.normalizer().normalize(expected.into())?;
        self.document()?.assert_subset(pointer, &expected, policy)
    }

    /// Asserts a successful fetch of exactly the given resources, in any
    /// order.
    pub fn assert_fetched_to_many(
        &self,
        expected: impl Into<NormalizationInput>,
    ) -> Result<(), AssertionError> {
        self.assert_fetched()?;
        self.assert_identifiers(expected.into(), ComparisonPolicy::strict())
    }

    /// Asserts a successful fetch of exactly the given resources, in the
    /// given order.
    pub fn assert_fetched_to_many_in_order(
        &self,
        expected: impl Into<NormalizationInput>,
    ) -> Result<(), AssertionError> {
        self.assert_fetched()?;
        self.assert_identifiers(expected.into(), ComparisonPolicy::strict().ordered(true))
    }

    /// Asserts a successful fetch of a single resource with the given
    /// identifier. Other members of the resource are not compared.
    pub fn assert_fetched_one(
        &self,
        expected: impl Into<NormalizationInput>,
    ) -> Result<(), AssertionError> {
        self.assert_fetched()?;

        let mut identifiers = self.normalizer().identifiers(expected.into())?;
        if identifiers.len() != 1 {
            return Err(Error::UnsupportedValue(format!(
                "expected one resource identifier, got {}",
                identifiers.len()
            ))
            .into());
        }

        let identifier = identifiers.remove(0);
        self.document()?
            .assert_subset(DATA, &identifier, &ComparisonPolicy::loose())
    }

    /// Asserts a successful fetch of an empty to-one relation.
    pub fn assert_fetched_null(&self) -> Result<(), AssertionError> {
        self.assert_fetched()?;
        self.document()?
            .assert_subset(DATA, &Value::Null, &ComparisonPolicy::strict())
    }

    fn assert_fetched(&self) -> Result<(), AssertionError> {
        self.assert_status(200)?;
        self.assert_json_api()
    }

    fn assert_identifiers(
        &self,
        expected: NormalizationInput,
        policy: ComparisonPolicy,
    ) -> Result<(), AssertionError> {
        let identifiers = Value::Array(self.normalizer().identifiers(expected)?);
        self.document()?
            .assert_subset(DATA, &identifiers, &policy.exhaustive(true))
    }

    fn normalizer(&self) -> Normalizer<'_> {
        match &self.expected_type {
            Some(resource_type) => Normalizer::new().expecting_type(resource_type),
            None => Normalizer::new(),
        }
    }

    fn context(&self) -> String {
        match &self.content {
            Some(content) => match Document::parse(content) {
                Ok(document) => format!("within JSON API document:\n{}", document),
                Err(_) => format!("with content:\n{}", content),
            },
            None => "with no content".to_string(),
        }
    }
}

fn lowercase_keys(headers: HashMap<String, String>) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identifiable, ResourceId, ResourceIdentifier};
    use serde_json::json;
    use test_case::test_case;

    struct Model {
        route_key: i64,
    }

    impl Identifiable for Model {
        fn resource_id(&self) -> ResourceId {
            ResourceId::Integer(self.route_key)
        }
    }

    fn post(id: &str) -> Value {
        json!({ "type": "posts", "id": id })
    }

    fn http() -> HttpMessage {
        let headers = vec![
            ("Content-Type".to_string(), MEDIA_TYPE.to_string()),
            ("Accept".to_string(), MEDIA_TYPE.to_string()),
        ]
        .into_iter()
        .collect();

        HttpMessage::new(
            200,
            Some(MEDIA_TYPE.to_string()),
            Some(json!({ "data": [post("1"), post("2"), post("3")] }).to_string()),
            headers,
        )
        .will_see_type("posts")
    }

    fn models(ids: &[i64]) -> NormalizationInput {
        NormalizationInput::models(ids.iter().map(|id| Model { route_key: *id }))
    }

    fn assert_fails(result: Result<(), AssertionError>, headline: &str) {
        match result {
            Err(AssertionError::Failed(failure)) => assert!(
                failure.headline.contains(headline),
                "\"{}\" does not contain \"{}\"",
                failure.headline,
                headline
            ),
            Err(AssertionError::Invalid(err)) => panic!("assertion not evaluated: {}", err),
            Ok(()) => panic!("assertion passed, expected \"{}\"", headline),
        }
    }

    #[test]
    fn test_fetched_to_many_with_models() {
        let http = http();

        // order is not asserted
        assert!(http.assert_fetched_to_many(models(&[2, 1, 3])).is_ok());

        assert_fails(
            http.assert_fetched_to_many(models(&[])),
            "the document has an empty list at [/data]",
        );
        assert_fails(
            http.assert_fetched_to_many(models(&[1, 3])),
            "the list at [/data] only contains the values",
        );
        assert_fails(
            http.assert_fetched_to_many(models(&[1, 4, 3])),
            "the list at [/data] only contains the values",
        );
    }

    #[test]
    fn test_fetched_to_many_with_integers() {
        let http = http();

        assert!(http.assert_fetched_to_many(vec![2, 1, 3]).is_ok());
        assert_fails(
            http.assert_fetched_to_many(Vec::<i64>::new()),
            "the document has an empty list at [/data]",
        );
        assert_fails(
            http.assert_fetched_to_many(vec![1, 3]),
            "the list at [/data] only contains the values",
        );
        assert_fails(
            http.assert_fetched_to_many(vec![1, 4, 3]),
            "the list at [/data] only contains the values",
        );
    }

    #[test]
    fn test_fetched_to_many_with_strings() {
        let http = http();

        assert!(http.assert_fetched_to_many(vec!["2", "1", "3"]).is_ok());
        assert_fails(
            http.assert_fetched_to_many(vec!["1", "3"]),
            "the list at [/data] only contains the values",
        );
        assert_fails(
            http.assert_fetched_to_many(vec!["1", "4", "3"]),
            "the list at [/data] only contains the values",
        );
    }

    #[test_case(true, json!([post("1"), post("2"), post("3")]) ; "in order")]
    #[test_case(true, json!([post("3"), post("1"), post("2")]) ; "not in order")]
    #[test_case(false, json!([post("1"), { "type": "foobar", "id": "2" }, post("3")]) ; "invalid type")]
    #[test_case(false, json!([post("1"), post("20"), post("3")]) ; "invalid id")]
    fn test_fetched_to_many_with_array(passes: bool, expected: Value) {
        let result = http().assert_fetched_to_many(expected);

        if passes {
            assert!(result.is_ok());
        } else {
            assert_fails(result, "the list at [/data] only contains the values");
        }
    }

    #[test_case(true, json!([post("1"), post("2"), post("3")]) ; "in order")]
    #[test_case(false, json!([post("3"), post("1"), post("2")]) ; "not in order")]
    #[test_case(false, json!([post("1"), { "type": "foobar", "id": "2" }, post("3")]) ; "invalid type")]
    #[test_case(false, json!([post("1"), post("20"), post("3")]) ; "invalid id")]
    fn test_fetched_to_many_in_order_with_array(passes: bool, expected: Value) {
        let result = http().assert_fetched_to_many_in_order(expected);

        if passes {
            assert!(result.is_ok());
        } else {
            assert_fails(
                result,
                "the member at [/data] matches the resource identifiers",
            );
        }
    }

    #[test]
    fn test_fetched_to_many_in_order() {
        let http = http();

        assert!(http.assert_fetched_to_many_in_order(vec![1, 2, 3]).is_ok());
        assert!(http.assert_fetched_to_many_in_order(models(&[1, 2, 3])).is_ok());
        assert_fails(
            http.assert_fetched_to_many_in_order(Vec::<i64>::new()),
            "the document has an empty list at [/data]",
        );
        assert_fails(
            http.assert_fetched_to_many_in_order(vec![1, 3, 2]),
            "member at [/data] matches the resource identifiers",
        );
        assert_fails(
            http.assert_fetched_to_many_in_order(vec!["1", "4", "3"]),
            "member at [/data] matches the resource identifiers",
        );
    }

    #[test]
    fn test_fetched_to_many_with_resources() {
        let resources = json!({
            "data": [
                { "type": "posts", "id": "1", "attributes": { "title": "One" } },
                { "type": "posts", "id": "2", "attributes": { "title": "Two" } },
                { "type": "posts", "id": "3", "attributes": { "title": "Three" } },
            ]
        });
        let http = http().with_content(resources.to_string());

        assert_fails(
            http.assert_fetched_to_many(vec![
                ResourceIdentifier::new("posts", 1),
                ResourceIdentifier::new("posts", 2),
                ResourceIdentifier::new("posts", 3),
            ]),
            "list at [/data] only contains the values",
        );
        assert_fails(
            http.assert_fetched_to_many_in_order(vec![1, 2, 3]),
            "member at [/data] matches the resource identifiers",
        );
    }

    #[test]
    fn test_fetched_to_many_requires_expected_type() {
        let http = HttpMessage::new(
            200,
            Some(MEDIA_TYPE.to_string()),
            Some(json!({ "data": [post("1")] }).to_string()),
            HashMap::new(),
        );

        assert!(matches!(
            http.assert_fetched_to_many(vec![1]),
            Err(AssertionError::Invalid(Error::UnsupportedValue(_)))
        ));
        assert!(http.assert_fetched_to_many(json!([post("1")])).is_ok());
    }

    #[test]
    fn test_status_fails_before_body() {
        let http = http().with_status(404).with_content("not json");

        let err = http.assert_fetched_to_many(vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.headline(), Some("status 404 is 200"));
        assert!(err.to_string().contains("with content:\nnot json"));
    }

    #[test]
    fn test_media_type() {
        let http = http();

        assert!(http.assert_json_api().is_ok());
        assert!(http
            .with_media_type("application/vnd.api+json; charset=utf-8")
            .assert_json_api()
            .is_ok());

        let err = http
            .with_media_type("application/json")
            .assert_fetched_to_many(vec![1, 2, 3])
            .unwrap_err();
        assert!(err.headline().unwrap().contains("media type"));
    }

    #[test]
    fn test_headers() {
        let http = http();

        assert_eq!(http.header("content-type"), Some(MEDIA_TYPE));
        assert!(http.assert_header("Accept", MEDIA_TYPE).is_ok());
        assert_fails(
            http.assert_header("Accept", "application/json"),
            "header Accept is application/json",
        );
        assert_fails(
            http.with_headers(HashMap::new()).assert_header("Accept", MEDIA_TYPE),
            "header Accept is",
        );
    }

    #[test]
    fn test_with_methods_copy() {
        let http = http();
        let other = http.with_status(201).with_content("{}");

        assert_eq!(http.status(), 200);
        assert_ne!(http.content(), other.content());
        assert_eq!(other.status(), 201);
    }

    #[test]
    fn test_fetched_one() {
        let http = http().with_content(
            json!({ "data": { "type": "posts", "id": "1", "attributes": { "title": "One" } } })
                .to_string(),
        );

        assert!(http.assert_fetched_one(1).is_ok());
        assert!(http.assert_fetched_one(ResourceIdentifier::new("posts", "1")).is_ok());
        assert_fails(
            http.assert_fetched_one(2),
            "the member at [/data] matches the subset",
        );
        assert!(matches!(
            http.assert_fetched_one(vec![1, 2]),
            Err(AssertionError::Invalid(Error::UnsupportedValue(_)))
        ));
    }

    #[test]
    fn test_fetched_null() {
        let http = http().with_content(r#"{"data": null}"#);
        assert!(http.assert_fetched_null().is_ok());
        assert_fails(
            self::http().assert_fetched_null(),
            "the member at [/data] matches the subset",
        );
    }

    #[test]
    fn test_assert_subset_and_parse_error() {
        let http = http();

        assert!(http
            .assert_subset("/data/0", json!({ "type": "posts" }), &ComparisonPolicy::loose())
            .is_ok());
        assert!(matches!(
            http.with_content("{").assert_subset("/data", json!([]), &ComparisonPolicy::loose()),
            Err(AssertionError::Invalid(Error::Parse(_)))
        ));
    }

    #[tokio::test]
    async fn test_from_response() {
        let body = json!({ "data": [post("1"), post("2"), post("3")] }).to_string();
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_header("content-type", MEDIA_TYPE)
            .with_header("x-request-id", "abc")
            .with_body(body)
            .create_async()
            .await;

        let response = reqwest::get(format!("{}/posts", server.url()))
            .await
            .unwrap();
        let http = HttpMessage::from_response(response)
            .await
            .unwrap()
            .will_see_type("posts");

        assert_eq!(http.status(), 200);
        assert_eq!(http.header("X-Request-Id"), Some("abc"));
        assert!(http.assert_fetched_to_many(vec![3, 2, 1]).is_ok());
        assert!(http.assert_fetched_to_many_in_order(vec![1, 2, 3]).is_ok());
    }

    #[tokio::test]
    async fn test_from_response_without_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/posts/1")
            .with_status(204)
            .create_async()
            .await;

        let response = reqwest::Client::new()
            .delete(format!("{}/posts/1", server.url()))
            .send()
            .await
            .unwrap();
        let http = HttpMessage::from_response(response).await.unwrap();

        assert!(http.assert_status(204).is_ok());
        assert_eq!(http.content(), None);
        assert_fails(http.assert_status(200), "status 204 is 200");
    }
}
