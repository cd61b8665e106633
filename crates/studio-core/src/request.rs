//! Request intents and decoded responses.
//!
//! A [`RequestIntent`] is a fully specified, not-yet-sent request. Its body is
//! a sum type, so a request carrying both JSON and multipart content cannot
//! be constructed.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::error::{ProtocolError, ValidationError};

/// HTTP method of a request intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path relative to the backend base URL, kept as raw segments.
///
/// Segments are percent-encoded only when the absolute URL is built, so a
/// token or identifier can never inject extra path components. Empty, `.`
/// and `..` segments would be collapsed by URL normalization and are
/// rejected by [`check`](Self::check) instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(Vec<String>);

impl ApiPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the raw (unencoded) segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Fails if a segment would not survive as its own path component.
    pub fn check(&self) -> Result<()> {
        match self
            .segments()
            .find(|s| matches!(s.trim(), "" | "." | ".."))
        {
            Some(segment) => Err(ValidationError::InvalidPathSegment {
                segment: segment.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        f.write_str("/")
    }
}

/// One file attached to a multipart payload.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Text fields plus binary attachments, sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append a file under `field`. Repeating a field name sends a list.
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            mime,
            bytes,
        });
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Returns the first value of a text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<FilePart>) {
        (self.fields, self.files)
    }
}

/// Body of a request intent: nothing, structured JSON, or multipart.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serialize a value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(|e| ValidationError::Encoding {
            reason: e.to_string(),
        })?;
        Ok(RequestBody::Json(value))
    }

    /// Build a body from loosely-typed optional parts.
    ///
    /// Fails with [`ValidationError::AmbiguousBody`] when both are present.
    pub fn from_parts(json: Option<Value>, multipart: Option<MultipartForm>) -> Result<Self> {
        match (json, multipart) {
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousBody.into()),
            (Some(json), None) => Ok(RequestBody::Json(json)),
            (None, Some(form)) => Ok(RequestBody::Multipart(form)),
            (None, None) => Ok(RequestBody::Empty),
        }
    }
}

/// A fully specified request, not yet sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestIntent {
    method: Method,
    path: ApiPath,
    body: RequestBody,
}

impl RequestIntent {
    pub fn new(method: Method, path: ApiPath, body: RequestBody) -> Self {
        Self { method, path, body }
    }

    pub fn get(path: ApiPath) -> Self {
        Self::new(Method::Get, path, RequestBody::Empty)
    }

    pub fn delete(path: ApiPath) -> Self {
        Self::new(Method::Delete, path, RequestBody::Empty)
    }

    pub fn post_json<T: Serialize + ?Sized>(path: ApiPath, body: &T) -> Result<Self> {
        Ok(Self::new(Method::Post, path, RequestBody::json(body)?))
    }

    pub fn post_multipart(path: ApiPath, form: MultipartForm) -> Self {
        Self::new(Method::Post, path, RequestBody::Multipart(form))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &ApiPath {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Split into owned parts for dispatch.
    pub fn into_parts(self) -> (Method, ApiPath, RequestBody) {
        (self.method, self.path, self.body)
    }
}

/// A successful response, decoded per its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Empty,
    Json(Value),
    Text(String),
}

impl Response {
    /// Decode the body into a typed value.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` accept it.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Response::Json(value) => value,
            Response::Empty => Value::Null,
            Response::Text(text) => {
                return Err(ProtocolError::UnexpectedResponse {
                    message: format!("expected JSON, got text ({} bytes)", text.len()),
                }
                .into());
            }
        };

        serde_json::from_value(value).map_err(|e| {
            ProtocolError::UnexpectedResponse {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Returns a human-readable message carried by the body, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Response::Json(value) => extract_message(value),
            Response::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        }
    }
}

/// Extract a human-readable message from a JSON body.
///
/// Looks at `detail`, `error` and `message` first, then falls back to the
/// first entry of a field-error map such as `{"password": ["Too short."]}`.
pub fn extract_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(extract_message),
        Value::Object(map) => {
            for key in ["detail", "error", "message"] {
                if let Some(msg) = map.get(key).and_then(extract_message) {
                    return Some(msg);
                }
            }
            map.iter().find_map(|(field, v)| {
                let msg = extract_message(v)?;
                if field == "non_field_errors" {
                    Some(msg)
                } else {
                    Some(format!("{field}: {msg}"))
                }
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorCategory};
    use serde_json::json;

    #[test]
    fn path_display_has_trailing_slash() {
        assert_eq!(ApiPath::new(["auth", "login"]).to_string(), "/auth/login/");
    }

    #[test]
    fn dot_and_empty_segments_are_rejected() {
        for segment in ["", " ", ".", ".."] {
            assert!(matches!(
                ApiPath::new(["payments", segment]).check(),
                Err(Error::Validation(ValidationError::InvalidPathSegment { .. }))
            ));
        }
        assert!(ApiPath::new(["payments", "tx-1"]).check().is_ok());
        assert!(ApiPath::new(["auth", "verify-reset-token", "a..b"]).check().is_ok());
    }

    #[test]
    fn hybrid_body_is_rejected() {
        let form = MultipartForm::new().text("prompt", "a cat");
        let err = RequestBody::from_parts(Some(json!({"prompt": "a cat"})), Some(form)).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::AmbiguousBody)
        ));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn from_parts_picks_the_single_body() {
        let body = RequestBody::from_parts(Some(json!({"a": 1})), None).unwrap();
        assert!(matches!(body, RequestBody::Json(_)));

        let body = RequestBody::from_parts(None, Some(MultipartForm::new())).unwrap();
        assert!(matches!(body, RequestBody::Multipart(_)));

        let body = RequestBody::from_parts(None, None).unwrap();
        assert_eq!(body, RequestBody::Empty);
    }

    #[test]
    fn multipart_keeps_repeated_files() {
        let form = MultipartForm::new()
            .text("prompt", "a cat")
            .file("images", "a.png", None, vec![1, 2])
            .file("images", "b.png", Some("image/png".into()), vec![3]);
        assert_eq!(form.files().len(), 2);
        assert_eq!(form.field("prompt"), Some("a cat"));
        assert_eq!(form.field("thread"), None);
    }

    #[test]
    fn extracts_common_message_fields() {
        assert_eq!(
            extract_message(&json!({"detail": "Insufficient credits"})).as_deref(),
            Some("Insufficient credits")
        );
        assert_eq!(
            extract_message(&json!({"error": "Invalid token"})).as_deref(),
            Some("Invalid token")
        );
        assert_eq!(
            extract_message(&json!({"password": ["Ensure this field has at least 8 characters."]}))
                .as_deref(),
            Some("password: Ensure this field has at least 8 characters.")
        );
        assert_eq!(
            extract_message(&json!({"non_field_errors": ["Bad pair"]})).as_deref(),
            Some("Bad pair")
        );
        assert_eq!(extract_message(&json!({"count": 3})), None);
    }

    #[test]
    fn empty_response_decodes_as_unit() {
        Response::Empty.json::<()>().unwrap();
        assert_eq!(Response::Empty.json::<Option<u32>>().unwrap(), None);
    }

    #[test]
    fn text_response_is_not_json() {
        let err = Response::Text("<html>".into()).json::<Value>().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Protocol);
    }
}
