use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Transport-agnostic description of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
    encode_error: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            encode_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append every non-null field of `params` as a query pair.
    ///
    /// Arrays repeat the key once per element; nested objects are sent as JSON text.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Self {
        match serde_json::to_value(params) {
            Ok(Value::Object(fields)) => {
                for (name, value) in fields {
                    push_pair(&mut self.query, &name, value);
                }
            }
            Ok(Value::Null) => {}
            Ok(other) => {
                self.encode_error = Some(format!(
                    "query parameters must serialize to an object, got {other}"
                ));
            }
            Err(err) => self.encode_error = Some(err.to_string()),
        }
        self
    }

    pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(err) => self.encode_error = Some(err.to_string()),
        }
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Set when query or body serialization failed; such a request is never sent.
    pub fn encode_error(&self) -> Option<&str> {
        self.encode_error.as_deref()
    }
}

fn push_pair(query: &mut Vec<(String, String)>, name: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(text) => query.push((name.to_string(), text)),
        Value::Bool(flag) => query.push((name.to_string(), flag.to_string())),
        Value::Number(number) => query.push((name.to_string(), number.to_string())),
        Value::Array(items) => {
            for item in items {
                push_pair(query, name, item);
            }
        }
        object @ Value::Object(_) => query.push((name.to_string(), object.to_string())),
    }
}
