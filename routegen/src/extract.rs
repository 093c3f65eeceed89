use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::response::{self, IntoResponse};
use crate::router::{Request, Response};

/// Values captured by `{name}` route segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    /// Parameters the router attached to `req`, empty when there are none.
    pub fn from_request(req: &Request) -> Self {
        req.extensions().get::<PathParams>().cloned().unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Json<T> {
    pub fn from_request(req: &Request) -> Result<Self, Error> {
        let value: T = serde_json::from_slice(req.body())
            .map_err(|e| Error::bad_request(format!("invalid JSON: {}", e)))?;
        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => response::json(http::StatusCode::OK, body),
            Err(e) => Error::internal(format!("failed to serialize response: {}", e)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Product {
        id: u32,
        name: String,
    }

    fn request(body: &'static str) -> Request {
        http::Request::builder()
            .uri("/products")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_path_params_absent() {
        let params = PathParams::from_request(&request(""));
        assert!(params.is_empty());
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_path_params_from_extensions() {
        let mut params = PathParams::default();
        params.insert("id", "9");
        let mut req = request("");
        req.extensions_mut().insert(params.clone());

        assert_eq!(PathParams::from_request(&req), params);
    }

    #[test]
    fn test_json_from_request() {
        let Json(product) = Json::<Product>::from_request(&request(r#"{"id":1,"name":"lamp"}"#)).unwrap();
        assert_eq!(
            product,
            Product {
                id: 1,
                name: "lamp".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_json_is_bad_request() {
        let err = Json::<Product>::from_request(&request("{")).err().unwrap();
        assert_eq!(err.status, 400);
        assert!(err.message.starts_with("invalid JSON"));
    }

    #[test]
    fn test_json_response() {
        let response = Json(Product {
            id: 2,
            name: "desk".to_string(),
        })
        .into_response();
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.body(), &Bytes::from_static(br#"{"id":2,"name":"desk"}"#));
    }
}
