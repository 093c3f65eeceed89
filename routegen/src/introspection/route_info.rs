//! Route metadata for introspection.

use serde::Serialize;

/// Metadata about a registered route.
///
/// # Examples
///
/// ```
/// use routegen::introspection::RouteInfo;
///
/// let info = RouteInfo::new("GET", "products/{id}").with_name("ProductById");
/// assert_eq!(info.method, "GET");
/// assert_eq!(info.name.as_deref(), Some("ProductById"));
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteInfo {
    /// The HTTP method (GET, POST, PUT, DELETE).
    pub method: String,
    /// The path pattern with parameters (e.g., "products/{id}").
    pub path: String,
    /// Name given through `with_name`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub requires_authorization: bool,
}

impl RouteInfo {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            name: None,
            requires_authorization: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_info_new() {
        let info = RouteInfo::new("GET", "products");
        assert_eq!(info.method, "GET");
        assert_eq!(info.path, "products");
        assert!(info.name.is_none());
        assert!(!info.requires_authorization);
    }

    #[test]
    fn test_route_info_serialize() {
        let info = RouteInfo::new("GET", "health");
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"method":"GET","path":"health","requires_authorization":false}"#
        );

        let named = serde_json::to_string(&info.with_name("Health")).unwrap();
        assert!(named.contains("\"name\":\"Health\""));
    }
}
