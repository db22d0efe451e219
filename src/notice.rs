//! # Error notices.
//!
//! A [`Notice`] is the payload delivered through [`Backend::notify`](crate::Backend::notify):
//! the error class and message, a unique token the application can show to users,
//! and the context attached at report time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// One reported error.
///
/// # Example
/// ```rust
/// use faultline::Notice;
///
/// let err = std::io::Error::other("disk full");
/// let notice = Notice::from_error(&err);
/// assert_eq!(notice.error_message, "disk full");
/// assert!(notice.error_class.ends_with("Error"));
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Notice {
    /// Unique identifier of this report.
    pub token: Uuid,
    /// Error type name.
    pub error_class: String,
    /// Rendered error message.
    pub error_message: String,
    /// Environment the error happened in.
    pub environment: Option<String>,
    /// Extra key/value data attached to the report.
    pub context: Map<String, Value>,
    /// When the notice was created.
    pub occurred_at: DateTime<Utc>,
}

impl Notice {
    /// Builds a notice from any error, using its Rust type name as the class.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::build(std::any::type_name::<E>(), error.to_string())
    }

    /// Builds a notice from a plain message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::build("Error", message.into())
    }

    fn build(class: &str, message: String) -> Self {
        Self {
            token: Uuid::new_v4(),
            error_class: class.to_string(),
            error_message: message,
            environment: None,
            context: Map::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Sets the environment name.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Merges `context` into the notice; existing keys are overwritten.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context.extend(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Custom;

    impl std::fmt::Display for Custom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("custom failure")
        }
    }

    impl std::error::Error for Custom {}

    #[test]
    fn test_class_is_type_name() {
        let notice = Notice::from_error(&Custom);
        assert!(notice.error_class.ends_with("Custom"), "{}", notice.error_class);
        assert_eq!(notice.error_message, "custom failure");
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = Notice::from_message("boom");
        let b = Notice::from_message("boom");
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_context_merge_overwrites() {
        let mut first = Map::new();
        first.insert("user".into(), json!(1));
        first.insert("page".into(), json!("/"));
        let mut second = Map::new();
        second.insert("user".into(), json!(2));

        let notice = Notice::from_message("boom")
            .with_context(first)
            .with_context(second);
        assert_eq!(notice.context.get("user"), Some(&json!(2)));
        assert_eq!(notice.context.get("page"), Some(&json!("/")));
    }

    #[test]
    fn test_serializes_token_and_message() {
        let notice = Notice::from_message("boom").with_environment("staging");
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value["error_message"], json!("boom"));
        assert_eq!(value["environment"], json!("staging"));
        assert_eq!(value["token"], json!(notice.token.to_string()));
    }
}
