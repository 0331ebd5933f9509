use crate::error::{ApiError, FieldError};

/// Accumulates field errors so a request reports every problem at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless `ok`; returns `ok` for chaining
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) -> bool {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        ok
    }

    pub fn require<T: Copy>(&mut self, field: &str, value: Option<T>, message: &str) -> Option<T> {
        self.check(field, value.is_some(), message);
        value
    }

    /// Required string that must not be blank
    pub fn require_text<'a>(&mut self, field: &str, value: &'a Option<String>, message: &str) -> Option<&'a str> {
        let text = value.as_deref().map(str::trim).filter(|s| !s.is_empty());
        self.check(field, text.is_some(), message);
        text
    }

    /// Bounds check on an optional number; absent values pass
    pub fn range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64, message: &str) {
        if let Some(v) = value {
            self.check(field, v >= min && v <= max, message);
        }
    }

    pub fn min(&mut self, field: &str, value: Option<f64>, min: f64, message: &str) {
        if let Some(v) = value {
            self.check(field, v >= min, message);
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(email) = value {
            self.check(field, is_valid_email(email), "Invalid email address");
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::validation_error("Validation Error", self.errors)
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("admin@climatedashboard.com"));
        assert!(is_valid_email("a.b@sub.domain.org"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@example."));
    }

    #[test]
    fn collects_every_failure() {
        let mut v = Validator::new();
        let blank = Some("  ".to_string());
        let name = v.require_text("name", &blank, "Name is required");
        let lat = v.require("latitude", Some(120.0), "latitude is required");
        v.range("latitude", lat, -90.0, 90.0, "Latitude must be less than or equal to 90");
        assert!(name.is_none());
        assert!(!v.is_ok());

        match v.into_error() {
            ApiError::ValidationError { field_errors, .. } => {
                let fields: Vec<_> = field_errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "latitude"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn finish_passes_when_clean() {
        let mut v = Validator::new();
        v.min("rainfall", Some(0.0), 0.0, "Rainfall cannot be negative");
        v.email("email", None);
        assert!(v.finish().is_ok());
    }
}
