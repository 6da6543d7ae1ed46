//! Order details and checkout validation.
//!
//! Validation runs locally before any remote call; the remote service's
//! structured validation errors map into the same field→message shape so
//! the checkout form renders both identically.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use redseam_core::Email;

/// Field-level validation errors, ordered by field name.
///
/// Holds one message per field - the first message when the remote side
/// returns several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// An empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, keeping an earlier message if present.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// The message for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Map a remote per-field error array into this shape, taking the
    /// first message per field.
    #[must_use]
    pub fn from_remote(errors: &HashMap<String, Vec<String>>) -> Self {
        let mut result = Self::new();
        for (field, messages) in errors {
            if let Some(first) = messages.first() {
                result.insert(field, first);
            }
        }
        result
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Checkout form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub zip_code: String,
    pub address: String,
}

impl OrderDetails {
    /// A copy with every field trimmed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: self.email.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }

    /// Validate all fields.
    ///
    /// # Errors
    ///
    /// Returns the field→message map when any field is missing or the
    /// email is not a `local@domain.tld` shape.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.surname.trim().is_empty() {
            errors.insert("surname", "Surname is required");
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        } else {
            match Email::parse(email) {
                Ok(parsed) if parsed.has_dotted_domain() => {}
                _ => errors.insert("email", "Please enter a valid email"),
            }
        }

        if self.zip_code.trim().is_empty() {
            errors.insert("zip_code", "Zip code is required");
        }
        if self.address.trim().is_empty() {
            errors.insert("address", "Address is required");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Successful checkout payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Confirmation message from the remote service.
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_order() -> OrderDetails {
        OrderDetails {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            zip_code: "0193".to_string(),
            address: "12 Analytical St".to_string(),
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(valid_order().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_have_messages() {
        let errors = OrderDetails::default().validate().unwrap_err();

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("surname"), Some("Surname is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("zip_code"), Some("Zip code is required"));
        assert_eq!(errors.get("address"), Some("Address is required"));
    }

    #[test]
    fn test_whitespace_only_fields_rejected() {
        let mut order = valid_order();
        order.address = "   ".to_string();

        let errors = order.validate().unwrap_err();
        assert_eq!(errors.get("address"), Some("Address is required"));
    }

    #[test]
    fn test_email_shape_requires_dotted_domain() {
        let mut order = valid_order();
        order.email = "ada@localhost".to_string();
        let errors = order.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email"));

        order.email = "not-an-email".to_string();
        let errors = order.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email"));
    }

    #[test]
    fn test_normalized_trims_fields() {
        let mut order = valid_order();
        order.name = "  Ada  ".to_string();

        assert_eq!(order.normalized().name, "Ada");
    }

    #[test]
    fn test_from_remote_takes_first_message() {
        let mut remote = HashMap::new();
        remote.insert(
            "zip_code".to_string(),
            vec![
                "The zip code field is required.".to_string(),
                "The zip code must be numeric.".to_string(),
            ],
        );

        let errors = FieldErrors::from_remote(&remote);
        assert_eq!(errors.get("zip_code"), Some("The zip code field is required."));
    }

    #[test]
    fn test_display_joins_fields_in_order() {
        let mut errors = FieldErrors::new();
        errors.insert("surname", "Surname is required");
        errors.insert("name", "Name is required");

        assert_eq!(
            errors.to_string(),
            "name: Name is required; surname: Surname is required"
        );
    }
}
