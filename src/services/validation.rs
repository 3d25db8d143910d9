use garde::Validate;
use serde::de::DeserializeOwned;

use crate::models::submission::{ContactForm, ContactSubmission, QuoteForm, QuoteSubmission};

/// Validation failure. The message lists every violated field as
/// `field: reason` joined with `, `.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Parse a raw request body and validate it as a contact submission.
pub fn validate_contact(body: &[u8]) -> Result<ContactSubmission, ValidationError> {
    let form: ContactForm = parse_and_check(body, ContactForm::FIELDS)?;

    Ok(ContactSubmission {
        name: form.name.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        phone: form.phone,
        gym_name: form.gym_name,
        city: form.city,
        activity: form.activity,
        message: form.message.unwrap_or_default(),
    })
}

/// Parse a raw request body and validate it as a quote submission.
pub fn validate_quote(body: &[u8]) -> Result<QuoteSubmission, ValidationError> {
    let form: QuoteForm = parse_and_check(body, QuoteForm::FIELDS)?;

    Ok(QuoteSubmission {
        name: form.name.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        phone: form.phone.unwrap_or_default(),
        gym_name: form.gym_name.unwrap_or_default(),
        postal_code: form.postal_code.unwrap_or_default(),
        city: form.city.unwrap_or_default(),
        activities: form.activities,
        surfaces: form.surfaces,
        surface_area: form.surface_area,
        frequency: form.frequency,
        message: form.message,
    })
}

/// Parse `body` and run the garde rules. Violations are reported under the
/// body key the client sent, ordered as in `fields`.
fn parse_and_check<T>(body: &[u8], fields: &[&str]) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    let form: T = serde_json::from_slice(body)
        .map_err(|e| ValidationError(format!("body: invalid JSON payload ({e})")))?;

    form.validate().map_err(|report| {
        let mut violations = report
            .iter()
            .map(|(path, error)| (wire_name(&path.to_string()), error.to_string()))
            .collect::<Vec<_>>();
        violations.sort_by_key(|(field, _)| {
            fields
                .iter()
                .position(|f| *f == field.as_str())
                .unwrap_or(fields.len())
        });

        let message = violations
            .iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect::<Vec<_>>()
            .join(", ");
        ValidationError(message)
    })?;

    Ok(form)
}

/// `gym_name` -> `gymName`, matching `#[serde(rename_all = "camelCase")]`.
fn wire_name(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut upper = false;
    for c in path.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: &ValidationError) -> Vec<&str> {
        err.0
            .split(", ")
            .map(|s| s.split(':').next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_valid_contact_minimal() {
        let body = br#"{"name":"Jean Dupont","email":"jean@example.com","message":"Bonjour, je voudrais un devis."}"#;
        let contact = validate_contact(body).unwrap();
        assert_eq!(contact.name, "Jean Dupont");
        assert_eq!(contact.email, "jean@example.com");
        assert_eq!(contact.message, "Bonjour, je voudrais un devis.");
        assert!(contact.phone.is_none());
        assert!(contact.gym_name.is_none());
        assert!(contact.city.is_none());
        assert!(contact.activity.is_none());
    }

    #[test]
    fn test_valid_contact_with_optional_fields() {
        let body = br#"{"name":"Jo","email":"jo@club.fr","message":"0123456789","phone":"1","gymName":"X","city":"Lyon","activity":"Judo"}"#;
        let contact = validate_contact(body).unwrap();
        assert_eq!(contact.phone.as_deref(), Some("1"));
        assert_eq!(contact.gym_name.as_deref(), Some("X"));
        assert_eq!(contact.activity.as_deref(), Some("Judo"));
    }

    #[test]
    fn test_contact_collects_every_violation() {
        let err = validate_contact(br#"{"name":"A","email":"bad","message":"short"}"#).unwrap_err();
        assert_eq!(fields(&err), vec!["name", "email", "message"]);
    }

    #[test]
    fn test_contact_missing_fields() {
        let err = validate_contact(b"{}").unwrap_err();
        assert_eq!(fields(&err), vec!["name", "email", "message"]);
    }

    #[test]
    fn test_length_counts_characters() {
        // Two characters, four bytes
        let body = r#"{"name":"Éé","email":"e@e.fr","message":"ééééééééééé"}"#;
        assert!(validate_contact(body.as_bytes()).is_ok());
    }

    #[test]
    fn test_values_are_not_sanitized() {
        let body = br#"{"name":"<b>Jo</b>","email":"jo@club.fr","message":"<script>x</script>"}"#;
        let contact = validate_contact(body).unwrap();
        assert_eq!(contact.name, "<b>Jo</b>");
        assert_eq!(contact.message, "<script>x</script>");
    }

    #[test]
    fn test_malformed_json() {
        let err = validate_contact(b"not json").unwrap_err();
        assert!(err.0.starts_with("body:"));
    }

    #[test]
    fn test_valid_quote() {
        let body = br#"{"name":"Marie Martin","email":"marie@example.com","phone":"0612345678","gymName":"Dojo Paris","postalCode":"75001","city":"Paris"}"#;
        let quote = validate_quote(body).unwrap();
        assert_eq!(quote.location(), "75001 Paris");
        assert!(quote.message.is_none());
    }

    #[test]
    fn test_quote_postal_code_must_be_five_chars() {
        let body = br#"{"name":"Marie","email":"marie@example.com","phone":"0612345678","gymName":"Dojo","postalCode":"7500","city":"Paris"}"#;
        let err = validate_quote(body).unwrap_err();
        assert_eq!(fields(&err), vec!["postalCode"]);

        let body = br#"{"name":"Marie","email":"marie@example.com","phone":"0612345678","gymName":"Dojo","postalCode":"750011","city":"Paris"}"#;
        assert!(validate_quote(body).is_err());
    }

    #[test]
    fn test_quote_required_fields() {
        let err = validate_quote(br#"{"name":"Marie","email":"marie@example.com"}"#).unwrap_err();
        assert_eq!(fields(&err), vec!["phone", "gymName", "postalCode", "city"]);
    }

    #[test]
    fn test_quote_errors_use_body_keys() {
        let err = validate_quote(
            br#"{"name":"Marie","email":"marie@example.com","phone":"0612345678","city":"Paris"}"#,
        )
        .unwrap_err();
        assert!(err.0.starts_with("gymName: "), "{}", err.0);
        assert!(err.0.contains(", postalCode: "), "{}", err.0);
        assert!(!err.0.contains('_'), "{}", err.0);
    }

    #[test]
    fn test_wire_name() {
        assert_eq!(wire_name("name"), "name");
        assert_eq!(wire_name("surface_area"), "surfaceArea");
        assert_eq!(wire_name("postal_code"), "postalCode");
    }
}
