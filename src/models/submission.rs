use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Which form a submission came from. Display gives the target sheet name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum FormKind {
    #[strum(serialize = "Contact")]
    Contact,
    #[strum(serialize = "Devis")]
    Quote,
}

impl FormKind {
    /// Column range matching the fixed row width of each sheet.
    pub fn range(self) -> &'static str {
        match self {
            FormKind::Contact => "A:H",
            FormKind::Quote => "A:K",
        }
    }

    /// Short label used in logs and metrics.
    pub fn metric_label(self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Quote => "quote",
        }
    }

    /// Title of the notification email.
    pub fn email_title(self) -> &'static str {
        match self {
            FormKind::Contact => "Nouveau message de contact",
            FormKind::Quote => "Nouvelle demande de devis",
        }
    }

    /// Confirmation returned to the client on success.
    pub fn success_message(self) -> &'static str {
        match self {
            FormKind::Contact => "Votre message a bien été envoyé. Nous vous répondrons rapidement.",
            FormKind::Quote => "Votre demande de devis a bien été envoyée. Nous revenons vers vous sous 48h.",
        }
    }
}

/// Raw contact form body. Every field is optional at the serde level so that
/// missing required fields surface as validation errors, not parse errors.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[garde(required, length(chars, min = 2))]
    pub name: Option<String>,

    #[garde(required, email)]
    pub email: Option<String>,

    #[garde(skip)]
    pub phone: Option<String>,

    #[garde(skip)]
    pub gym_name: Option<String>,

    #[garde(skip)]
    pub city: Option<String>,

    #[garde(skip)]
    pub activity: Option<String>,

    #[garde(required, length(chars, min = 10))]
    pub message: Option<String>,
}

/// Raw quote form body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteForm {
    #[garde(required, length(chars, min = 2))]
    pub name: Option<String>,

    #[garde(required, email)]
    pub email: Option<String>,

    #[garde(required, length(chars, min = 10))]
    pub phone: Option<String>,

    #[garde(required, length(chars, min = 2))]
    pub gym_name: Option<String>,

    #[garde(required, length(chars, equal = 5))]
    pub postal_code: Option<String>,

    #[garde(required, length(chars, min = 2))]
    pub city: Option<String>,

    #[garde(skip)]
    pub activities: Option<String>,

    #[garde(skip)]
    pub surfaces: Option<String>,

    #[garde(skip)]
    pub surface_area: Option<String>,

    #[garde(skip)]
    pub frequency: Option<String>,

    #[garde(skip)]
    pub message: Option<String>,
}

impl ContactForm {
    /// Body keys in form order, as the client sends them.
    pub const FIELDS: &'static [&'static str] = &[
        "name", "email", "phone", "gymName", "city", "activity", "message",
    ];
}

impl QuoteForm {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "gymName",
        "postalCode",
        "city",
        "activities",
        "surfaces",
        "surfaceArea",
        "frequency",
        "message",
    ];
}

/// A validated contact request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gym_name: Option<String>,
    pub city: Option<String>,
    pub activity: Option<String>,
    pub message: String,
}

/// A validated quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gym_name: String,
    pub postal_code: String,
    pub city: String,
    pub activities: Option<String>,
    pub surfaces: Option<String>,
    pub surface_area: Option<String>,
    pub frequency: Option<String>,
    pub message: Option<String>,
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// One labelled line of a notification email. Lines without a value are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct EmailField {
    pub label: &'static str,
    pub value: Option<String>,
}

impl EmailField {
    fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: Some(value.to_string()),
        }
    }

    fn optional(label: &'static str, value: &Option<String>) -> Self {
        Self {
            label,
            value: value.clone(),
        }
    }
}

/// A validated form submission, ready to persist and announce.
pub trait Submission: Send + Sync {
    const KIND: FormKind;

    /// Sheet row in the fixed column order of `KIND`, ending with `timestamp`.
    fn to_row(&self, timestamp: &str) -> Vec<String>;

    fn subject(&self) -> String;

    fn email_fields(&self) -> Vec<EmailField>;

    /// Submitter address, used as the notification reply-to.
    fn reply_to(&self) -> &str;
}

impl Submission for ContactSubmission {
    const KIND: FormKind = FormKind::Contact;

    /// Columns A:H: name, email, phone, gym, city, activity, message, timestamp.
    fn to_row(&self, timestamp: &str) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            cell(&self.phone),
            cell(&self.gym_name),
            cell(&self.city),
            cell(&self.activity),
            self.message.clone(),
            timestamp.to_string(),
        ]
    }

    fn subject(&self) -> String {
        format!("Nouveau message de contact - {}", self.name)
    }

    fn email_fields(&self) -> Vec<EmailField> {
        vec![
            EmailField::new("Nom", &self.name),
            EmailField::new("Email", &self.email),
            EmailField::optional("Téléphone", &self.phone),
            EmailField::optional("Salle / Club", &self.gym_name),
            EmailField::optional("Ville", &self.city),
            EmailField::optional("Activité", &self.activity),
            EmailField::new("Message", &self.message),
        ]
    }

    fn reply_to(&self) -> &str {
        &self.email
    }
}

impl QuoteSubmission {
    /// Postal code and city joined into the single location column kept from
    /// the older 10-column sheet layout.
    pub fn location(&self) -> String {
        format!("{} {}", self.postal_code, self.city)
    }
}

impl Submission for QuoteSubmission {
    const KIND: FormKind = FormKind::Quote;

    /// Columns A:K: name, email, phone, gym, location, activities, surfaces,
    /// surface area, frequency, message, timestamp.
    fn to_row(&self, timestamp: &str) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.gym_name.clone(),
            self.location(),
            cell(&self.activities),
            cell(&self.surfaces),
            cell(&self.surface_area),
            cell(&self.frequency),
            cell(&self.message),
            timestamp.to_string(),
        ]
    }

    fn subject(&self) -> String {
        format!("Nouvelle demande de devis - {}", self.gym_name)
    }

    fn email_fields(&self) -> Vec<EmailField> {
        vec![
            EmailField::new("Nom", &self.name),
            EmailField::new("Email", &self.email),
            EmailField::new("Téléphone", &self.phone),
            EmailField::new("Salle / Club", &self.gym_name),
            EmailField::new("Code postal", &self.postal_code),
            EmailField::new("Ville", &self.city),
            EmailField::optional("Activités", &self.activities),
            EmailField::optional("Surfaces", &self.surfaces),
            EmailField::optional("Surface (m²)", &self.surface_area),
            EmailField::optional("Fréquence", &self.frequency),
            EmailField::optional("Message", &self.message),
        ]
    }

    fn reply_to(&self) -> &str {
        &self.email
    }
}

/// JSON body of every form endpoint response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
