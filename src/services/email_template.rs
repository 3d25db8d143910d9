use chrono::{DateTime, Utc};
use minijinja::{context, Environment, Value};

use crate::models::submission::{EmailField, FormKind};

/// Shared layout for both notification emails. Auto-escaping is off for
/// inline templates; every interpolated user value goes through `field`.
const SUBMISSION_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
</head>
<body style="margin:0;padding:24px;background:#f4f6f8;font-family:Arial,Helvetica,sans-serif;color:#1f2933;">
  <div style="max-width:600px;margin:0 auto;background:#ffffff;border-radius:8px;overflow:hidden;">
    <div style="background:#0f766e;color:#ffffff;padding:20px 24px;">
      <h1 style="margin:0;font-size:20px;">{{ title }}</h1>
    </div>
    <div style="padding:24px;">
{%- for f in fields %}{% if f.value %}
      <div style="margin-bottom:16px;">
        <div style="font-size:12px;text-transform:uppercase;color:#6b7280;">{{ f.label }}</div>
        <div style="font-size:15px;margin-top:4px;">{{ f.value | field }}</div>
      </div>
{%- endif %}{% endfor %}
    </div>
    <div style="padding:16px 24px;background:#f9fafb;font-size:12px;color:#6b7280;">
      Reçu le {{ received_at }} via {{ site_url | field }}
    </div>
  </div>
</body>
</html>
"#;

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then turn line breaks into `<br>`.
fn field_filter(value: String) -> Value {
    let escaped = escape_html(&value)
        .replace("\r\n", "<br>")
        .replace('\n', "<br>");
    Value::from_safe_string(escaped)
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("field", field_filter);
    env
}

/// Render the notification body for one submission.
pub fn render_submission_email(
    kind: FormKind,
    fields: &[EmailField],
    received_at: DateTime<Utc>,
    site_url: &str,
) -> Result<String, minijinja::Error> {
    environment().render_str(
        SUBMISSION_TEMPLATE,
        context! {
            title => kind.email_title(),
            fields => fields,
            received_at => received_at.format("%d/%m/%Y à %H:%M UTC").to_string(),
            site_url => site_url,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::{ContactSubmission, Submission};
    use chrono::TimeZone;

    fn contact() -> ContactSubmission {
        ContactSubmission {
            name: "Jean <b>Dupont</b>".to_string(),
            email: "jean@example.com".to_string(),
            phone: None,
            gym_name: Some("L'Atelier & Co".to_string()),
            city: None,
            activity: None,
            message: "Ligne 1\nLigne \"2\"".to_string(),
        }
    }

    fn render(submission: &ContactSubmission) -> String {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        render_submission_email(
            FormKind::Contact,
            &submission.email_fields(),
            at,
            "https://hygiene-pro.fr",
        )
        .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_user_values_escaped() {
        let html = render(&contact());
        assert!(html.contains("Jean &lt;b&gt;Dupont&lt;/b&gt;"));
        assert!(html.contains("L&#039;Atelier &amp; Co"));
        assert!(!html.contains("<b>Dupont"));
    }

    #[test]
    fn test_newlines_become_br() {
        let html = render(&contact());
        assert!(html.contains("Ligne 1<br>Ligne &quot;2&quot;"));
    }

    #[test]
    fn test_absent_optional_fields_omitted() {
        let html = render(&contact());
        assert!(html.contains("Salle / Club"));
        assert!(!html.contains("Téléphone"));
        assert!(!html.contains("Ville"));
        assert!(!html.contains("Activité"));
    }

    #[test]
    fn test_title_and_footer() {
        let html = render(&contact());
        assert!(html.contains("<h1 style=\"margin:0;font-size:20px;\">Nouveau message de contact</h1>"));
        assert!(html.contains("Reçu le 14/03/2026 à 09:30 UTC via https://hygiene-pro.fr"));
    }
}
