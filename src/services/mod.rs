pub mod client_logos;
pub mod email_template;
pub mod mailer;
pub mod rate_limit;
pub mod sheets;
pub mod validation;
