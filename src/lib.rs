//! Form submission API
//!
//! Backend for the marketing site's contact and quote forms: validates each
//! submission, rate limits by client IP, appends a row to a Google Sheet and
//! sends a best-effort notification email through Resend.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
