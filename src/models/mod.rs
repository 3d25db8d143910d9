pub mod client_logo;
pub mod submission;
