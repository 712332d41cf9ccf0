// Presentation layer - HTTP surface over the dashboard and section pages
pub mod app_state;
pub mod handlers;
