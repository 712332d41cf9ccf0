// Application layer - Use cases driving the backend client
pub mod dashboard_controller;
pub mod environment_api;
pub mod polling;
pub mod section_pages;
