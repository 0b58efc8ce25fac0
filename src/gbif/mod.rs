pub mod client;
pub mod jobs;
pub mod services;
pub mod views;
