//! Service layer shared by clients

mod log_service;

pub use log_service::LogService;
