//! # rating-service
//!
//! Application layer containing the dispatcher, services, and DTOs.

pub mod dto;
pub mod services;

pub use services::{Dispatcher, ServiceContext, ServiceError, ServiceResult};
