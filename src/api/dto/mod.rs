//! Data Transfer Objects for request and response serialization.

pub mod common_dto;

pub use common_dto::*;
