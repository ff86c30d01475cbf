//! Infrastructure layer: concrete implementations of domain traits and wire DTOs.

pub mod auth;
pub mod dto;
pub mod presence;
pub mod registry;
pub mod repository;
