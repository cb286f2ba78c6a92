//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` so that the PostgreSQL backend can map rows directly.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod reset;
pub mod session;
pub mod user;
