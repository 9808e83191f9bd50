//! # atelier-entity
//!
//! Domain entity models for Atelier. Every struct in this crate is either a
//! database row or a domain value object. Rows derive `sqlx::FromRow` when
//! the `sqlx` feature is enabled; the client sync engine uses them without it.

pub mod notification;
pub mod project;
pub mod stakeholder;
pub mod user;
pub mod work;
