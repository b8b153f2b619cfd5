//! Domain logic for the movie catalogue and its identity model.
//!
//! This crate has no database dependency. It owns the rules the storage layer
//! relies on: field validation, sort/pagination shaping, the password and
//! token secret/hash split, and permission codes.

pub mod error;
pub mod filters;
pub mod movie;
pub mod password;
pub mod permissions;
pub mod token;
pub mod types;
pub mod user;
pub mod validator;
