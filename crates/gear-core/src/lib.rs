//! # gear-core
//!
//! Core types, ID prefixes, and error types for Gearbox.
//!
//! This crate provides the foundational types shared across all Gearbox crates:
//! - Entity structs for every back-office record (leads, students, lessons, invoices, ...)
//! - Status enums, some with state machine transitions
//! - ID prefix constants
//! - Cross-cutting error types
//! - Lesson time-slot overlap rules and slug generation
//! - Intake form validation
//! - Document renderers (certificate PDF, ministry CSV, iCalendar feed)
//! - Response types for reports and the dashboard

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod forms;
pub mod ids;
pub mod money;
pub mod render;
pub mod responses;
pub mod slug;
pub mod time_slot;
