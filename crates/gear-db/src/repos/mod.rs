//! Repository modules implementing the store-side operations for every
//! Gearbox entity group.
//!
//! Each module adds methods to `GearService` via `impl GearService` blocks.

pub mod audit;
pub mod billing;
pub mod calendar;
pub mod comms;
pub mod conflict;
pub mod course;
pub mod credential;
pub mod dashboard;
pub mod enrollment;
pub mod intake;
pub mod lead;
pub mod lesson;
pub mod marketing;
pub mod notification;
pub mod resource;
pub mod staff;
pub mod student;
