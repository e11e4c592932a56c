//! Document renderers: certificate PDFs, ministry CSV reports, iCalendar feeds.
//!
//! Renderers are pure functions over entity data; storing the output is the
//! document store's job in `gear-db`.

pub mod csv;
pub mod ics;
pub mod pdf;
