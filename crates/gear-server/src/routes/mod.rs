pub mod calendar;
pub mod intake;
pub mod marketing;
pub mod notifications;
pub mod stripe;
