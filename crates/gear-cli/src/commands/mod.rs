pub mod audit;
pub mod blog;
pub mod calendar;
pub mod comms;
pub mod course;
pub mod credential;
pub mod dashboard;
pub mod dispatch;
pub mod enrollment;
pub mod init;
pub mod invoice;
pub mod lead;
pub mod lesson;
pub mod notification;
pub mod request;
pub mod resource;
pub mod scheduler;
pub mod schema;
pub mod seed;
pub mod serve;
pub mod shared;
pub mod staff;
pub mod student;
