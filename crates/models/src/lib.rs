pub mod attendance;
pub mod chat;
pub mod complaint;
pub mod gpa;
pub mod grading;
pub mod priority;
pub mod role;
pub mod timetable;
