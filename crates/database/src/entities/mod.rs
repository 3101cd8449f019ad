pub mod attachment;
pub mod attendance;
pub mod attendance_records;
pub mod chat_messages;
pub mod chat_participants;
pub mod chats;
pub mod class_subjects;
pub mod classes;
pub mod complaint_history;
pub mod complaints;
pub mod departments;
pub mod grades;
pub mod notices;
pub mod semester_records;
pub mod subject_faculty;
pub mod subjects;
pub mod timetable_periods;
pub mod timetables;
pub mod users;
