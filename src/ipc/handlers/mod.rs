pub mod actions;
pub mod backup;
pub mod certificates;
pub mod core;
pub mod import;
pub mod reports;
pub mod staff;
pub mod students;
pub mod summons;
pub mod teachers;
