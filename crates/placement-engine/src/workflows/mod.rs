pub mod admissions;
pub mod matching;
pub mod memory;
pub mod repository;
