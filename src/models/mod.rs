pub mod listening;
pub mod reading;
pub mod result;
pub mod user;
pub mod writing;
