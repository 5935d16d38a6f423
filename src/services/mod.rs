pub mod ai_service;
pub mod eval_service;
pub mod grading_service;
pub mod listening_service;
pub mod reading_service;
pub mod user_service;
pub mod writing_service;
