pub mod file;
pub mod seeding;

pub use file::*;
pub use seeding::*;
