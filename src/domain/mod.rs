pub mod board;
pub mod instruction;
pub mod pose;
