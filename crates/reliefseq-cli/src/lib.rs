pub mod cli;
pub mod select;
