pub mod cli;
pub mod errors;
pub mod inference;
pub mod pantherlog;
pub mod sample;
pub mod schema;
pub mod testcase;
