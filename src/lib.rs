pub mod calculator;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod scoring;
pub mod services;
pub mod universe;
