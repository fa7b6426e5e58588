#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod query;
pub mod records;
pub mod traits;
pub mod types;
pub mod update;
