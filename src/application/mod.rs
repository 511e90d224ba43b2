//! Application services layer.

pub mod authoring;
pub mod blog;
pub mod chrome;
pub mod error;
pub mod pagination;
pub mod repos;
pub mod site;
pub mod syndication;
