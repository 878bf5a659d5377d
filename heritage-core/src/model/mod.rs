pub mod config;
pub mod feature;
pub mod link;
pub mod row;
