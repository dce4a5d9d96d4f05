pub mod challenge;
pub mod user;
pub mod weight_entry;
