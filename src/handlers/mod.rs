pub mod auth;
pub mod challenges;
pub mod charts;
pub mod health;
pub mod settings;
pub mod weights;
