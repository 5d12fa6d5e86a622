pub mod errors;
pub mod gate;
pub mod models;
pub mod permissions;
pub mod platform;
pub mod settings;
