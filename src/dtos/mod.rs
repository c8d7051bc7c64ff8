pub mod auth;
pub mod azienda;
pub mod hello;
pub mod software;
pub mod stats;
