pub mod azienda;
pub mod software;
pub mod user;
