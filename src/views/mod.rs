pub mod login;
pub mod render;
