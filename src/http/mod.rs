pub mod client;
pub mod interceptor;
