pub mod page;
pub mod person;
pub mod session;
