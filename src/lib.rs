pub mod consts;
pub mod http;
pub mod model;
pub mod notify;
pub mod options;
pub mod persons;
pub mod router;
pub mod session;
pub mod storage;
pub mod views;
