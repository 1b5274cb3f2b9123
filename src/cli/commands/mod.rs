pub mod api;
pub mod route;
pub mod session;
pub mod token;
