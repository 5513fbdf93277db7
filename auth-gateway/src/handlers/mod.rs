pub mod index;
pub mod session_auth;
pub mod users;
