pub mod badge;
pub mod route;
pub mod user;
