pub mod trap;
pub mod user;
