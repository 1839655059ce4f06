pub mod assets;
pub mod catalog;
pub mod errors;
pub mod events;
pub mod repl;
pub mod session;
