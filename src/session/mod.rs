mod store;
mod sweeper;

pub use store::{Session, SessionStore};
pub use sweeper::EvictionSweeper;
