pub mod agent;
pub mod session;
pub mod terminal;
pub mod tooling;
