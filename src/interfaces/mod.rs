pub mod clock;
pub mod handlers;
pub mod ids;
pub mod store;
