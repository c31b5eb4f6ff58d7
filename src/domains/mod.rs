pub mod envelope;
pub mod message;
pub mod requests;
