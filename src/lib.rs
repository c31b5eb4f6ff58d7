pub mod client;
pub mod codec;
pub mod config;
pub mod daemon;
pub mod domains;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod keys;
pub mod providers;
pub mod services;

pub use crate::client::ChatEngine;
pub use crate::config::Config;
pub use crate::domains::envelope::{Envelope, MessageType};
pub use crate::error::{RedChatError, Result};
