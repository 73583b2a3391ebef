//! Value objects exchanged with the authorization framework.

pub mod client;
pub mod token;

pub use client::ClientInfo;
pub use token::TokenInfo;
