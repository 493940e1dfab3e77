//! Posts owned by registered users, behind password login and stateless
//! bearer tokens.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod posts;
pub mod state;
pub mod users;
