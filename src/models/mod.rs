// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod achievement;
pub mod chat;
pub mod meditation;
pub mod story;
pub mod user;

pub use achievement::*;
pub use chat::*;
pub use meditation::*;
pub use story::*;
pub use user::*;

use once_cell::sync::Lazy;
use regex::Regex;

/// Username shape shared by registration validation and mention extraction
pub static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("invalid username regex"));
