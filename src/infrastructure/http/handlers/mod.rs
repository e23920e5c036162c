//! HTTP Handlers

mod bible;
mod ping;
mod resource;

pub use bible::*;
pub use ping::*;
pub use resource::*;
