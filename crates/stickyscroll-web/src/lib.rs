#![forbid(unsafe_code)]

//! Browser binding for `stickyscroll-core`.
//!
//! Injected into a chat page, it locates the chat history scroller, layers
//! a guard over its `scrollTop`, forwards page input to the session, and
//! paints the floating jump-to-bottom control. Everything outside
//! [`wasm`] is plain Rust and is tested on the host.

pub mod error;
pub mod selectors;
pub mod style;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use error::BootError;
