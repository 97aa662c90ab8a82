//! Helpers behind the `inkvault` binary: turning plain text into a block
//! tree and rendering search highlights for a terminal.

pub mod render;
pub mod text;
