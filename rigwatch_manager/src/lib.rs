//! RIGWATCH Manager Library
//!
//! Feed clients and command implementations behind the `rigwatch` binary.

pub mod commands;
pub mod feed;
