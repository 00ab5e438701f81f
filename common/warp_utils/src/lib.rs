//! This crate contains functions that are common across multiple `warp` HTTP servers in the
//! beacon node.

pub mod cors;
pub mod reject;
pub mod task;
