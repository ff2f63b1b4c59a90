// Author: Dustin Pilgrim
// License: MIT

pub mod activity;
pub mod session_store;
pub mod ticker;
pub mod verifier;
