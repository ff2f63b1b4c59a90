// Author: Dustin Pilgrim
// License: MIT

pub mod action;
pub mod activity;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod guard_msg;
pub mod info;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod utils;
pub mod verify;

#[cfg(test)]
mod controller_tests;
