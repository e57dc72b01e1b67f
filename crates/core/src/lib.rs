#![deny(warnings)]

pub mod analysis;
pub mod config;
pub mod emotion;
pub mod export;
pub mod history;
pub mod observe;
pub mod session;
