//! Library components of the `affil-recon` command-line tool.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod menu;
