// xmlscrub/src/lib.rs
//! # XmlScrub CLI
//!
//! This crate provides the command-line front end for the xmlscrub
//! streaming XML redaction engine. The core logic lives in
//! `xmlscrub-core`; this crate only parses arguments, initializes
//! logging, and wires files to the converter.

pub mod cli;
pub mod commands;
pub mod logger;

pub use commands::convert::{run_convert, ConvertOptions};
