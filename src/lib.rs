//! subhd - subtitle search and download client for subhd.com
//!
//! Turns a video filename into a search keyword, parses the site's result
//! page into candidates and downloads a chosen candidate's archive, detecting
//! whether it is a rar, zip or plain srt file.

pub mod cli;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod query;
pub mod search;
pub mod subtitle;
