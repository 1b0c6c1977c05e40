//! Windows Event Collector subscription management on local or remote hosts.

pub mod apply;
pub mod cmd;
pub mod commands;
pub mod enumerate;
pub mod error;
pub mod host;
pub mod output;
pub mod prompt;
pub mod service;
pub mod subscription;
pub mod wecutil;
