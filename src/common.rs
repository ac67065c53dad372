//! Functionality shared by the commands.

pub mod file;
pub mod request;
