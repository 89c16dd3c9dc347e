//! API Module - Commands called by the front end

pub mod commands;
