//! UI Module - Terminal front end
//!
//! - `form` - Salary form screen (keys → state, state → frame)
//! - `run` - Terminal setup and event loop
//! - `theme` - Colors and styles

pub mod form;
pub mod run;
pub mod theme;
