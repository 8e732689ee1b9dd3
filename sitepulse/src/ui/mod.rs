//! UI module root: exposes drawing functions for individual panels.

pub mod charts;
pub mod header;
pub mod info;
pub mod overview;
pub mod theme;
pub mod util;
