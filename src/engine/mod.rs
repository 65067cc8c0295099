//! Match-play plumbing that sits outside the search core.

pub mod time;
