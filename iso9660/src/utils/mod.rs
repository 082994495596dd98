//! Shared helpers: sector access, text decoding, dates

pub mod datetime;
pub mod sector;
pub mod string;
