//! Object API request handlers

pub mod object;

pub use object::*;
