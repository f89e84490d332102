//! Progress display

pub mod renderer;
