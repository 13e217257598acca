pub mod cli;
pub mod engine;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;

pub use engine::Engine;
