mod runner;


pub use runner::{execute, run_hammer};
