#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]

//! Frame streaming runtime: persisted frame assets, the async frame cache,
//! and the timestep scheduler that keeps several series in lockstep.

pub mod assets;
pub mod blend;
pub mod cache;
pub mod import;
pub mod naming;
pub mod scheduler;
pub mod sim;
