//! Numerical core of a hybrid particle-in-cell code: ions are
//! macro-particles, electrons a massless isothermal fluid, and the
//! fields live on a staggered Yee mesh.
//!
//! A `patch::Patch` ties everything together and is usually built from
//! an input file via `init::ConfigInitializer`.

pub mod grid;
pub mod field;
pub mod interpolator;
pub mod particle;
pub mod pusher;
pub mod boundary;
pub mod solver;
pub mod setup;
pub mod init;
pub mod patch;
