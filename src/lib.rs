//! Decode and re-encode the register snapshots exchanged with Luxtronik
//! heat-pump controllers.
//!
//! The controller reports its state as a fixed-layout sequence of signed
//! 32-bit registers. [`registers`] describes that layout, [`datatypes`]
//! knows how to turn individual registers into typed values and back, and
//! [`vector`] binds the two to one concrete snapshot. [`connection`] and
//! [`protocol`] implement the TCP exchange that produces the raw snapshot
//! in the first place.

pub mod commands;
pub mod connection;
pub mod datatypes;
pub mod output;
pub mod protocol;
pub mod registers;
pub mod vector;
