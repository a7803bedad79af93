#![allow(clippy::cast_precision_loss)]

mod common;
mod determinism;
mod failures;
mod scenarios;
