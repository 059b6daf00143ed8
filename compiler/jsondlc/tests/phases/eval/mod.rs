//! Evaluation phase tests: matching values against bound modules.

mod imports;
mod logic;
mod natives;
