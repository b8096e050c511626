#![doc = include_str!("../README.md")]

pub mod compiler;
pub mod environment;
pub mod ir_module;
pub mod types;

pub use compiler::{Compiler, CompilerOptions, LowerError, LowerErrorKind, LowerResult};
pub use ir_module::{IrModule, Procedure};
