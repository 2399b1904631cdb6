#![doc = include_str!("../README.md")]

mod common;
pub mod dispatch;

pub use common::*;
