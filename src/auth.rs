//! Token model and scope helpers.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{secret::*, *};
