//! Policy data model and compiler (§3, §4.2).

mod compiler;
mod types;

pub use compiler::compile;
pub use types::{
    CommandRule, Config, Layers, PathAccess, PathLayer, PathSource, ResolvedPath,
};
