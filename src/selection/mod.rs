//! # Selection Module
//!
//! Selection paths address one field (or subtree) of the node graph:
//!
//! ```text
//! get:/pets/{petId}>res:200>ref:#/c/s/Pet>obj:Pet>prop:scalar:name
//! get:/pets/{petId}>res:200>**
//! ```
//!
//! A path is the `>`-joined sequence of node ids from an operation root,
//! with `#/components/schemas/` abbreviated to `#/c/s/`. A trailing `*`
//! selects the leaves directly below the prefix, `**` every reachable leaf.
//!
//! [`resolve`] walks a path segment by segment, expanding lazily; the
//! [`Collector`] turns a list of paths into the concrete leaf paths and the
//! container types the generator must declare.

mod collector;
mod path;
mod resolve;

pub use collector::*;
pub use path::*;
pub use resolve::*;
