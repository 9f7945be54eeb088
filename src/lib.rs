//! # connector-gen
//!
//! Generates a federation connector schema from an OpenAPI 3 document: a
//! GraphQL SDL file whose `Query` and `Mutation` fields carry `@connect`
//! directives binding them to the REST operations they were derived from.
//!
//! ## Architecture
//!
//! - **[`document`]** - loading, normalizing and validating the source document
//! - **[`graph`]** - the lazily built node graph: one root per operation,
//!   schema nodes created on visit, circular references cut at the closing edge
//! - **[`context`]** - traversal state shared by one generation run
//! - **[`selection`]** - the path language for choosing fields, and the collector
//! - **[`naming`]** - GraphQL names for types, fields and operations
//! - **[`generator`]** - the two-pass emitter (declarations, then `@connect` bindings)
//! - **[`config`]**, **[`logging`]**, **[`cli`]** - the binary's surface
//!
//! ## Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(connector-gen)
//!     participant Doc as document::load_document
//!     participant Graph as graph::Graph
//!     participant Col as selection::Collector
//!     participant Gen as generator::Generator
//!
//!     CLI->>Doc: load_document("petstore.yaml")
//!     Doc-->>CLI: Document
//!     CLI->>Graph: Graph::from_document(&doc)
//!     CLI->>Col: collect(selections)
//!     Col->>Graph: resolve paths, visiting on demand
//!     Col-->>CLI: Collection (leaves, containers, operations)
//!     CLI->>Gen: generate(&collection)
//!     Gen->>Graph: consolidate allOf/oneOf, declare types
//!     Gen-->>CLI: SDL text
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use connector_gen::config::GeneratorConfig;
//! use connector_gen::document::{load_document, LoadOptions};
//! use connector_gen::generator::generate_schema;
//!
//! let doc = load_document("petstore.yaml".as_ref(), &LoadOptions::default())?;
//! let sdl = generate_schema(&doc, &["get:/pets>**"], &GeneratorConfig::default())?;
//! println!("{sdl}");
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod generator;
pub mod graph;
pub mod logging;
pub mod naming;
pub mod selection;

pub use error::{DocumentError, GenError, Result};
