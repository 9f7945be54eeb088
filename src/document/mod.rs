//! # Document Module
//!
//! The boundary between the generator core and the OpenAPI source document.
//!
//! The core never touches files: it receives a [`Document`] (an already
//! normalized JSON model) and resolves `$ref` pointers through
//! [`Document::lookup`]. This module also contains the loader that produces
//! such a document from a YAML or JSON file, and the validation pass run
//! before generation.
//!
//! ```rust,ignore
//! use connector_gen::document::{load_document, LoadOptions};
//!
//! let doc = load_document("petstore.yaml".as_ref(), &LoadOptions::default())?;
//! let pet = doc.lookup("#/components/schemas/Pet");
//! ```

mod load;
mod types;
mod validate;

pub use load::*;
pub use types::*;
pub use validate::*;
