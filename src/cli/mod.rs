//! # CLI Module
//!
//! Command-line surface of the `connector-gen` binary.
//!
//! ```bash
//! # every operation, everything below it
//! connector-gen petstore.yaml --skip-selection --output petstore.graphql
//!
//! # pick operations interactively, only /pets paths
//! connector-gen petstore.yaml --filter '^/pets'
//!
//! # replay a saved selection
//! connector-gen petstore.yaml --selections selections.json
//!
//! # save the concrete paths a selection expands to
//! connector-gen petstore.yaml --skip-selection --print-selections > selections.json
//! ```
//!
//! Options can also be given as `CONNECTOR_GEN_*` environment variables;
//! see [`crate::config`].
//!
//! | Exit code | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | generation failed (unresolved path, unsupported schema, missing ref) |
//! | 2 | document invalid or unsupported |
//! | 3 | document or selections file unreadable |

mod commands;
mod prompt;


pub use commands::{exit_code, run, run_cli, Cli};
pub use prompt::{Picker, PickerCommand};
