//! # Generator Module
//!
//! Emits the connector schema for a [`Collection`] of selected paths.
//!
//! ## Passes
//!
//! 1. **Types** ([`TypeBuilder`]): walks the collected containers and every
//!    selected operation bottom-up, declaring `enum`, `type` and `input`
//!    types into an order-preserving list so referenced types precede the
//!    types that reference them. Composed and union types are consolidated
//!    on the way. Names are assigned afterwards by [`assign_names`].
//! 2. **Selections** ([`response_selection`], [`body_selection`]): one
//!    selection body per root field, mirroring the selected paths.
//!
//! ## Output
//!
//! ```graphql
//! extend schema
//!   @link(url: "https://specs.apollo.dev/federation/v2.10", import: ["@key"])
//!   @link(url: "https://specs.apollo.dev/connect/v0.1", import: ["@connect", "@source"])
//!   @source(name: "api", http: { baseURL: "https://petstore.example.com" })
//!
//! type Pet {
//!   id: Int
//!   name: String
//! }
//!
//! type Query {
//!   getPetById(petId: Int!): Pet
//!     @connect(
//!       source: "api"
//!       http: { GET: "/pets/{$args.petId}" }
//!       selection: """
//!       id
//!       name
//!       """
//!     )
//! }
//! ```

mod connect;
mod names;
mod select;
#[cfg(test)]
mod tests;
mod types;

pub use connect::*;
pub use names::*;
pub use select::*;
pub use types::*;

use crate::config::GeneratorConfig;
use crate::context::Context;
use crate::document::Document;
use crate::error::Result;
use crate::graph::Graph;
use crate::selection::{Collection, Collector};
use std::fmt::Write as _;
use tracing::info;

/// Render a description as a GraphQL string literal.
fn description_lines(description: &str, indent: &str) -> Vec<String> {
    if description.contains('\n') {
        let mut lines = vec![format!("{indent}\"\"\"")];
        for line in description.lines() {
            lines.push(format!("{indent}{}", line.replace("\"\"\"", "\\\"\"\"")).trim_end().to_string());
        }
        lines.push(format!("{indent}\"\"\""));
        lines
    } else {
        vec![format!(
            "{indent}\"{}\"",
            description.replace('\\', "\\\\").replace('"', "\\\"")
        )]
    }
}

fn write_declaration(out: &mut String, decl: &TypeDecl, names: &TypeNames, index: usize) {
    if let Some(description) = &decl.description {
        for line in description_lines(description, "") {
            let _ = writeln!(out, "{line}");
        }
    }
    match &decl.kind {
        DeclKind::Enum { values } => {
            let _ = writeln!(out, "enum {} {{", names.names[index]);
            for value in values {
                let _ = writeln!(out, "  {value}");
            }
        }
        DeclKind::Object { fields } => {
            let keyword = if decl.input { "input" } else { "type" };
            let _ = writeln!(out, "{keyword} {} {{", names.names[index]);
            for field in fields {
                if let Some(description) = &field.description {
                    for line in description_lines(description, "  ") {
                        let _ = writeln!(out, "{line}");
                    }
                }
                let bang = if decl.input && field.required { "!" } else { "" };
                let _ = write!(out, "  {}: {}{bang}", field.name, names.render(&field.ty));
                match &field.comment {
                    Some(comment) => {
                        let _ = writeln!(out, " # {comment}");
                    }
                    None => out.push('\n'),
                }
            }
        }
    }
    out.push_str("}\n\n");
}

/// Two-pass emitter over one graph and context.
pub struct Generator<'a, 'doc> {
    graph: &'a mut Graph,
    ctx: &'a mut Context<'doc>,
    collection: &'a Collection,
    config: &'a GeneratorConfig,
}

impl<'a, 'doc> Generator<'a, 'doc> {
    pub fn new(
        graph: &'a mut Graph,
        ctx: &'a mut Context<'doc>,
        collection: &'a Collection,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            graph,
            ctx,
            collection,
            config,
        }
    }

    pub fn generate(self) -> Result<String> {
        let document_url = self.ctx.document().base_url().map(str::to_string);

        // Pass 1: declarations and root field signatures.
        let mut builder = TypeBuilder::new(&mut *self.graph, &mut *self.ctx, self.collection);
        builder.declare_containers()?;
        let mut operations = Vec::new();
        for &op in &self.collection.operations {
            operations.push(builder.operation(op)?);
        }
        let (decls, uses_json) = builder.finish();
        let names = assign_names(self.graph, self.ctx, &decls);

        // Pass 2: root fields with their bindings.
        let mut queries = String::new();
        let mut mutations = String::new();
        for op in &operations {
            let out = if op.method.is_query() {
                &mut queries
            } else {
                &mut mutations
            };
            self.write_root_field(out, op, &names)?;
        }

        let mut out = String::new();
        let _ = writeln!(out, "extend schema");
        let _ = writeln!(
            out,
            "  @link(url: \"https://specs.apollo.dev/federation/{}\", import: [\"@key\"])",
            self.config.federation_version
        );
        let _ = writeln!(
            out,
            "  @link(url: \"https://specs.apollo.dev/connect/{}\", import: [\"@connect\", \"@source\"])",
            self.config.connect_version
        );
        let _ = writeln!(
            out,
            "  @source(name: \"{}\", http: {{ baseURL: \"{}\" }})",
            escape(&self.config.source_name),
            escape(&self.config.resolve_base_url(document_url.as_deref()))
        );
        out.push('\n');
        if uses_json {
            out.push_str("scalar JSON\n\n");
        }
        for (index, decl) in decls.iter().enumerate() {
            if names.primary[index] {
                write_declaration(&mut out, decl, &names, index);
            }
        }
        if !queries.is_empty() {
            let _ = write!(out, "type Query {{\n{queries}}}\n\n");
        }
        if !mutations.is_empty() {
            let _ = write!(out, "type Mutation {{\n{mutations}}}\n\n");
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');

        info!(
            types = names.primary.iter().filter(|p| **p).count(),
            queries = operations.iter().filter(|o| o.method.is_query()).count(),
            mutations = operations.iter().filter(|o| !o.method.is_query()).count(),
            warnings = self.ctx.warnings().len(),
            "generated schema"
        );
        Ok(out)
    }

    fn write_root_field(&self, out: &mut String, op: &OperationDecl, names: &TypeNames) -> Result<()> {
        if let Some(description) = &op.description {
            for line in description_lines(description, "  ") {
                let _ = writeln!(out, "{line}");
            }
        }
        let args: Vec<String> = op
            .args
            .iter()
            .map(|a| {
                let bang = if a.required { "!" } else { "" };
                format!("{}: {}{bang}", a.name, names.render(&a.ty))
            })
            .collect();
        let comment = op
            .comment
            .as_deref()
            .map(|c| format!(" # {c}"))
            .unwrap_or_default();
        if args.is_empty() {
            let _ = writeln!(out, "  {}: {}{comment}", op.name, names.render(&op.returns));
        } else {
            let _ = writeln!(
                out,
                "  {}({}): {}{comment}",
                op.name,
                args.join(", "),
                names.render(&op.returns)
            );
        }

        let directive = ConnectDirective {
            source: escape(&self.config.source_name),
            method: op.method.as_str(),
            path: path_template(&op.path, &op.args),
            headers: headers(&op.args, &self.config.headers),
            body: op
                .body
                .as_ref()
                .map(|(body, arg)| body_selection(self.graph, *body, arg))
                .unwrap_or_default(),
            selection: op
                .response
                .map(|r| response_selection(self.graph, self.collection, r))
                .unwrap_or_else(|| vec!["$".to_string()]),
        };
        let _ = writeln!(out, "{}", directive.render()?);
        Ok(())
    }
}

/// Generate for an already collected selection.
pub fn generate(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    collection: &Collection,
    config: &GeneratorConfig,
) -> Result<String> {
    Generator::new(graph, ctx, collection, config).generate()
}

/// Build the graph, collect `selections` and generate, in one call.
pub fn generate_schema<S: AsRef<str>>(
    doc: &Document,
    selections: &[S],
    config: &GeneratorConfig,
) -> Result<String> {
    let mut graph = Graph::from_document(doc);
    let mut ctx = Context::new(doc);
    let collection = Collector::new().collect(&mut graph, &mut ctx, selections)?;
    generate(&mut graph, &mut ctx, &collection, config)
}
