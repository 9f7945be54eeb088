//! `@connect` directive rendering.

use super::types::ArgDecl;
use crate::config::StaticHeader;
use crate::error::Result;
use crate::graph::ParamLocation;
use minijinja::Environment;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const CONNECT_TEMPLATE: &str = r#"    @connect(
      source: "{{ source }}"
{%- if headers or body %}
      http: {
        {{ method }}: "{{ path }}"
{%- if headers %}
        headers: [
{%- for header in headers %}
          { name: "{{ header.name }}", value: "{{ header.value }}" }
{%- endfor %}
        ]
{%- endif %}
{%- if body %}
        body: """
{%- for line in body %}
        {{ line }}
{%- endfor %}
        """
{%- endif %}
      }
{%- else %}
      http: { {{ method }}: "{{ path }}" }
{%- endif %}
      selection: """
{%- for line in selection %}
      {{ line }}
{%- endfor %}
      """
    )"#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("connect", CONNECT_TEMPLATE)
        .expect("connect template should be valid");
    env
});

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("path param regex should be valid"));

#[derive(Debug, Clone, Serialize)]
pub struct ConnectHeader {
    pub name: String,
    pub value: String,
}

/// Everything one `@connect` directive needs.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectDirective {
    pub source: String,
    pub method: &'static str,
    /// Path template with `$args` substitutions and query string
    pub path: String,
    pub headers: Vec<ConnectHeader>,
    /// Body mapping lines, empty when the operation sends none
    pub body: Vec<String>,
    pub selection: Vec<String>,
}

impl ConnectDirective {
    pub fn render(&self) -> Result<String> {
        let template = TEMPLATES.get_template("connect")?;
        Ok(template.render(self)?)
    }
}

/// Escape a value for a GraphQL string literal.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `{param}` segments become `{$args.param}`; required query parameters
/// are appended as a query string.
pub fn path_template(path: &str, args: &[ArgDecl]) -> String {
    let mut out = PATH_PARAM
        .replace_all(path, |caps: &regex::Captures<'_>| {
            let wire = &caps[1];
            let arg = args
                .iter()
                .find(|a| a.location == Some(ParamLocation::Path) && a.wire_name == wire)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| crate::naming::field_name(wire));
            format!("{{$args.{arg}}}")
        })
        .into_owned();
    let query: Vec<String> = args
        .iter()
        .filter(|a| a.location == Some(ParamLocation::Query) && a.required)
        .map(|a| format!("{}={{$args.{}}}", a.wire_name, a.name))
        .collect();
    if !query.is_empty() {
        out.push(if out.contains('?') { '&' } else { '?' });
        out.push_str(&query.join("&"));
    }
    escape(&out)
}

/// Header parameters bound to their arguments, then the static headers.
pub fn headers(args: &[ArgDecl], statics: &[StaticHeader]) -> Vec<ConnectHeader> {
    args.iter()
        .filter(|a| a.location == Some(ParamLocation::Header))
        .map(|a| ConnectHeader {
            name: escape(&a.wire_name),
            value: format!("{{$args.{}}}", a.name),
        })
        .chain(statics.iter().map(|h| ConnectHeader {
            name: escape(&h.name),
            value: escape(&h.value),
        }))
        .collect()
}
