//! Strict template rendering over a document tree.
//!
//! # Responsibilities
//! - Render every string leaf as a Jinja template against a context
//! - Preserve keys, key order and list order
//! - Pass non-string scalars through unchanged
//!
//! # Design Decisions
//! - Undefined variables are hard errors (`UndefinedBehavior::Strict`)
//! - The environment has no loader: `include`/`import` cannot reach the filesystem
//! - Strings without template markers are returned as-is

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use thiserror::Error;

use crate::document::value::{Document, Map, Value};

/// Variables available to a template, supplied per read request.
pub type RenderContext = Map;

/// Rendering failure, tagged with the path of the offending leaf.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("undefined variable in `{path}`: {detail}")]
    Undefined { path: String, detail: String },

    #[error("syntax error in `{path}`: {detail}")]
    Syntax { path: String, detail: String },

    #[error("failed to render `{path}`: {detail}")]
    Render { path: String, detail: String },
}

impl TemplateError {
    /// Field path of the leaf that failed to render.
    pub fn path(&self) -> &str {
        match self {
            TemplateError::Undefined { path, .. }
            | TemplateError::Syntax { path, .. }
            | TemplateError::Render { path, .. } => path,
        }
    }

    fn from_minijinja(path: &str, err: &minijinja::Error) -> Self {
        let path = path.to_owned();
        let detail = err.to_string();
        match err.kind() {
            ErrorKind::UndefinedError => TemplateError::Undefined { path, detail },
            ErrorKind::SyntaxError => TemplateError::Syntax { path, detail },
            _ => TemplateError::Render { path, detail },
        }
    }
}

/// Renders documents against a [`RenderContext`].
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render a copy of `document`; the input is left untouched.
    pub fn render(&self, document: &Document, context: &RenderContext) -> Result<Document, TemplateError> {
        let ctx = minijinja::Value::from_serialize(context);
        self.render_map(document, &ctx, "")
    }

    fn render_value(&self, value: &Value, ctx: &minijinja::Value, path: &str) -> Result<Value, TemplateError> {
        match value {
            Value::String(source) => self.render_str(source, ctx, path).map(Value::String),
            Value::Map(map) => self.render_map(map, ctx, path).map(Value::Map),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.render_value(item, ctx, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            scalar => Ok(scalar.clone()),
        }
    }

    fn render_map(&self, map: &Map, ctx: &minijinja::Value, path: &str) -> Result<Map, TemplateError> {
        map.iter()
            .map(|(key, value)| {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                Ok::<_, TemplateError>((key.clone(), self.render_value(value, ctx, &child)?))
            })
            .collect()
    }

    fn render_str(&self, source: &str, ctx: &minijinja::Value, path: &str) -> Result<String, TemplateError> {
        if !has_template_markers(source) {
            return Ok(source.to_owned());
        }
        self.env
            .render_str(source, ctx)
            .map_err(|err| TemplateError::from_minijinja(path, &err))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn has_template_markers(source: &str) -> bool {
    source.contains("{{") || source.contains("{%") || source.contains("{#")
}
