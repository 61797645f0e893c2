//! Templates with a declared set of substitution fields.

use std::collections::HashMap;

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::TemplateRenderer;

/// A named text template whose placeholders must all belong to its schema.
///
/// The schema is checked once at construction; rendering then requires a
/// value for every field the source actually uses.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
    fields: Vec<String>,
    used: Vec<String>,
    renderer: TemplateRenderer,
}

impl Template {
    /// Create a template, rejecting placeholders outside `fields`.
    pub fn new(name: impl Into<String>, source: impl Into<String>, fields: &[&str]) -> TemplateResult<Self> {
        let name = name.into();
        let source = source.into();
        let renderer = TemplateRenderer::new();

        let used = renderer.placeholders(&source);
        if let Some(field) = used.iter().find(|f| !fields.contains(&f.as_str())) {
            return Err(TemplateError::UnknownField {
                template: name,
                field: field.clone(),
            });
        }

        Ok(Self {
            name,
            source,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            used,
            renderer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared schema.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Render with `variables`; every placeholder in the source must have a value.
    pub fn render(&self, variables: &HashMap<String, String>) -> TemplateResult<String> {
        if let Some(missing) = self.used.iter().find(|f| !variables.contains_key(*f)) {
            return Err(TemplateError::MissingVariable {
                template: self.name.clone(),
                variable: missing.clone(),
            });
        }

        Ok(self.renderer.render_content(&self.source, variables))
    }
}
