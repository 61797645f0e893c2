//! Placeholder substitution.

use std::collections::HashMap;

use regex::Regex;

/// Replaces `{{variable}}` placeholders in text.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self {
            // Match {{variable_name}} pattern
            variable_pattern: Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}")
                .expect("placeholder pattern is valid"),
        }
    }

    /// Render content by replacing variables.
    ///
    /// Placeholders without a value are left untouched.
    pub fn render_content(&self, content: &str, variables: &HashMap<String, String>) -> String {
        self.variable_pattern
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                variables
                    .get(var_name)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }

    /// Names of all placeholders in `content`, in order of first appearance.
    pub fn placeholders(&self, content: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.variable_pattern.captures_iter(content) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_content() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render_content(
            "TEST_ENV_TARGET={{name}}:{{ tag }}",
            &vars(&[("name", "node"), ("tag", "5")]),
        );
        assert_eq!(rendered, "TEST_ENV_TARGET=node:5");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render_content("echo {{missing}} $HOME", &vars(&[]));
        assert_eq!(rendered, "echo {{missing}} $HOME");
    }

    #[test]
    fn test_placeholders_deduplicated() {
        let renderer = TemplateRenderer::new();
        assert_eq!(
            renderer.placeholders("{{tag}} {{name}}:{{tag}}"),
            vec!["tag".to_string(), "name".to_string()]
        );
    }
}
