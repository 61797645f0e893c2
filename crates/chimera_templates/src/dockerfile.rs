//! Dockerfile generation for a build target.

use std::collections::HashMap;

use tracing::debug;

use crate::error::TemplateResult;
use crate::renderer::TemplateRenderer;
use crate::template::Template;

/// Fields available to the Dockerfile skeleton and to user supplied
/// `env`/`install` entries.
pub const DOCKERFILE_FIELDS: &[&str] = &["name", "tag", "id", "base_image", "baseImage", "image"];

const DOCKERFILE_HEADER: &str = "\
FROM {{base_image}}:{{tag}}
COPY project/ /project
WORKDIR /project

ENV CHIMERA_TARGET={{name}}:{{tag}}
ENV CHIMERA_TARGET_NAME={{name}}
ENV CHIMERA_TARGET_TAG={{tag}}
";

/// Everything the Dockerfile is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct DockerfileContext<'a> {
    pub name: &'a str,
    pub tag: &'a str,
    pub id: &'a str,
    pub base_image: &'a str,
    pub image: &'a str,
    pub env: &'a [String],
    pub install: &'a [String],
    pub script: &'a str,
}

impl DockerfileContext<'_> {
    /// Substitution values for this context.
    pub fn variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), self.name.to_string());
        vars.insert("tag".to_string(), self.tag.to_string());
        vars.insert("id".to_string(), self.id.to_string());
        vars.insert("base_image".to_string(), self.base_image.to_string());
        vars.insert("baseImage".to_string(), self.base_image.to_string());
        vars.insert("image".to_string(), self.image.to_string());
        vars
    }
}

/// Renders Dockerfiles.
#[derive(Debug, Clone)]
pub struct DockerfileTemplate {
    header: Template,
    renderer: TemplateRenderer,
}

impl DockerfileTemplate {
    pub fn new() -> TemplateResult<Self> {
        Ok(Self {
            header: Template::new("Dockerfile", DOCKERFILE_HEADER, DOCKERFILE_FIELDS)?,
            renderer: TemplateRenderer::new(),
        })
    }

    /// Render the Dockerfile text.
    ///
    /// The first line is always `FROM <base_image>:<tag>`. Each env and
    /// install entry is itself rendered against the context fields.
    pub fn render(&self, context: &DockerfileContext<'_>) -> TemplateResult<String> {
        let vars = context.variables();
        let mut out = self.header.render(&vars)?;

        for entry in context.env {
            out.push_str("ENV ");
            out.push_str(&self.renderer.render_content(entry, &vars));
            out.push('\n');
        }

        out.push('\n');

        for entry in context.install {
            out.push_str("RUN ");
            out.push_str(&self.renderer.render_content(entry, &vars));
            out.push('\n');
        }

        out.push_str("CMD ");
        out.push_str(context.script);
        out.push('\n');

        debug!("Rendered Dockerfile for {}:{}\n{}", context.name, context.tag, out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(env: &'a [String], install: &'a [String]) -> DockerfileContext<'a> {
        DockerfileContext {
            name: "node",
            tag: "5",
            id: "0a1b2c3d4e",
            base_image: "library/node",
            image: "node-5-0a1b2c3d4e",
            env,
            install,
            script: "npm test && npm run lint",
        }
    }

    #[test]
    fn test_first_line_is_base_image_and_tag() {
        let template = DockerfileTemplate::new().unwrap();
        let text = template.render(&context(&[], &[])).unwrap();

        assert_eq!(text.lines().next(), Some("FROM library/node:5"));
    }

    #[test]
    fn test_full_layout() {
        let template = DockerfileTemplate::new().unwrap();
        let env = vec!["TEST_ALL=true".to_string(), "TEST_ENV_TARGET={{name}}:{{tag}}".to_string()];
        let install = vec!["touch /test-install-target".to_string(), "echo {{id}}".to_string()];

        let text = template.render(&context(&env, &install)).unwrap();

        let expected = "\
FROM library/node:5
COPY project/ /project
WORKDIR /project

ENV CHIMERA_TARGET=node:5
ENV CHIMERA_TARGET_NAME=node
ENV CHIMERA_TARGET_TAG=5
ENV TEST_ALL=true
ENV TEST_ENV_TARGET=node:5

RUN touch /test-install-target
RUN echo 0a1b2c3d4e
CMD npm test && npm run lint
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_camel_case_alias() {
        let template = DockerfileTemplate::new().unwrap();
        let env = vec!["BASE={{baseImage}}".to_string()];
        let text = template.render(&context(&env, &[])).unwrap();

        assert!(text.contains("ENV BASE=library/node\n"));
    }
}
