//! Build targets and their expansion from a config.

use std::fmt;
use std::path::{Path, PathBuf};

use chimera_templates::DockerfileContext;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::context::RunContext;

/// Random identifier namespacing a target's artifacts.
///
/// Ten hex characters from five random bytes. Collisions are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Number of random bytes in an id.
    pub const BYTES: usize = 5;

    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        Self(hex::encode(&uuid.as_bytes()[..Self::BYTES]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One concrete (image, tag) build-and-test unit.
///
/// Everything but the container id is fixed at expansion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    name: String,
    tag: String,
    id: TargetId,
    base_image: String,
    image: String,
    staging_dir: PathBuf,
    archive_path: PathBuf,
    install: Vec<String>,
    env: Vec<String>,
    script: String,
    container_id: Option<String>,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> &TargetId {
        &self.id
    }

    /// Image the target builds from.
    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    /// Name given to the built image and its test container.
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn install(&self) -> &[String] {
        &self.install
    }

    pub fn env(&self) -> &[String] {
        &self.env
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// Container created by the test stage, if it ran.
    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub(crate) fn set_container_id(&mut self, id: impl Into<String>) {
        self.container_id = Some(id.into());
    }

    /// `name:tag`, the form used by filters and CI matrices.
    pub fn label(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }

    /// Whether `filter` is a prefix of the name or of `name:tag`.
    pub fn matches(&self, filter: &str) -> bool {
        self.name.starts_with(filter) || self.label().starts_with(filter)
    }

    pub fn dockerfile_context(&self) -> DockerfileContext<'_> {
        DockerfileContext {
            name: &self.name,
            tag: &self.tag,
            id: self.id.as_str(),
            base_image: &self.base_image,
            image: &self.image,
            env: &self.env,
            install: &self.install,
            script: &self.script,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Expand a config into one target per (image, tag) pair, in config order,
/// keeping only those matching the context's filter.
pub fn expand_targets(config: &Config, context: &RunContext) -> Vec<Target> {
    let script = config.script_line();

    let targets: Vec<Target> = config
        .targets
        .iter()
        .flat_map(|definition| {
            let script = script.clone();
            definition.tags.iter().map(move |tag| {
                let id = TargetId::generate();
                let install = definition
                    .install
                    .iter()
                    .chain(&config.install)
                    .cloned()
                    .collect();
                let env = definition.env.iter().chain(&config.env).cloned().collect();

                Target {
                    image: image_name(&definition.name, tag, &id),
                    staging_dir: context.work_dir.join(id.as_str()),
                    archive_path: context.work_dir.join(format!("{}.tar", id)),
                    name: definition.name.clone(),
                    tag: tag.clone(),
                    base_image: definition.base_image().to_string(),
                    install,
                    env,
                    script: script.clone(),
                    container_id: None,
                    id,
                }
            })
        })
        .filter(|target| match &context.target_filter {
            Some(filter) => target.matches(filter),
            None => true,
        })
        .collect();

    debug!("Expanded {} target(s)", targets.len());
    targets
}

/// `<name>-<tag>-<id>`, reduced to characters valid in a repository name.
fn image_name(name: &str, tag: &str, id: &TargetId) -> String {
    format!("{}-{}-{}", name, tag, id)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' | '/' => c,
            _ => '-',
        })
        .collect()
}
