//! Configuration file loading.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chimera_runner::DockerOptions;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".chimera.yml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime connection options
    pub docker: DockerOptions,
    /// Named image definitions, in file order
    #[serde(deserialize_with = "deserialize_targets")]
    pub targets: Vec<ImageDefinition>,
    /// Install steps appended to every target
    pub install: Vec<String>,
    /// Environment entries appended to every target
    pub env: Vec<String>,
    /// Test script steps, joined with `&&`
    pub script: Vec<String>,
}

/// One named image entry under `targets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageDefinition {
    /// Key of the entry in the `targets` map
    #[serde(skip)]
    pub name: String,
    /// Base image, defaults to the entry name
    pub image: Option<String>,
    /// Tags to build, one target each
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    pub install: Vec<String>,
    pub env: Vec<String>,
}

impl ImageDefinition {
    /// Base image this entry builds from.
    pub fn base_image(&self) -> &str {
        self.image.as_deref().unwrap_or(&self.name)
    }
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        debug!("Reading config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse and validate config text.
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|source| CoreError::ConfigParse {
                path: PathBuf::from(path),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if self.script.is_empty() {
            return Err(CoreError::InvalidConfig(
                "no script steps defined".to_string(),
            ));
        }

        for definition in &self.targets {
            if definition.name.trim().is_empty() {
                return Err(CoreError::InvalidConfig("target with empty name".to_string()));
            }
            if definition.tags.is_empty() {
                return Err(CoreError::InvalidConfig(format!(
                    "target '{}' declares no tags",
                    definition.name
                )));
            }
        }

        Ok(())
    }

    /// The composed test script.
    pub fn script_line(&self) -> String {
        self.script.join(" && ")
    }
}

fn deserialize_targets<'de, D>(deserializer: D) -> Result<Vec<ImageDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TargetsVisitor;

    impl<'de> Visitor<'de> for TargetsVisitor {
        type Value = Vec<ImageDefinition>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of target names to image definitions")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut targets = Vec::new();
            while let Some((name, definition)) = map.next_entry::<String, Option<ImageDefinition>>()? {
                let mut definition = definition.unwrap_or_default();
                definition.name = name;
                targets.push(definition);
            }
            Ok(targets)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_map(TargetsVisitor)
}

/// Tags may be written as strings or bare numbers (`tags: [4, "5.1"]`).
#[derive(Deserialize)]
#[serde(untagged)]
enum TagValue {
    Text(String),
    Number(serde_yaml::Number),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<TagValue>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| match value {
            TagValue::Text(text) => text,
            TagValue::Number(number) => number.to_string(),
        })
        .collect())
}
