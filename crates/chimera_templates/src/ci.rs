//! CI configuration generation.
//!
//! Produces a CI config whose build matrix runs one chimera target per job,
//! selected through the `CHIMERA_TARGET` environment variable.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

const TRAVIS_HEADER: &str = "\
language: rust
sudo: required
services:
  - docker
install:
  - cargo install chimera_cli
script:
  - chimera
env:
  matrix:
";

const TRAVIS_MATRIX_ENTRY: &str = "    - CHIMERA_TARGET={{name}}:{{tag}}\n";

/// Supported CI services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiService {
    Travis,
}

impl FromStr for CiService {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "travis" => Ok(Self::Travis),
            other => Err(TemplateError::UnknownCiService(other.to_string())),
        }
    }
}

impl fmt::Display for CiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Travis => write!(f, "travis"),
        }
    }
}

/// One job of the generated build matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixEntry<'a> {
    pub name: &'a str,
    pub tag: &'a str,
}

/// Render the CI config for `service` with one matrix job per entry.
pub fn generate_ci_config(service: CiService, entries: &[MatrixEntry<'_>]) -> TemplateResult<String> {
    match service {
        CiService::Travis => {
            let entry_template = Template::new("travis matrix", TRAVIS_MATRIX_ENTRY, &["name", "tag"])?;
            let mut out = TRAVIS_HEADER.to_string();

            for entry in entries {
                let mut vars = HashMap::new();
                vars.insert("name".to_string(), entry.name.to_string());
                vars.insert("tag".to_string(), entry.tag.to_string());
                out.push_str(&entry_template.render(&vars)?);
            }

            Ok(out)
        }
    }
}
