//! # chimera_templates
//!
//! Text generation for chimera.
//!
//! - [`Template`]: a text template with a declared schema of `{{field}}`
//!   placeholders, checked when the template is built
//! - [`DockerfileTemplate`]: renders the Dockerfile for one build target
//! - [`generate_ci_config`]: renders a CI config with one job per target
//!
//! ## Example
//!
//! ```rust
//! use chimera_templates::{DockerfileContext, DockerfileTemplate};
//!
//! let env = vec!["CI=true".to_string()];
//! let install = vec!["npm install".to_string()];
//! let context = DockerfileContext {
//!     name: "node",
//!     tag: "5",
//!     id: "0a1b2c3d4e",
//!     base_image: "node",
//!     image: "node-5-0a1b2c3d4e",
//!     env: &env,
//!     install: &install,
//!     script: "npm test",
//! };
//!
//! let dockerfile = DockerfileTemplate::new().unwrap().render(&context).unwrap();
//! assert!(dockerfile.starts_with("FROM node:5\n"));
//! ```

pub mod ci;
pub mod dockerfile;
pub mod error;
pub mod renderer;
pub mod template;

pub use ci::{generate_ci_config, CiService, MatrixEntry};
pub use dockerfile::{DockerfileContext, DockerfileTemplate, DOCKERFILE_FIELDS};
pub use error::{TemplateError, TemplateResult};
pub use renderer::TemplateRenderer;
pub use template::Template;
