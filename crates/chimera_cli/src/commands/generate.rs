//! Generate command - Print a CI config for the configured targets.

use anyhow::Result;
use clap::Args;

use chimera_core::{expand_targets, Config, RunContext};
use chimera_templates::{generate_ci_config, CiService, MatrixEntry};

use super::Cli;

#[derive(Args, Debug, PartialEq, Eq)]
pub struct GenerateArgs {
    /// CI service to generate for (travis)
    pub service: String,
}

pub async fn execute(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let config = cli.load_config()?;
    print!("{}", render(&config, &cli.run_context(), &args.service)?);
    Ok(())
}

/// CI config for `service` with one matrix job per selected target.
fn render(config: &Config, context: &RunContext, service: &str) -> Result<String> {
    let service: CiService = service.parse()?;
    let targets = expand_targets(config, context);
    let entries: Vec<MatrixEntry<'_>> = targets
        .iter()
        .map(|t| MatrixEntry {
            name: t.name(),
            tag: t.tag(),
        })
        .collect();

    Ok(generate_ci_config(service, &entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_yaml(
            "targets:\n  node:\n    tags: [\"4\", \"5\"]\n  iojs:\n    tags: [\"3\"]\nscript: [\"npm test\"]\n",
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_has_one_job_per_target() {
        let out = render(&config(), &RunContext::new("."), "travis").unwrap();
        let jobs: Vec<_> = out
            .lines()
            .filter(|l| l.contains("CHIMERA_TARGET="))
            .map(str::trim)
            .collect();
        assert_eq!(
            jobs,
            vec![
                "- CHIMERA_TARGET=node:4",
                "- CHIMERA_TARGET=node:5",
                "- CHIMERA_TARGET=iojs:3"
            ]
        );
    }

    #[test]
    fn test_matrix_respects_filter() {
        let context = RunContext::new(".").target_filter(Some("io".to_string()));
        let out = render(&config(), &context, "Travis").unwrap();
        assert_eq!(out.matches("CHIMERA_TARGET=").count(), 1);
    }

    #[test]
    fn test_unknown_service_fails() {
        let err = render(&config(), &RunContext::new("."), "jenkins").unwrap_err();
        assert!(err.to_string().contains("jenkins"));
    }
}
