//! Staging directory and build context archive.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chimera_templates::DockerfileTemplate;
use tokio::fs;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::target::Target;

/// Name of the generated build file inside the staging directory.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Name of the project link inside the staging directory.
pub const PROJECT_LINK_NAME: &str = "project";

/// Stage a target and pack it into its build context archive.
///
/// Creates the staging directory, writes the rendered Dockerfile, links the
/// project directory next to it and archives the result with links resolved.
pub async fn bundle(
    target: &Target,
    project_dir: &Path,
    template: &DockerfileTemplate,
) -> CoreResult<()> {
    let staging = target.staging_dir();
    let dockerfile = template.render(&target.dockerfile_context())?;

    fs::create_dir(staging).await.map_err(|source| staging_error(staging, source))?;

    let dockerfile_path = staging.join(DOCKERFILE_NAME);
    fs::write(&dockerfile_path, dockerfile)
        .await
        .map_err(|source| staging_error(&dockerfile_path, source))?;

    let project = absolute(project_dir).map_err(|source| staging_error(project_dir, source))?;
    let link = staging.join(PROJECT_LINK_NAME);
    link_dir(&project, &link)
        .await
        .map_err(|source| staging_error(&link, source))?;

    let source_dir = staging.to_path_buf();
    let archive = target.archive_path().to_path_buf();
    tokio::task::spawn_blocking(move || write_archive(&source_dir, &archive))
        .await
        .map_err(|e| CoreError::Archive {
            path: target.archive_path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })??;

    debug!("Bundled {} into {:?}", target, target.archive_path());
    Ok(())
}

/// Pack `dir` into a tar file at `archive`, following symlinks.
pub fn write_archive(dir: &Path, archive: &Path) -> CoreResult<()> {
    let archive_error = |source| CoreError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(dir)
        .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect::<io::Result<Vec<_>>>())
        .map_err(archive_error)?;
    entries.sort();

    let file = File::create(archive).map_err(archive_error)?;
    let mut builder = tar::Builder::new(file);
    builder.follow_symlinks(true);

    // Entries go in at the archive root; `is_dir` resolves the project link
    for path in &entries {
        let name = path.strip_prefix(dir).unwrap_or(path);
        if path.is_dir() {
            builder.append_dir_all(name, path).map_err(archive_error)?;
        } else {
            builder.append_path_with_name(path, name).map_err(archive_error)?;
        }
    }

    let file = builder.into_inner().map_err(archive_error)?;
    file.sync_all().map_err(archive_error)?;
    Ok(())
}

fn staging_error(path: &Path, source: io::Error) -> CoreError {
    CoreError::Staging {
        path: path.to_path_buf(),
        source,
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(unix)]
async fn link_dir(original: &Path, link: &Path) -> io::Result<()> {
    fs::symlink(original, link).await
}

#[cfg(windows)]
async fn link_dir(original: &Path, link: &Path) -> io::Result<()> {
    fs::symlink_dir(original, link).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::RunContext;
    use crate::target::expand_targets;
    use std::collections::HashMap;
    use std::io::Read;

    fn target(work_dir: &Path) -> Target {
        let config = Config::from_yaml(
            "targets:\n  node:\n    tags: [\"5\"]\nscript: [\"npm test\"]\n",
        )
        .unwrap();
        let context = RunContext::new("/unused").work_dir(work_dir);
        expand_targets(&config, &context).remove(0)
    }

    fn archive_entries(path: &Path) -> HashMap<String, String> {
        let mut archive = tar::Archive::new(File::open(path).unwrap());
        let mut entries = HashMap::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_start_matches("./")
                .to_string();
            let mut content = String::new();
            if entry.header().entry_type().is_file() {
                entry.read_to_string(&mut content).unwrap();
            }
            entries.insert(name, content);
        }
        entries
    }

    #[tokio::test]
    async fn test_bundle_layout() {
        let work = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("package.json"), "{}").unwrap();
        std::fs::create_dir(project.path().join("test")).unwrap();
        std::fs::write(project.path().join("test/env.js"), "// env").unwrap();

        let target = target(work.path());
        let template = DockerfileTemplate::new().unwrap();
        bundle(&target, project.path(), &template).await.unwrap();

        let staging = target.staging_dir();
        assert!(staging.join(DOCKERFILE_NAME).is_file());
        assert!(std::fs::symlink_metadata(staging.join(PROJECT_LINK_NAME))
            .unwrap()
            .file_type()
            .is_symlink());

        let entries = archive_entries(target.archive_path());
        assert!(entries[DOCKERFILE_NAME].starts_with("FROM node:5\n"));
        assert_eq!(entries["project/package.json"], "{}");
        assert_eq!(entries["project/test/env.js"], "// env");
    }

    #[tokio::test]
    async fn test_bundle_fails_when_staging_exists() {
        let work = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let target = target(work.path());
        std::fs::create_dir(target.staging_dir()).unwrap();

        let template = DockerfileTemplate::new().unwrap();
        let err = bundle(&target, project.path(), &template).await.unwrap_err();

        assert!(matches!(err, CoreError::Staging { .. }));
        assert!(!target.archive_path().exists());
    }

    #[test]
    fn test_write_archive_into_missing_dir_fails() {
        let source = tempfile::tempdir().unwrap();
        let err = write_archive(source.path(), Path::new("/nonexistent/dir/out.tar")).unwrap_err();
        assert!(matches!(err, CoreError::Archive { .. }));
    }
}
