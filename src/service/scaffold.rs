//! Project scaffolding pipeline.
//!
//! Each call works in its own project directory and never changes the
//! process working directory. The project directory is claimed with a
//! single `mkdir`, so of two concurrent calls for the same project only one
//! proceeds.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::service::paths::{absolutize, expand_user};
use crate::service::templates::{render_main_py, render_readme, render_report};
use crate::service::toolchain::{ScaffoldStep, Toolchain};
use crate::types::{ClientConfig, ProjectRequest, ENTRY_POINT};

/// Outcome of a successful scaffold.
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub project_name: String,
    /// `location/name` as given, after `~` expansion.
    pub project_dir: PathBuf,
    /// Absolute form of `project_dir`, used in client configuration.
    pub absolute_dir: PathBuf,
    /// Setup log lines in the order they happened.
    pub log: Vec<String>,
    pub client_config: ClientConfig,
}

impl ScaffoldReport {
    /// Human-readable summary returned to the MCP client.
    pub fn message(&self) -> String {
        render_report(
            &self.project_name,
            &self.project_dir,
            &self.absolute_dir,
            &self.log,
        )
    }
}

/// Creates MCP server projects.
pub struct ScaffoldService {
    toolchain: Arc<dyn Toolchain>,
    auto_install: bool,
}

impl ScaffoldService {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            toolchain,
            auto_install: true,
        }
    }

    /// Whether a missing uv gets installed automatically.
    pub fn with_auto_install(mut self, auto_install: bool) -> Self {
        self.auto_install = auto_install;
        self
    }

    /// Scaffold a project. Stops at the first failing stage and leaves
    /// whatever was already created on disk.
    pub async fn create(&self, request: &ProjectRequest) -> Result<ScaffoldReport> {
        request.validate()?;
        let mut log = Vec::new();

        let location = expand_user(&request.project_location);
        if !location.exists() {
            fs::create_dir_all(&location)
                .await
                .map_err(|e| Error::DirectoryCreation {
                    path: location.display().to_string(),
                    message: e.to_string(),
                })?;
            log.push(format!("✅ Created directory: {}", location.display()));
        }

        self.ensure_toolchain(&mut log).await?;

        let project_dir = location.join(&request.project_name);
        match fs::create_dir(&project_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::ProjectExists(project_dir));
            }
            Err(e) => return Err(e.into()),
        }
        log.push(format!(
            "✅ Created project directory: {}",
            project_dir.display()
        ));
        info!("Scaffolding {} in {}", request.project_name, project_dir.display());

        for step in ScaffoldStep::ALL {
            self.toolchain.run_step(step, &project_dir).await?;
            log.push(step.success_message().to_string());
        }

        let absolute_dir = absolutize(&project_dir)?;

        fs::write(
            project_dir.join(ENTRY_POINT),
            render_main_py(&request.server_description),
        )
        .await?;
        log.push("✅ Created main.py with basic MCP server implementation".to_string());

        let readme = render_readme(
            &request.project_name,
            &request.server_description,
            &absolute_dir,
        )?;
        fs::write(project_dir.join("README.md"), readme).await?;
        log.push("✅ Created README.md with usage instructions".to_string());

        info!("Created MCP server project at {}", absolute_dir.display());

        Ok(ScaffoldReport {
            project_name: request.project_name.clone(),
            client_config: ClientConfig::for_project(&request.project_name, &absolute_dir),
            project_dir,
            absolute_dir,
            log,
        })
    }

    async fn ensure_toolchain(&self, log: &mut Vec<String>) -> Result<()> {
        match self.toolchain.version().await {
            Ok(version) => {
                info!("Found {}", version);
                log.push("✅ uv package manager is installed".to_string());
                return Ok(());
            }
            Err(e) => warn!("uv is not usable: {}", e),
        }

        if !self.auto_install {
            return Err(Error::InstallFailed(
                "automatic installation is disabled".to_string(),
            ));
        }

        log.push("Installing uv package manager...".to_string());
        match self.toolchain.install().await {
            Ok(()) => {
                log.push("✅ uv package manager installed successfully".to_string());
                Ok(())
            }
            Err(Error::UnsupportedPlatform) => Err(Error::UnsupportedPlatform),
            Err(Error::InstallFailed(detail)) => Err(Error::InstallFailed(detail)),
            Err(e) => Err(Error::InstallFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Records calls instead of running uv.
    #[derive(Default)]
    struct FakeToolchain {
        installed: bool,
        install_outcome: Option<fn() -> Error>,
        fail_step: Option<ScaffoldStep>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeToolchain {
        fn installed() -> Self {
            Self {
                installed: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Toolchain for FakeToolchain {
        async fn version(&self) -> Result<String> {
            self.calls.lock().unwrap().push("--version".to_string());
            if self.installed {
                Ok("uv 0.5.0".to_string())
            } else {
                Err(Error::Internal("not found".to_string()))
            }
        }

        async fn install(&self) -> Result<()> {
            self.calls.lock().unwrap().push("install".to_string());
            match self.install_outcome {
                Some(make_error) => Err(make_error()),
                None => Ok(()),
            }
        }

        async fn run_step(&self, step: ScaffoldStep, dir: &Path) -> Result<()> {
            assert!(dir.is_dir(), "steps run inside the project directory");
            self.calls.lock().unwrap().push(step.args().join(" "));
            if self.fail_step == Some(step) {
                return Err(Error::StepFailed {
                    step,
                    detail: "fake failure".to_string(),
                });
            }
            if step == ScaffoldStep::Init {
                std::fs::write(dir.join("main.py"), "print('hello')\n").unwrap();
            }
            Ok(())
        }
    }

    fn service(toolchain: FakeToolchain) -> (ScaffoldService, Arc<FakeToolchain>) {
        let fake = Arc::new(toolchain);
        (ScaffoldService::new(fake.clone()), fake)
    }

    #[tokio::test]
    async fn test_create_project() {
        let root = tempfile::tempdir().unwrap();
        let location = root.path().join("servers");
        let (svc, fake) = service(FakeToolchain::installed());

        let request = ProjectRequest::new("weather", location.display().to_string())
            .with_description("Weather Server");
        let report = svc.create(&request).await.unwrap();

        assert_eq!(report.project_dir, location.join("weather"));
        assert!(report.absolute_dir.is_absolute());
        assert_eq!(
            fake.calls(),
            vec!["--version", "init", "venv", "add mcp[cli] httpx"]
        );

        let main = std::fs::read_to_string(report.project_dir.join("main.py")).unwrap();
        assert!(main.contains("FastMCP(\"Weather Server\")"));
        let readme = std::fs::read_to_string(report.project_dir.join("README.md")).unwrap();
        assert!(readme.starts_with("# weather"));

        assert_eq!(
            report.log,
            vec![
                format!("✅ Created directory: {}", location.display()),
                "✅ uv package manager is installed".to_string(),
                format!(
                    "✅ Created project directory: {}",
                    location.join("weather").display()
                ),
                "✅ Initialized uv project".to_string(),
                "✅ Created virtual environment".to_string(),
                "✅ Installed required dependencies".to_string(),
                "✅ Created main.py with basic MCP server implementation".to_string(),
                "✅ Created README.md with usage instructions".to_string(),
            ]
        );

        let entry = &report.client_config.mcp_servers["weather"];
        assert_eq!(entry.args[1], report.absolute_dir.display().to_string());
        assert!(report.message().contains("MCP Server created successfully!"));
    }

    #[tokio::test]
    async fn test_existing_location_is_not_logged() {
        let root = tempfile::tempdir().unwrap();
        let (svc, _) = service(FakeToolchain::installed());

        let request = ProjectRequest::new("demo", root.path().display().to_string());
        let report = svc.create(&request).await.unwrap();
        assert_eq!(report.log[0], "✅ uv package manager is installed");
    }

    #[tokio::test]
    async fn test_project_exists() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("taken")).unwrap();
        let (svc, fake) = service(FakeToolchain::installed());

        let request = ProjectRequest::new("taken", root.path().display().to_string());
        let err = svc.create(&request).await.unwrap_err();

        assert!(matches!(err, Error::ProjectExists(_)));
        assert!(err.to_string().ends_with("already exists. Please choose a different name or location."));
        assert_eq!(fake.calls(), vec!["--version"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_claim_directory_once() {
        for round in 0..10 {
            let root = tempfile::tempdir().unwrap();
            let svc = Arc::new(ScaffoldService::new(Arc::new(FakeToolchain::installed())));
            let request = ProjectRequest::new("race", root.path().display().to_string());

            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let svc = svc.clone();
                    let request = request.clone();
                    tokio::spawn(async move { svc.create(&request).await })
                })
                .collect();

            let mut created = 0;
            let mut rejected = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => created += 1,
                    Err(Error::ProjectExists(dir)) => {
                        assert_eq!(dir, root.path().join("race"));
                        rejected += 1;
                    }
                    Err(e) => panic!("round {}: unexpected error {}", round, e),
                }
            }
            assert_eq!((created, rejected), (1, 3), "round {}", round);
        }
    }

    #[tokio::test]
    async fn test_invalid_name_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let location = root.path().join("never-created");
        let (svc, fake) = service(FakeToolchain::installed());

        let request = ProjectRequest::new("../escape", location.display().to_string());
        let err = svc.create(&request).await.unwrap_err();

        assert!(matches!(err, Error::InvalidProjectName { .. }));
        assert!(!location.exists());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_step_failure_stops_pipeline() {
        let root = tempfile::tempdir().unwrap();
        let (svc, fake) = service(FakeToolchain {
            installed: true,
            fail_step: Some(ScaffoldStep::Venv),
            ..Default::default()
        });

        let request = ProjectRequest::new("broken", root.path().display().to_string());
        let err = svc.create(&request).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to create virtual environment");
        assert_eq!(fake.calls(), vec!["--version", "init", "venv"]);
        // Partial project stays on disk, without README.
        assert!(root.path().join("broken").is_dir());
        assert!(!root.path().join("broken").join("README.md").exists());
    }

    #[tokio::test]
    async fn test_installs_missing_uv() {
        let root = tempfile::tempdir().unwrap();
        let (svc, fake) = service(FakeToolchain::default());

        let request = ProjectRequest::new("fresh", root.path().display().to_string());
        let report = svc.create(&request).await.unwrap();

        assert_eq!(fake.calls()[..2], ["--version", "install"]);
        assert_eq!(report.log[0], "Installing uv package manager...");
        assert_eq!(report.log[1], "✅ uv package manager installed successfully");
    }

    #[tokio::test]
    async fn test_install_unsupported_platform() {
        let root = tempfile::tempdir().unwrap();
        let (svc, _) = service(FakeToolchain {
            install_outcome: Some(|| Error::UnsupportedPlatform),
            ..Default::default()
        });

        let request = ProjectRequest::new("x", root.path().display().to_string());
        let err = svc.create(&request).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform));
        assert!(!root.path().join("x").exists());
    }

    #[tokio::test]
    async fn test_install_failure_is_normalised() {
        let root = tempfile::tempdir().unwrap();
        let (svc, _) = service(FakeToolchain {
            install_outcome: Some(|| Error::Internal("curl: (6) could not resolve host".to_string())),
            ..Default::default()
        });

        let request = ProjectRequest::new("x", root.path().display().to_string());
        let err = svc.create(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to install uv package manager. Please install it manually."
        );
    }

    #[tokio::test]
    async fn test_auto_install_disabled() {
        let root = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeToolchain::default());
        let svc = ScaffoldService::new(fake.clone()).with_auto_install(false);

        let request = ProjectRequest::new("x", root.path().display().to_string());
        let err = svc.create(&request).await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed(_)));
        assert_eq!(fake.calls(), vec!["--version"]);
    }
}
