//! The `uv` package manager, driven as a subprocess.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Packages added to every generated project.
pub const PROJECT_DEPENDENCIES: &[&str] = &["mcp[cli]", "httpx"];

/// A uv invocation run inside the new project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldStep {
    Init,
    Venv,
    AddDependencies,
}

impl ScaffoldStep {
    /// Steps in the order they run.
    pub const ALL: [ScaffoldStep; 3] = [Self::Init, Self::Venv, Self::AddDependencies];

    /// Arguments passed to uv.
    pub fn args(&self) -> Vec<&'static str> {
        match self {
            Self::Init => vec!["init"],
            Self::Venv => vec!["venv"],
            Self::AddDependencies => {
                let mut args = vec!["add"];
                args.extend_from_slice(PROJECT_DEPENDENCIES);
                args
            }
        }
    }

    /// What the step does, phrased to follow "Failed to".
    pub fn action(&self) -> &'static str {
        match self {
            Self::Init => "initialize uv project",
            Self::Venv => "create virtual environment",
            Self::AddDependencies => "install dependencies",
        }
    }

    /// Setup log line written when the step succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Init => "✅ Initialized uv project",
            Self::Venv => "✅ Created virtual environment",
            Self::AddDependencies => "✅ Installed required dependencies",
        }
    }
}

/// Operations the scaffolder needs from a package manager.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Version string of the installed tool. Errors when it is unusable.
    async fn version(&self) -> Result<String>;

    /// Install the tool for the current user.
    async fn install(&self) -> Result<()>;

    /// Run one scaffolding step with `dir` as the working directory.
    async fn run_step(&self, step: ScaffoldStep, dir: &Path) -> Result<()>;
}

/// `uv` on the local machine.
pub struct UvToolchain {
    binary: RwLock<PathBuf>,
    command_timeout: Duration,
    install_script_url: String,
    /// Checked in order after installing, since our `PATH` predates the install.
    install_candidates: Vec<PathBuf>,
    client: reqwest::Client,
}

impl UvToolchain {
    pub fn new(binary: impl Into<PathBuf>, command_timeout: Duration) -> Self {
        Self {
            binary: RwLock::new(binary.into()),
            command_timeout,
            install_script_url: crate::config::DEFAULT_INSTALL_SCRIPT_URL.to_string(),
            install_candidates: install_candidates(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.uv_binary.clone(),
            Duration::from_secs(config.command_timeout),
        )
        .with_install_script_url(config.install_script_url.clone())
    }

    /// Fetch the installer from `url` instead of astral.sh.
    pub fn with_install_script_url(mut self, url: impl Into<String>) -> Self {
        self.install_script_url = url.into();
        self
    }

    /// Replace the locations searched for a freshly installed binary.
    pub fn with_install_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.install_candidates = candidates;
        self
    }

    /// The executable currently used for uv invocations.
    pub async fn binary(&self) -> PathBuf {
        self.binary.read().await.clone()
    }

    async fn exec(&self, args: &[&str], dir: Option<&Path>) -> Result<Output> {
        let binary = self.binary().await;
        let label = format!("{} {}", binary.display(), args.join(" "));
        debug!("Running: {}", label);

        let mut cmd = Command::new(&binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        match timeout(self.command_timeout, cmd.output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(Error::Timeout {
                command: label,
                seconds: self.command_timeout.as_secs(),
            }),
        }
    }

    async fn download_script(&self) -> Result<String> {
        let fetch = async {
            let response = self
                .client
                .get(&self.install_script_url)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        };

        match timeout(self.command_timeout, fetch).await {
            Ok(Ok(script)) => Ok(script),
            Ok(Err(e)) => Err(Error::InstallFailed(format!(
                "download of {} failed: {}",
                self.install_script_url, e
            ))),
            Err(_) => Err(Error::InstallFailed(format!(
                "download of {} timed out",
                self.install_script_url
            ))),
        }
    }

    async fn run_install_script(&self, script: &str) -> Result<()> {
        let mut child = Command::new("sh")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::InstallFailed(format!("failed to start sh: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .await
                .map_err(|e| Error::InstallFailed(format!("failed to feed installer: {}", e)))?;
        }

        let output = match timeout(self.command_timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| Error::InstallFailed(e.to_string()))?,
            Err(_) => return Err(Error::InstallFailed("installer timed out".to_string())),
        };

        if !output.status.success() {
            return Err(Error::InstallFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the official installer may have placed `uv`, most likely first.
pub fn install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::var_os("XDG_BIN_HOME") {
        candidates.push(PathBuf::from(dir).join("uv"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("uv"));
        candidates.push(home.join(".cargo").join("bin").join("uv"));
    }
    candidates
}

#[async_trait]
impl Toolchain for UvToolchain {
    async fn version(&self) -> Result<String> {
        let output = self.exec(&["--version"], None).await?;
        if !output.status.success() {
            return Err(Error::Internal(format!(
                "uv --version exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn install(&self) -> Result<()> {
        if !cfg!(any(target_os = "macos", target_os = "linux")) {
            return Err(Error::UnsupportedPlatform);
        }

        info!("Downloading uv installer from {}", self.install_script_url);
        let script = self.download_script().await?;
        self.run_install_script(&script).await?;

        if self.version().await.is_ok() {
            return Ok(());
        }

        // The installer does not touch the PATH of an already-running process.
        for candidate in &self.install_candidates {
            if candidate.is_file() {
                info!("Using freshly installed uv at {}", candidate.display());
                *self.binary.write().await = candidate.clone();
                return Ok(());
            }
        }

        warn!("uv installer finished but no uv binary was found");
        Err(Error::InstallFailed(
            "uv not found after installation".to_string(),
        ))
    }

    async fn run_step(&self, step: ScaffoldStep, dir: &Path) -> Result<()> {
        let output = self
            .exec(&step.args(), Some(dir))
            .await
            .map_err(|e| Error::StepFailed {
                step,
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("uv {} failed: {}", step.args().join(" "), detail);
            return Err(Error::StepFailed { step, detail });
        }
        Ok(())
    }
}
