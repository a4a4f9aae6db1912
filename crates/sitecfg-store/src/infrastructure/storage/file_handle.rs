//! Write access to the published configuration file.
//!
//! [`PromptFilePicker`] grants a [`LocalFileHandle`] for the configured
//! target.  With `confirm` enabled the operator is asked once, on a blocking
//! thread so the runtime keeps going; answering "no" or pressing Esc is a
//! cancellation.  The orchestrator caches the handle, so later saves in the
//! same session write without asking again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dialoguer::Confirm;
use tracing::debug;

use crate::application::backends::{FileHandle, FilePicker, HandleError};

/// [`FilePicker`] for a fixed target path.
pub struct PromptFilePicker {
    target: PathBuf,
    confirm: bool,
}

impl PromptFilePicker {
    pub fn new(target: impl Into<PathBuf>, confirm: bool) -> Self {
        Self {
            target: target.into(),
            confirm,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    async fn ask(&self) -> Result<bool, HandleError> {
        let prompt = format!("Write the site configuration to {}?", self.target.display());
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact_opt()
        })
        .await
        .map_err(|e| HandleError::Unavailable(e.to_string()))?
        .map_err(|e| HandleError::Unavailable(e.to_string()))?;
        Ok(answer == Some(true))
    }
}

#[async_trait]
impl FilePicker for PromptFilePicker {
    async fn pick(&self) -> Result<Arc<dyn FileHandle>, HandleError> {
        if self.target.is_dir() {
            return Err(HandleError::Unavailable(format!(
                "{} is a directory",
                self.target.display()
            )));
        }
        if self.confirm && !self.ask().await? {
            return Err(HandleError::Cancelled);
        }
        Ok(Arc::new(LocalFileHandle::new(self.target.clone())))
    }
}

/// Handle to a file on the local file system.
pub struct LocalFileHandle {
    path: PathBuf,
}

impl LocalFileHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn write(&self, contents: &str) -> Result<(), HandleError> {
        let tmp = self.temp_path();
        let describe = |e: std::io::Error| HandleError::Write(format!("{}: {e}", self.path.display()));
        tokio::fs::write(&tmp, contents).await.map_err(describe)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(describe)?;
        debug!("replaced {}", self.path.display());
        Ok(())
    }
}
