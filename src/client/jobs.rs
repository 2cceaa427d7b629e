//! Engine and job operations backed directly by the REST API

use crate::client::{EngineInfo, Hapy, JobInfo, Payload, ScriptOutput};
use crate::scripts::{self, Script, ScriptParams, GROOVY};
use crate::xml::{decode_document, Value};
use crate::{HapyError, Result};
use reqwest::{Method, StatusCode};

impl Hapy {
    /// Creates a new job directory named `name` under the engine's jobs directory
    pub async fn create_job(&self, name: &str) -> Result<()> {
        self.post_action(
            self.engine_url().clone(),
            &[("action", "create"), ("createpath", name)],
        )
        .await
    }

    /// Registers an existing job directory with the engine
    pub async fn add_job_directory(&self, path: &str) -> Result<()> {
        self.post_action(
            self.engine_url().clone(),
            &[("action", "add"), ("path", path)],
        )
        .await
    }

    /// Asks the engine to rescan its jobs directory
    pub async fn rescan_job_directory(&self) -> Result<()> {
        self.post_action(self.engine_url().clone(), &[("action", "rescan")])
            .await
    }

    pub async fn build_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "build").await
    }

    /// Launches a built job as a fresh crawl
    pub async fn launch_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "launch").await
    }

    /// Launches a built job, resuming from the named checkpoint
    pub async fn launch_job_from_checkpoint(&self, name: &str, checkpoint: &str) -> Result<()> {
        self.post_action(
            self.job_url(name, &[]),
            &[("action", "launch"), ("checkpoint", checkpoint)],
        )
        .await
    }

    /// Resumes a job from its newest checkpoint, or launches it fresh if it has none
    ///
    /// # Returns
    ///
    /// * `Ok(Some(checkpoint))` - The checkpoint the job was launched from
    /// * `Ok(None)` - No checkpoint existed; the job was launched as a new crawl
    pub async fn launch_from_latest_checkpoint(&self, name: &str) -> Result<Option<String>> {
        let info = self.job_info(name).await?;

        match info.latest_checkpoint() {
            None => {
                tracing::info!("No checkpoint found for {}, launching as a new job", name);
                self.launch_job(name).await?;
                Ok(None)
            }
            Some(checkpoint) => {
                tracing::info!("Launching {} from checkpoint {}", name, checkpoint);
                self.launch_job_from_checkpoint(name, checkpoint).await?;
                Ok(Some(checkpoint.to_string()))
            }
        }
    }

    pub async fn pause_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "pause").await
    }

    pub async fn unpause_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "unpause").await
    }

    pub async fn terminate_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "terminate").await
    }

    pub async fn teardown_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "teardown").await
    }

    pub async fn checkpoint_job(&self, name: &str) -> Result<()> {
        self.job_action(name, "checkpoint").await
    }

    /// Copies job `src_name` to a new job `dest_name`, optionally as a profile
    pub async fn copy_job(&self, src_name: &str, dest_name: &str, as_profile: bool) -> Result<()> {
        let mut fields = vec![("copyTo", dest_name)];
        if as_profile {
            fields.push(("asProfile", "on"));
        }
        self.post_action(self.job_url(src_name, &[]), &fields).await
    }

    /// Runs `script` in the scripting engine `engine` against the job's context
    ///
    /// Either output field is `None` when the engine left it out or empty.
    pub async fn execute_script(&self, name: &str, engine: &str, script: &str) -> Result<ScriptOutput> {
        let body = self
            .transport
            .call(
                Method::POST,
                self.job_url(name, &["script"]),
                Payload::form([("engine", engine), ("script", script)]),
                StatusCode::OK,
            )
            .await?;

        let document = decode_document(&body)?;
        Ok(ScriptOutput::from_document(&document))
    }

    /// Replaces the job's primary configuration with `cxml`
    pub async fn submit_configuration(&self, name: &str, cxml: impl Into<Vec<u8>>) -> Result<()> {
        let url = self.primary_config_url(name).await?;
        self.transport
            .call(
                Method::PUT,
                url,
                Payload::Document(cxml.into()),
                StatusCode::OK,
            )
            .await?;
        Ok(())
    }

    /// Raw decoded engine document (`{"engine": {...}}`)
    pub async fn get_info(&self) -> Result<Value> {
        self.get_document(self.engine_url().clone()).await
    }

    /// Raw decoded job document (`{"job": {...}}`)
    pub async fn get_job_info(&self, name: &str) -> Result<Value> {
        self.get_document(self.job_url(name, &[])).await
    }

    pub async fn engine_info(&self) -> Result<EngineInfo> {
        Ok(EngineInfo::from_document(&self.get_info().await?))
    }

    pub async fn job_info(&self, name: &str) -> Result<JobInfo> {
        Ok(JobInfo::from_document(&self.get_job_info(name).await?))
    }

    /// Fetches the job's primary configuration exactly as stored by the engine
    pub async fn get_job_configuration(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.primary_config_url(name).await?;
        self.get(url).await
    }

    /// Deletes a job
    ///
    /// Runs the bundled delete script against the job, removes the local
    /// `{jobsDir}/{name}.jobpath` marker if it exists on this machine, and
    /// rescans the jobs directory.
    pub async fn delete_job(&self, name: &str) -> Result<()> {
        let script = scripts::render(Script::DeleteJob, &ScriptParams::default())?;
        self.execute_script(name, GROOVY, &script).await?;

        let engine = self.engine_info().await?;
        match engine.jobs_dir {
            Some(jobs_dir) => {
                let marker = std::path::Path::new(&jobs_dir).join(format!("{}.jobpath", name));
                let is_file = tokio::fs::metadata(&marker)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false);
                if is_file {
                    tokio::fs::remove_file(&marker).await?;
                    tracing::info!("Removed job path marker {}", marker.display());
                }
            }
            None => {
                tracing::warn!("Engine did not report jobsDir; skipping job path marker for {}", name);
            }
        }

        self.rescan_job_directory().await
    }

    async fn job_action(&self, name: &str, action: &str) -> Result<()> {
        self.post_action(self.job_url(name, &[]), &[("action", action)])
            .await
    }

    async fn primary_config_url(&self, name: &str) -> Result<url::Url> {
        let reported = self
            .job_info(name)
            .await?
            .primary_config_url
            .ok_or_else(|| HapyError::MissingField("job.primaryConfigUrl".to_string()))?;
        self.resolve(&reported)
    }
}
