//! Convenience lookups built on top of the documented operations

use crate::client::{job_entries, Hapy};
use crate::scripts::{self, Script, ScriptParams, GROOVY};
use crate::xml::Value;
use crate::{HapyError, Result};

impl Hapy {
    /// The job's crawl-controller state, `None` when the job has no controller
    pub async fn job_state(&self, name: &str) -> Result<Option<String>> {
        Ok(self.job_info(name).await?.crawl_controller_state)
    }

    /// Crawl-controller state, falling back to the status description
    pub async fn job_status(&self, name: &str) -> Result<Option<String>> {
        let info = self.job_info(name).await?;
        Ok(info.status().map(str::to_string))
    }

    /// Every job entry of the engine document, as a list even for a single job
    pub async fn get_jobs(&self) -> Result<Vec<Value>> {
        let document = self.get_info().await?;
        Ok(job_entries(&document).into_iter().cloned().collect())
    }

    /// Short names of the engine's jobs, optionally only those in `state`
    pub async fn list_jobs(&self, state: Option<&str>) -> Result<Vec<String>> {
        let engine = self.engine_info().await?;
        Ok(engine
            .jobs
            .into_iter()
            .filter(|job| state.is_none() || job.crawl_controller_state.as_deref() == state)
            .filter_map(|job| job.short_name)
            .collect())
    }

    /// Identifier of the job's current launch
    pub async fn get_launch_id(&self, name: &str) -> Result<Option<String>> {
        let output = self.run_bundled(name, Script::LaunchId).await?;
        Ok(output
            .raw
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    /// Seeds of the latest launch, up to the first comment line
    pub async fn get_seeds(&self, name: &str) -> Result<Vec<String>> {
        let body = self
            .get(self.job_url(name, &["jobdir", "latest", "seeds.txt"]))
            .await?;
        Ok(parse_seeds(&String::from_utf8_lossy(&body)))
    }

    /// Deletes every queued URI from the job's frontier
    ///
    /// Returns the count reported by the engine.
    pub async fn empty_frontier(&self, name: &str) -> Result<String> {
        let output = self.run_bundled(name, Script::EmptyFrontier).await?;
        output
            .raw
            .map(|raw| raw.trim().to_string())
            .ok_or_else(|| HapyError::MissingField("rawOutput".to_string()))
    }

    async fn run_bundled(&self, name: &str, script: Script) -> Result<crate::ScriptOutput> {
        let source = scripts::render(script, &ScriptParams::default())?;
        self.execute_script(name, GROOVY, &source).await
    }
}

/// Trims each line and stops at the first one starting with `#`; blank lines are dropped
fn parse_seeds(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with('#'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
