//! Typed views over decoded engine documents
//!
//! Every field is optional: the engine omits elements it has no value for,
//! and these views report that as `None` instead of failing.

use crate::xml::Value;

fn text_at(node: Option<&Value>, key: &str) -> Option<String> {
    node.and_then(|n| n.get(key))
        .and_then(Value::as_text)
        .map(str::to_string)
}

/// State of a single job, from `GET /engine/job/{name}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInfo {
    pub short_name: Option<String>,
    pub crawl_controller_state: Option<String>,
    pub status_description: Option<String>,
    pub primary_config_url: Option<String>,

    /// Checkpoint names in the order the engine lists them, newest first
    pub checkpoints: Vec<String>,
}

impl JobInfo {
    /// Reads a decoded `<job>` document
    pub fn from_document(document: &Value) -> Self {
        let job = document.get("job");

        let checkpoints = job
            .and_then(|j| j.pointer(&["checkpointFiles", "value"]))
            .map(|value| {
                value
                    .items()
                    .into_iter()
                    .filter_map(Value::as_text)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            short_name: text_at(job, "shortName"),
            crawl_controller_state: text_at(job, "crawlControllerState"),
            status_description: text_at(job, "statusDescription"),
            primary_config_url: text_at(job, "primaryConfigUrl"),
            checkpoints,
        }
    }

    /// The checkpoint a resumed crawl should start from
    ///
    /// The engine lists checkpoints newest first, and reports a lone
    /// checkpoint as a scalar rather than a one-element list.
    pub fn latest_checkpoint(&self) -> Option<&str> {
        self.checkpoints.first().map(String::as_str)
    }

    /// Controller state, or the status description when the job has no controller
    pub fn status(&self) -> Option<&str> {
        self.crawl_controller_state
            .as_deref()
            .or(self.status_description.as_deref())
    }
}

/// One entry of the engine's job list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub key: Option<String>,
    pub short_name: Option<String>,
    pub url: Option<String>,
    pub is_profile: bool,
    pub crawl_controller_state: Option<String>,
    pub status_description: Option<String>,
}

impl JobSummary {
    fn from_value(value: &Value) -> Self {
        let node = Some(value);
        Self {
            key: text_at(node, "key"),
            short_name: text_at(node, "shortName"),
            url: text_at(node, "url"),
            is_profile: text_at(node, "isProfile").as_deref() == Some("true"),
            crawl_controller_state: text_at(node, "crawlControllerState"),
            status_description: text_at(node, "statusDescription"),
        }
    }
}

/// Engine-wide state, from `GET /engine`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub heritrix_version: Option<String>,
    pub jobs_dir: Option<String>,
    pub jobs: Vec<JobSummary>,
}

impl EngineInfo {
    /// Reads a decoded `<engine>` document
    pub fn from_document(document: &Value) -> Self {
        let engine = document.get("engine");

        Self {
            heritrix_version: text_at(engine, "heritrixVersion"),
            jobs_dir: text_at(engine, "jobsDir"),
            jobs: job_entries(document)
                .into_iter()
                .map(JobSummary::from_value)
                .collect(),
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobSummary> {
        self.jobs
            .iter()
            .find(|j| j.short_name.as_deref() == Some(name) || j.key.as_deref() == Some(name))
    }
}

/// Job entries of an engine document, as a list whether the engine sent one or many
pub fn job_entries(document: &Value) -> Vec<&Value> {
    document
        .pointer(&["engine", "jobs", "value"])
        .map(Value::items)
        .unwrap_or_default()
}

/// Output of a script run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Text written to `rawOut`
    pub raw: Option<String>,

    /// Text written to `htmlOut`
    pub html: Option<String>,
}

impl ScriptOutput {
    /// Reads the direct `rawOutput` and `htmlOutput` children of the root element
    pub fn from_document(document: &Value) -> Self {
        let root = document.as_map().and_then(|m| m.values().next());
        Self {
            raw: text_at(root, "rawOutput"),
            html: text_at(root, "htmlOutput"),
        }
    }
}
