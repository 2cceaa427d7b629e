//! Bundled Groovy scripts
//!
//! Some operations are not part of the engine's REST surface and are instead
//! run as scripts against a job's application context. The sources live
//! under `templates/` and are rendered with minijinja, so the query scripts
//! can take a URL and a result limit.

use minijinja::{context, Environment, UndefinedBehavior};

/// Scripting engine name the engine registers for Groovy
pub const GROOVY: &str = "groovy";

/// A bundled script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    DeleteJob,
    LaunchId,
    EmptyFrontier,
    SurtScope,
    ShowDecideRules,
    ShowAllSheets,
    ShowMetadata,
    KillAllToethreads,
    PendingUrls,
    PendingUrlsFrom,
    UrlStatus,
}

impl Script {
    pub const ALL: [Script; 11] = [
        Self::DeleteJob,
        Self::LaunchId,
        Self::EmptyFrontier,
        Self::SurtScope,
        Self::ShowDecideRules,
        Self::ShowAllSheets,
        Self::ShowMetadata,
        Self::KillAllToethreads,
        Self::PendingUrls,
        Self::PendingUrlsFrom,
        Self::UrlStatus,
    ];

    /// Template name, also the CLI command name for the query scripts
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeleteJob => "delete-job",
            Self::LaunchId => "launch-id",
            Self::EmptyFrontier => "empty-frontier",
            Self::SurtScope => "surt-scope",
            Self::ShowDecideRules => "show-decide-rules",
            Self::ShowAllSheets => "show-all-sheets",
            Self::ShowMetadata => "show-metadata",
            Self::KillAllToethreads => "kill-all-toethreads",
            Self::PendingUrls => "pending-urls",
            Self::PendingUrlsFrom => "pending-urls-from",
            Self::UrlStatus => "url-status",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::DeleteJob => include_str!("templates/delete-job.groovy"),
            Self::LaunchId => include_str!("templates/launch-id.groovy"),
            Self::EmptyFrontier => include_str!("templates/empty-frontier.groovy"),
            Self::SurtScope => include_str!("templates/surt-scope.groovy"),
            Self::ShowDecideRules => include_str!("templates/show-decide-rules.groovy"),
            Self::ShowAllSheets => include_str!("templates/show-all-sheets.groovy"),
            Self::ShowMetadata => include_str!("templates/show-metadata.groovy"),
            Self::KillAllToethreads => include_str!("templates/kill-all-toethreads.groovy"),
            Self::PendingUrls => include_str!("templates/pending-urls.groovy"),
            Self::PendingUrlsFrom => include_str!("templates/pending-urls-from.groovy"),
            Self::UrlStatus => include_str!("templates/url-status.groovy"),
        }
    }

    fn template_name(&self) -> String {
        format!("{}.groovy", self.name())
    }
}

/// Values the query scripts are rendered with
#[derive(Debug, Clone)]
pub struct ScriptParams {
    /// URL to look up
    pub url: String,

    /// Maximum number of results to print
    pub limit: u32,
}

impl Default for ScriptParams {
    fn default() -> Self {
        Self {
            url: "http://www.bbc.co.uk/news".to_string(),
            limit: 10,
        }
    }
}

/// Renders bundled scripts
pub struct ScriptRenderer {
    environment: Environment<'static>,
}

impl ScriptRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Strict);
        environment.add_filter("groovy_string", groovy_string);

        for script in Script::ALL {
            environment.add_template_owned(script.template_name(), script.source())?;
        }

        Ok(Self { environment })
    }

    pub fn render(&self, script: Script, params: &ScriptParams) -> Result<String, minijinja::Error> {
        let template = self.environment.get_template(&script.template_name())?;
        template.render(context! {
            url => &params.url,
            limit => params.limit,
        })
    }
}

/// Renders one script with a throwaway renderer
pub fn render(script: Script, params: &ScriptParams) -> Result<String, minijinja::Error> {
    ScriptRenderer::new()?.render(script, params)
}

/// Quotes a value as a single-quoted Groovy string, which is never interpolated
fn groovy_string(value: String) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
