//! h3cc: Heritrix3 crawl controller
//!
//! Command-line front end over the hapy client: starts and stops crawls,
//! reports job status, and runs the bundled Groovy query scripts.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hapy::config::load_config;
use hapy::scripts::{Script, ScriptParams, ScriptRenderer, GROOVY};
use hapy::{ClientConfig, Hapy, ScriptOutput, Value};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// h3cc: Heritrix3 crawl controller
///
/// Performs basic operations against a Heritrix3 engine: starting and
/// stopping crawls, reporting on crawler status, updating crawler
/// configuration, and running diagnostic scripts.
#[derive(Parser, Debug)]
#[command(name = "h3cc")]
#[command(version)]
#[command(about = "Heritrix3 crawl controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Name of job to operate upon
    #[arg(short, long, default_value = "frequent", global = true)]
    job: String,

    /// Name of host to connect to
    #[arg(short = 'H', long, default_value = "localhost", global = true)]
    host: String,

    /// Secure port to connect to
    #[arg(short = 'P', long, default_value_t = 8443, global = true)]
    port: u16,

    /// H3 user to login with
    #[arg(short, long, default_value = "heritrix", global = true)]
    user: String,

    /// H3 user password
    #[arg(short, long, default_value = "heritrix", global = true)]
    password: String,

    /// URL to use for queries
    #[arg(short, long, default_value = "http://www.bbc.co.uk/news", global = true)]
    query_url: String,

    /// Maximum number of results to return from queries
    #[arg(short = 'l', long, default_value_t = 10, global = true)]
    query_limit: u32,

    /// Profile file with engine connection settings (replaces host, port, user and password)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verify the engine's TLS certificate (Heritrix ships a self-signed one)
    #[arg(long, global = true)]
    verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the engine document
    Status,
    /// List job names
    ListJobs {
        /// Only jobs whose crawl controller is in this state (e.g. RUNNING)
        #[arg(long)]
        state: Option<String>,
    },
    /// Print the engine's summary entry for the job
    JobSummary,
    /// Create a new job
    JobCreate,
    /// Build the job
    JobBuild,
    /// Launch the job as a new crawl
    JobLaunch,
    /// Launch the job from its latest checkpoint, or fresh if there is none
    JobResume,
    /// Pause the job
    JobPause,
    /// Unpause the job
    JobUnpause,
    /// Checkpoint the job
    JobCheckpoint,
    /// Terminate the job
    JobTerminate,
    /// Tear down the job
    JobTeardown,
    /// Delete the job directory and rescan
    JobDelete,
    /// Copy the job
    JobCopy {
        /// Name of the new job
        dest: String,
        /// Create the copy as a profile
        #[arg(long)]
        as_profile: bool,
    },
    /// Print the job's status description
    JobStatus,
    /// Print the job document
    JobInfo,
    /// Print the job document as JSON
    JobInfoJson,
    /// Print the job's crawler-beans configuration
    JobCxml,
    /// Replace the job's crawler-beans configuration with a local file
    JobSubmitCxml {
        /// Configuration file to upload
        file: PathBuf,
    },
    /// Print the seeds of the latest launch
    JobSeeds,
    /// Print the job's current launch id
    LaunchId,
    /// Rescan the engine's jobs directory
    Rescan,
    /// Register an existing job directory
    AddJobDir {
        /// Directory on the engine host
        path: String,
    },
    /// Run a local script file against the job
    RunScript {
        /// Script file
        file: PathBuf,
        /// Scripting engine
        #[arg(long, default_value = GROOVY)]
        engine: String,
    },
    /// Delete every queued URI from the job's frontier
    EmptyFrontier,
    /// Print the SURT prefixes in scope
    SurtScope,
    /// Print the scope decide rules
    ShowDecideRules,
    /// Print all sheet overlays
    ShowAllSheets,
    /// Print the crawl metadata
    ShowMetadata,
    /// Kill and replace all toe threads
    KillAllToethreads,
    /// List pending URLs
    PendingUrls,
    /// List pending URLs queued alongside the query URL
    PendingUrlsFrom,
    /// Report how the crawl treats the query URL
    UrlStatus,
}

impl Command {
    /// Bundled script behind a query command
    fn script(&self) -> Option<Script> {
        match self {
            Self::SurtScope => Some(Script::SurtScope),
            Self::ShowDecideRules => Some(Script::ShowDecideRules),
            Self::ShowAllSheets => Some(Script::ShowAllSheets),
            Self::ShowMetadata => Some(Script::ShowMetadata),
            Self::KillAllToethreads => Some(Script::KillAllToethreads),
            Self::PendingUrls => Some(Script::PendingUrls),
            Self::PendingUrlsFrom => Some(Script::PendingUrlsFrom),
            Self::UrlStatus => Some(Script::UrlStatus),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::debug!("{:?}", e);
                eprintln!("h3cc: {:#}", e);
                eprintln!("      for help use --help");
                ExitCode::from(2)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            ExitCode::SUCCESS
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("h3cc=info,hapy=info,warn"),
            1 => EnvFilter::new("h3cc=debug,hapy=debug,info"),
            2 => EnvFilter::new("h3cc=trace,hapy=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the connection parameters from the profile file or the host flags
fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading profile from: {}", path.display());
            load_config(path)
                .with_context(|| format!("loading {}", path.display()))?
                .client_config()?
        }
        None => ClientConfig::parse(&format!("https://{}:{}", cli.host, cli.port))
            .context("building engine URL from host and port")?
            .with_credentials(cli.user.clone(), cli.password.clone())
            .insecure(!cli.verify_tls),
    };

    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = client_config(&cli)?;
    tracing::debug!("Talking to engine at {}", config.base_url);

    let hapy = Hapy::new(config)?;
    let job = cli.job.as_str();

    if let Some(script) = cli.command.script() {
        let params = ScriptParams {
            url: cli.query_url.clone(),
            limit: cli.query_limit,
        };
        let source = ScriptRenderer::new()?.render(script, &params)?;
        let output = hapy.execute_script(job, GROOVY, &source).await?;
        print_script_output(&output);
        return Ok(());
    }

    match &cli.command {
        Command::Status => print!("{}", render_document(&hapy.get_info().await?)),
        Command::ListJobs { state } => {
            for name in hapy.list_jobs(state.as_deref()).await? {
                println!("{}", name);
            }
        }
        Command::JobSummary => {
            let engine = hapy.engine_info().await?;
            match engine.job(job) {
                Some(summary) => println!("{:#?}", summary),
                None => bail!("job '{}' is not known to the engine", job),
            }
        }
        Command::JobCreate => hapy.create_job(job).await?,
        Command::JobBuild => hapy.build_job(job).await?,
        Command::JobLaunch => hapy.launch_job(job).await?,
        Command::JobResume => match hapy.launch_from_latest_checkpoint(job).await? {
            Some(checkpoint) => tracing::info!("Resumed {} from {}", job, checkpoint),
            None => tracing::info!("Launched {} without a checkpoint", job),
        },
        Command::JobPause => hapy.pause_job(job).await?,
        Command::JobUnpause => hapy.unpause_job(job).await?,
        Command::JobCheckpoint => hapy.checkpoint_job(job).await?,
        Command::JobTerminate => hapy.terminate_job(job).await?,
        Command::JobTeardown => hapy.teardown_job(job).await?,
        Command::JobDelete => hapy.delete_job(job).await?,
        Command::JobCopy { dest, as_profile } => hapy.copy_job(job, dest, *as_profile).await?,
        Command::JobStatus => {
            let info = hapy.job_info(job).await?;
            match info.status_description.as_deref().or(info.status()) {
                Some(status) => println!("{}", status),
                None => bail!("job '{}' reported no status", job),
            }
        }
        Command::JobInfo => print!("{}", render_document(&hapy.get_job_info(job).await?)),
        Command::JobInfoJson => {
            let document = hapy.get_job_info(job).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::JobCxml => {
            let cxml = hapy.get_job_configuration(job).await?;
            std::io::stdout().write_all(&cxml)?;
        }
        Command::JobSubmitCxml { file } => {
            let cxml = tokio::fs::read(file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            hapy.submit_configuration(job, cxml).await?;
        }
        Command::JobSeeds => {
            for seed in hapy.get_seeds(job).await? {
                println!("{}", seed);
            }
        }
        Command::LaunchId => match hapy.get_launch_id(job).await? {
            Some(id) => println!("{}", id),
            None => bail!("job '{}' has no current launch", job),
        },
        Command::Rescan => hapy.rescan_job_directory().await?,
        Command::AddJobDir { path } => hapy.add_job_directory(path).await?,
        Command::RunScript { file, engine } => {
            let source = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let output = hapy.execute_script(job, engine, &source).await?;
            print_script_output(&output);
        }
        Command::EmptyFrontier => println!("{}", hapy.empty_frontier(job).await?),
        Command::SurtScope
        | Command::ShowDecideRules
        | Command::ShowAllSheets
        | Command::ShowMetadata
        | Command::KillAllToethreads
        | Command::PendingUrls
        | Command::PendingUrlsFrom
        | Command::UrlStatus => unreachable!("script commands are handled above"),
    }

    Ok(())
}

fn print_script_output(output: &ScriptOutput) {
    if let Some(raw) = &output.raw {
        print!("{}", raw);
    }
    if let Some(html) = &output.html {
        print!("{}", html);
    }
}

/// Renders a decoded document as indented `tag: text` lines
///
/// Repeated tags are printed once per occurrence, as they appear in the XML.
fn render_document(document: &Value) -> String {
    let mut out = String::new();
    if let Some(map) = document.as_map() {
        for (tag, value) in map {
            write_value(&mut out, tag, value, 0);
        }
    }
    out
}

fn write_value(out: &mut String, tag: &str, value: &Value, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Scalar(text) => {
            out.push_str(&format!("{}{}: {}\n", pad, tag, text.as_deref().unwrap_or("~")));
        }
        Value::Map(children) => {
            out.push_str(&format!("{}{}:\n", pad, tag));
            for (child, value) in children {
                write_value(out, child, value, depth + 1);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                write_value(out, tag, item, depth);
            }
        }
    }
}
