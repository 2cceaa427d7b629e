use hapy::{ClientConfig, Hapy};
use wiremock::MockServer;

/// Creates a client whose base URL is the mock server root
pub fn client_for(server: &MockServer) -> Hapy {
    let config = ClientConfig::parse(&server.uri()).expect("mock server URI should parse");
    Hapy::new(config).expect("client should build")
}

/// A job document as the engine returns it
pub fn job_document(server: &MockServer, name: &str, checkpoints: &[&str]) -> String {
    let checkpoint_values: String = checkpoints
        .iter()
        .map(|cp| format!("<value>{}</value>", cp))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<job>
  <shortName>{name}</shortName>
  <crawlControllerState>PAUSED</crawlControllerState>
  <statusDescription>Active: PAUSED</statusDescription>
  <primaryConfig>/opt/heritrix/jobs/{name}/crawler-beans.cxml</primaryConfig>
  <primaryConfigUrl>{uri}/engine/job/{name}/jobdir/crawler-beans.cxml</primaryConfigUrl>
  <checkpointFiles>{checkpoint_values}</checkpointFiles>
</job>"#,
        name = name,
        uri = server.uri(),
        checkpoint_values = checkpoint_values,
    )
}

/// An engine document listing the given jobs
pub fn engine_document(jobs_dir: &str, jobs: &[(&str, &str)]) -> String {
    let entries: String = jobs
        .iter()
        .map(|(name, state)| {
            format!(
                "<value><shortName>{name}</shortName><key>{name}</key><isProfile>false</isProfile>\
                 <crawlControllerState>{state}</crawlControllerState>\
                 <statusDescription>Active: {state}</statusDescription></value>",
                name = name,
                state = state
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<engine>
  <heritrixVersion>3.4.0</heritrixVersion>
  <jobsDir>{jobs_dir}</jobsDir>
  <jobs>{entries}</jobs>
</engine>"#,
        jobs_dir = jobs_dir,
        entries = entries,
    )
}
