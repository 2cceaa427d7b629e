use crate::common::{client_for, job_document};
use hapy::{Hapy, HapyError};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

async fn create_build_launch(hapy: &Hapy, name: &str) -> hapy::Result<()> {
    hapy.create_job(name).await?;
    hapy.build_job(name).await?;
    hapy.launch_job(name).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_build_launch_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/engine"))
        .and(header("accept", "application/xml"))
        .and(body_string("action=create&createpath=foo"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    for action in ["build", "launch"] {
        Mock::given(method("POST"))
            .and(path("/engine/job/foo"))
            .and(body_string(format!("action={}", action)))
            .respond_with(ResponseTemplate::new(303))
            .expect(1)
            .mount(&server)
            .await;
    }

    create_build_launch(&client_for(&server), "foo")
        .await
        .expect("every step should be accepted");
}

#[tokio::test]
async fn test_failed_build_halts_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/engine"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("action=build"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("action=launch"))
        .respond_with(ResponseTemplate::new(303))
        .expect(0)
        .mount(&server)
        .await;

    let err = create_build_launch(&client_for(&server), "foo")
        .await
        .unwrap_err();

    match err {
        HapyError::Api(api) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.method, "POST");
            assert_eq!(api.url, format!("{}/engine/job/foo", server.uri()));
            assert_eq!(api.body.as_deref(), Some("action=build"));
            assert_eq!(api.response_body, "boom");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lifecycle_actions_expect_see_other() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let hapy = client_for(&server);
    let results = [
        hapy.pause_job("foo").await,
        hapy.unpause_job("foo").await,
        hapy.terminate_job("foo").await,
        hapy.teardown_job("foo").await,
        hapy.checkpoint_job("foo").await,
    ];

    for result in results {
        assert!(matches!(result, Err(HapyError::Api(ref api)) if api.status == 200));
    }
}

#[tokio::test]
async fn test_lifecycle_action_bodies() {
    let server = MockServer::start().await;

    for action in ["pause", "unpause", "terminate", "teardown", "checkpoint"] {
        Mock::given(method("POST"))
            .and(path("/engine/job/foo"))
            .and(body_string(format!("action={}", action)))
            .respond_with(ResponseTemplate::new(303))
            .expect(1)
            .mount(&server)
            .await;
    }

    let hapy = client_for(&server);
    hapy.pause_job("foo").await.unwrap();
    hapy.unpause_job("foo").await.unwrap();
    hapy.terminate_job("foo").await.unwrap();
    hapy.teardown_job("foo").await.unwrap();
    hapy.checkpoint_job("foo").await.unwrap();
}

#[tokio::test]
async fn test_copy_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("copyTo=bar"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("copyTo=bar-profile&asProfile=on"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    let hapy = client_for(&server);
    hapy.copy_job("foo", "bar", false).await.unwrap();
    hapy.copy_job("foo", "bar-profile", true).await.unwrap();
}

#[tokio::test]
async fn test_launch_from_latest_checkpoint_without_checkpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_document(&server, "foo", &[])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("action=launch"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    let used = client_for(&server)
        .launch_from_latest_checkpoint("foo")
        .await
        .unwrap();
    assert_eq!(used, None);
}

#[tokio::test]
async fn test_launch_from_latest_checkpoint_single_scalar() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(job_document(&server, "foo", &["cp00001-20240101120000"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("action=launch&checkpoint=cp00001-20240101120000"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    let used = client_for(&server)
        .launch_from_latest_checkpoint("foo")
        .await
        .unwrap();
    assert_eq!(used.as_deref(), Some("cp00001-20240101120000"));
}

#[tokio::test]
async fn test_launch_from_latest_checkpoint_picks_first_of_many() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_document(
            &server,
            "foo",
            &["cp00003-20240103120000", "cp00002-20240102120000", "cp00001-20240101120000"],
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(body_string("action=launch&checkpoint=cp00003-20240103120000"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    let used = client_for(&server)
        .launch_from_latest_checkpoint("foo")
        .await
        .unwrap();
    assert_eq!(used.as_deref(), Some("cp00003-20240103120000"));
}

/// Stores the body of each request it answers
struct StoreBody(Arc<Mutex<Vec<u8>>>);

impl Respond for StoreBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        *self.0.lock().unwrap() = request.body.clone();
        ResponseTemplate::new(200)
    }
}

/// Serves whatever [`StoreBody`] last stored
struct ServeBody(Arc<Mutex<Vec<u8>>>);

impl Respond for ServeBody {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_bytes(self.0.lock().unwrap().clone())
    }
}

#[tokio::test]
async fn test_configuration_round_trip() {
    let server = MockServer::start().await;
    let stored = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_document(&server, "foo", &[])))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/engine/job/foo/jobdir/crawler-beans.cxml"))
        .respond_with(StoreBody(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo/jobdir/crawler-beans.cxml"))
        .respond_with(ServeBody(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let cxml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<beans>\n  <!-- caf\u{e9} & co -->\n</beans>\n"
        .as_bytes()
        .to_vec();

    let hapy = client_for(&server);
    hapy.submit_configuration("foo", cxml.clone()).await.unwrap();
    let fetched = hapy.get_job_configuration("foo").await.unwrap();

    assert_eq!(fetched, cxml);
}

#[tokio::test]
async fn test_configuration_without_config_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<job><shortName>foo</shortName></job>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_job_configuration("foo")
        .await
        .unwrap_err();
    assert!(matches!(err, HapyError::MissingField(field) if field == "job.primaryConfigUrl"));
}

#[tokio::test]
async fn test_job_status_lookups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/running"))
        .respond_with(ResponseTemplate::new(200).set_body_string(job_document(&server, "running", &[])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/engine/job/unbuilt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<job><shortName>unbuilt</shortName><statusDescription>Unbuilt</statusDescription></job>",
        ))
        .mount(&server)
        .await;

    let hapy = client_for(&server);

    assert_eq!(hapy.job_state("running").await.unwrap().as_deref(), Some("PAUSED"));
    assert_eq!(hapy.job_status("running").await.unwrap().as_deref(), Some("PAUSED"));

    assert_eq!(hapy.job_state("unbuilt").await.unwrap(), None);
    assert_eq!(hapy.job_status("unbuilt").await.unwrap().as_deref(), Some("Unbuilt"));

    let info = hapy.job_info("running").await.unwrap();
    assert_eq!(info.short_name.as_deref(), Some("running"));
    assert_eq!(
        info.primary_config_url,
        Some(format!("{}/engine/job/running/jobdir/crawler-beans.cxml", server.uri()))
    );
}

#[tokio::test]
async fn test_get_seeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine/job/foo/jobdir/latest/seeds.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "http://example.com/\nhttps://example.org/\n# parked\nhttp://parked.example/\n",
        ))
        .mount(&server)
        .await;

    let seeds = client_for(&server).get_seeds("foo").await.unwrap();
    assert_eq!(seeds, vec!["http://example.com/", "https://example.org/"]);
}
