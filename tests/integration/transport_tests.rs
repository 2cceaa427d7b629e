use crate::common::client_for;
use hapy::{ClientConfig, Hapy, HapyError};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHALLENGE: &str = r#"Digest realm="Heritrix", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

#[tokio::test]
async fn test_get_expects_ok_not_see_other() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine"))
        .respond_with(ResponseTemplate::new(303))
        .mount(&server)
        .await;

    let err = client_for(&server).get_info().await.unwrap_err();
    match err {
        HapyError::Api(api) => {
            assert_eq!(api.status, 303);
            assert_eq!(api.method, "GET");
            assert_eq!(api.body, None);
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_xml_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<engine><jobs></engine>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_info().await.unwrap_err();
    assert!(matches!(err, HapyError::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let config = ClientConfig::parse("http://127.0.0.1:1").unwrap();
    let hapy = Hapy::new(config).unwrap();

    let err = hapy.build_job("foo").await.unwrap_err();
    assert!(matches!(err, HapyError::Transport { .. }));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<engine/>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::parse(&server.uri())
        .unwrap()
        .timeout(Duration::from_millis(200));
    let err = Hapy::new(config).unwrap().get_info().await.unwrap_err();

    match err {
        HapyError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_digest_challenge_is_answered() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(303))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/engine/job/foo"))
        .respond_with(ResponseTemplate::new(401).insert_header("www-authenticate", CHALLENGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::parse(&server.uri())
        .unwrap()
        .with_credentials("admin", "admin");
    Hapy::new(config).unwrap().build_job("foo").await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_without_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine"))
        .respond_with(ResponseTemplate::new(401).insert_header("www-authenticate", CHALLENGE))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).get_info().await.unwrap_err();
    assert!(matches!(err, HapyError::Api(api) if api.status == 401));
}

#[tokio::test]
async fn test_accept_header_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/engine"))
        .and(header("accept", "application/xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<engine/>"))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).get_info().await.unwrap();
}
