use docmirror_http::{HttpClient, HttpError, RequestOpts};
use reqwest::StatusCode;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_text_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>介绍</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let body = client
        .get_text("/docs/intro", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(body, "<html>介绍</html>");
}

#[tokio::test]
async fn non_success_status_is_an_error_and_not_retried_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_text("/missing", RequestOpts::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    match err {
        HttpError::Status { url, snippet, .. } => {
            assert!(url.ends_with("/missing"));
            assert_eq!(snippet, "not here");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(1);
    let body = client
        .get_text("/flaky", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn client_errors_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(3);
    let err = client
        .get_text("/gone", RequestOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::GONE));
}

#[test]
fn invalid_base_is_rejected() {
    assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
}
