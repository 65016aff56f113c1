use fragsync_core::charts::MonthSelection;
use fragsync_engine::{ChartClient, FetchSettings, SyncError};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ChartClient {
    let base = Url::parse(&server.uri()).unwrap();
    ChartClient::over_http(FetchSettings::default(), base).unwrap()
}

#[tokio::test]
async fn loads_best_sellers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/best-sellers/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"labels":["Pandesal","Ensaymada"],"data":[120,80]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let data = client(&server).best_sellers().await.unwrap();
    assert_eq!(data.labels, vec!["Pandesal", "Ensaymada"]);
    assert_eq!(data.data, vec![120.0, 80.0]);
}

#[tokio::test]
async fn revenue_change_sends_year_and_month() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/revenue-change/"))
        .and(query_param("year", "2024"))
        .and(query_param("month", "03"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"labels":["1","2"],"revenues":[100.5,0]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let data = client(&server)
        .revenue_change("2024", MonthSelection::Month(3))
        .await
        .unwrap();
    assert_eq!(data.revenues, vec![100.5, 0.0]);
}

#[tokio::test]
async fn missing_fields_default_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sales-vs-expenses/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"months":["Jan"]}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let data = client(&server).sales_vs_expenses().await.unwrap();
    assert_eq!(data.months, vec!["Jan"]);
    assert!(data.sales_daily.is_empty());
}

#[tokio::test]
async fn invalid_json_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/best-sellers/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = client(&server).best_sellers().await.unwrap_err();
    assert!(matches!(err, SyncError::Json(_)));
}

#[tokio::test]
async fn http_client_keeps_configured_headers_and_asks_for_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/best-sellers/"))
        .and(header("accept", "application/json"))
        .and(header("cookie", "sessionid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"labels":["Pandesal"],"data":[3]}"#,
            "application/json; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        headers: vec![("Cookie".to_string(), "sessionid=abc123".to_string())],
        ..FetchSettings::default()
    };
    let base = Url::parse(&server.uri()).unwrap();
    let data = ChartClient::over_http(settings, base)
        .unwrap()
        .best_sellers()
        .await
        .unwrap();
    assert_eq!(data.labels, vec!["Pandesal"]);
}
