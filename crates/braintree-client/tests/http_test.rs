//! Transport behavior shared by every resource client: headers, basic auth,
//! status mapping, malformed bodies and which failed sends are repeated.

use std::time::Duration;

use braintree_client::http::{user_agent, GatewayHttp, API_VERSION};
use braintree_client::{BraintreeGateway, GatewayConfig, GatewayError};
use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MERCHANT: &str = "/merchants/integration_merchant_id";

fn config(mock_server: &MockServer) -> GatewayConfig {
    GatewayConfig::local_mock(&mock_server.uri(), "integration_merchant_id").unwrap()
}

fn test_gateway(mock_server: &MockServer) -> BraintreeGateway {
    BraintreeGateway::new(config(mock_server)).unwrap()
}

async fn find_with_status(status: u16) -> GatewayError {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/transactions/abc")))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(&mock_server)
        .await;
    test_gateway(&mock_server).transactions().find("abc").await.unwrap_err()
}

#[tokio::test]
async fn requests_carry_gateway_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/customers/c1")))
        .and(header("Accept", "application/xml"))
        .and(header("Content-Type", "application/xml"))
        .and(header("X-ApiVersion", API_VERSION))
        .and(header("User-Agent", user_agent().as_str()))
        .and(basic_auth("integration_public_key", "integration_private_key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<customer><id>c1</id></customer>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let customer = test_gateway(&mock_server).customers().find("c1").await.unwrap();
    assert_eq!(customer.id, "c1");
}

#[tokio::test]
async fn raw_transport_decodes_camel_case_tree() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/echo")))
        .respond_with(ResponseTemplate::new(201).set_body_string(
            r#"<echo-result><page-size type="integer">5</page-size><active type="boolean">true</active><gone nil="true"/></echo-result>"#,
        ))
        .mount(&mock_server)
        .await;

    let http = GatewayHttp::new(&config(&mock_server)).unwrap();
    let params = json!({"echo": {"value": 1}});
    let tree = http
        .post("/echo", Some(params.as_object().unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        tree,
        json!({"echoResult": {"pageSize": 5, "active": true, "gone": null}})
    );
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    assert!(matches!(find_with_status(401).await, GatewayError::Authentication));
    assert!(matches!(find_with_status(403).await, GatewayError::Authorization { .. }));
    assert!(find_with_status(404).await.is_not_found());
    assert!(matches!(find_with_status(426).await, GatewayError::UpgradeRequired));
    assert!(matches!(find_with_status(500).await, GatewayError::ServerError));
    assert!(matches!(find_with_status(503).await, GatewayError::DownForMaintenance));
    assert_eq!(
        find_with_status(418).await.to_string(),
        "unexpected gateway response: Unexpected HTTP_RESPONSE #418"
    );
}

#[tokio::test]
async fn malformed_xml_is_an_xml_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/customers/c1")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<customer><id>c1</customer>"))
        .mount(&mock_server)
        .await;

    let err = test_gateway(&mock_server).customers().find("c1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Xml { .. }), "got {err:?}");
}

#[tokio::test]
async fn empty_lookup_body_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/customers/c1")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let err = test_gateway(&mock_server).customers().find("c1").await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected gateway response: Expected customer");
}

fn slow_config(mock_server: &MockServer) -> GatewayConfig {
    let mut config = config(mock_server);
    config.timeout_secs = 1;
    config.max_retries = 2;
    config
}

#[tokio::test]
async fn timed_out_write_is_not_resent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/transactions")))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = GatewayHttp::new(&slow_config(&mock_server)).unwrap();
    let params = json!({"transaction": {"amount": "1000.00", "type": "sale"}});
    let err = http
        .post("/transactions", Some(params.as_object().unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Http { .. }));
}

#[tokio::test]
async fn timed_out_read_is_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/transactions/abc")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let http = GatewayHttp::new(&slow_config(&mock_server)).unwrap();
    let err = http.get("/transactions/abc").await.unwrap_err();
    assert!(matches!(err, GatewayError::Http { .. }));
}
