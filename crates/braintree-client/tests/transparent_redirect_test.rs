//! Transparent redirect: `tr_data` generation and confirmation against a
//! wiremock gateway.
//!
//! ## Endpoints Tested
//!
//! | Method | Path (relative to merchant) | Test |
//! |--------|-----------------------------|------|
//! | POST   | `/transparent_redirect_requests/{id}/confirm` | `confirm_*` |
//! | POST   | `/customers/all/confirm_transparent_redirect_request` | `deprecated_customer_confirm_*` |

use braintree_client::test_values::integration;
use braintree_client::transparent_redirect::ConfirmResult;
use braintree_client::{BraintreeGateway, GatewayConfig, GatewayError};
use braintree_core::hex_digest;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MERCHANT: &str = "/merchants/integration_merchant_id";

fn test_gateway(mock_server: &MockServer) -> BraintreeGateway {
    let config = GatewayConfig::local_mock(&mock_server.uri(), "integration_merchant_id").unwrap();
    BraintreeGateway::new(config).unwrap()
}

/// What the gateway appends to the merchant's redirect URL.
fn redirect_query(fields: &str) -> String {
    format!("{fields}&hash={}", hex_digest(integration::PRIVATE_KEY, fields))
}

// -- tr_data ------------------------------------------------------------------------

#[tokio::test]
async fn tr_data_is_signed_query_with_kind() {
    let mock_server = MockServer::start().await;
    let gateway = test_gateway(&mock_server);

    let tr_data = gateway
        .transparent_redirect()
        .create_customer_data(&json!({
            "redirectUrl": "http://example.com/done",
            "customer": {"firstName": "Dan"}
        }))
        .unwrap();

    let (digest, query) = tr_data.split_once('|').unwrap();
    assert_eq!(digest, hex_digest(integration::PRIVATE_KEY, query));
    assert!(query.contains("customer%5Bfirst_name%5D=Dan"));
    assert!(query.contains("kind=create_customer"));
    assert!(query.contains("public_key=integration_public_key"));
    assert!(query.contains("api_version=1"));
    assert!(query.contains("redirect_url=http%3A%2F%2Fexample.com%2Fdone"));
}

#[tokio::test]
async fn tr_data_rejects_bad_input() {
    let mock_server = MockServer::start().await;
    let gateway = test_gateway(&mock_server);
    let tr = gateway.transparent_redirect();

    let err = tr
        .transaction_data(&json!({"redirectUrl": "http://example.com", "transaction": {"amount": "10.00"}}))
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument(_)));

    let err = tr
        .create_customer_data(&json!({"redirectUrl": "http://example.com", "customer": {"bogus": "x"}}))
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid keys: customer[bogus]");

    let err = tr.update_customer_data(&json!({"redirectUrl": "http://example.com"})).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument(_)));

    let err = tr.create_credit_card_data(&json!({"creditCard": {"customerId": "c1"}})).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument: expected params to contain redirectUrl");
}

// -- POST /transparent_redirect_requests/{id}/confirm ---------------------------------

#[tokio::test]
async fn confirm_create_customer_returns_customer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/transparent_redirect_requests/tr42/confirm")))
        .respond_with(ResponseTemplate::new(201).set_body_string(
            "<customer><id>c9</id><first-name>Dan</first-name></customer>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let query = redirect_query("http_status=200&id=tr42&kind=create_customer");
    let confirmed = gateway.transparent_redirect().confirm(&format!("?{query}")).await.unwrap();

    assert!(confirmed.is_success());
    match confirmed {
        ConfirmResult::Customer(result) => assert_eq!(result.resource().unwrap().id, "c9"),
        other => panic!("expected a customer, got {other:?}"),
    }
}

#[tokio::test]
async fn confirm_transaction_with_validation_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/transparent_redirect_requests/tr7/confirm")))
        .respond_with(ResponseTemplate::new(422).set_body_string(
            r#"<api-error-response><errors><transaction><errors type="array"><error><code>81503</code><attribute>amount</attribute><message>Amount is an invalid format.</message></error></errors></transaction></errors><message>Amount is an invalid format.</message></api-error-response>"#,
        ))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let query = redirect_query("http_status=200&id=tr7&kind=create_transaction");
    let confirmed = gateway.transparent_redirect().confirm(&query).await.unwrap();
    assert!(!confirmed.is_success());
    assert!(matches!(confirmed, ConfirmResult::Transaction(_)));
}

#[tokio::test]
async fn confirm_with_tampered_query_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let query = redirect_query("http_status=200&id=tr42&kind=create_customer").replace("tr42", "tr43");
    let err = gateway.transparent_redirect().confirm(&query).await.unwrap_err();
    assert!(matches!(err, GatewayError::TransparentRedirect { .. }));
}

#[tokio::test]
async fn confirm_rejects_parameters_after_the_hash() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let signed = redirect_query("http_status=200&id=tr42&kind=create_customer");

    let appended = format!("{signed}&id=other&kind=create_transaction");
    let err = gateway.transparent_redirect().confirm(&appended).await.unwrap_err();
    assert!(matches!(err, GatewayError::TransparentRedirect { .. }));

    let hash = signed.rsplit("&hash=").next().unwrap().to_string();
    let repeated = format!("{signed}&hash={hash}");
    let err = gateway.transparent_redirect().confirm(&repeated).await.unwrap_err();
    assert!(matches!(err, GatewayError::TransparentRedirect { .. }));
}

#[tokio::test]
async fn confirm_surfaces_redirect_status_errors() {
    let mock_server = MockServer::start().await;
    let gateway = test_gateway(&mock_server);

    let query = redirect_query("bt_message=Invalid+params&http_status=404&id=tr42&kind=create_customer");
    let err = gateway.transparent_redirect().confirm(&query).await.unwrap_err();
    assert_eq!(err.to_string(), "not found: Invalid params");

    let query = redirect_query("http_status=500&id=tr42&kind=create_customer");
    let err = gateway.transparent_redirect().confirm(&query).await.unwrap_err();
    assert!(matches!(err, GatewayError::ServerError));
}

#[tokio::test]
async fn confirm_rejects_unknown_kind() {
    let mock_server = MockServer::start().await;
    let gateway = test_gateway(&mock_server);

    let query = redirect_query("http_status=200&id=tr42&kind=delete_everything");
    let err = gateway.transparent_redirect().confirm(&query).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unexpected { .. }));
}

// -- deprecated customer redirect ------------------------------------------------------

#[tokio::test]
#[allow(deprecated)]
async fn deprecated_customer_confirm_posts_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/customers/all/confirm_transparent_redirect_request")))
        .and(body_string_contains("<id>tr42</id>"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<customer><id>c9</id></customer>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let query = redirect_query("http_status=200&id=tr42");
    let result = gateway
        .customers()
        .create_from_transparent_redirect(&query)
        .await
        .unwrap();
    assert_eq!(result.into_resource().unwrap().id, "c9");
    assert!(gateway
        .customers()
        .create_customer_url()
        .ends_with("/customers/all/create_via_transparent_redirect_request"));
}
