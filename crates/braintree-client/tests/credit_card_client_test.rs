//! Contract tests for CreditCardClient against a wiremock gateway.
//!
//! ## Endpoints Tested
//!
//! | Method | Path (relative to merchant) | Test |
//! |--------|-----------------------------|------|
//! | POST   | `/payment_methods` | `create_card_*` |
//! | GET    | `/payment_methods/{token}` | `find_card_*` |
//! | PUT    | `/payment_methods/{token}` | `update_card_*` |
//! | DELETE | `/payment_methods/{token}` | `delete_card_*` |

use braintree_client::result::error_codes;
use braintree_client::test_values::credit_card_numbers;
use braintree_client::{BraintreeGateway, GatewayConfig, GatewayError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MERCHANT: &str = "/merchants/integration_merchant_id";

fn test_gateway(mock_server: &MockServer) -> BraintreeGateway {
    let config = GatewayConfig::local_mock(&mock_server.uri(), "integration_merchant_id").unwrap();
    BraintreeGateway::new(config).unwrap()
}

const CARD_XML: &str = r#"<credit-card>
  <token>my_token</token>
  <customer-id>c123</customer-id>
  <bin>510510</bin>
  <last-4>5100</last-4>
  <cardholder-name>Cardholder</cardholder-name>
  <card-type>MasterCard</card-type>
  <expiration-month>05</expiration-month>
  <expiration-year>2012</expiration-year>
  <default type="boolean">false</default>
  <billing-address>
    <id>ab</id>
    <customer-id>c123</customer-id>
    <street-address>1 E Main St</street-address>
    <postal-code>60622</postal-code>
  </billing-address>
  <created-at type="datetime">2010-01-14T18:05:53Z</created-at>
  <updated-at type="datetime">2010-01-14T18:05:53Z</updated-at>
</credit-card>"#;

// -- POST /payment_methods --------------------------------------------------------

#[tokio::test]
async fn create_card_returns_vaulted_card() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/payment_methods")))
        .and(body_string_contains("<credit-card>"))
        .and(body_string_contains("<number>5105105105105100</number>"))
        .and(body_string_contains("<verify-card type=\"boolean\">true</verify-card>"))
        .respond_with(ResponseTemplate::new(201).set_body_string(CARD_XML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let result = gateway
        .credit_cards()
        .create(&json!({
            "customerId": "c123",
            "cardholderName": "Cardholder",
            "number": credit_card_numbers::MASTER_CARD,
            "expirationDate": "05/12",
            "options": {"verifyCard": true},
            "billingAddress": {"streetAddress": "1 E Main St", "postalCode": "60622"}
        }))
        .await
        .unwrap();

    let card = result.into_resource().unwrap();
    assert_eq!(card.token, "my_token");
    assert_eq!(card.masked_number(), "510510******5100");
    assert_eq!(card.expiration_date(), "05/2012");
    assert!(!card.is_default());
    assert_eq!(card.billing_address.as_ref().unwrap().postal_code, "60622");
}

#[tokio::test]
async fn create_card_reports_failed_verification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{MERCHANT}/payment_methods")))
        .respond_with(ResponseTemplate::new(422).set_body_string(
            r#"<api-error-response>
  <errors><errors type="array"/></errors>
  <credit-card-verification>
    <status>processor_declined</status>
    <processor-response-code>2000</processor-response-code>
    <processor-response-text>Do Not Honor</processor-response-text>
    <cvv-response-code>M</cvv-response-code>
  </credit-card-verification>
  <message>Do Not Honor</message>
</api-error-response>"#,
        ))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let result = gateway
        .credit_cards()
        .create(&json!({
            "customerId": "c123",
            "number": "4000111111111115",
            "expirationDate": "05/2012",
            "options": {"verifyCard": true}
        }))
        .await
        .unwrap();

    let error = result.error().unwrap();
    assert!(error.errors.is_empty());
    assert_eq!(error.message, "Do Not Honor");
    let verification = error.credit_card_verification.as_ref().unwrap();
    assert_eq!(verification.status, "processor_declined");
    assert_eq!(verification.processor_response_code, "2000");
    assert_eq!(verification.cvv_response_code, "M");
}

#[tokio::test]
async fn create_card_rejects_update_only_option() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let err = gateway
        .credit_cards()
        .create(&json!({
            "customerId": "c123",
            "billingAddress": {"options": {"updateExisting": true}}
        }))
        .await
        .unwrap_err();
    match err {
        GatewayError::InvalidKeys(e) => {
            assert_eq!(e.keys, vec!["billingAddress[options][updateExisting]".to_string()])
        }
        other => panic!("expected InvalidKeys, got {other:?}"),
    }
}

// -- GET /payment_methods/{token} -------------------------------------------------

#[tokio::test]
async fn find_card_not_found_names_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{MERCHANT}/payment_methods/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let err = gateway.credit_cards().find("gone").await.unwrap_err();
    assert_eq!(err.to_string(), "not found: credit card with token gone not found");
}

// -- PUT /payment_methods/{token} -------------------------------------------------

#[tokio::test]
async fn update_card_allows_update_existing_billing_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{MERCHANT}/payment_methods/my_token")))
        .and(body_string_contains(
            "<billing-address><options><update-existing type=\"boolean\">true</update-existing></options>",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(CARD_XML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let card = gateway
        .credit_cards()
        .update_no_validate(
            "my_token",
            &json!({
                "billingAddress": {"options": {"updateExisting": true}, "region": "IL"}
            }),
        )
        .await
        .unwrap();
    assert_eq!(card.customer_id, "c123");
}

#[tokio::test]
async fn update_card_validation_errors_are_nested() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{MERCHANT}/payment_methods/my_token")))
        .respond_with(ResponseTemplate::new(422).set_body_string(
            r#"<api-error-response><errors><credit-card><errors type="array"><error><code>81709</code><attribute>expiration_date</attribute><message>Expiration date is required.</message></error></errors></credit-card></errors><message>Expiration date is required.</message></api-error-response>"#,
        ))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let result = gateway
        .credit_cards()
        .update("my_token", &json!({"expirationDate": ""}))
        .await
        .unwrap();
    let errors = &result.error().unwrap().errors;
    let on_date = errors.for_key("creditCard").unwrap().on_attribute("expirationDate");
    assert_eq!(on_date[0].code, error_codes::CREDIT_CARD_EXPIRATION_DATE_IS_REQUIRED);
}

// -- DELETE /payment_methods/{token} ----------------------------------------------

#[tokio::test]
async fn delete_card_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{MERCHANT}/payment_methods/my_token")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    gateway.credit_cards().delete("my_token").await.unwrap();
}
