use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use stablepay_engine::{
    db_types::{Json, Order, OrderStatus},
    events::EventProducers,
    traits::NullSettlementRegistry,
    MerchantApi,
    OrderFlowApi,
};

use super::{
    helpers::{bearer, get_request, post_request, test_api_key, test_merchant, test_order, MERCHANT_ID},
    mocks::{MockMerchantStore, MockPaymentStore},
};
use crate::{
    config::ServerConfig,
    routes::{CreateOrderRoute, GetOrderRoute, ListOrdersRoute},
};

#[actix_web::test]
async fn create_order_requires_a_bearer_credential() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": "25.00", "currency": "USDC"});
    let (status, body) = post_request("", "/v1/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No bearer credential was supplied."}"#);
}

#[actix_web::test]
async fn create_order_rejects_an_unknown_key() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": "25.00", "currency": "USDC"});
    let unknown = "Bearer sk_test_unknownkey00000000000000000000000000000000000000000000";
    let (status, body) = post_request(unknown, "/v1/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The presented API key is not valid."}"#);
}

#[actix_web::test]
async fn create_order_happy_path() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": "25.00", "currency": "USDC", "metadata": {"invoice": "INV-7"}});
    let (status, body) = post_request(&bearer(), "/v1/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Response was not JSON");
    assert_eq!(response["status"], "pending");
    assert_eq!(response["amount"], "25.00");
    assert_eq!(response["currency"], "USDC");
    let id = response["id"].as_str().expect("id missing");
    assert!(id.starts_with("ord_"));
    let payment_url = response["payment_url"].as_str().expect("payment_url missing");
    assert!(payment_url.starts_with("https://pay.test/pay/"));
    assert!(response.get("memo").is_none(), "the creation response must not leak the raw memo field");
}

#[actix_web::test]
async fn create_order_rejects_an_empty_currency() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": "25.00", "currency": "  "});
    let (status, body) = post_request(&bearer(), "/v1/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: currency must not be empty"}"#);
}

#[actix_web::test]
async fn create_order_rejects_a_negative_ttl() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": "25.00", "currency": "USDC", "expires_in": -60});
    let (status, _) = post_request(&bearer(), "/v1/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fetch_an_order_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&bearer(), "/v1/orders/ord_0000001", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn fetching_a_missing_order_404s() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&bearer(), "/v1/orders/ord_doesnotexist", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order ord_doesnotexist does not exist"}"#);
}

#[actix_web::test]
async fn list_orders_with_a_limit() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&bearer(), "/v1/orders?limit=2", configure_list).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Response was not JSON");
    assert_eq!(response["data"].as_array().expect("data missing").len(), 2);
    assert_eq!(response["has_more"], true);
}

fn merchant_store() -> MockMerchantStore {
    let mut store = MockMerchantStore::new();
    store.expect_fetch_api_key_candidates().returning(|prefix| {
        let key = test_api_key();
        if prefix == key.key_prefix {
            Ok(vec![key])
        } else {
            Ok(vec![])
        }
    });
    store.expect_touch_api_key().returning(|_| Ok(()));
    store.expect_fetch_merchant().returning(|_| Ok(Some(test_merchant())));
    store
}

fn common_app_data(cfg: &mut ServiceConfig, payments: MockPaymentStore) {
    let orders_api = OrderFlowApi::new(payments, "https://pay.test", EventProducers::default());
    let merchants_api = MerchantApi::new(merchant_store());
    cfg.app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(merchants_api))
        .app_data(web::Data::new(NullSettlementRegistry))
        .app_data(web::Data::new(ServerConfig::default()));
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut payments = MockPaymentStore::new();
    // Echo the inserted order back, the way the real backend's INSERT .. RETURNING does.
    payments.expect_insert_order().returning(|order| {
        Ok(Order {
            id: order.id,
            merchant_id: order.merchant_id,
            payment_link_id: order.payment_link_id,
            amount: order.amount,
            currency: order.currency,
            memo: order.memo,
            status: OrderStatus::Pending,
            payment_url: order.payment_url,
            customer_address: None,
            tx_hash: None,
            paid_at: None,
            expires_at: order.expires_at,
            metadata: order.metadata.map(Json),
            created_at: order.created_at,
        })
    });
    common_app_data(cfg, payments);
    cfg.service(CreateOrderRoute::<MockPaymentStore, MockMerchantStore, NullSettlementRegistry>::new());
}

fn configure_fetch(cfg: &mut ServiceConfig) {
    let mut payments = MockPaymentStore::new();
    payments.expect_fetch_order().returning(|id, merchant_id| {
        if id.as_str() == "ord_0000001" && merchant_id == MERCHANT_ID {
            Ok(Some(test_order("ord_0000001", "testmemo0000000000000001")))
        } else {
            Ok(None)
        }
    });
    common_app_data(cfg, payments);
    cfg.service(GetOrderRoute::<MockPaymentStore, MockMerchantStore>::new());
}

fn configure_list(cfg: &mut ServiceConfig) {
    let mut payments = MockPaymentStore::new();
    payments.expect_fetch_orders_for_merchant().returning(|_, limit| {
        let orders = (1..=limit)
            .map(|i| test_order(&format!("ord_000000{i}"), &format!("testmemo000000000000000{i}")))
            .collect();
        Ok(orders)
    });
    common_app_data(cfg, payments);
    cfg.service(ListOrdersRoute::<MockPaymentStore, MockMerchantStore>::new());
}

const ORDER_JSON: &str = r#"{"id":"ord_0000001","merchant_id":"testmerchant000000000001","payment_link_id":null,"amount":"25.00","currency":"USDC","memo":"testmemo0000000000000001","status":"pending","payment_url":"https://pay.test/pay/testmemo0000000000000001","customer_address":null,"tx_hash":null,"paid_at":null,"expires_at":"2025-03-01T11:00:00Z","metadata":null,"created_at":"2025-03-01T10:00:00Z"}"#;
