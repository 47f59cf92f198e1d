use actix_web::{
    body::MessageBody,
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use spg_common::Amount;
use stablepay_engine::{
    db_types::{KeyEnvironment, Memo, Merchant, Order, OrderId, OrderStatus},
    helpers::{api_key_hash, api_key_prefix},
};

// A fixed raw API key for endpoint tests. DO NOT use this key anywhere else.
pub const RAW_API_KEY: &str = "sk_test_endpointtestkey000000000cafebabe0123456789abcdef01234567";
pub const MERCHANT_ID: &str = "testmerchant000000000001";

pub fn test_key_material() -> (String, String) {
    (api_key_hash(RAW_API_KEY), api_key_prefix(RAW_API_KEY))
}

pub fn bearer() -> String {
    format!("Bearer {RAW_API_KEY}")
}

pub fn test_merchant() -> Merchant {
    Merchant {
        id: MERCHANT_ID.to_string(),
        name: "Test Merchant".to_string(),
        email: "merchant@example.com".to_string(),
        settlement_address: Some("0x00112233445566778899aabbccddeeff00112233".to_string()),
        gas_sponsored: false,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    }
}

pub fn test_order(id: &str, memo: &str) -> Order {
    Order {
        id: OrderId(id.to_string()),
        merchant_id: MERCHANT_ID.to_string(),
        payment_link_id: None,
        amount: "25.00".parse::<Amount>().unwrap(),
        currency: "USDC".to_string(),
        memo: Memo(memo.to_string()),
        status: OrderStatus::Pending,
        payment_url: format!("https://pay.test/pay/{memo}"),
        customer_address: None,
        tx_hash: None,
        paid_at: None,
        expires_at: Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
        metadata: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
    }
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !auth_header.is_empty() {
        req = req.insert_header((AUTHORIZATION, auth_header));
    }
    send(req, configure).await
}

pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !auth_header.is_empty() {
        req = req.insert_header((AUTHORIZATION, auth_header));
    }
    send(req, configure).await
}

async fn send(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn test_api_key() -> stablepay_engine::db_types::ApiKey {
    let (key_hash, key_prefix) = test_key_material();
    stablepay_engine::db_types::ApiKey {
        id: "testkey00000000000000001".to_string(),
        merchant_id: MERCHANT_ID.to_string(),
        name: "Endpoint test key".to_string(),
        key_hash,
        key_prefix,
        environment: KeyEnvironment::Test,
        last_used_at: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    }
}
