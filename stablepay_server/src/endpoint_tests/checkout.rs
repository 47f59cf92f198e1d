use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use spg_common::Amount;
use stablepay_engine::{
    db_types::{Json, Order, OrderStatus, PaymentLink},
    events::EventProducers,
    OrderFlowApi,
};

use super::{
    helpers::{post_request, test_merchant, test_order, MERCHANT_ID},
    mocks::MockPaymentStore,
};
use crate::routes::{ConfirmOrderRoute, LinkCheckoutRoute};

#[actix_web::test]
async fn link_checkout_happy_path() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/api/link/pl_0000001/create-order", json!({}), configure_checkout)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Response was not JSON");
    let order_id = response["orderId"].as_str().expect("orderId missing");
    assert!(order_id.starts_with("ord_"));
    let payment_url = response["paymentUrl"].as_str().expect("paymentUrl missing");
    assert!(payment_url.starts_with("/pay/"), "link checkouts carry relative payment URLs");
}

#[actix_web::test]
async fn checkout_against_an_unknown_link_404s() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/api/link/pl_doesnotexist/create-order", json!({}), configure_checkout)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. The payment link pl_doesnotexist does not exist or is inactive"}"#);
}

#[actix_web::test]
async fn checkout_fails_when_the_merchant_has_no_settlement_address() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/api/link/pl_0000002/create-order", json!({}), configure_checkout)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("has no usable settlement address"));
}

#[actix_web::test]
async fn confirm_order_happy_path() {
    let _ = env_logger::try_init().ok();
    let body = json!({"txHash": "0xhash", "customerAddress": "0xcust"});
    let (status, body) =
        post_request("", "/api/orders/testmemo0000000000000001/confirm", body, configure_confirm)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"order":{"id":"ord_0000001","status":"paid","txHash":"0xhash"}}"#);
}

#[actix_web::test]
async fn confirming_an_unknown_memo_404s() {
    let _ = env_logger::try_init().ok();
    let body = json!({"txHash": "0xhash", "customerAddress": "0xcust"});
    let (status, body) = post_request("", "/api/orders/nosuchmemo00000000000000/confirm", body, configure_confirm)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No order carries the memo nosuchmemo00000000000000"}"#);
}

#[actix_web::test]
async fn confirming_with_an_empty_tx_hash_mutates_nothing() {
    let _ = env_logger::try_init().ok();
    let body = json!({"txHash": "  ", "customerAddress": "0xcust"});
    // No confirm expectation is set, so reaching the store would panic the test.
    let (status, body) = post_request("", "/api/orders/testmemo0000000000000001/confirm", body, configure_validation)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: txHash must not be empty"}"#);
}

#[actix_web::test]
async fn confirming_with_an_empty_customer_address_mutates_nothing() {
    let _ = env_logger::try_init().ok();
    let body = json!({"txHash": "0xhash", "customerAddress": ""});
    let (status, _) = post_request("", "/api/orders/testmemo0000000000000001/confirm", body, configure_validation)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn test_link(id: &str) -> PaymentLink {
    PaymentLink {
        id: id.to_string(),
        merchant_id: MERCHANT_ID.to_string(),
        title: "Coffee fund".to_string(),
        description: None,
        image_url: None,
        amount: "12.50".parse::<Amount>().unwrap(),
        currency: "USDC".to_string(),
        is_active: true,
        view_count: 0,
        payment_count: 0,
        total_amount: Amount::zero(),
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn register_orders_api(cfg: &mut ServiceConfig, payments: MockPaymentStore) {
    let orders_api = OrderFlowApi::new(payments, "https://pay.test", EventProducers::default());
    cfg.app_data(web::Data::new(orders_api));
}

fn configure_checkout(cfg: &mut ServiceConfig) {
    let mut payments = MockPaymentStore::new();
    payments.expect_fetch_active_link_checkout().returning(|link_id| match link_id {
        "pl_0000001" => Ok(Some((test_link("pl_0000001"), test_merchant()))),
        "pl_0000002" => {
            let mut merchant = test_merchant();
            merchant.settlement_address = None;
            Ok(Some((test_link("pl_0000002"), merchant)))
        },
        _ => Ok(None),
    });
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
    register_orders_api(cfg, payments);
    cfg.service(LinkCheckoutRoute::<MockPaymentStore>::new());
}

fn configure_confirm(cfg: &mut ServiceConfig) {
    let mut payments = MockPaymentStore::new();
    payments.expect_confirm_order_by_memo().returning(|memo, tx_hash, customer_address| {
        if memo.as_str() == "testmemo0000000000000001" {
            let mut order = test_order("ord_0000001", "testmemo0000000000000001");
            order.status = OrderStatus::Paid;
            order.tx_hash = Some(tx_hash.to_string());
            order.customer_address = Some(customer_address.to_string());
            order.paid_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap());
            Ok(Some(order))
        } else {
            Ok(None)
        }
    });
    register_orders_api(cfg, payments);
    cfg.service(ConfirmOrderRoute::<MockPaymentStore>::new());
}

fn configure_validation(cfg: &mut ServiceConfig) {
    register_orders_api(cfg, MockPaymentStore::new());
    cfg.service(ConfirmOrderRoute::<MockPaymentStore>::new());
}
