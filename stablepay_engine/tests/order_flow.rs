mod support;

use std::collections::HashSet;

use chrono::{Duration, Utc};
use spg_common::Amount;
use stablepay_engine::{
    db_types::{NewMerchant, NewPaymentLink, OrderStatus},
    events::EventProducers,
    helpers::new_memo,
    order_objects::{CreateOrderParams, OrderQueryFilter},
    traits::{MerchantManagement, PaymentGatewayError},
    MerchantApi,
    OrderFlowApi,
    PaymentLinkApi,
    SqliteDatabase,
};
use support::prepare_test_db;

const SETTLEMENT_ADDRESS: &str = "0x00112233445566778899aabbccddeeff00112233";

fn amount(s: &str) -> Amount {
    s.parse().expect("valid amount")
}

async fn new_merchant(db: &SqliteDatabase, email: &str) -> String {
    let merchant = db
        .insert_merchant(NewMerchant { name: "Acme Corp".to_string(), email: email.to_string() })
        .await
        .expect("merchant should be created");
    merchant.id
}

fn order_api(db: &SqliteDatabase) -> OrderFlowApi<SqliteDatabase> {
    OrderFlowApi::new(db.clone(), "https://pay.example.com", EventProducers::default())
}

#[tokio::test]
async fn create_confirm_fetch_round_trip() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "roundtrip@example.com").await;
    let api = order_api(&db);

    let params = CreateOrderParams::new(merchant_id.as_str(), amount("25.00"), "USDC")
        .with_metadata(serde_json::json!({"invoice": "INV-1001"}));
    let order = api.create_order(params).await.expect("order should be created");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.amount, amount("25.00"));
    assert!(order.id.as_str().starts_with("ord_"));
    assert_eq!(order.memo.as_str().len(), 24);
    assert_eq!(order.payment_url, format!("https://pay.example.com/pay/{}", order.memo));
    let ttl = order.expires_at - order.created_at;
    assert!((ttl - Duration::seconds(3600)).num_seconds().abs() <= 2, "default TTL should be one hour");
    assert!(order.customer_address.is_none());
    assert!(order.paid_at.is_none());

    let confirmed = api
        .confirm_order(&order.memo, "0xabc123", "0xcustomer")
        .await
        .expect("confirmation should succeed");
    assert_eq!(confirmed.status, OrderStatus::Paid);
    assert_eq!(confirmed.tx_hash.as_deref(), Some("0xabc123"));
    assert_eq!(confirmed.customer_address.as_deref(), Some("0xcustomer"));
    assert!(confirmed.paid_at.is_some());

    let fetched = api.order(&order.id, &merchant_id).await.expect("fetch should succeed").expect("order exists");
    assert_eq!(fetched.status, OrderStatus::Paid);
    assert_eq!(fetched.memo, order.memo);
}

#[tokio::test]
async fn confirming_an_unknown_memo_changes_nothing() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "unknown-memo@example.com").await;
    let api = order_api(&db);
    let order = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("5"), "USDC"))
        .await
        .expect("order should be created");

    let err = api.confirm_order(&new_memo(), "0xdead", "0xbeef").await.expect_err("unknown memo must fail");
    assert!(matches!(err, PaymentGatewayError::MemoNotFound(_)));

    let fetched = api.order(&order.id, &merchant_id).await.expect("fetch succeeds").expect("order exists");
    assert_eq!(fetched.status, OrderStatus::Pending, "the failed confirmation must not mutate anything");
    assert!(fetched.tx_hash.is_none());
}

#[tokio::test]
async fn memos_are_unique_across_many_orders() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "memos@example.com").await;
    let api = order_api(&db);
    let mut memos = HashSet::new();
    for _ in 0..50 {
        let order = api
            .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("1.50"), "USDC"))
            .await
            .expect("order should be created");
        assert!(memos.insert(order.memo.clone()), "memo {} was generated twice", order.memo);
    }
    assert_eq!(memos.len(), 50);
}

#[tokio::test]
async fn orders_are_invisible_to_other_merchants() {
    let db = prepare_test_db().await;
    let merchant_a = new_merchant(&db, "tenant-a@example.com").await;
    let merchant_b = new_merchant(&db, "tenant-b@example.com").await;
    let api = order_api(&db);

    let order = api
        .create_order(CreateOrderParams::new(merchant_a.as_str(), amount("9.99"), "USDC"))
        .await
        .expect("order should be created");

    let visible = api.order(&order.id, &merchant_a).await.expect("fetch succeeds");
    assert!(visible.is_some());
    let invisible = api.order(&order.id, &merchant_b).await.expect("fetch succeeds");
    assert!(invisible.is_none(), "another merchant's order must look like a missing one");

    let (own, _) = api.orders_for_merchant(&merchant_b, 20).await.expect("list succeeds");
    assert!(own.is_empty());
}

#[tokio::test]
async fn listing_respects_the_limit_and_flags_more_rows() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "listing@example.com").await;
    let api = order_api(&db);
    for _ in 0..5 {
        api.create_order(CreateOrderParams::new(merchant_id.as_str(), amount("2"), "USDC"))
            .await
            .expect("order should be created");
    }

    let (page, has_more) = api.orders_for_merchant(&merchant_id, 3).await.expect("list succeeds");
    assert_eq!(page.len(), 3);
    assert!(has_more);

    let (page, has_more) = api.orders_for_merchant(&merchant_id, 10).await.expect("list succeeds");
    assert_eq!(page.len(), 5);
    assert!(!has_more);
}

#[tokio::test]
async fn filtered_search_reports_exact_totals() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "search@example.com").await;
    let api = order_api(&db);
    for _ in 0..4 {
        api.create_order(CreateOrderParams::new(merchant_id.as_str(), amount("2"), "USDC"))
            .await
            .expect("order should be created");
    }
    let paid = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("2"), "USDC"))
        .await
        .expect("order should be created");
    api.confirm_order(&paid.memo, "0xhash", "0xcust").await.expect("confirmation succeeds");

    let query = OrderQueryFilter::for_merchant(merchant_id.as_str()).with_status(OrderStatus::Pending);
    let result = api.search_orders(query).await.expect("search succeeds");
    assert_eq!(result.total, 4);
    assert_eq!(result.orders.len(), 4);
    assert!(!result.has_more);
    assert!(result.orders.iter().all(|o| o.status == OrderStatus::Pending));

    let query = OrderQueryFilter::for_merchant(merchant_id.as_str()).with_limit(2).with_offset(2);
    let result = api.search_orders(query).await.expect("search succeeds");
    assert_eq!(result.total, 5);
    assert_eq!(result.orders.len(), 2);
    assert!(result.has_more);

    let query = OrderQueryFilter::for_merchant(merchant_id.as_str()).since(Utc::now() + Duration::hours(1));
    let result = api.search_orders(query).await.expect("search succeeds");
    assert_eq!(result.total, 0);
    assert!(result.orders.is_empty());
    assert!(!result.has_more);
}

#[tokio::test]
async fn expiry_sweep_only_touches_overdue_pending_orders() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "expiry@example.com").await;
    let api = order_api(&db);

    let overdue = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("3"), "USDC").with_ttl_seconds(-10))
        .await
        .expect("order should be created");
    let paid = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("4"), "USDC").with_ttl_seconds(-10))
        .await
        .expect("order should be created");
    api.confirm_order(&paid.memo, "0xffff", "0xcust").await.expect("confirmation succeeds");
    let fresh = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("5"), "USDC"))
        .await
        .expect("order should be created");

    let expired = api.expire_old_orders().await.expect("sweep succeeds");
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, overdue.id);
    assert_eq!(expired[0].status, OrderStatus::Expired);

    let paid = api.order(&paid.id, &merchant_id).await.expect("fetch succeeds").expect("order exists");
    assert_eq!(paid.status, OrderStatus::Paid, "paid orders are terminal and stay paid");
    let fresh = api.order(&fresh.id, &merchant_id).await.expect("fetch succeeds").expect("order exists");
    assert_eq!(fresh.status, OrderStatus::Pending);

    // The sweep is idempotent
    let expired = api.expire_old_orders().await.expect("sweep succeeds");
    assert!(expired.is_empty());
}

#[tokio::test]
async fn confirmation_is_applied_even_after_expiry() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "late-payment@example.com").await;
    let api = order_api(&db);

    let order = api
        .create_order(CreateOrderParams::new(merchant_id.as_str(), amount("7"), "USDC").with_ttl_seconds(-60))
        .await
        .expect("order should be created");
    api.expire_old_orders().await.expect("sweep succeeds");

    // The chain transfer already happened, so the late confirmation is still recorded.
    let confirmed = api.confirm_order(&order.memo, "0xlate", "0xcust").await.expect("confirmation succeeds");
    assert_eq!(confirmed.status, OrderStatus::Paid);
}

#[tokio::test]
async fn link_checkout_requires_a_configured_merchant_and_an_active_link() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "links@example.com").await;
    let merchant_api = MerchantApi::new(db.clone());
    let link_api = PaymentLinkApi::new(db.clone());
    let api = order_api(&db);

    let link = link_api
        .create_payment_link(NewPaymentLink {
            merchant_id: merchant_id.clone(),
            title: "Coffee fund".to_string(),
            description: None,
            image_url: None,
            amount: amount("12.50"),
            currency: "USDC".to_string(),
        })
        .await
        .expect("link should be created");

    let err = api.create_order_from_link(&link.id).await.expect_err("no settlement address yet");
    assert!(matches!(err, PaymentGatewayError::MerchantNotConfigured(_)));

    merchant_api
        .update_settlement_address(&merchant_id, SETTLEMENT_ADDRESS)
        .await
        .expect("address should be accepted");

    let order = api.create_order_from_link(&link.id).await.expect("checkout should succeed");
    assert_eq!(order.amount, amount("12.50"));
    assert_eq!(order.payment_link_id.as_deref(), Some(link.id.as_str()));
    assert_eq!(order.payment_url, format!("/pay/{}", order.memo));
    let ttl = order.expires_at - order.created_at;
    assert!((ttl - Duration::seconds(1800)).num_seconds().abs() <= 2, "link orders expire after 30 minutes");
    let metadata = order.metadata.as_ref().expect("link orders carry metadata");
    assert_eq!(metadata.0["paymentLinkTitle"], "Coffee fund");

    link_api.set_payment_link_active(&merchant_id, &link.id, false).await.expect("toggle succeeds");
    let err = api.create_order_from_link(&link.id).await.expect_err("inactive links are invisible");
    assert!(matches!(err, PaymentGatewayError::PaymentLinkNotFound(_)));

    let err = api.create_order_from_link("pl_doesnotexist").await.expect_err("unknown links are invisible");
    assert!(matches!(err, PaymentGatewayError::PaymentLinkNotFound(_)));
}

#[tokio::test]
async fn confirmed_link_payments_update_the_link_counters() {
    let db = prepare_test_db().await;
    let merchant_id = new_merchant(&db, "link-counters@example.com").await;
    let merchant_api = MerchantApi::new(db.clone());
    let link_api = PaymentLinkApi::new(db.clone());
    let api = order_api(&db);

    merchant_api
        .update_settlement_address(&merchant_id, SETTLEMENT_ADDRESS)
        .await
        .expect("address should be accepted");
    let link = link_api
        .create_payment_link(NewPaymentLink {
            merchant_id: merchant_id.clone(),
            title: "Sticker pack".to_string(),
            description: Some("Three glossy stickers".to_string()),
            image_url: None,
            amount: amount("19.99"),
            currency: "USDC".to_string(),
        })
        .await
        .expect("link should be created");

    link_api.record_view(&link.id).await.expect("view recorded");
    link_api.record_view(&link.id).await.expect("view recorded");

    for _ in 0..2 {
        let order = api.create_order_from_link(&link.id).await.expect("checkout succeeds");
        api.confirm_order(&order.memo, "0xhash", "0xcust").await.expect("confirmation succeeds");
    }

    let link = link_api.payment_link(&merchant_id, &link.id).await.expect("fetch succeeds").expect("link exists");
    assert_eq!(link.view_count, 2);
    assert_eq!(link.payment_count, 2);
    assert_eq!(link.total_amount, amount("39.98"));

    let stale = Utc::now() - Duration::days(1);
    assert!(link.updated_at > stale);
}
