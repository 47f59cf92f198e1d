use mockall::mock;
use stablepay_engine::{
    db_types::{ApiKey, ApiKeySummary, Memo, Merchant, NewApiKey, NewMerchant, NewOrder, Order, OrderId, PaymentLink},
    order_objects::OrderQueryFilter,
    traits::{MerchantApiError, MerchantManagement, PaymentGatewayDatabase, PaymentGatewayError},
};

mock! {
    pub PaymentStore {}
    impl Clone for PaymentStore {
        fn clone(&self) -> Self;
    }
    impl PaymentGatewayDatabase for PaymentStore {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;
        async fn fetch_order(&self, id: &OrderId, merchant_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_by_memo(&self, memo: &Memo) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_orders_for_merchant(&self, merchant_id: &str, limit: i64) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn count_orders(&self, query: &OrderQueryFilter) -> Result<i64, PaymentGatewayError>;
        async fn confirm_order_by_memo(&self, memo: &Memo, tx_hash: &str, customer_address: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn expire_overdue_orders(&self) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn fetch_active_link_checkout(&self, link_id: &str) -> Result<Option<(PaymentLink, Merchant)>, PaymentGatewayError>;
    }
}

mock! {
    pub MerchantStore {}
    impl MerchantManagement for MerchantStore {
        async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, MerchantApiError>;
        async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError>;
        async fn update_settlement_address(&self, merchant_id: &str, address: &str) -> Result<Merchant, MerchantApiError>;
        async fn set_gas_sponsored(&self, merchant_id: &str, enabled: bool) -> Result<Merchant, MerchantApiError>;
        async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, MerchantApiError>;
        async fn fetch_api_keys(&self, merchant_id: &str) -> Result<Vec<ApiKeySummary>, MerchantApiError>;
        async fn fetch_api_key_candidates(&self, key_prefix: &str) -> Result<Vec<ApiKey>, MerchantApiError>;
        async fn touch_api_key(&self, key_id: &str) -> Result<(), MerchantApiError>;
        async fn rename_api_key(&self, merchant_id: &str, key_id: &str, name: &str) -> Result<ApiKeySummary, MerchantApiError>;
        async fn delete_api_key(&self, merchant_id: &str, key_id: &str) -> Result<(), MerchantApiError>;
    }
}
