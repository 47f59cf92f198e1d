//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database calls) must
//! be expressed as a future or asynchronous function so that worker threads can interleave requests.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use stablepay_engine::{
    db_types::{Memo, OrderId},
    order_objects::CreateOrderParams,
    traits::{MerchantManagement, PaymentGatewayDatabase, SettlementRegistry},
    MerchantApi,
    OrderFlowApi,
};

use crate::{
    auth::authenticated_merchant,
    config::ServerConfig,
    data_objects::{
        CheckoutResponse,
        ConfirmOrderRequest,
        ConfirmOrderResponse,
        ConfirmedOrderView,
        CreateOrderRequest,
        ListOrdersQuery,
        OrderCreatedResponse,
        OrderListResponse,
    },
    errors::ServerError,
};

/// Requests may not ask for more rows than this in one page.
const MAX_PAGE_SIZE: i64 = 100;

// Actix-web cannot handle generics in handlers, so routes are implemented manually using the `route!` macro. Each
// bound becomes one generic parameter on the generated route struct, in declaration order.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders (/v1)  ----------------------------------------------------
route!(create_order => Post "/v1/orders" impl PaymentGatewayDatabase, MerchantManagement, SettlementRegistry);
/// Creates a new pending order for the authenticated merchant.
///
/// The body carries the amount, currency, optional metadata and an optional `expires_in` in seconds. The response is
/// the trimmed order view; customers are sent to the returned `payment_url`. The freshly created order is offered to
/// the settlement registry; a registration failure is logged but does not fail the request, since the order exists
/// either way.
pub async fn create_order<B: PaymentGatewayDatabase, M: MerchantManagement, S: SettlementRegistry>(
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
    orders: web::Data<OrderFlowApi<B>>,
    merchants: web::Data<MerchantApi<M>>,
    registry: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let merchant = authenticated_merchant(&req, merchants.as_ref()).await?;
    let body = body.into_inner();
    if body.currency.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("currency must not be empty".to_string()));
    }
    if matches!(body.expires_in, Some(ttl) if ttl <= 0) {
        return Err(ServerError::InvalidRequestBody("expires_in must be positive".to_string()));
    }
    debug!("💻️ POST create_order for merchant {}", merchant.id);
    let mut params = CreateOrderParams::new(merchant.id.as_str(), body.amount, body.currency.as_str());
    if let Some(metadata) = body.metadata {
        params = params.with_metadata(metadata);
    }
    if let Some(ttl) = body.expires_in {
        params = params.with_ttl_seconds(ttl);
    }
    let order = orders.create_order(params).await?;
    if let Err(e) = registry.register_order(&order).await {
        warn!("🧾️ Could not register order {} for settlement. {e}", order.id);
    }
    Ok(HttpResponse::Ok().json(OrderCreatedResponse::from(order)))
}

route!(get_order => Get "/v1/orders/{order_id}" impl PaymentGatewayDatabase, MerchantManagement);
/// Fetches one of the authenticated merchant's orders. Orders belonging to other merchants 404.
pub async fn get_order<B: PaymentGatewayDatabase, M: MerchantManagement>(
    req: HttpRequest,
    path: web::Path<String>,
    orders: web::Data<OrderFlowApi<B>>,
    merchants: web::Data<MerchantApi<M>>,
) -> Result<HttpResponse, ServerError> {
    let merchant = authenticated_merchant(&req, merchants.as_ref()).await?;
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET order {order_id} for merchant {}", merchant.id);
    let order = orders
        .order(&order_id, &merchant.id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(list_orders => Get "/v1/orders" impl PaymentGatewayDatabase, MerchantManagement);
/// The authenticated merchant's most recent orders, newest first. `?limit=N` caps the page size; the `has_more` flag
/// is the usual approximation and is true exactly when the page came back full.
pub async fn list_orders<B: PaymentGatewayDatabase, M: MerchantManagement>(
    req: HttpRequest,
    query: web::Query<ListOrdersQuery>,
    orders: web::Data<OrderFlowApi<B>>,
    merchants: web::Data<MerchantApi<M>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let merchant = authenticated_merchant(&req, merchants.as_ref()).await?;
    let limit = query.limit.unwrap_or(config.default_page_size).clamp(1, MAX_PAGE_SIZE);
    debug!("💻️ GET orders for merchant {} (limit {limit})", merchant.id);
    let (data, has_more) = orders.orders_for_merchant(&merchant.id, limit).await?;
    Ok(HttpResponse::Ok().json(OrderListResponse { data, has_more }))
}

//----------------------------------------------   Checkout (/api)  --------------------------------------------------
route!(link_checkout => Post "/api/link/{link_id}/create-order" impl PaymentGatewayDatabase);
/// Starts a checkout for a public payment link. Unknown and inactive links 404; a link whose merchant has no usable
/// settlement address 400s, since there is nowhere for the funds to go.
pub async fn link_checkout<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    orders: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let link_id = path.into_inner();
    debug!("💻️ POST link_checkout for link {link_id}");
    let order = orders.create_order_from_link(&link_id).await?;
    let response = CheckoutResponse { order_id: order.id, payment_url: order.payment_url };
    Ok(HttpResponse::Ok().json(response))
}

route!(confirm_order => Post "/api/orders/{memo}/confirm" impl PaymentGatewayDatabase);
/// Records an on-chain payment against the order carrying the given memo.
///
/// The checkout page calls this after the transfer has been submitted, so the confirmation is applied regardless of
/// the order's current status or expiry. An empty transaction hash or customer address 400s without touching
/// anything; an unknown memo 404s.
pub async fn confirm_order<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    body: web::Json<ConfirmOrderRequest>,
    orders: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let memo = Memo(path.into_inner());
    let body = body.into_inner();
    if body.tx_hash.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("txHash must not be empty".to_string()));
    }
    if body.customer_address.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("customerAddress must not be empty".to_string()));
    }
    debug!("💻️ POST confirm_order for memo {memo}");
    let order = orders.confirm_order(&memo, &body.tx_hash, &body.customer_address).await?;
    let response = ConfirmOrderResponse { success: true, order: ConfirmedOrderView::from(order) };
    Ok(HttpResponse::Ok().json(response))
}
