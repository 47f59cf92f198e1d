use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use stablepay_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::NullSettlementRegistry,
    MerchantApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    routes::{health, ConfirmOrderRoute, CreateOrderRoute, GetOrderRoute, LinkCheckoutRoute, ListOrdersRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.run_expiry_worker {
        start_expiry_worker(db.clone(), producers.clone(), config.payment_url_base.clone());
    } else {
        warn!("🕰️ The expiry worker is disabled. Overdue orders will not be swept by this process.");
    }
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires up the order event consumers. The hooks below only log; a webhook dispatcher subscribes here when one is
/// deployed alongside the server.
fn create_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|event| {
        Box::pin(async move {
            info!("📬️ Order {} was paid with tx {:?}", event.order.id, event.order.tx_hash);
        })
    });
    hooks.on_order_expired(|event| {
        Box::pin(async move {
            info!("📬️ Order {} passed its expiry time without payment", event.order.id);
        })
    });
    EventHandlers::new(128, hooks)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), config.payment_url_base.clone(), producers.clone());
        let merchants_api = MerchantApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(merchants_api))
            .app_data(web::Data::new(NullSettlementRegistry))
            .app_data(web::Data::new(config.clone()))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, SqliteDatabase, NullSettlementRegistry>::new())
            .service(ListOrdersRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(GetOrderRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(LinkCheckoutRoute::<SqliteDatabase>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
