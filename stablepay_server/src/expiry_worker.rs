use log::*;
use stablepay_engine::{db_types::Order, events::EventProducers, OrderFlowApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the order expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The worker ticks once a minute and marks every pending order whose expiry time has passed as expired. Terminal
/// orders are never touched, and each expired order fires the order-expired hooks.
pub fn start_expiry_worker(db: SqliteDatabase, producers: EventProducers, payment_url_base: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let api = OrderFlowApi::new(db, payment_url_base, producers);
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        info!("🕰️ Order expiry worker started");
        loop {
            timer.tick().await;
            match api.expire_old_orders().await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No orders were due to expire"),
                Ok(expired) => {
                    info!("🕰️ {} orders expired", expired.len());
                    debug!("🕰️ Expired orders: {}", order_list(&expired));
                },
                Err(e) => error!("🕰️ Error running the order expiry job: {e}"),
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] memo: {} merchant: {}", o.id, o.memo, o.merchant_id))
        .collect::<Vec<String>>()
        .join(", ")
}
