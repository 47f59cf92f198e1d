mod crypto;
mod ids;

pub use crypto::{
    api_key_hash,
    api_key_prefix,
    constant_time_eq,
    new_webhook_secret,
    sign_payload,
    verify_signature,
};
pub use ids::{
    generate_api_key,
    new_key_id,
    new_link_id,
    new_memo,
    new_merchant_id,
    new_order_id,
    new_webhook_id,
    random_token,
};

/// The EVM zero address. A merchant whose settlement address is unset or equal to this cannot receive payments.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
