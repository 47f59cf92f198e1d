use rand::Rng;

use crate::db_types::{KeyEnvironment, Memo, OrderId};

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 24;

/// Generates a random lowercase base-36 token of the given length.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char).collect()
}

/// A fresh payment memo. Memos are the correlation key between on-chain transfers and orders, so they must be unique.
/// The database enforces this with a UNIQUE constraint; a collision surfaces as an error and the caller retries.
pub fn new_memo() -> Memo {
    Memo(random_token(TOKEN_LEN))
}

pub fn new_order_id() -> OrderId {
    OrderId(format!("ord_{}", random_token(TOKEN_LEN)))
}

pub fn new_link_id() -> String {
    format!("pl_{}", random_token(TOKEN_LEN))
}

pub fn new_webhook_id() -> String {
    format!("wh_{}", random_token(TOKEN_LEN))
}

pub fn new_merchant_id() -> String {
    random_token(TOKEN_LEN)
}

pub fn new_key_id() -> String {
    random_token(TOKEN_LEN)
}

/// Generates a raw API key: `sk_test_` or `sk_live_` followed by a random token and 32 hex characters.
/// The raw key is returned to the merchant exactly once. Only its hash is stored.
pub fn generate_api_key(environment: KeyEnvironment) -> String {
    let mut rng = rand::thread_rng();
    let suffix: [u8; 16] = rng.gen();
    format!("sk_{environment}_{}{}", random_token(TOKEN_LEN), hex::encode(suffix))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tokens_use_the_base36_charset() {
        let token = random_token(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ids_carry_their_prefixes() {
        assert!(new_order_id().as_str().starts_with("ord_"));
        assert!(new_link_id().starts_with("pl_"));
        assert!(new_webhook_id().starts_with("wh_"));
        assert_eq!(new_memo().as_str().len(), 24);
    }

    #[test]
    fn api_keys_carry_their_environment() {
        assert!(generate_api_key(KeyEnvironment::Test).starts_with("sk_test_"));
        let key = generate_api_key(KeyEnvironment::Live);
        assert!(key.starts_with("sk_live_"));
        assert_eq!(key.len(), "sk_live_".len() + 24 + 32);
    }
}
