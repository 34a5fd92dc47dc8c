use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::db::DbPool;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenKeys>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl_days);
        let rate_limiter = RateLimiter::new(&config.rate_limit);
        Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}
