pub mod rate_limit;
pub mod request_id;
pub mod workspace_auth;

pub use rate_limit::{ApiKeyExtractor, ApiRateLimitConfig, api_rate_limit_config, api_rate_limiter};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use workspace_auth::WithWorkspace;
