mod backend_client;
mod rate_limiter;
mod retry_policy;
mod transport;

pub use backend_client::BackendClient;
pub use rate_limiter::{DEFAULT_WINDOW, SlidingWindowRateLimiter};
pub use retry_policy::RetryPolicy;
pub use transport::{
    BackendAuth, HttpTransport, RequestBody, ReqwestTransport, TransportError, TransportResponse,
};
