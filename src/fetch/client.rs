use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared requests; the seam that lets tests and wrappers stand in
/// for a real `reqwest::Client`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
