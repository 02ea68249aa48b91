use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::TrackerError;

pub const DEFAULT_BOARD_URL: &str = "http://investorshub.advfn.com/boards/breakoutboards.aspx";
const USER_AGENT: &str = concat!("board_streaks/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub fn build_client(opts: &FetchOptions) -> Result<Client, TrackerError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(opts.connect_timeout)
        .timeout(opts.request_timeout)
        .build()?;
    Ok(client)
}

/// Fetch the board page. Errors, non-2xx statuses and blank bodies all fail.
pub async fn fetch_board(client: &Client, url: &str) -> Result<String, TrackerError> {
    info!("Fetching board: {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TrackerError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let html = response.text().await?;
    if html.trim().is_empty() {
        return Err(TrackerError::EmptyPage(url.to_string()));
    }

    info!("Fetched {} bytes", html.len());
    Ok(html)
}
