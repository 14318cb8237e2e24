// src/web_crawler/renderer.rs
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::debug;

use crate::models::Result;

/// Fetch a page through a headless browser so script-built markup is
/// observable. One isolated browser per invocation, torn down before
/// returning; a wedged site can only ever take its own instance with it.
pub async fn render_page(url: &str, timeout: Duration) -> Result<String> {
    let config = BrowserConfig::builder()
        .request_timeout(timeout)
        .build()?;

    let (mut browser, mut handler) = Browser::launch(config).await?;

    // The CDP handler must be polled for the whole browser lifetime.
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("Browser handler event error: {}", e);
            }
        }
    });

    let rendered = tokio::time::timeout(timeout, async {
        let page = browser.new_page(url).await?;
        page.wait_for_navigation().await?;
        let html = page.content().await?;
        Ok::<String, Box<dyn std::error::Error + Send + Sync>>(html)
    })
    .await;

    let result = match rendered {
        Ok(inner) => inner,
        Err(_) => Err(format!(
            "render timed out after {}ms for {url}",
            timeout.as_millis()
        )
        .into()),
    };

    if let Err(e) = browser.close().await {
        debug!("Failed to close browser for {}: {}", url, e);
    }
    if let Err(e) = browser.wait().await {
        debug!("Failed to wait for browser exit for {}: {}", url, e);
    }
    handler_task.abort();

    result
}
