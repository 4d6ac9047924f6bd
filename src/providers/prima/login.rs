use crate::browser::actions::{wait_and_click, wait_and_fill, Target};
use crate::config::Config;
use crate::error::ScrapeError;
use crate::providers::prima::selectors::PrimaSelectors;
use crate::utils::mask_sensitive;
use fantoccini::Client;
use std::time::Duration;

/// Authenticates against the portal. Called exactly once per batch; a failure
/// here is fatal to the whole run. Between records the orchestrator only
/// re-navigates to the entry URL and relies on the portal session cookie.
pub async fn login(client: &Client, config: &Config) -> Result<(), ScrapeError> {
    tracing::info!(
        "logging in to {} as {}",
        config.prima_login_url,
        mask_sensitive(&config.prima_username)
    );

    client
        .goto(&config.prima_login_url)
        .await
        .map_err(|e| ScrapeError::LoginFailed(format!("login page did not load: {}", e)))?;

    tokio::time::sleep(Duration::from_millis(config.navigation_settle_ms)).await;

    let timeout = Duration::from_millis(config.element_timeout_ms);

    let username = Target::css(PrimaSelectors::USERNAME_INPUT);
    if !wait_and_fill(client, &username, &config.prima_username, timeout).await {
        return Err(ScrapeError::LoginFailed("username input not found".to_string()));
    }

    let password = Target::css(PrimaSelectors::PASSWORD_INPUT);
    if !wait_and_fill(client, &password, &config.prima_password, timeout).await {
        return Err(ScrapeError::LoginFailed("password input not found".to_string()));
    }

    let submit = Target::css(PrimaSelectors::LOGIN_BUTTON);
    if !wait_and_click(client, &submit, timeout).await {
        return Err(ScrapeError::LoginFailed("login button not found".to_string()));
    }

    tokio::time::sleep(Duration::from_millis(config.navigation_settle_ms)).await;

    // Invalid credentials leave us on the login page rather than raising
    // anything the driver can see; check the URL to catch them.
    let current_url = client
        .current_url()
        .await
        .map_err(|e| ScrapeError::LoginFailed(format!("post-login URL unavailable: {}", e)))?;

    if current_url.as_str().to_lowercase().contains("login") {
        return Err(ScrapeError::LoginFailed(
            "still on login page after submit (wrong credentials?)".to_string(),
        ));
    }

    tracing::info!("[OK] logged in, landed on {}", current_url);
    Ok(())
}
