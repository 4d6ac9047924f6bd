use fantoccini::elements::Element;
use fantoccini::{Client, Locator};
use std::time::Duration;

/// An element descriptor. Owns its selector text so dynamic XPaths (e.g. the
/// license-year option for a specific year) can be built at runtime.
#[derive(Debug, Clone)]
pub enum Target {
    Css(String),
    XPath(String),
}

impl Target {
    pub fn css(selector: impl Into<String>) -> Self {
        Target::Css(selector.into())
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Target::XPath(selector.into())
    }

    pub fn as_locator(&self) -> Locator<'_> {
        match self {
            Target::Css(s) => Locator::Css(s),
            Target::XPath(s) => Locator::XPath(s),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Css(s) => write!(f, "css:{}", s),
            Target::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Waits for an element to appear, or returns None once the timeout elapses.
/// Missing elements are an expected outcome here, never an error.
pub async fn wait_for(client: &Client, target: &Target, timeout: Duration) -> Option<Element> {
    match client
        .wait()
        .at_most(timeout)
        .for_element(target.as_locator())
        .await
    {
        Ok(elem) => Some(elem),
        Err(e) => {
            tracing::debug!("element not found within {:?}: {} ({})", timeout, target, e);
            None
        }
    }
}

/// Waits for the element then clicks it. Returns false on timeout or if the
/// click itself is rejected (overlay, detached node).
pub async fn wait_and_click(client: &Client, target: &Target, timeout: Duration) -> bool {
    let Some(elem) = wait_for(client, target, timeout).await else {
        tracing::warn!("could not click {} within {:?}", target, timeout);
        return false;
    };
    match elem.click().await {
        Ok(()) => {
            tracing::debug!("clicked {}", target);
            true
        }
        Err(e) => {
            tracing::warn!("click rejected on {}: {}", target, e);
            false
        }
    }
}

/// Waits for the element then types into it. Returns false on timeout or if
/// the keystrokes are rejected.
pub async fn wait_and_fill(client: &Client, target: &Target, text: &str, timeout: Duration) -> bool {
    let Some(elem) = wait_for(client, target, timeout).await else {
        tracing::warn!("could not fill {} within {:?}", target, timeout);
        return false;
    };
    match elem.send_keys(text).await {
        Ok(()) => {
            tracing::debug!("filled {} with '{}'", target, text);
            true
        }
        Err(e) => {
            tracing::warn!("send_keys rejected on {}: {}", target, e);
            false
        }
    }
}

/// Scrolls the element into the middle of the viewport. Best-effort: a
/// missing element or a script error only logs a warning.
pub async fn scroll_into_view(client: &Client, target: &Target, timeout: Duration) -> bool {
    let Some(elem) = wait_for(client, target, timeout).await else {
        tracing::warn!("could not scroll to {} within {:?}", target, timeout);
        return false;
    };
    let arg = match serde_json::to_value(&elem) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("element handle not serializable for {}: {}", target, e);
            return false;
        }
    };
    match client
        .execute(
            "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});",
            vec![arg],
        )
        .await
    {
        Ok(_) => {
            tracing::debug!("scrolled to {}", target);
            true
        }
        Err(e) => {
            tracing::warn!("scroll failed on {}: {}", target, e);
            false
        }
    }
}

/// Waits for the element and reads its visible text.
pub async fn read_text(client: &Client, target: &Target, timeout: Duration) -> Option<String> {
    let elem = wait_for(client, target, timeout).await?;
    match elem.text().await {
        Ok(text) => {
            tracing::debug!("read '{}' from {}", text.trim(), target);
            Some(text.trim().to_string())
        }
        Err(e) => {
            tracing::warn!("text read failed on {}: {}", target, e);
            None
        }
    }
}

/// Two-attempt click: on first failure, pause and retry once. The portal is
/// known to be slow to render some navigation targets.
pub async fn click_with_retry(
    client: &Client,
    target: &Target,
    timeout: Duration,
    retry_pause: Duration,
) -> bool {
    if wait_and_click(client, target, timeout).await {
        return true;
    }
    tracing::warn!("first click attempt on {} failed, retrying once", target);
    tokio::time::sleep(retry_pause).await;
    wait_and_click(client, target, timeout).await
}
