use crate::config::Config;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

/// Builds the WebDriver client with the Chrome capability set the portal
/// tolerates. Acquiring the client spawns a real browser process; the caller
/// owns it for the whole batch and must close it on every exit path.
pub async fn create_webdriver_client(
    config: &Config,
) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut caps = serde_json::Map::new();

    let mut chrome_opts = serde_json::Map::new();

    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-software-rasterizer".to_string(),
        "--window-size=1920,1080".to_string(),
        "--disable-infobars".to_string(),
        "--log-level=3".to_string(),
        format!(
            "--lang={}",
            config.accept_language.split(',').next().unwrap_or("it-IT")
        ),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }

    if let Some(proxy_url) = &config.proxy_url {
        args.push(format!("--proxy-server={}", proxy_url));
    }

    chrome_opts.insert("args".to_string(), json!(args));
    chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));

    let mut prefs = serde_json::Map::new();
    prefs.insert("credentials_enable_service".to_string(), json!(false));
    prefs.insert("profile.password_manager_enabled".to_string(), json!(false));
    chrome_opts.insert("prefs".to_string(), json!(prefs));

    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("acceptInsecureCerts".to_string(), json!(true));

    tracing::info!("connecting to WebDriver at {}", config.webdriver_url);

    let client = ClientBuilder::native()
        .capabilities(caps)
        .connect(&config.webdriver_url)
        .await?;

    // The portal runs bot-detection scripts; hide the obvious webdriver
    // markers before the first navigation.
    let anti_detection_script = format!(
        r#"
        Object.defineProperty(navigator, 'webdriver', {{
            get: () => undefined
        }});
        Object.defineProperty(navigator, 'userAgent', {{
            get: () => '{}'
        }});
        window.navigator.chrome = {{ runtime: {{}} }};
        Object.defineProperty(navigator, 'languages', {{
            get: () => ['it-IT', 'it', 'en-US', 'en']
        }});
        "#,
        config.user_agent
    );

    if let Err(e) = client.execute(&anti_detection_script, vec![]).await {
        tracing::warn!("anti-detection script failed: {:?}", e);
    }

    tracing::info!("WebDriver session established");

    Ok(client)
}
