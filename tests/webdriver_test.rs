use preventivatore::browser::create_webdriver_client;
use preventivatore::Config;

// These need a running chromedriver (chromedriver --port=9515); run them by
// hand with `cargo test -- --ignored`.

fn local_config() -> Config {
    let mut config = Config::from_env().expect("config");
    config.webdriver_url = "http://localhost:9515".to_string();
    config.headless = true;
    config
}

#[tokio::test]
#[ignore]
async fn test_webdriver_connection() {
    let config = local_config();

    let client = create_webdriver_client(&config)
        .await
        .expect("chromedriver not reachable on http://localhost:9515");

    client.close().await.expect("close failed");
}

#[tokio::test]
#[ignore]
async fn test_webdriver_navigation() {
    let config = local_config();

    let client = create_webdriver_client(&config)
        .await
        .expect("chromedriver not reachable on http://localhost:9515");

    client
        .goto("https://www.example.com")
        .await
        .expect("navigation failed");

    let url = client.current_url().await.expect("no current url");
    assert!(url.as_str().contains("example.com"));

    client.close().await.expect("close failed");
}
