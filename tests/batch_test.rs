use preventivatore::config::{Config, FormDefaults};
use preventivatore::services::run_quotation_process;
use preventivatore::store::models::CustomerRecord;
use std::sync::Arc;

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        log_level: "info".to_string(),
        prima_login_url: "https://intermediari.prima.it/login".to_string(),
        prima_username: "user@example.com".to_string(),
        prima_password: "password".to_string(),
        // Nothing listens here; acquiring the session must fail fast.
        webdriver_url: "http://127.0.0.1:9".to_string(),
        headless: true,
        proxy_url: None,
        user_agent: "test-agent".to_string(),
        accept_language: "it-IT,it;q=0.9".to_string(),
        customers_path: dir.join("clienti.csv").to_string_lossy().into_owned(),
        quotations_path: dir.join("quotazioni.csv").to_string_lossy().into_owned(),
        window_start: None,
        window_end: None,
        element_timeout_ms: 100,
        interstitial_timeout_ms: 50,
        price_timeout_ms: 100,
        step_pause_ms: 0,
        retry_pause_ms: 0,
        navigation_settle_ms: 0,
        post_submit_settle_ms: 0,
        pacing_min_ms: 0,
        pacing_max_ms: 0,
        defaults: FormDefaults {
            city: "Torino".to_string(),
            postal_code: "10121".to_string(),
            address: "Via Roma".to_string(),
            house_number: "1".to_string(),
            phone_number: "3270692082".to_string(),
        },
    }
}

fn unprocessed(plate: &str) -> CustomerRecord {
    CustomerRecord {
        plate: plate.to_string(),
        birth_date: None,
        expiry_date: None,
        license_year: None,
        city: None,
        postal_code: None,
        address: None,
        house_number: None,
        processed: false,
        inserted_at: None,
    }
}

#[tokio::test]
async fn test_unacquirable_browser_is_fatal_to_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(dir.path()));

    let summary =
        run_quotation_process(config.clone(), Some(vec![unprocessed("AB123CD")])).await;

    assert!(summary.starts_with("[KO] fatal"), "summary was: {}", summary);
    // Nothing may be written when the batch aborts before processing.
    assert!(!std::path::Path::new(&config.customers_path).exists());
    assert!(!std::path::Path::new(&config.quotations_path).exists());
}

#[tokio::test]
async fn test_empty_selection_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(dir.path()));

    let mut done = unprocessed("AB123CD");
    done.processed = true;

    let summary = run_quotation_process(config.clone(), Some(vec![done])).await;

    assert!(summary.contains("no unprocessed records"), "summary was: {}", summary);
    assert!(!std::path::Path::new(&config.quotations_path).exists());
}
