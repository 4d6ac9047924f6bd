use chrono::NaiveDate;
use std::env;

/// Runtime configuration, resolved once from the environment and passed
/// explicitly to every component. No process-wide mutable state.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,

    // Prima portal
    pub prima_login_url: String,
    pub prima_username: String,
    pub prima_password: String,

    // Browser
    pub webdriver_url: String,
    pub headless: bool,
    pub proxy_url: Option<String>,
    pub user_agent: String,
    pub accept_language: String,

    // Tables
    pub customers_path: String,
    pub quotations_path: String,

    // Optional expiry-date window for record selection ("YYYY-MM-DD")
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,

    // Timeouts (ms)
    pub element_timeout_ms: u64,
    pub interstitial_timeout_ms: u64,
    pub price_timeout_ms: u64,

    // Named delays (ms)
    pub step_pause_ms: u64,
    pub retry_pause_ms: u64,
    pub navigation_settle_ms: u64,
    pub post_submit_settle_ms: u64,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,

    pub defaults: FormDefaults,
}

/// Substitution values used when a customer record leaves a form field blank.
/// The portal rejects empty fields, so every one of these must apply cleanly.
#[derive(Debug, Clone)]
pub struct FormDefaults {
    pub city: String,
    pub postal_code: String,
    pub address: String,
    pub house_number: String,
    pub phone_number: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            prima_login_url: env::var("PRIMA_LOGIN_URL")
                .unwrap_or_else(|_| "https://intermediari.prima.it/login".to_string()),
            prima_username: env::var("PRIMA_USERNAME").unwrap_or_default(),
            prima_password: env::var("PRIMA_PASSWORD").unwrap_or_default(),

            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            headless: env::var("HEADLESS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            proxy_url: env::var("PROXY_URL").ok().filter(|s| !s.is_empty()),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string()
            }),
            accept_language: env::var("ACCEPT_LANGUAGE")
                .unwrap_or_else(|_| "it-IT,it;q=0.9".to_string()),

            customers_path: env::var("CUSTOMERS_FILE")
                .unwrap_or_else(|_| "clienti_assicurazioni.csv".to_string()),
            quotations_path: env::var("QUOTATIONS_FILE")
                .unwrap_or_else(|_| "quotazioni.csv".to_string()),

            window_start: parse_date_var("PROCESS_WINDOW_START"),
            window_end: parse_date_var("PROCESS_WINDOW_END"),

            element_timeout_ms: parse_ms_var("ELEMENT_TIMEOUT_MS", 5_000),
            interstitial_timeout_ms: parse_ms_var("INTERSTITIAL_TIMEOUT_MS", 3_000),
            price_timeout_ms: parse_ms_var("PRICE_TIMEOUT_MS", 15_000),

            step_pause_ms: parse_ms_var("STEP_PAUSE_MS", 500),
            retry_pause_ms: parse_ms_var("RETRY_PAUSE_MS", 1_000),
            navigation_settle_ms: parse_ms_var("NAVIGATION_SETTLE_MS", 2_000),
            post_submit_settle_ms: parse_ms_var("POST_SUBMIT_SETTLE_MS", 7_000),
            pacing_min_ms: parse_ms_var("PACING_MIN_MS", 3_000),
            pacing_max_ms: parse_ms_var("PACING_MAX_MS", 6_000),

            defaults: FormDefaults {
                city: env::var("DEFAULT_CITY").unwrap_or_else(|_| "Torino".to_string()),
                postal_code: env::var("DEFAULT_CAP").unwrap_or_else(|_| "10121".to_string()),
                address: env::var("DEFAULT_ADDRESS").unwrap_or_else(|_| "Via Roma".to_string()),
                house_number: env::var("DEFAULT_CIVIC").unwrap_or_else(|_| "1".to_string()),
                phone_number: env::var("DEFAULT_PHONE")
                    .unwrap_or_else(|_| "3270692082".to_string()),
            },
        })
    }
}

fn parse_ms_var(name: &str, default: u64) -> u64 {
    env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn parse_date_var(name: &str) -> Option<NaiveDate> {
    env::var(name)
        .ok()
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}
