use crate::browser::create_webdriver_client;
use crate::config::Config;
use crate::providers::prima::{login, quote};
use crate::store::models::{CustomerRecord, QuotationResult};
use crate::store::table::load_table;
use crate::store::upsert::upsert;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Caller interface for the front-end: run a batch over the supplied table,
/// or over the persisted customers file when none is given (the documented
/// retry path). Always returns a human-readable multi-line summary; it never
/// panics out of a batch.
pub async fn run_quotation_process(
    config: Arc<Config>,
    table: Option<Vec<CustomerRecord>>,
) -> String {
    BatchRunner::new(config).run(table).await
}

pub struct BatchRunner {
    config: Arc<Config>,
}

impl BatchRunner {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub async fn run(&self, table: Option<Vec<CustomerRecord>>) -> String {
        let config = &self.config;

        let mut records = match table {
            Some(rows) => rows,
            None => match load_table(&config.customers_path) {
                Ok(rows) => rows,
                Err(e) => {
                    return format!(
                        "[KO] could not load customers table '{}': {}",
                        config.customers_path, e
                    );
                }
            },
        };

        let selected = select_records(&records, config.window_start, config.window_end);
        if selected.is_empty() {
            return "[OK] no unprocessed records to quote".to_string();
        }
        tracing::info!("{} records selected for quotation", selected.len());

        // One browser session for the whole batch. Acquiring it spawns an OS
        // process, so every path below must reach the close() calls.
        let client = match create_webdriver_client(config).await {
            Ok(client) => client,
            Err(e) => {
                return format!("[KO] fatal: WebDriver session not acquired: {}", e);
            }
        };

        if let Err(e) = login(&client, config).await {
            let _ = client.close().await;
            return format!("[KO] fatal: {}\n0 records processed, nothing written", e);
        }

        let mut lines: Vec<String> = Vec::new();
        let mut results: Vec<QuotationResult> = Vec::new();
        let mut ok_count = 0usize;

        for (loop_idx, &record_idx) in selected.iter().enumerate() {
            let plate = records[record_idx].plate.clone();
            tracing::info!("--- processing plate {} ({}/{}) ---", plate, loop_idx + 1, selected.len());

            // The form flow ends on the results page; start the next record
            // from the entry URL, reusing the session cookie.
            if loop_idx > 0 {
                if let Err(e) = client.goto(&config.prima_login_url).await {
                    tracing::warn!("[{}] re-navigation failed: {}", plate, e);
                }
                tokio::time::sleep(Duration::from_millis(config.navigation_settle_ms)).await;
            }

            let result = quote(&client, config, &records[record_idx]).await;

            if result.error {
                let reason = result
                    .abort_reason
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string());
                lines.push(format!("[KO] {} - {}", plate, reason));
            } else {
                let rc = result
                    .rc
                    .amount()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".to_string());
                lines.push(format!("[OK] {} - RC {}", plate, rc));
                ok_count += 1;

                let record = &mut records[record_idx];
                record.processed = true;
                record.inserted_at = Some(Utc::now());
            }
            results.push(result);

            self.pace().await;
        }

        let _ = client.close().await;
        tracing::info!("[OK] browser closed");

        lines.push(format!(
            "{} of {} quotations retrieved successfully",
            ok_count,
            selected.len()
        ));

        self.persist(records, &results, &mut lines);

        lines.join("\n")
    }

    /// Randomized pause between records, to look less like a robot.
    async fn pace(&self) {
        let (lo, hi) = (
            self.config.pacing_min_ms.min(self.config.pacing_max_ms),
            self.config.pacing_min_ms.max(self.config.pacing_max_ms),
        );
        let pause = rand::thread_rng().gen_range(lo..=hi);
        tracing::debug!("pacing for {} ms", pause);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    /// Writes both tables. A locked file is reported, never retried here:
    /// the in-memory results survive in the caller's summary and a re-run
    /// with no argument picks the batch up again.
    fn persist(
        &self,
        records: Vec<CustomerRecord>,
        results: &[QuotationResult],
        lines: &mut Vec<String>,
    ) {
        let config = &self.config;

        match upsert(&config.customers_path, records, |r: &CustomerRecord| {
            r.plate.clone()
        }) {
            Ok(()) => lines.push(format!("[OK] customers table updated: {}", config.customers_path)),
            Err(e) => lines.push(format!(
                "[KO] customers table '{}' not written: {}",
                config.customers_path, e
            )),
        }

        let successful: Vec<QuotationResult> =
            results.iter().filter(|r| !r.error).cloned().collect();
        if successful.is_empty() {
            return;
        }
        match upsert(&config.quotations_path, successful, |r: &QuotationResult| {
            r.plate.clone()
        }) {
            Ok(()) => lines.push(format!(
                "[OK] quotations table updated: {}",
                config.quotations_path
            )),
            Err(e) => lines.push(format!(
                "[KO] quotations table '{}' not written: {}",
                config.quotations_path, e
            )),
        }
    }
}

/// Picks the records worth driving through the portal: unprocessed, with a
/// usable plate, and inside the expiry window when one is configured.
pub fn select_records(
    records: &[CustomerRecord],
    window_start: Option<NaiveDate>,
    window_end: Option<NaiveDate>,
) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            if record.processed || record.plate.trim().is_empty() {
                return false;
            }
            match (window_start, window_end) {
                (None, None) => true,
                (start, end) => match record.expiry_date {
                    Some(expiry) => {
                        start.map_or(true, |s| expiry >= s) && end.map_or(true, |e| expiry <= e)
                    }
                    // A window is configured but the record has no expiry
                    // date: not in scope for this run.
                    None => false,
                },
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(plate: &str, processed: bool, expiry: Option<(i32, u32, u32)>) -> CustomerRecord {
        CustomerRecord {
            plate: plate.to_string(),
            birth_date: None,
            expiry_date: expiry.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            license_year: None,
            city: None,
            postal_code: None,
            address: None,
            house_number: None,
            processed,
            inserted_at: None,
        }
    }

    #[test]
    fn test_select_skips_processed_and_blank_plates() {
        let records = vec![
            record("AB123CD", false, None),
            record("EF456GH", true, None),
            record("   ", false, None),
        ];
        assert_eq!(select_records(&records, None, None), vec![0]);
    }

    #[test]
    fn test_select_respects_expiry_window() {
        let records = vec![
            record("IN-WINDOW", false, Some((2025, 7, 13))),
            record("TOO-EARLY", false, Some((2025, 7, 1))),
            record("TOO-LATE", false, Some((2025, 8, 1))),
            record("NO-EXPIRY", false, None),
        ];
        let start = NaiveDate::from_ymd_opt(2025, 7, 12);
        let end = NaiveDate::from_ymd_opt(2025, 7, 15);
        assert_eq!(select_records(&records, start, end), vec![0]);
    }

    #[test]
    fn test_select_keeps_stable_order() {
        let records = vec![
            record("A", false, None),
            record("B", false, None),
            record("C", false, None),
        ];
        assert_eq!(select_records(&records, None, None), vec![0, 1, 2]);
    }

    #[test]
    fn test_half_open_window() {
        let records = vec![
            record("OLD", false, Some((2020, 1, 1))),
            record("NEW", false, Some((2030, 1, 1))),
        ];
        let start = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert_eq!(select_records(&records, start, None), vec![1]);
    }
}
