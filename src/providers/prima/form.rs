use crate::browser::actions::{
    click_with_retry, scroll_into_view, wait_and_click, wait_and_fill, Target,
};
use crate::config::{Config, FormDefaults};
use crate::error::ScrapeError;
use crate::providers::prima::extract::extract_prices;
use crate::providers::prima::selectors::PrimaSelectors;
use crate::store::models::{CustomerRecord, QuotationResult, DATE_FORMAT_IT};
use fantoccini::Client;
use std::fmt;
use std::time::Duration;

/// Where the driver currently is in the portal's multi-step form. The form
/// itself only exposes this through what happens to be rendered; keeping an
/// explicit step makes the control flow inspectable and the abort reason
/// attributable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Start,
    NavigatedToForm,
    BasicDataEntered,
    OwnerDataEntered,
    Submitted,
    ResultsExtracted,
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormStep::Start => "Start",
            FormStep::NavigatedToForm => "NavigatedToForm",
            FormStep::BasicDataEntered => "BasicDataEntered",
            FormStep::OwnerDataEntered => "OwnerDataEntered",
            FormStep::Submitted => "Submitted",
            FormStep::ResultsExtracted => "ResultsExtracted",
        };
        f.write_str(name)
    }
}

/// The value that will be typed into one owner field, and whether it came
/// from the record or from the documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub value: String,
    pub is_default: bool,
}

impl FieldPlan {
    fn provided(value: &str) -> Self {
        FieldPlan { value: value.to_string(), is_default: false }
    }

    fn fallback(value: &str) -> Self {
        FieldPlan { value: value.to_string(), is_default: true }
    }
}

/// Resolved fill plan for the owner page. The portal rejects blank fields,
/// so every absent record value is substituted before the driver touches the
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFieldPlan {
    /// None selects the first year the dropdown offers.
    pub license_year: Option<i32>,
    pub city: FieldPlan,
    pub postal_code: FieldPlan,
    pub address: FieldPlan,
    pub house_number: FieldPlan,
    pub phone_number: FieldPlan,
}

/// Pure resolution of record values against the configured defaults.
pub fn plan_owner_fields(record: &CustomerRecord, defaults: &FormDefaults) -> OwnerFieldPlan {
    OwnerFieldPlan {
        license_year: record.license_year,
        city: plan_field(&record.city, &defaults.city),
        postal_code: plan_field(&record.postal_code, &defaults.postal_code),
        address: plan_field(&record.address, &defaults.address),
        house_number: plan_field(&record.house_number, &defaults.house_number),
        // The customers table carries no phone column; the portal requires one.
        phone_number: FieldPlan::fallback(&defaults.phone_number),
    }
}

fn plan_field(value: &Option<String>, default: &str) -> FieldPlan {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => FieldPlan::provided(v),
        _ => FieldPlan::fallback(default),
    }
}

/// Drives the whole quotation form for one record. Never fails outright: a
/// fatal step marks the result errored and whatever was extracted up to that
/// point is returned for inspection.
pub async fn quote(client: &Client, config: &Config, record: &CustomerRecord) -> QuotationResult {
    let mut result = QuotationResult::new(&record.plate);
    let mut step = FormStep::Start;

    tracing::info!("[{}] starting quotation run", record.plate);

    match drive_form(client, config, record, &mut result, &mut step).await {
        Ok(()) => {
            step = FormStep::ResultsExtracted;
            tracing::info!("[OK] [{}] reached {}", record.plate, step);
        }
        Err(e) => {
            result.error = true;
            result.abort_reason = Some(format!("aborted at {}: {}", step, e));
            tracing::error!("[KO] [{}] aborted at {}: {}", record.plate, step, e);
        }
    }

    result
}

async fn drive_form(
    client: &Client,
    config: &Config,
    record: &CustomerRecord,
    result: &mut QuotationResult,
    step: &mut FormStep,
) -> Result<(), ScrapeError> {
    let timeout = Duration::from_millis(config.element_timeout_ms);
    let short = Duration::from_millis(config.interstitial_timeout_ms);
    let step_pause = Duration::from_millis(config.step_pause_ms);
    let retry_pause = Duration::from_millis(config.retry_pause_ms);

    // Dashboard -> new quotation. The quotation list is slow to render, so
    // this click gets the two-attempt treatment.
    let quotation_link = Target::xpath(PrimaSelectors::QUOTATION_LINK);
    if !click_with_retry(client, &quotation_link, timeout, retry_pause).await {
        return Err(ScrapeError::Navigation("quotation link not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let motor_button = Target::css(PrimaSelectors::COMPUTE_MOTOR_BUTTON);
    if !wait_and_click(client, &motor_button, timeout).await {
        return Err(ScrapeError::Navigation("motor calculation button not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;
    *step = FormStep::NavigatedToForm;

    // Page 1: plate is the form key and must land; the birth date is
    // best-effort because the portal sometimes pre-fills it.
    let plate_input = Target::css(PrimaSelectors::PLATE_INPUT);
    if !wait_and_fill(client, &plate_input, &record.plate, timeout).await {
        return Err(ScrapeError::FormField("plate input not found".to_string()));
    }

    if let Some(birth_date) = record.birth_date {
        let birthday = Target::xpath(PrimaSelectors::BIRTHDAY_INPUT);
        let formatted = birth_date.format(DATE_FORMAT_IT).to_string();
        if !wait_and_fill(client, &birthday, &formatted, timeout).await {
            tracing::warn!("[{}] birth date input failed, continuing without it", record.plate);
        }
    } else {
        tracing::warn!("[{}] no birth date on record, leaving portal value", record.plate);
    }
    *step = FormStep::BasicDataEntered;

    let proceed = Target::xpath(PrimaSelectors::PROCEED_BUTTON);
    scroll_into_view(client, &proceed, timeout).await;
    if !click_with_retry(client, &proceed, timeout, retry_pause).await {
        return Err(ScrapeError::Navigation("proceed button (page 1) not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    dismiss_interstitials(client, record, short).await;

    fill_owner_page(client, config, record, timeout, short, step_pause).await?;
    *step = FormStep::OwnerDataEntered;

    // Submit and let the asynchronous quote computation settle; the portal
    // signals completion only by rendering the result boxes.
    let compute = Target::css(PrimaSelectors::COMPUTE_QUOTATION_BUTTON);
    scroll_into_view(client, &compute, timeout).await;
    if !wait_and_click(client, &compute, timeout).await {
        return Err(ScrapeError::Navigation("compute quotation button not found".to_string()));
    }
    *step = FormStep::Submitted;
    tracing::info!("[{}] form submitted, waiting for quotation results", record.plate);
    tokio::time::sleep(Duration::from_millis(config.post_submit_settle_ms)).await;

    extract_prices(client, config, result).await
}

/// Overlays that appear only sometimes: cookie banner, and the effective-date
/// field the portal adds when page 1 lacked enough information. Neither is
/// fatal when absent.
async fn dismiss_interstitials(client: &Client, record: &CustomerRecord, short: Duration) {
    let cookies = Target::css(PrimaSelectors::COOKIES_ACCEPT_BUTTON);
    if wait_and_click(client, &cookies, short).await {
        tracing::info!("[{}] cookie banner dismissed", record.plate);
    } else {
        tracing::debug!("[{}] no cookie banner", record.plate);
    }

    if let Some(expiry) = record.expiry_date {
        let effective_date = Target::xpath(PrimaSelectors::EFFECTIVE_DATE_INPUT);
        let formatted = expiry.format(DATE_FORMAT_IT).to_string();
        if wait_and_fill(client, &effective_date, &formatted, short).await {
            tracing::info!("[{}] effective date filled with {}", record.plate, formatted);
        } else {
            tracing::debug!("[{}] effective date field not present", record.plate);
        }
    }
}

async fn fill_owner_page(
    client: &Client,
    config: &Config,
    record: &CustomerRecord,
    timeout: Duration,
    short: Duration,
    step_pause: Duration,
) -> Result<(), ScrapeError> {
    let plate = &record.plate;
    let plan = plan_owner_fields(record, &config.defaults);

    // License year: a closed custom dropdown, not an input.
    let year_dropdown = Target::css(PrimaSelectors::LICENSE_YEAR_DROPDOWN);
    scroll_into_view(client, &year_dropdown, timeout).await;
    if !wait_and_click(client, &year_dropdown, timeout).await {
        return Err(ScrapeError::FormField("license year dropdown not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let first_year = Target::css(PrimaSelectors::LICENSE_YEAR_FIRST_OPTION);
    match plan.license_year {
        Some(year) => {
            let option = PrimaSelectors::license_year_option(year);
            if !wait_and_click(client, &option, timeout).await {
                tracing::warn!("[{}] license year {} not offered, taking first option", plate, year);
                if !wait_and_click(client, &first_year, timeout).await {
                    return Err(ScrapeError::FormField(
                        "default license year option not found".to_string(),
                    ));
                }
            }
        }
        None => {
            tracing::info!("[{}] no license year on record, taking first option", plate);
            if !wait_and_click(client, &first_year, timeout).await {
                return Err(ScrapeError::FormField(
                    "default license year option not found".to_string(),
                ));
            }
        }
    }
    tokio::time::sleep(step_pause).await;

    // Residential city: free text plus an autocomplete list; the list entry
    // is nice to have, the text itself is required.
    let city_input = Target::css(PrimaSelectors::CITY_INPUT);
    scroll_into_view(client, &city_input, timeout).await;
    if !wait_and_fill(client, &city_input, &plan.city.value, timeout).await {
        return Err(ScrapeError::FormField("residential city input not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;
    let city_option = Target::css(PrimaSelectors::CITY_FIRST_OPTION);
    if !wait_and_click(client, &city_option, short).await {
        tracing::warn!("[{}] city autocomplete option not clicked", plate);
    }

    // CAP: the typed value must be confirmed from the autocomplete list. A
    // rejected value falls back to the default CAP, and that one must apply.
    let cap_input = Target::css(PrimaSelectors::CAP_INPUT);
    if !wait_and_fill(client, &cap_input, &plan.postal_code.value, timeout).await {
        return Err(ScrapeError::FormField("CAP input not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;
    let cap_option = PrimaSelectors::cap_option(&plan.postal_code.value);
    if !wait_and_click(client, &cap_option, short).await {
        if plan.postal_code.is_default {
            return Err(ScrapeError::FormField("default CAP option not found".to_string()));
        }
        tracing::warn!(
            "[{}] CAP '{}' not accepted, falling back to {}",
            plate,
            plan.postal_code.value,
            config.defaults.postal_code
        );
        if !wait_and_fill(client, &cap_input, &config.defaults.postal_code, timeout).await {
            return Err(ScrapeError::FormField("CAP input not found for default".to_string()));
        }
        tokio::time::sleep(step_pause).await;
        let default_option = PrimaSelectors::cap_option(&config.defaults.postal_code);
        if !wait_and_click(client, &default_option, short).await {
            return Err(ScrapeError::FormField("default CAP option not found".to_string()));
        }
    }

    let address_input = Target::css(PrimaSelectors::ADDRESS_INPUT);
    if !wait_and_fill(client, &address_input, &plan.address.value, timeout).await {
        return Err(ScrapeError::FormField("address input not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let civic_input = Target::css(PrimaSelectors::CIVIC_NUMBER_INPUT);
    if !wait_and_fill(client, &civic_input, &plan.house_number.value, timeout).await {
        return Err(ScrapeError::FormField("civic number input not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    // Occupation and civil status have no counterpart in the customers
    // table; the fixed options keep the quote comparable across records.
    let occupation = Target::xpath(PrimaSelectors::OCCUPATION_DROPDOWN);
    scroll_into_view(client, &occupation, timeout).await;
    if !wait_and_click(client, &occupation, timeout).await {
        return Err(ScrapeError::FormField("occupation dropdown not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;
    let occupation_option = Target::css(PrimaSelectors::OCCUPATION_SECOND_OPTION);
    if !wait_and_click(client, &occupation_option, timeout).await {
        return Err(ScrapeError::FormField("occupation option not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let civil_status = Target::xpath(PrimaSelectors::CIVIL_STATUS_DROPDOWN);
    scroll_into_view(client, &civil_status, timeout).await;
    if !wait_and_click(client, &civil_status, timeout).await {
        return Err(ScrapeError::FormField("civil status dropdown not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;
    let civil_option = Target::css(PrimaSelectors::CIVIL_STATUS_FIRST_OPTION);
    if !wait_and_click(client, &civil_option, timeout).await {
        return Err(ScrapeError::FormField("civil status option not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let phone_input = Target::css(PrimaSelectors::PHONE_INPUT);
    if !wait_and_fill(client, &phone_input, &plan.phone_number.value, timeout).await {
        return Err(ScrapeError::FormField("phone number input not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    let privacy = Target::css(PrimaSelectors::PRIVACY_CHECKBOX);
    scroll_into_view(client, &privacy, timeout).await;
    if !wait_and_click(client, &privacy, timeout).await {
        return Err(ScrapeError::FormField("privacy checkbox not found".to_string()));
    }
    tokio::time::sleep(step_pause).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> FormDefaults {
        FormDefaults {
            city: "Torino".to_string(),
            postal_code: "10121".to_string(),
            address: "Via Roma".to_string(),
            house_number: "1".to_string(),
            phone_number: "3270692082".to_string(),
        }
    }

    fn record(plate: &str) -> CustomerRecord {
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

    #[test]
    fn test_absent_fields_get_documented_defaults() {
        let plan = plan_owner_fields(&record("AB123CD"), &defaults());
        assert_eq!(plan.license_year, None);
        assert_eq!(plan.city, FieldPlan::fallback("Torino"));
        assert_eq!(plan.postal_code, FieldPlan::fallback("10121"));
        assert_eq!(plan.address, FieldPlan::fallback("Via Roma"));
        assert_eq!(plan.house_number, FieldPlan::fallback("1"));
        assert_eq!(plan.phone_number, FieldPlan::fallback("3270692082"));
    }

    #[test]
    fn test_provided_fields_pass_through() {
        let mut rec = record("AB123CD");
        rec.license_year = Some(2011);
        rec.city = Some("Milano".to_string());
        rec.postal_code = Some("20121".to_string());
        rec.address = Some("Corso Buenos Aires".to_string());
        rec.house_number = Some("12".to_string());

        let plan = plan_owner_fields(&rec, &defaults());
        assert_eq!(plan.license_year, Some(2011));
        assert_eq!(plan.city, FieldPlan::provided("Milano"));
        assert_eq!(plan.postal_code, FieldPlan::provided("20121"));
        assert_eq!(plan.address, FieldPlan::provided("Corso Buenos Aires"));
        assert_eq!(plan.house_number, FieldPlan::provided("12"));
        // Phone is never in the table, so it is always the default.
        assert!(plan.phone_number.is_default);
    }

    #[test]
    fn test_blank_strings_count_as_absent() {
        let mut rec = record("AB123CD");
        rec.city = Some("   ".to_string());
        rec.postal_code = Some(String::new());

        let plan = plan_owner_fields(&rec, &defaults());
        assert!(plan.city.is_default);
        assert!(plan.postal_code.is_default);
    }

    #[test]
    fn test_form_step_names() {
        assert_eq!(FormStep::Start.to_string(), "Start");
        assert_eq!(FormStep::Submitted.to_string(), "Submitted");
        assert_eq!(FormStep::ResultsExtracted.to_string(), "ResultsExtracted");
    }
}
