use crate::browser::actions::{read_text, scroll_into_view, wait_and_click, wait_for, Target};
use crate::config::Config;
use crate::error::ScrapeError;
use crate::providers::prima::selectors::{GuaranteeSelectors, PrimaSelectors, GUARANTEES};
use crate::store::models::{PriceOutcome, QuotationResult};
use crate::utils::parse_eur_price;
use fantoccini::Client;
use rust_decimal::Decimal;
use std::time::Duration;

/// Reads every price off the results page. The primary RC price is required;
/// each of the nine optional guarantees is extracted in isolation so one
/// broken box cannot lose the others.
pub async fn extract_prices(
    client: &Client,
    config: &Config,
    result: &mut QuotationResult,
) -> Result<(), ScrapeError> {
    let rc_target = Target::css(PrimaSelectors::RC_PRICE);
    let rc_text = read_text(
        client,
        &rc_target,
        Duration::from_millis(config.price_timeout_ms),
    )
    .await
    .ok_or_else(|| ScrapeError::Parse("primary RC price did not render".to_string()))?;

    let rc_price = parse_eur_price(&rc_text)
        .map_err(|e| ScrapeError::Parse(format!("RC price unreadable: {}", e)))?;
    result.rc = PriceOutcome::Amount(rc_price);
    tracing::info!("[OK] [{}] RC price: {}", result.plate, rc_price);

    for guarantee in GUARANTEES {
        let outcome = extract_component(client, config, guarantee).await;
        match &outcome {
            PriceOutcome::Amount(price) => {
                tracing::info!("[OK] [{}] {}: {}", result.plate, guarantee.name, price);
            }
            PriceOutcome::NotOffered => {
                tracing::info!("[{}] {} not offered for this profile", result.plate, guarantee.name);
            }
            PriceOutcome::Unset => {
                tracing::warn!("[{}] {} extraction failed, left unset", result.plate, guarantee.name);
            }
        }
        if let Some(slot) = result.component_mut(guarantee.name) {
            *slot = outcome;
        }
    }

    Ok(())
}

/// One guarantee box, all failures local. A missing box means the guarantee
/// does not apply to this vehicle/profile; anything else that goes wrong
/// leaves the component unset.
async fn extract_component(
    client: &Client,
    config: &Config,
    guarantee: &GuaranteeSelectors,
) -> PriceOutcome {
    let timeout = Duration::from_millis(config.element_timeout_ms);
    let probe = Duration::from_millis(config.interstitial_timeout_ms);
    let step_pause = Duration::from_millis(config.step_pause_ms);

    let container = guarantee.container();
    if wait_for(client, &container, probe).await.is_none() {
        return PriceOutcome::NotOffered;
    }
    scroll_into_view(client, &container, timeout).await;

    // Select the richest tier where the box carries a dropdown, so prices
    // are comparable across records.
    if let Some(dropdown) = guarantee.dropdown {
        if !wait_and_click(client, &Target::xpath(dropdown), timeout).await {
            return PriceOutcome::Unset;
        }
        tokio::time::sleep(step_pause).await;

        if let Some(tier_option) = guarantee.tier_option {
            if !wait_and_click(client, &Target::xpath(tier_option), timeout).await {
                return PriceOutcome::Unset;
            }
            tokio::time::sleep(step_pause).await;
        }
    }

    let Some(price_text) = read_text(client, &guarantee.price(), timeout).await else {
        return PriceOutcome::Unset;
    };
    let price = match parse_eur_price(&price_text) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!("{} price text '{}' unreadable: {}", guarantee.name, price_text, e);
            return PriceOutcome::Unset;
        }
    };

    // Some boxes render a bundle discount next to the price; the recorded
    // amount is the price net of it.
    let discount = match read_text(client, &guarantee.discount_badge(), probe).await {
        Some(text) => parse_eur_price(&text).ok(),
        None => None,
    };

    finalize_price(price, discount)
}

/// Applies an optional discount to an extracted price. A discount larger
/// than the price itself is a scrape anomaly, not a free guarantee.
pub fn finalize_price(price: Decimal, discount: Option<Decimal>) -> PriceOutcome {
    match discount {
        None => PriceOutcome::Amount(price),
        Some(d) if d <= price => PriceOutcome::Amount((price - d).round_dp(2)),
        Some(d) => {
            tracing::warn!("discount {} exceeds price {}, leaving component unset", d, price);
            PriceOutcome::Unset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_finalize_without_discount() {
        assert_eq!(
            finalize_price(dec!(120.50), None),
            PriceOutcome::Amount(dec!(120.50))
        );
    }

    #[test]
    fn test_finalize_subtracts_discount() {
        assert_eq!(
            finalize_price(dec!(120.50), Some(dec!(20.50))),
            PriceOutcome::Amount(dec!(100.00))
        );
    }

    #[test]
    fn test_finalize_full_discount_is_zero_not_negative() {
        assert_eq!(
            finalize_price(dec!(99.99), Some(dec!(99.99))),
            PriceOutcome::Amount(dec!(0.00))
        );
    }

    #[test]
    fn test_finalize_oversized_discount_is_unset() {
        assert_eq!(finalize_price(dec!(10), Some(dec!(25))), PriceOutcome::Unset);
    }
}
