use crate::browser::Target;

/// Locators for the Prima.it intermediary portal. The portal owns these and
/// changes them without notice; keep every selector in this one module.
pub struct PrimaSelectors;

impl PrimaSelectors {
    // Login page
    pub const USERNAME_INPUT: &'static str = "#id-input-email-id";
    pub const PASSWORD_INPUT: &'static str = "#id-input-password-id";
    pub const LOGIN_BUTTON: &'static str = "button[type='submit']";

    // Dashboard navigation
    pub const QUOTATION_LINK: &'static str = "//a[@class='quotation-link']";
    pub const COMPUTE_MOTOR_BUTTON: &'static str = "button[data-test-id='calcola-motor']";

    // Form page 1: vehicle/owner basic data
    pub const PLATE_INPUT: &'static str = "#plate_number";
    pub const BIRTHDAY_INPUT: &'static str = "(//input[@id='owner_birth_date'])[2]";
    pub const PROCEED_BUTTON: &'static str = "(//button[@type='button'])[1]";

    // Interstitials between page 1 and page 2
    pub const COOKIES_ACCEPT_BUTTON: &'static str = "button.cookie-policy-accept";
    pub const EFFECTIVE_DATE_INPUT: &'static str = "(//input[@id='effective_date_date'])[2]";

    // Form page 2: owner details
    pub const LICENSE_YEAR_DROPDOWN: &'static str =
        "div[id='owner_license_year'] span[class='form-select__status']";
    pub const LICENSE_YEAR_FIRST_OPTION: &'static str =
        "div[id='owner_license_year'] li:nth-child(1)";
    pub const CITY_INPUT: &'static str = "#owner_residential_city";
    pub const CITY_FIRST_OPTION: &'static str =
        "div[class='is-valid form-autocomplete is-open is-large is-pristine'] li:nth-child(1)";
    pub const CAP_INPUT: &'static str = "#owner_residential_cap";
    pub const ADDRESS_INPUT: &'static str = "#owner_residential_address";
    pub const CIVIC_NUMBER_INPUT: &'static str = "#owner_residential_civic_number";
    pub const OCCUPATION_DROPDOWN: &'static str = "(//div[@id='owner_occupation'])[1]";
    pub const OCCUPATION_SECOND_OPTION: &'static str =
        "div[id='owner_occupation'] li:nth-child(2)";
    pub const CIVIL_STATUS_DROPDOWN: &'static str = "(//div[@id='owner_civil_status'])[1]";
    pub const CIVIL_STATUS_FIRST_OPTION: &'static str =
        "div[id='owner_civil_status'] li:nth-child(1)";
    pub const PHONE_INPUT: &'static str = "#phone_number";
    pub const PRIVACY_CHECKBOX: &'static str = "label[for='privacy_all']";
    pub const COMPUTE_QUOTATION_BUTTON: &'static str =
        ".btn.btn--primary[data-test-id='button-calculate-quote']";

    // Results page: the highlighted RC box is the primary price
    pub const RC_PRICE: &'static str =
        "div[class='guarantee-box__price guarantee-box__price--highlighted'] span[class='price__value']";

    pub fn license_year_option(year: i32) -> Target {
        Target::xpath(format!(
            "//div[@id='owner_license_year']//li[normalize-space()='{}']",
            year
        ))
    }

    pub fn cap_option(cap: &str) -> Target {
        Target::xpath(format!("(//li[normalize-space()='{}'])[1]", cap))
    }
}

/// One optional guarantee box on the results page. Boxes differ slightly in
/// markup (ribbon badges, bundle-discount badges), hence per-guarantee
/// container classes rather than one shared pattern.
#[derive(Debug, Clone, Copy)]
pub struct GuaranteeSelectors {
    /// Output column this component feeds.
    pub name: &'static str,
    /// Class list of the guarantee-box container, used to probe presence.
    pub container_class: &'static str,
    /// Tier dropdown inside the box; None when the box has a flat price.
    pub dropdown: Option<&'static str>,
    /// The "Super" tier entry to select once the dropdown is open.
    pub tier_option: Option<&'static str>,
}

impl GuaranteeSelectors {
    pub fn container(&self) -> Target {
        Target::css(format!("div[class='{}']", self.container_class))
    }

    pub fn price(&self) -> Target {
        Target::css(format!(
            "div[class='{}'] span[class='price__value']",
            self.container_class
        ))
    }

    pub fn discount_badge(&self) -> Target {
        Target::css(format!(
            "div[class='{}'] span[class='price__discount']",
            self.container_class
        ))
    }
}

/// The nine optional guarantees, in the order they appear on the page.
pub const GUARANTEES: &[GuaranteeSelectors] = &[
    GuaranteeSelectors {
        name: "Infortuni",
        container_class: "guarantee-box guarantee-infortuni_conducente has-bundle-discount-badge",
        dropdown: None,
        tier_option: None,
    },
    GuaranteeSelectors {
        name: "Furto_Incendio",
        container_class: "guarantee-box guarantee-furto_incendio",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-furto_incendio']//div[@class='guarantee-box__optionsWrapper']//div[1]",
        ),
        tier_option: Some(
            "//div[@class='dropdown__option is-open']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Assistenza_stradale",
        container_class: "guarantee-box guarantee-assistenza_stradale has-bundle-discount-badge",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-assistenza_stradale has-bundle-discount-badge']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='dropdown__option is-open']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Tutela_legale",
        container_class: "guarantee-box guarantee-tutela_legale",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-tutela_legale']//div[@class='dropdown__option']",
        ),
        tier_option: Some("//li[contains(text(),'Super, fino a € 20.000')]"),
    },
    GuaranteeSelectors {
        name: "Cristalli",
        container_class: "guarantee-box guarantee-cristalli",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-cristalli']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='dropdown__option is-open']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Eventi_naturali",
        container_class:
            "guarantee-box guarantee-eventi_naturali with-ribbon-badge with-ribbon-badge__border",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-eventi_naturali with-ribbon-badge with-ribbon-badge__border']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='guarantee-box guarantee-eventi_naturali with-ribbon-badge with-ribbon-badge__border']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Atti_vandalici",
        container_class:
            "guarantee-box guarantee-eventi_sociopolitici with-ribbon-badge with-ribbon-badge__border",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-eventi_sociopolitici with-ribbon-badge with-ribbon-badge__border']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='guarantee-box guarantee-eventi_sociopolitici with-ribbon-badge with-ribbon-badge__border']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Kasko_collisione",
        container_class: "guarantee-box guarantee-collisione",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-collisione']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='guarantee-box guarantee-collisione']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
    GuaranteeSelectors {
        name: "Kasko_completa",
        container_class:
            "guarantee-box guarantee-kasko with-ribbon-badge with-ribbon-badge__border",
        dropdown: Some(
            "//div[@class='guarantee-box guarantee-kasko with-ribbon-badge with-ribbon-badge__border']//div[@class='dropdown__option']",
        ),
        tier_option: Some(
            "//div[@class='guarantee-box guarantee-kasko with-ribbon-badge with-ribbon-badge__border']//li[@class='dropdown__option__list__item'][normalize-space()='Super']",
        ),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarantee_names_are_unique() {
        let mut names: Vec<&str> = GUARANTEES.iter().map(|g| g.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GUARANTEES.len());
    }

    #[test]
    fn test_dropdown_implies_tier_option() {
        for g in GUARANTEES {
            assert_eq!(g.dropdown.is_some(), g.tier_option.is_some(), "{}", g.name);
        }
    }
}
