use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One vehicle/owner row of the customers table. Column names match the
/// spreadsheet the back office maintains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Targa")]
    pub plate: String,

    #[serde(rename = "Data di nascita", default, with = "date_it")]
    pub birth_date: Option<NaiveDate>,

    #[serde(rename = "Scadenza", default, with = "date_it")]
    pub expiry_date: Option<NaiveDate>,

    #[serde(rename = "Anno patente", default)]
    pub license_year: Option<i32>,

    #[serde(rename = "Citta di residenza", default)]
    pub city: Option<String>,

    #[serde(rename = "Cap", default)]
    pub postal_code: Option<String>,

    #[serde(rename = "Indirizzo", default)]
    pub address: Option<String>,

    #[serde(rename = "Civico", default)]
    pub house_number: Option<String>,

    #[serde(rename = "Processata", default)]
    pub processed: bool,

    #[serde(rename = "Data inserimento", default, with = "datetime_utc")]
    pub inserted_at: Option<DateTime<Utc>>,
}

/// Outcome of extracting one price component. `NotOffered` means the portal
/// does not propose the guarantee for this vehicle/profile; `Unset` means the
/// extraction failed or never ran. The two must stay distinguishable in the
/// saved table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriceOutcome {
    Amount(Decimal),
    NotOffered,
    #[default]
    Unset,
}

impl PriceOutcome {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            PriceOutcome::Amount(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, PriceOutcome::Unset)
    }
}

impl Serialize for PriceOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PriceOutcome::Amount(d) => serializer.serialize_str(&d.to_string()),
            PriceOutcome::NotOffered => serializer.serialize_str("N/A"),
            PriceOutcome::Unset => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for PriceOutcome {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(PriceOutcome::Unset);
        }
        if trimmed.eq_ignore_ascii_case("n/a") {
            return Ok(PriceOutcome::NotOffered);
        }
        // An unreadable stored value degrades to Unset rather than failing
        // the whole table load.
        match trimmed.parse::<Decimal>() {
            Ok(d) if d >= Decimal::ZERO => Ok(PriceOutcome::Amount(d)),
            _ => Ok(PriceOutcome::Unset),
        }
    }
}

/// One row of the quotations table: the prices scraped for a plate in a
/// single form run. Component columns keep the names the back office already
/// uses downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationResult {
    #[serde(rename = "Targa")]
    pub plate: String,

    #[serde(rename = "Sito")]
    pub site: String,

    #[serde(rename = "RC", default)]
    pub rc: PriceOutcome,

    #[serde(rename = "Infortuni", default)]
    pub infortuni: PriceOutcome,

    #[serde(rename = "Furto_Incendio", default)]
    pub furto_incendio: PriceOutcome,

    #[serde(rename = "Assistenza_stradale", default)]
    pub assistenza_stradale: PriceOutcome,

    #[serde(rename = "Tutela_legale", default)]
    pub tutela_legale: PriceOutcome,

    #[serde(rename = "Cristalli", default)]
    pub cristalli: PriceOutcome,

    #[serde(rename = "Eventi_naturali", default)]
    pub eventi_naturali: PriceOutcome,

    #[serde(rename = "Atti_vandalici", default)]
    pub atti_vandalici: PriceOutcome,

    #[serde(rename = "Kasko_collisione", default)]
    pub kasko_collisione: PriceOutcome,

    #[serde(rename = "Kasko_completa", default)]
    pub kasko_completa: PriceOutcome,

    #[serde(rename = "Errore", default)]
    pub error: bool,

    #[serde(rename = "Data inserimento", default, with = "datetime_utc")]
    pub inserted_at: Option<DateTime<Utc>>,

    /// Why the run aborted, for the caller-facing summary. Not a table
    /// column.
    #[serde(skip)]
    pub abort_reason: Option<String>,
}

pub const SOURCE_SITE: &str = "Prima.it";

impl QuotationResult {
    /// A fresh result with every component unset, so an aborted run can be
    /// returned as-is and the caller still sees what was extracted.
    pub fn new(plate: &str) -> Self {
        QuotationResult {
            plate: plate.to_string(),
            site: SOURCE_SITE.to_string(),
            rc: PriceOutcome::Unset,
            infortuni: PriceOutcome::Unset,
            furto_incendio: PriceOutcome::Unset,
            assistenza_stradale: PriceOutcome::Unset,
            tutela_legale: PriceOutcome::Unset,
            cristalli: PriceOutcome::Unset,
            eventi_naturali: PriceOutcome::Unset,
            atti_vandalici: PriceOutcome::Unset,
            kasko_collisione: PriceOutcome::Unset,
            kasko_completa: PriceOutcome::Unset,
            error: false,
            inserted_at: None,
            abort_reason: None,
        }
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut PriceOutcome> {
        match name {
            "Infortuni" => Some(&mut self.infortuni),
            "Furto_Incendio" => Some(&mut self.furto_incendio),
            "Assistenza_stradale" => Some(&mut self.assistenza_stradale),
            "Tutela_legale" => Some(&mut self.tutela_legale),
            "Cristalli" => Some(&mut self.cristalli),
            "Eventi_naturali" => Some(&mut self.eventi_naturali),
            "Atti_vandalici" => Some(&mut self.atti_vandalici),
            "Kasko_collisione" => Some(&mut self.kasko_collisione),
            "Kasko_completa" => Some(&mut self.kasko_completa),
            _ => None,
        }
    }
}

/// Dates travel through the tables in the Italian dd/mm/YYYY form the portal
/// form also expects.
pub const DATE_FORMAT_IT: &str = "%d/%m/%Y";

mod date_it {
    use super::DATE_FORMAT_IT;
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT_IT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT_IT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

mod datetime_utc {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_outcome_round_trip() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(QuotationResult {
                rc: PriceOutcome::Amount(dec!(512.34)),
                infortuni: PriceOutcome::NotOffered,
                ..QuotationResult::new("AB123CD")
            })
            .unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: QuotationResult = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(row.plate, "AB123CD");
        assert_eq!(row.rc, PriceOutcome::Amount(dec!(512.34)));
        assert_eq!(row.infortuni, PriceOutcome::NotOffered);
        assert_eq!(row.furto_incendio, PriceOutcome::Unset);
        assert!(!row.error);
    }

    #[test]
    fn test_price_outcome_never_negative() {
        let data = "Targa,Sito,RC\nAB123CD,Prima.it,-10.0\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: QuotationResult = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(row.rc, PriceOutcome::Unset);
    }

    #[test]
    fn test_customer_record_dates() {
        let data = "Targa,Data di nascita,Scadenza,Anno patente,Citta di residenza,Cap,Indirizzo,Civico\nAB123CD,01/05/1990,15/07/2025,,,,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: CustomerRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(row.plate, "AB123CD");
        assert_eq!(
            row.birth_date,
            Some(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap())
        );
        assert_eq!(
            row.expiry_date,
            Some(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        );
        assert_eq!(row.license_year, None);
        assert!(!row.processed);
    }
}
