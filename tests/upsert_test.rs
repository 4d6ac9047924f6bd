use preventivatore::store::models::{PriceOutcome, QuotationResult};
use preventivatore::store::table::load_table;
use preventivatore::store::upsert::upsert;
use rust_decimal_macros::dec;

fn result(plate: &str, rc: rust_decimal::Decimal) -> QuotationResult {
    QuotationResult {
        rc: PriceOutcome::Amount(rc),
        ..QuotationResult::new(plate)
    }
}

#[test]
fn test_upsert_creates_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotazioni.csv");

    upsert(&path, vec![result("AB123CD", dec!(512.34))], |r: &QuotationResult| {
        r.plate.clone()
    })
    .unwrap();

    let rows: Vec<QuotationResult> = load_table(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].plate, "AB123CD");
    assert_eq!(rows[0].rc, PriceOutcome::Amount(dec!(512.34)));
}

#[test]
fn test_incoming_row_replaces_existing_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotazioni.csv");

    let mut old = result("X", dec!(10));
    old.furto_incendio = PriceOutcome::Amount(dec!(33.33));
    upsert(&path, vec![old], |r: &QuotationResult| r.plate.clone()).unwrap();

    // The replacement row has no Furto_Incendio value; after the merge it
    // must not inherit the old one (whole-row replacement, not field union).
    upsert(
        &path,
        vec![result("X", dec!(20)), result("Y", dec!(5))],
        |r: &QuotationResult| r.plate.clone(),
    )
    .unwrap();

    let rows: Vec<QuotationResult> = load_table(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].plate, "X");
    assert_eq!(rows[0].rc, PriceOutcome::Amount(dec!(20)));
    assert_eq!(rows[0].furto_incendio, PriceOutcome::Unset);
    assert_eq!(rows[1].plate, "Y");
    assert_eq!(rows[1].rc, PriceOutcome::Amount(dec!(5)));
}

#[test]
fn test_upsert_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotazioni.csv");

    upsert(&path, vec![result("X", dec!(10))], |r: &QuotationResult| {
        r.plate.clone()
    })
    .unwrap();

    let batch = vec![result("X", dec!(20)), result("Y", dec!(5))];
    upsert(&path, batch.clone(), |r: &QuotationResult| r.plate.clone()).unwrap();
    let after_once = std::fs::read_to_string(&path).unwrap();

    upsert(&path, batch, |r: &QuotationResult| r.plate.clone()).unwrap();
    let after_twice = std::fs::read_to_string(&path).unwrap();

    assert_eq!(after_once, after_twice);
}

#[test]
fn test_not_offered_marker_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotazioni.csv");

    let mut row = result("AB123CD", dec!(512.34));
    row.kasko_completa = PriceOutcome::NotOffered;
    upsert(&path, vec![row], |r: &QuotationResult| r.plate.clone()).unwrap();

    let rows: Vec<QuotationResult> = load_table(&path).unwrap();
    assert_eq!(rows[0].kasko_completa, PriceOutcome::NotOffered);
    assert_eq!(rows[0].cristalli, PriceOutcome::Unset);
}
