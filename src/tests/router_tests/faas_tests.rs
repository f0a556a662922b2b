// src/tests/router_tests/faas_tests.rs

use crate::config::ReportSettings;
use crate::errors::ServerError;
use crate::report::layout::PageGeometry;
use crate::router::handle;
use crate::tests::utils::{body_bytes, body_string, get, post_form, seeded_repo};

const FORM: &str = "/faas/FAAS-2024-001";

#[test]
fn report_shows_valuation_of_current_run() {
    let (repo, _temp_dir) = seeded_repo("faas_show_test");
    let resp = handle(get(FORM), &repo, &ReportSettings::default()).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains(r#"value="Residential Type II-A - 1st Floor""#));
    assert!(body.contains(r#"value="Residential Type II-A - 2nd Floor""#));
    assert!(!body.contains("3rd Floor"));
    assert!(body.contains(r#"value="1,032,000.00""#));

    // 2 × 1,032,000 + 118,520 in items, assessed at 20%.
    assert!(body.contains(r#"value="2,182,520.00""#));
    assert!(body.contains(r#"value="436,504.00""#));

    // Form details show people-facing fields only.
    assert!(body.contains("Owner Name"));
    assert!(body.contains(r#"value="Maria Santos""#));
    assert!(!body.contains("Value Info Id"));
    assert!(!body.contains("Created At"));
    assert!(!body.contains("Edits applied."));
}

#[test]
fn missing_form_is_not_found() {
    let (repo, _temp_dir) = seeded_repo("faas_missing_test");
    let err = handle(get("/faas/FAAS-0000-000"), &repo, &ReportSettings::default()).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
}

#[test]
fn posted_edits_become_overrides() {
    let (repo, _temp_dir) = seeded_repo("faas_post_test");
    let req = post_form(
        FORM,
        &[
            ("property_appraisal:0:market_value", "999.00"),
            // Equal to the computed text, so not an edit.
            ("property_appraisal:1:market_value", "1,032,000.00"),
            // Read-only label.
            ("property_appraisal:4:description", "Hacked"),
            ("not_a_cell", "ignored"),
        ],
    );

    let body = body_string(handle(req, &repo, &ReportSettings::default()).unwrap());
    assert!(body.contains(r#"value="999.00""#));
    assert!(body.contains("1 edited cell(s)"));
    assert!(body.contains("notice-info"));
    assert!(body.contains("Edits applied."));
    assert!(!body.contains("Hacked"));
    // Totals are not recomputed from overrides.
    assert!(body.contains(r#"value="2,064,000.00""#));
}

#[test]
fn export_sends_spreadsheet_download() {
    let (repo, _temp_dir) = seeded_repo("faas_export_test");
    let req = post_form(
        &format!("{FORM}/export"),
        &[("memoranda:0:note", "Checked on site")],
    );

    let resp = handle(req, &repo, &ReportSettings::default()).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["Content-Type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        resp.headers()["Content-Disposition"],
        r#"attachment; filename="building_faas_FAAS-2024-001.xlsx""#
    );
    assert!(body_bytes(resp).starts_with(b"PK"));
}

#[test]
fn failed_export_keeps_edits_and_notifies() {
    let (repo, _temp_dir) = seeded_repo("faas_export_fail_test");
    let settings = ReportSettings {
        page: PageGeometry {
            height: 70.0,
            ..PageGeometry::default()
        },
        ..ReportSettings::default()
    };
    let req = post_form(
        &format!("{FORM}/export"),
        &[("property_appraisal:0:area", "61.00")],
    );

    let resp = handle(req, &repo, &settings).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Export failed"));
    assert!(body.contains(r#"role="alert""#));
    assert!(body.contains(r#"value="61.00""#));
}
