// src/tests/router_tests/home_tests.rs

use crate::config::ReportSettings;
use crate::errors::ServerError;
use crate::router::handle;
use crate::templates::html_error_response;
use crate::tests::utils::{body_string, get, seeded_repo};

#[test]
fn home_lists_forms_with_links() {
    let (repo, _temp_dir) = seeded_repo("home_test");
    let resp = handle(get("/"), &repo, &ReportSettings::default()).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains(r#"href="/faas/FAAS-2024-001""#));
    assert!(body.contains(r#"href="/faas/FAAS-2024-002""#));
    assert!(body.contains("Jose Reyes"));
}

#[test]
fn unknown_paths_are_not_found() {
    let (repo, _temp_dir) = seeded_repo("home_404_test");
    let settings = ReportSettings::default();

    for uri in ["/nope", "/faas", "/faas/FAAS-2024-001/extra"] {
        let err = handle(get(uri), &repo, &settings).unwrap_err();
        assert!(matches!(err, ServerError::NotFound), "{uri}");
    }

    let page = html_error_response(ServerError::NotFound);
    assert_eq!(page.status(), 404);
    assert!(body_string(page).contains("Error 404"));
}
