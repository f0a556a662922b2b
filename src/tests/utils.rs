use crate::db::{apply_sql, Database, SqliteFaasRepository};
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;
use tempfile::TempDir;
use url::form_urlencoded;

/// Fresh temp-file database with the production schema and demo data. The
/// file is removed when the returned `TempDir` drops.
pub fn seeded_repo(tag: &str) -> (SqliteFaasRepository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(temp_dir.path().join(format!("{tag}.sqlite")));
    apply_sql(&db, include_str!("../../sql/schema.sql"))
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    apply_sql(&db, include_str!("../../sql/seed.sql"))
        .unwrap_or_else(|e| panic!("Seeding failed: {e}"));
    (SqliteFaasRepository::new(db), temp_dir)
}

pub fn get(uri: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST with an urlencoded form body built from `fields`.
pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn body_bytes(resp: Response) -> Vec<u8> {
    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    bytes
}

pub fn body_string(resp: Response) -> String {
    String::from_utf8(body_bytes(resp)).unwrap()
}
