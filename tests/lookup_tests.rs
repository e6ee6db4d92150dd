//! End-to-end lookup scenarios against a mock StoredSafe API.
//!
//! The mock server runs on a tokio runtime while the blocking client is
//! driven from the test thread.

use serde_json::json;
use storedsafe_vault::cli::commands::get;
use storedsafe_vault::cli::RunConfig;
use storedsafe_vault::client::VaultClient;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "abc123";

struct Api {
    server: MockServer,
    rt: Runtime,
}

impl Api {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn auth_ok(self) -> Self {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/api/1.0/auth/check"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "CALLINFO": { "status": "SUCCESS" } })),
                ),
        );
        self
    }

    fn object(self, id: u64, password: &str) -> Self {
        self.mount(
            Mock::given(method("GET"))
                .and(path(format!("/api/1.0/object/{id}")))
                .and(query_param("token", TOKEN))
                .and(query_param("decrypt", "true"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "OBJECT": [ { "id": id, "groupid": 1, "crypted": { "password": password } } ]
                }))),
        );
        self
    }

    fn search(self, needle: &str, objects: serde_json::Value) -> Self {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/api/1.0/find"))
                .and(query_param("token", TOKEN))
                .and(query_param("needle", needle))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "OBJECT": objects }))),
        );
        self
    }

    fn client(&self) -> VaultClient {
        VaultClient::with_base_url(format!("{}/api/1.0", self.server.uri()), TOKEN)
    }

    fn request_paths(&self) -> Vec<String> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_owned())
            .collect()
    }
}

fn config(vault_id: &str) -> RunConfig {
    RunConfig {
        vault_id: vault_id.to_owned(),
        verbose: false,
        debug: false,
    }
}

/// Run a lookup and return (printed?, stdout).
fn run(api: &Api, vault_id: &str) -> (bool, String) {
    let mut out = Vec::new();
    let printed = get::fetch(&config(vault_id), &api.client(), &mut out).unwrap();
    (printed, String::from_utf8(out).unwrap())
}

#[test]
fn numeric_id_prints_password() {
    let api = Api::start().auth_ok().object(919, "s3cr3t");
    assert_eq!(run(&api, "919"), (true, "s3cr3t\n".to_owned()));
}

#[test]
fn unknown_numeric_id_is_not_searched() {
    let api = Api::start().auth_ok();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/api/1.0/object/4242"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "OBJECT": [] }))),
    );

    assert_eq!(run(&api, "4242"), (false, String::new()));
    assert!(!api.request_paths().iter().any(|p| p.ends_with("/find")));
}

#[test]
fn last_search_match_wins() {
    let api = Api::start()
        .auth_ok()
        .search(
            "prod-sweden-vars",
            json!([
                { "id": 10, "groupid": 3, "public": { "host": "prod-sweden-vars", "username": "deploy" } },
                { "id": 15, "groupid": 3, "public": { "host": "prod-norway-vars", "username": "deploy" } },
                { "id": 20, "groupid": 4, "public": { "host": "prod-sweden-vars", "username": "deploy" } }
            ]),
        )
        .object(10, "old")
        .object(15, "unrelated")
        .object(20, "new");

    assert_eq!(run(&api, "prod-sweden-vars"), (true, "new\n".to_owned()));
    let paths = api.request_paths();
    assert!(paths.contains(&"/api/1.0/object/10".to_owned()));
    assert!(!paths.contains(&"/api/1.0/object/15".to_owned()));
}

#[test]
fn search_without_matches_prints_nothing() {
    let api = Api::start().auth_ok().search(
        "db01",
        json!([ { "id": 1, "groupid": 1, "public": { "host": "db02", "username": "root" } } ]),
    );
    assert_eq!(run(&api, "db01"), (false, String::new()));
}

#[test]
fn rejected_session_stops_before_lookup() {
    let api = Api::start().object(919, "s3cr3t");
    api.mount(
        Mock::given(method("POST"))
            .and(path("/api/1.0/auth/check"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "CALLINFO": { "status": "FAIL" } })),
            ),
    );

    assert_eq!(run(&api, "919"), (false, String::new()));
    assert!(!api
        .request_paths()
        .iter()
        .any(|p| p.starts_with("/api/1.0/object")));
}

#[test]
fn http_error_on_auth_check_stops_before_lookup() {
    let api = Api::start();
    api.mount(
        Mock::given(method("POST"))
            .and(path("/api/1.0/auth/check"))
            .respond_with(ResponseTemplate::new(401)),
    );
    assert_eq!(run(&api, "919"), (false, String::new()));
}

#[test]
fn unreachable_server_is_not_authenticated() {
    let client = VaultClient::with_base_url("http://127.0.0.1:9/api/1.0", TOKEN);
    let mut out = Vec::new();
    let printed = get::fetch(&config("919"), &client, &mut out).unwrap();
    assert!(!printed);
    assert!(out.is_empty());
}

#[test]
fn failed_object_request_is_an_error() {
    let api = Api::start().auth_ok();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/api/1.0/object/919"))
            .respond_with(ResponseTemplate::new(500)),
    );

    let mut out = Vec::new();
    let result = get::fetch(&config("919"), &api.client(), &mut out);
    assert!(result.is_err());
    assert!(out.is_empty());
}

#[test]
fn auth_check_reports_false_for_each_failure() {
    let unreachable = VaultClient::with_base_url("http://127.0.0.1:9/api/1.0", TOKEN);
    assert!(!get::auth_check(&unreachable));

    let rejected = Api::start();
    rejected.mount(
        Mock::given(method("POST"))
            .and(path("/api/1.0/auth/check"))
            .respond_with(ResponseTemplate::new(403)),
    );
    assert!(!get::auth_check(&rejected.client()));

    let invalid = Api::start();
    invalid.mount(
        Mock::given(method("POST"))
            .and(path("/api/1.0/auth/check"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "CALLINFO": { "status": "FAIL" } })),
            ),
    );
    assert!(!get::auth_check(&invalid.client()));

    assert!(get::auth_check(&Api::start().auth_ok().client()));
}

#[test]
fn object_body_without_id_still_prints_password() {
    let api = Api::start().auth_ok();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/api/1.0/object/919"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "OBJECT": [ { "crypted": { "password": "s3cr3t" } } ]
            }))),
    );
    assert_eq!(run(&api, "919"), (true, "s3cr3t\n".to_owned()));
}

#[test]
fn broken_sibling_record_does_not_hide_a_match() {
    let api = Api::start()
        .auth_ok()
        .search(
            "db01",
            json!([
                { "id": 10, "groupid": 1, "public": { "host": "db01", "username": "root" } },
                { "id": null, "groupid": 1, "public": { "host": "other", "username": "root" } }
            ]),
        )
        .object(10, "found");
    assert_eq!(run(&api, "db01"), (true, "found\n".to_owned()));
}
