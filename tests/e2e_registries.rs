//! End-to-end resolution through the real registry adapters against a mock server

mod helper;

use std::sync::Arc;

use mockito::{Server, ServerGuard};

use helper::registries_at;
use pkgtime::config::{BatchConfig, HttpConfig};
use pkgtime::version::batch::BatchRunner;
use pkgtime::version::error::ErrorKind;
use pkgtime::version::http::HttpClient;
use pkgtime::version::registries::build_registries;
use pkgtime::version::resolver::{Resolution, Resolver};
use pkgtime::version::types::{PackageRef, RegistryType};

fn resolver_for(server: &ServerGuard) -> Resolver {
    let http = HttpClient::new(&HttpConfig::default()).unwrap();
    Resolver::new(build_registries(&registries_at(&server.url()), &http))
}

async fn resolve(
    server: &ServerGuard,
    registry_type: RegistryType,
    name: &str,
    date: &str,
) -> Resolution {
    let package = PackageRef::new(registry_type, name).unwrap();
    resolver_for(server)
        .resolve(&package, date.parse().unwrap())
        .await
}

#[tokio::test]
async fn pip_resolves_release_uploaded_on_cutoff_day() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/pypi/requests/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "info": {"name": "requests"},
                "releases": {
                    "2.21.0": [{"upload_time_iso_8601": "2018-12-10T15:40:57.000000Z"}],
                    "2.22.0": [
                        {"upload_time_iso_8601": "2019-05-16T14:22:03.000000Z"},
                        {"upload_time_iso_8601": "2019-05-16T14:22:05.000000Z"}
                    ],
                    "2.23.0": [{"upload_time_iso_8601": "2020-02-19T13:40:03.000000Z"}],
                    "3.0.0.dev0": []
                }
            }"#,
        )
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Pip, "Requests", "2019-05-16").await;

    let resolved = resolution.outcome.unwrap();
    assert_eq!(resolved.version, "2.22.0");
    assert_eq!(resolved.published_at.to_rfc3339(), "2019-05-16T14:22:03+00:00");
}

#[tokio::test]
async fn npm_skips_bookkeeping_keys_and_unpublished_versions() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/left-pad")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "name": "left-pad",
                "versions": {"1.0.0": {}, "1.1.0": {}},
                "time": {
                    "created": "2014-03-26T00:00:00.000Z",
                    "modified": "2019-12-30T00:00:00.000Z",
                    "1.0.0": "2015-01-01T00:00:00.000Z",
                    "1.1.0": "2016-01-01T00:00:00.000Z",
                    "1.2.0": "2017-01-01T00:00:00.000Z"
                }
            }"#,
        )
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Npm, "left-pad", "2018-01-01").await;

    assert_eq!(resolution.outcome.unwrap().version, "1.1.0");
}

#[tokio::test]
async fn cargo_ignores_yanked_versions() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/crates/serde")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "versions": [
                    {"num": "1.0.104", "created_at": "2019-12-15T00:00:00.000000+00:00", "yanked": true},
                    {"num": "1.0.103", "created_at": "2019-11-24T00:00:00.000000+00:00", "yanked": false},
                    {"num": "1.0.102", "created_at": "2019-11-01T00:00:00.000000+00:00", "yanked": false}
                ]
            }"#,
        )
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Cargo, "serde", "2019-12-31").await;

    assert_eq!(resolution.outcome.unwrap().version, "1.0.103");
}

#[tokio::test]
async fn gem_resolves_across_platform_builds() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/versions/nokogiri.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"number": "1.10.8", "platform": "java", "created_at": "2020-02-11T00:00:00.000Z"},
                {"number": "1.10.8", "platform": "ruby", "created_at": "2020-02-10T00:00:00.000Z"},
                {"number": "1.10.7", "platform": "ruby", "created_at": "2019-12-03T00:00:00.000Z"}
            ]"#,
        )
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Gem, "nokogiri", "2020-02-10").await;

    assert_eq!(resolution.outcome.unwrap().version, "1.10.8");
}

#[tokio::test]
async fn composer_skips_versions_without_time() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/packages/monolog/monolog.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "package": {
                    "name": "monolog/monolog",
                    "versions": {
                        "dev-main": {"version": "dev-main"},
                        "2.0.2": {"version": "2.0.2", "time": "2019-12-20T14:22:59+00:00"},
                        "2.0.1": {"version": "2.0.1", "time": "2019-11-13T10:27:43+00:00"}
                    }
                }
            }"#,
        )
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Composer, "Monolog/Monolog", "2019-12-01").await;

    assert_eq!(resolution.outcome.unwrap().version, "2.0.1");
}

#[tokio::test]
async fn unknown_package_is_not_found_for_any_date() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/crates/does-not-exist")
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    for date in ["1990-01-01", "2099-01-01"] {
        let resolution = resolve(&server, RegistryType::Cargo, "does-not-exist", date).await;
        assert_eq!(
            resolution.outcome.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}

#[tokio::test]
async fn server_error_is_reported_as_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/pypi/flask/json")
        .with_status(503)
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Pip, "flask", "2020-01-01").await;

    assert_eq!(resolution.outcome.unwrap_err().kind(), ErrorKind::HttpError);
}

#[tokio::test]
async fn malformed_body_is_reported_as_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/versions/rails.json")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let resolution = resolve(&server, RegistryType::Gem, "rails", "2020-01-01").await;

    assert_eq!(
        resolution.outcome.unwrap_err().kind(),
        ErrorKind::InvalidResponse
    );
}

#[tokio::test]
async fn batch_mixes_success_and_failure_in_input_order() {
    let mut server = Server::new_async().await;
    let _found = server
        .mock("GET", "/react")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "versions": {"16.12.0": {}, "16.13.0": {}},
                "time": {
                    "16.12.0": "2019-11-14T00:00:00.000Z",
                    "16.13.0": "2020-02-26T00:00:00.000Z"
                }
            }"#,
        )
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/no-such-package")
        .with_status(404)
        .create_async()
        .await;

    let runner = BatchRunner::new(
        Arc::new(resolver_for(&server)),
        &BatchConfig {
            stagger_delay_ms: 1,
        },
    );
    let packages: Vec<PackageRef> = ["no-such-package", "react"]
        .iter()
        .map(|name| PackageRef::new(RegistryType::Npm, name).unwrap())
        .collect();

    let results = runner.run(&packages, "2020-01-01".parse().unwrap()).await;

    assert_eq!(
        results[0].outcome.as_ref().unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(results[1].outcome.as_ref().unwrap().version, "16.12.0");
}
