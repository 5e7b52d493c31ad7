//! End-to-end tests over HTTP.

use axum::http::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use static_alias::routing::{AliasRouter, AliasRule, BoxError};

mod common;

#[tokio::test]
async fn test_serves_alias_fallthrough_and_index() {
    let site = common::build_site(&[
        ("old.html", "old page"),
        ("new.html", "new page"),
        ("plain.txt", "plain"),
        ("docs/index.html", "docs index"),
        ("empty/", ""),
    ]);
    let config = common::config_for(site.path());
    let router = AliasRouter::new(
        config.root.clone(),
        vec![AliasRule::builder()
            .when_literal("/old.html")
            .serve_template("<% absDir %>/new.html")
            .build()],
    );
    let (addr, shutdown) = common::start_server(config, router).await;
    let client = common::client();

    let aliased = client.get(format!("http://{addr}/old.html")).send().await.unwrap();
    assert_eq!(aliased.status(), StatusCode::OK);
    assert_eq!(aliased.text().await.unwrap(), "new page");

    let plain = client.get(format!("http://{addr}/plain.txt")).send().await.unwrap();
    assert_eq!(plain.status(), StatusCode::OK);
    assert!(plain.headers().contains_key("x-request-id"));
    assert_eq!(plain.text().await.unwrap(), "plain");

    let index = client.get(format!("http://{addr}/docs/")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(index.text().await.unwrap(), "docs index");

    let empty = client.get(format!("http://{addr}/empty/")).send().await.unwrap();
    assert_eq!(empty.status(), StatusCode::NOT_FOUND);

    let missing = client.get(format!("http://{addr}/nope.html")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_alias_outside_root_is_forbidden() {
    let site = common::build_site(&[("public/index.html", "home"), ("secret.txt", "secret")]);
    let config = common::config_for(&site.path().join("public"));
    let router = AliasRouter::new(
        config.root.clone(),
        vec![
            AliasRule::builder()
                .when_literal("/leak")
                .serve_template("../secret.txt")
                .build(),
            AliasRule::builder()
                .when_literal("/shared")
                .serve_template("../secret.txt")
                .allow_outside(true)
                .build(),
        ],
    );
    let (addr, shutdown) = common::start_server(config, router).await;
    let client = common::client();

    let leak = client.get(format!("http://{addr}/leak")).send().await.unwrap();
    assert_eq!(leak.status(), StatusCode::FORBIDDEN);

    let shared = client.get(format!("http://{addr}/shared")).send().await.unwrap();
    assert_eq!(shared.status(), StatusCode::OK);
    assert_eq!(shared.text().await.unwrap(), "secret");

    shutdown.trigger();
}

#[tokio::test]
async fn test_failing_predicate_yields_server_error() {
    let site = common::build_site(&[("ok.txt", "ok")]);
    let config = common::config_for(site.path());
    let router = AliasRouter::new(
        config.root.clone(),
        vec![AliasRule::builder()
            .when_async(|params, _| {
                let fail = params.req_path() == "/boom";
                async move {
                    if fail {
                        Err::<bool, BoxError>("backend unavailable".into())
                    } else {
                        Ok(false)
                    }
                }
            })
            .build()],
    );
    let (addr, shutdown) = common::start_server(config, router).await;
    let client = common::client();

    let boom = client.get(format!("http://{addr}/boom")).send().await.unwrap();
    assert_eq!(boom.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The failure is per request; the server keeps serving.
    let ok = client.get(format!("http://{addr}/ok.txt")).send().await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_predicate_sets_response_headers() {
    let site = common::build_site(&[("mobile/app.js", "mobile"), ("app.js", "desktop")]);
    let config = common::config_for(site.path());
    let router = AliasRouter::new(
        config.root.clone(),
        vec![AliasRule::builder()
            .when_fn(|params, exchange| {
                let mobile = params.get("user-agent").is_some_and(|ua| ua.contains("Mobile"));
                if mobile {
                    exchange.response().insert(
                        HeaderName::from_static("vary"),
                        HeaderValue::from_static("User-Agent"),
                    );
                }
                mobile
            })
            .serve_template("mobile/<% fileName %>")
            .build()],
    );
    let (addr, shutdown) = common::start_server(config, router).await;
    let client = common::client();

    let mobile = client
        .get(format!("http://{addr}/app.js"))
        .header("user-agent", "Phone Mobile Safari")
        .send()
        .await
        .unwrap();
    assert_eq!(mobile.status(), StatusCode::OK);
    assert_eq!(mobile.headers()["vary"], "User-Agent");
    assert_eq!(mobile.text().await.unwrap(), "mobile");

    let desktop = client
        .get(format!("http://{addr}/app.js"))
        .header("user-agent", "Desktop")
        .send()
        .await
        .unwrap();
    assert!(desktop.headers().get("vary").is_none());
    assert_eq!(desktop.text().await.unwrap(), "desktop");

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_from_toml_config() {
    let site = common::build_site(&[("en/index.html", "english"), ("fr/index.html", "french")]);
    let toml = format!(
        r#"
root = "{root}"

[[alias]]
match = "reqPath=/"
serve = ["<% query_lang %>/index.html", "en/index.html"]
"#,
        root = site.path().display()
    );
    let config_path = site.path().join("alias.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = static_alias::config::load_config(&config_path).unwrap();
    let router = AliasRouter::from_config(&config).unwrap();
    let (addr, shutdown) = common::start_server(config, router).await;
    let client = common::client();

    let fr = client.get(format!("http://{addr}/?lang=fr")).send().await.unwrap();
    assert_eq!(fr.text().await.unwrap(), "french");

    let fallback = client.get(format!("http://{addr}/?lang=xx")).send().await.unwrap();
    assert_eq!(fallback.text().await.unwrap(), "english");

    shutdown.trigger();
}
