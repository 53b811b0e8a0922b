mod common;

use assert_cmd::Command;
use clap::Parser;
use common::png_bytes;
use predicates::prelude::*;
use std::fs::write;
use std::path::PathBuf;
use suvi_forge::cli::Cli;
use tempfile::{tempdir, NamedTempFile};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_flags_override_config_file() {
    let file = NamedTempFile::new().unwrap();
    write(file.path(), "concurrency: 2\nfps: 8\noutput: from_file.gif\n").unwrap();

    let cli = Cli::try_parse_from([
        "suvi-forge",
        "--config",
        file.path().to_str().unwrap(),
        "--concurrency",
        "5",
        "--keep",
    ])
    .unwrap();
    let config = cli.resolve_config().unwrap();

    assert_eq!(config.concurrency.get(), 5, "flag wins over file");
    assert_eq!(config.fps.get(), 8, "file wins over default");
    assert_eq!(config.output, PathBuf::from("from_file.gif"));
    assert!(config.keep);
}

#[test]
fn test_cli_rejects_zero_concurrency() {
    assert!(Cli::try_parse_from(["suvi-forge", "--concurrency", "0"]).is_err());
}

#[test]
fn test_help_lists_options() {
    let mut cmd = Command::cargo_bin("suvi-forge").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("--dir-url")
            .and(predicate::str::contains("--concurrency"))
            .and(predicate::str::contains("--keep")),
    );
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_binary_fails_on_empty_listing() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dir/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        server
    });
    let out = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("suvi-forge").expect("Binary exists");
    cmd.arg("--dir-url")
        .arg(format!("{}/dir/", server.uri()))
        .arg("--output")
        .arg(out.path().join("live.gif"))
        .env_remove("RUST_LOG");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no frame links found"));
    assert!(!out.path().join("live.gif").exists());
}

#[test]
fn test_binary_builds_gif_from_listing() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dir/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="a.png">a</a><a href="b.png">b</a><a href="latest.png">l</a>"#,
            ))
            .mount(&server)
            .await;
        for name in ["a.png", "b.png", "latest.png"] {
            Mock::given(method("GET"))
                .and(path(format!("/dir/{name}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_bytes(png_bytes(3, 3, [7, 7, 7, 255])),
                )
                .mount(&server)
                .await;
        }
        server
    });
    let out = tempdir().unwrap();
    let output = out.path().join("live.gif");

    let mut cmd = Command::cargo_bin("suvi-forge").expect("Binary exists");
    cmd.arg("--dir-url")
        .arg(format!("{}/dir/", server.uri()))
        .arg("-o")
        .arg(&output)
        .arg("--concurrency")
        .arg("2")
        .arg("--fps")
        .arg("4");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GIF created").and(predicate::str::contains("frames: 2")));
    assert!(output.is_file());
}
