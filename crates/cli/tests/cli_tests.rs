//! CLI integration tests
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("mangarelay")
}

fn get_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/manganato/{}", name)).unwrap()
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_cli_help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("updates"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("chapter"))
        .stdout(predicate::str::contains("image"));
}

#[test]
fn test_cli_requires_subcommand() {
    cmd().assert().failure();
}

#[test]
fn test_cli_encode_decode() {
    let url = "https://chapmanganato.to/manga-ab1234/chapter-1";
    let output = cmd().args(["encode", url]).assert().success().get_output().stdout.clone();
    let token = String::from_utf8(output).unwrap().trim().to_string();

    assert!(!token.contains('/'));
    cmd()
        .args(["decode", &token])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", url)));
}

#[test]
fn test_cli_decode_accepts_links() {
    cmd()
        .args(["decode", "/v1/chapters/aHR0cHM6Ly9leGFtcGxlLmNvbQ=="])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com"));
}

#[test]
fn test_cli_decode_invalid_token() {
    cmd()
        .args(["decode", "!!!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid token"));
}

#[test]
fn test_cli_info_rejects_unknown_prefix() {
    cmd()
        .args(["info", "xx-manga-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a manga id"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mangarelay"));
}

#[test]
fn test_cli_updates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/genre-all");
        then.status(200).body(get_fixture("listing.html"));
    });

    let output = cmd()
        .args(["--updates-url", &server.url("/genre-all"), "updates"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries = stdout_json(&output);
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[0]["url"], "/mangas/cu-manga-ab1234");
    assert_eq!(entries[0]["lastChapter"], "Chapter 200");
    assert_eq!(entries[1]["url"], "/mangas/mu-manga-zz9876");
}

#[test]
fn test_cli_search_pages() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/search/story/one_piece").query_param("page", "3");
        then.status(200).body(get_fixture("search.html"));
    });

    cmd()
        .args(["search", "one piece", "--page", "3", "--updates-url", &server.url("/genre-all")])
        .assert()
        .success()
        .stdout(predicate::str::contains("One Piece Party"));

    mock.assert();
}

#[test]
fn test_cli_info() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/manga-ab1234");
        then.status(200).body(get_fixture("detail.html"));
    });

    let output = cmd()
        .args(["--manga-base", &server.base_url(), "info", "/mangas/mu-manga-ab1234"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let detail = stdout_json(&output);
    assert_eq!(detail["title"], "Solo Leveling");
    assert_eq!(detail["chapters"].as_array().unwrap().len(), 4);
}

#[test]
fn test_cli_info_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/manga-gone");
        then.status(302).header("location", "/");
    });

    cmd()
        .args(["--manga-base", &server.base_url(), "info", "mu-manga-gone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_cli_image_output_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/img/1-o.png");
        then.status(200).header("content-type", "image/png").body(vec![1u8, 2, 3, 4, 5]);
    });

    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("page.png");
    let token = mangarelay_core::encode_url(&server.url("/img/1-o.png"));

    cmd()
        .args(["image", &token, "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 5 B"));

    assert_eq!(std::fs::read(&output).unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_cli_image_default_filename() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/img/cover.jpg");
        then.status(200).header("content-type", "image/jpeg").body(vec![9u8; 64]);
    });

    let tmp = TempDir::new().unwrap();
    let token = mangarelay_core::encode_url(&server.url("/img/cover.jpg"));

    cmd().current_dir(tmp.path()).args(["image", &token]).assert().success();

    assert_eq!(std::fs::read(tmp.path().join("cover.jpg")).unwrap().len(), 64);
}
