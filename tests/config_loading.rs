#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for manifest loading and step counting.

mod common;

use common::{setup_manifest_root, write_manifest};
use kitstrap::config::{Config, OpKind};
use kitstrap::logging::Logger;

#[test]
fn example_scenario_total_is_five() {
    // apt = ["nmap", "curl"], everything else empty:
    // 2 + 0 + 0 + 0 + 0 downloads + 3 fixed = 5.
    let root = tempfile::tempdir().unwrap();
    setup_manifest_root(root.path(), "nmap\ncurl\n", "", "", "");

    let log = Logger::new();
    let config = Config::load(root.path(), &log);
    assert_eq!(config.total_steps(), 5);
}

#[test]
fn total_counts_every_manifest_and_downloads() {
    let root = tempfile::tempdir().unwrap();
    setup_manifest_root(
        root.path(),
        "nmap\n",
        "https://github.com/a/b.git\nhttps://github.com/c/d.git\n",
        "autorecon\n",
        "chromium\n",
    );
    write_manifest(
        root.path(),
        "downloads.toml",
        "[[download]]\nurl = \"https://x/a.zip\"\ndest = \"a\"\n\n\
         [[download]]\nurl = \"https://x/b.tgz\"\ndest = \"b\"\n",
    );

    let log = Logger::new();
    let config = Config::load(root.path(), &log);
    assert_eq!(config.total_steps(), 1 + 2 + 1 + 1 + 2 + 3);
}

#[test]
fn missing_manifest_directory_loads_empty() {
    let root = tempfile::tempdir().unwrap();

    let log = Logger::new();
    let config = Config::load(root.path(), &log);

    assert!(config.apt_packages.is_empty());
    assert!(config.git_repos.is_empty());
    assert!(config.pip_packages.is_empty());
    assert!(config.snap_packages.is_empty());
    assert!(config.downloads.is_empty());
    assert!(config.shell_ops.is_empty());
    assert_eq!(config.total_steps(), 3, "only the fixed steps remain");
}

#[test]
fn malformed_downloads_manifest_does_not_abort_loading() {
    let root = tempfile::tempdir().unwrap();
    setup_manifest_root(root.path(), "nmap\n", "", "", "");
    write_manifest(root.path(), "downloads.toml", "[[download]]\nurl = broken");

    let log = Logger::new();
    let config = Config::load(root.path(), &log);

    assert!(config.downloads.is_empty(), "bad manifest becomes empty");
    assert_eq!(config.apt_packages, vec!["nmap"], "other manifests unaffected");
    assert_eq!(config.total_steps(), 1 + 3);
}

#[test]
fn structured_manifests_parse_into_typed_values() {
    let root = tempfile::tempdir().unwrap();
    setup_manifest_root(root.path(), "", "", "", "");
    write_manifest(
        root.path(),
        "downloads.toml",
        "[[download]]\nurl = \"https://x/kr.tar.gz\"\ndest = \"kiterunner\"\n",
    );
    write_manifest(
        root.path(),
        "shellrc.toml",
        "[[operation]]\nkind = \"replace\"\nline = 100\ntext = \"PROMPT='%n'\"\n",
    );

    let log = Logger::new();
    let config = Config::load(root.path(), &log);

    assert_eq!(config.downloads[0].url, "https://x/kr.tar.gz");
    assert_eq!(config.downloads[0].dest, "kiterunner");
    assert_eq!(config.shell_ops[0].kind, OpKind::Replace);
    assert_eq!(config.shell_ops[0].line, 100);
    assert_eq!(config.shell_ops[0].text, "PROMPT='%n'");
}

#[test]
fn blank_lines_do_not_count_as_steps() {
    let root = tempfile::tempdir().unwrap();
    setup_manifest_root(root.path(), "nmap\n\n\ncurl\n\n", "", "", "");

    let log = Logger::new();
    let config = Config::load(root.path(), &log);
    assert_eq!(config.apt_packages.len(), 2);
    assert_eq!(config.total_steps(), 5);
}
