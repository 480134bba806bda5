//! Tests for probe, check-users, completions and man.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::{CommandFactory, Parser};
use std::path::Path;

#[test]
fn cli_parse_probe() {
    match parse(&["qcw", "probe", "--url", "https://qlik", "--clear-cache"]) {
        CliCommand::Probe {
            server,
            clear_cache,
        } => {
            assert_eq!(server.url, "https://qlik");
            assert!(clear_cache);
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_probe_overrides() {
    match parse(&["qcw", "probe", "--url", "qlik", "--port", "443", "--insecure"]) {
        CliCommand::Probe {
            server,
            clear_cache,
        } => {
            let o = server.overrides();
            assert_eq!(o.url, "qlik");
            assert_eq!(o.port, Some(443));
            assert!(o.insecure);
            assert!(!clear_cache);
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_check_users() {
    match parse(&["qcw", "check-users", "/path/to/users.txt"]) {
        CliCommand::CheckUsers { path } => assert_eq!(path, Path::new("/path/to/users.txt")),
        _ => panic!("expected CheckUsers"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["qcw", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_man() {
    assert!(matches!(parse(&["qcw", "man"]), CliCommand::Man));
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
