//! Tests for relations, domains, completions and man.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

#[test]
fn cli_parse_relations() {
    match parse(&["linkscope", "relations", "https://www.pixiv.net/users/1"]) {
        CliCommand::Relations { url, liveness } => {
            assert_eq!(url, "https://www.pixiv.net/users/1");
            assert!(!liveness);
        }
        _ => panic!("expected Relations"),
    }
}

#[test]
fn cli_parse_relations_liveness() {
    match parse(&["linkscope", "relations", "--liveness", "https://x.com/a"]) {
        CliCommand::Relations { liveness, .. } => assert!(liveness),
        _ => panic!("expected Relations --liveness"),
    }
}

#[test]
fn cli_parse_domains() {
    match parse(&["linkscope", "domains"]) {
        CliCommand::Domains => {}
        _ => panic!("expected Domains"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["linkscope", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    assert!(Cli::try_parse_from(["linkscope", "completions", "tcsh"]).is_err());
}

#[test]
fn cli_parse_man() {
    match parse(&["linkscope", "man"]) {
        CliCommand::Man => {}
        _ => panic!("expected Man"),
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
