// crates/hotelier-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Argument Tests
// Description: Unit tests for the clap command definitions.
// Purpose: Ensure labels parse into typed modules and actions.
// Dependencies: clap, hotelier-core
// ============================================================================

//! ## Overview
//! Validates the command tree and the module and action value parsers.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::CommandFactory;
use clap::Parser;
use hotelier_core::Action;
use hotelier_core::Module;

use super::AccessCommand;
use super::Cli;
use super::Commands;
use super::parse_action;
use super::parse_module;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn explain_arguments_parse_labels() {
    let cli = Cli::try_parse_from([
        "hotelier",
        "access",
        "explain",
        "--store",
        "hotelier.db",
        "--user",
        "pm",
        "--module",
        "bank_details",
        "--action",
        "read",
    ])
    .unwrap();
    let Commands::Access {
        command: AccessCommand::Explain(command),
    } = cli.command
    else {
        panic!("expected access explain");
    };
    assert_eq!(command.module, Module::BankDetails);
    assert_eq!(command.action, Action::Read);
    assert!(command.resource.is_none());
}

#[test]
fn unknown_module_is_rejected() {
    let parsed = Cli::try_parse_from([
        "hotelier",
        "access",
        "explain",
        "--store",
        "x.db",
        "--user",
        "pm",
        "--module",
        "invoices",
        "--action",
        "read",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn value_parsers_accept_labels_case_insensitively() {
    assert_eq!(parse_module("Property").unwrap(), Module::Property);
    assert_eq!(parse_action(" DELETE ").unwrap(), Action::Delete);
    let err = parse_module("invoices").unwrap_err();
    assert!(err.contains("bank_details"));
}
