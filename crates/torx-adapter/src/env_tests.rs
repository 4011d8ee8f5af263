// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn timeout_value_returns_none_when_unset() {
    std::env::remove_var(TORXTIMEOUT);
    assert_eq!(timeout_value(), None);
}

#[test]
#[serial]
fn timeout_value_returns_raw_string_when_set() {
    std::env::set_var(TORXTIMEOUT, "250");
    let result = timeout_value();
    std::env::remove_var(TORXTIMEOUT);
    assert_eq!(result.as_deref(), Some("250"));
}

#[test]
#[serial]
fn timeout_value_treats_empty_as_unset() {
    std::env::set_var(TORXTIMEOUT, "");
    let result = timeout_value();
    std::env::remove_var(TORXTIMEOUT);
    assert_eq!(result, None);
}

#[test]
#[serial]
fn timeout_unit_returns_none_when_unset() {
    std::env::remove_var(TORXTIMEUNIT);
    assert_eq!(timeout_unit(), None);
}

#[test]
#[serial]
fn timeout_unit_is_not_normalized() {
    std::env::set_var(TORXTIMEUNIT, "Seconds");
    let result = timeout_unit();
    std::env::remove_var(TORXTIMEUNIT);
    assert_eq!(result.as_deref(), Some("Seconds"));
}

#[test]
#[serial]
fn log_filter_returns_directive_when_set() {
    std::env::set_var(TORX_ADAPTER_LOG, "torx_adapter=debug");
    let result = log_filter();
    std::env::remove_var(TORX_ADAPTER_LOG);
    assert_eq!(result.as_deref(), Some("torx_adapter=debug"));
}

#[test]
fn name_constants_match_jtorx_variables() {
    assert_eq!(TORXTIMEOUT, "TORXTIMEOUT");
    assert_eq!(TORXTIMEUNIT, "TORXTIMEUNIT");
}
