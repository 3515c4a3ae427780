//! Tests for get-server-info and show-config CLI commands
//!
//! These are simple commands that display static/config information.

use crate::common::{create_test_services, test_config};
use websift::cli::commands::config::{execute as execute_config, ConfigArgs};
use websift::cli::commands::info::{execute as execute_info, InfoArgs};
use websift::cli::OutputFormat;

// =============================================================================
// get-server-info tests
// =============================================================================

#[tokio::test]
async fn test_server_info_human() {
    let services = create_test_services(test_config(None));

    let result = execute_info(InfoArgs { detailed: false }, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Get server info should succeed");
}

#[tokio::test]
async fn test_server_info_json() {
    let services = create_test_services(test_config(None));

    let result = execute_info(InfoArgs { detailed: false }, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Get server info (JSON) should succeed");
}

#[tokio::test]
async fn test_server_info_detailed_with_search_configured() {
    let services = create_test_services(test_config(Some("http://127.0.0.1:9")));

    let result = execute_info(InfoArgs { detailed: true }, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Get detailed server info should succeed");
}

// =============================================================================
// show-config tests
// =============================================================================

#[tokio::test]
async fn test_show_config_human() {
    let services = create_test_services(test_config(None));

    let result = execute_config(ConfigArgs { all: false }, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Show config should succeed");
}

#[tokio::test]
async fn test_show_config_json_all() {
    let services = create_test_services(test_config(Some("http://127.0.0.1:9")));

    let result = execute_config(ConfigArgs { all: true }, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Show config (JSON, all) should succeed");
}
