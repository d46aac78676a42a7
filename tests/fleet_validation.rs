//! Fleet describe-response validation
//!
//! A describe that returns anything but exactly one record with exactly the
//! requested name means the configuration and the backend disagree. The cycle
//! must fail loudly and issue no mutation rather than guess.

use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zerolift::config::{self, Config};
use zerolift::error::AppError;
use zerolift::fleet::HttpFleetBackend;
use zerolift::trigger::Trigger;

const EXPOSITION: &str = "concourse_steps_waiting{workerTags=\"gpu\"} 3\n";

async fn build_trigger(metrics_server: &MockServer, fleet_server: &MockServer) -> Trigger {
    let vars = HashMap::from([
        (
            config::ENV_METRICS_URL.to_string(),
            format!("{}/metrics", metrics_server.uri()),
        ),
        (config::ENV_FLEET_API_URL.to_string(), fleet_server.uri()),
        (
            config::ENV_TAG_FLEETS.to_string(),
            r#"{"gpu": "gpu-asg"}"#.to_string(),
        ),
    ]);
    let config = Arc::new(Config::from_env_map(&vars).expect("should build test config"));
    let backend =
        Arc::new(HttpFleetBackend::new(fleet_server.uri()).expect("should build backend client"));
    Trigger::new(config, backend).expect("should build trigger")
}

async fn mount_metrics(metrics_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXPOSITION))
        .expect(1)
        .mount(metrics_server)
        .await;
}

async fn mount_describe(fleet_server: &MockServer, records: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/fleets"))
        .and(query_param("name", "gpu-asg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .expect(1)
        .mount(fleet_server)
        .await;
}

async fn forbid_mutations(fleet_server: &MockServer) {
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(fleet_server)
        .await;
}

#[tokio::test]
async fn test_two_records_for_one_identifier_is_a_cardinality_error() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    mount_metrics(&metrics_server).await;
    mount_describe(
        &fleet_server,
        serde_json::json!([
            {"name": "gpu-asg", "desired_capacity": 0},
            {"name": "gpu-asg", "desired_capacity": 2}
        ]),
    )
    .await;
    forbid_mutations(&fleet_server).await;

    let trigger = build_trigger(&metrics_server, &fleet_server).await;
    let err = trigger.run_cycle().await.unwrap_err();

    assert!(matches!(err, AppError::FleetCardinality { count: 2, .. }));
}

#[tokio::test]
async fn test_zero_records_for_one_identifier_is_a_cardinality_error() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    mount_metrics(&metrics_server).await;
    mount_describe(&fleet_server, serde_json::json!([])).await;
    forbid_mutations(&fleet_server).await;

    let trigger = build_trigger(&metrics_server, &fleet_server).await;
    let err = trigger.run_cycle().await.unwrap_err();

    assert!(matches!(err, AppError::FleetCardinality { count: 0, .. }));
}

#[tokio::test]
async fn test_record_with_different_name_is_an_identity_error() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    mount_metrics(&metrics_server).await;
    mount_describe(
        &fleet_server,
        serde_json::json!([
            {"name": "gpu-asg-renamed", "desired_capacity": 0}
        ]),
    )
    .await;
    forbid_mutations(&fleet_server).await;

    let trigger = build_trigger(&metrics_server, &fleet_server).await;
    let err = trigger.run_cycle().await.unwrap_err();

    match err {
        AppError::FleetIdentityMismatch {
            requested,
            returned,
        } => {
            assert_eq!(requested, "gpu-asg");
            assert_eq!(returned, "gpu-asg-renamed");
        }
        other => panic!("expected identity mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_describe_failure_aborts_the_cycle() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    mount_metrics(&metrics_server).await;
    Mock::given(method("GET"))
        .and(path("/fleets"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&fleet_server)
        .await;
    forbid_mutations(&fleet_server).await;

    let trigger = build_trigger(&metrics_server, &fleet_server).await;
    let err = trigger.run_cycle().await.unwrap_err();

    assert!(matches!(err, AppError::Backend { .. }));
}
