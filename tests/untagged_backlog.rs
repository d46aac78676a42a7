//! Untagged backlog handling through the full cycle
//!
//! Jobs with no worker-capability requirement report an empty (or absent)
//! `workerTags` label and aggregate under the literal tag "none". With a
//! fleet mapped for "none", untagged backlog scales that fleet like any
//! other; without one, it is ignored.

use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zerolift::config::{self, Config};
use zerolift::fleet::HttpFleetBackend;
use zerolift::trigger::Trigger;

// One sample with an empty tag label and one with no tag label at all; both
// land in the "none" bucket for a combined backlog of 3.
const EXPOSITION: &str = "\
# TYPE concourse_steps_waiting gauge
concourse_steps_waiting{workerTags=\"\"} 2
concourse_steps_waiting 1
";

fn test_config(metrics_url: &str, fleet_api_url: &str, mapping: &str) -> Config {
    let vars = HashMap::from([
        (config::ENV_METRICS_URL.to_string(), metrics_url.to_string()),
        (
            config::ENV_FLEET_API_URL.to_string(),
            fleet_api_url.to_string(),
        ),
        (config::ENV_TAG_FLEETS.to_string(), mapping.to_string()),
    ]);
    Config::from_env_map(&vars).expect("should build test config")
}

#[tokio::test]
async fn test_untagged_backlog_scales_the_fleet_mapped_for_none() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXPOSITION))
        .expect(1)
        .mount(&metrics_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fleets"))
        .and(query_param("name", "general-asg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "general-asg", "desired_capacity": 0}
        ])))
        .expect(1)
        .mount(&fleet_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/fleets/general-asg/desired-capacity"))
        .and(body_json(serde_json::json!({"desired_capacity": 1})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fleet_server)
        .await;

    let config = Arc::new(test_config(
        &format!("{}/metrics", metrics_server.uri()),
        &fleet_server.uri(),
        r#"{"none": "general-asg"}"#,
    ));
    let backend =
        Arc::new(HttpFleetBackend::new(fleet_server.uri()).expect("should build backend client"));
    let trigger = Trigger::new(config, backend).expect("should build trigger");

    let report = trigger.run_cycle().await.expect("cycle should succeed");
    assert_eq!(report.tags_observed, 1);
    assert_eq!(report.targets, 1);
    assert_eq!(report.scaled, 1);
}

#[tokio::test]
async fn test_untagged_backlog_without_a_none_mapping_is_ignored() {
    let metrics_server = MockServer::start().await;
    let fleet_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXPOSITION))
        .expect(1)
        .mount(&metrics_server)
        .await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fleet_server)
        .await;

    let config = Arc::new(test_config(
        &format!("{}/metrics", metrics_server.uri()),
        &fleet_server.uri(),
        r#"{"gpu": "gpu-asg"}"#,
    ));
    let backend =
        Arc::new(HttpFleetBackend::new(fleet_server.uri()).expect("should build backend client"));
    let trigger = Trigger::new(config, backend).expect("should build trigger");

    let report = trigger.run_cycle().await.expect("cycle should succeed");
    assert_eq!(report.tags_observed, 1);
    assert_eq!(report.targets, 0);
    assert_eq!(report.scaled, 0);
}
