//! Tests for layered configuration and the assembled limiter stack.

use cloudrein::{CancellationToken, CloudreinConfig, CloudreinErrorKind, codes};
use std::io::Write;
use std::time::Duration;
use tempfile::Builder;
use tokio::time::Instant;

#[test]
fn test_bundled_ec2_table_order() {
    let config = CloudreinConfig::bundled().unwrap();
    let ec2 = &config.throttle.services["ec2"];
    let patterns: Vec<String> = ec2.operations.iter().map(|op| op.pattern()).collect();
    assert_eq!(
        patterns,
        ["(Describe|Get|List)", "RunInstances", "StartInstances", ".*"]
    );
    assert_eq!(*ec2.operations[0].refill_rate(), 20.0);
    assert_eq!(*ec2.operations[0].burst(), 100);
    assert_eq!(*ec2.operations[3].burst(), 200);
}

#[test]
fn test_bundled_registry_routes_operations() {
    let registry = CloudreinConfig::bundled().unwrap().build_registry().unwrap();

    let ec2 = registry.lookup("ec2").unwrap();
    assert_eq!(ec2.matching("RunInstances").unwrap().bucket().burst(), 5.0);
    assert_eq!(ec2.matching("ListImages").unwrap().bucket().burst(), 100.0);
    assert_eq!(ec2.matching("CreateVpc").unwrap().operation(), ".*");

    let elb = registry.lookup("elbv2").unwrap();
    assert_eq!(elb.matching("DescribeTargetGroups").unwrap().bucket().burst(), 20.0);
    assert!(registry.lookup("s3").is_none());
}

#[test]
fn test_from_file_overrides_everything() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[wait]
initial_delay_ms = 250
factor = 2.0
jitter = 0.0
max_attempts = 6

[[throttle.services.sts.operations]]
operations = ["AssumeRole"]
refill_rate = 1.0
burst = 2
"#
    )
    .unwrap();

    let config = CloudreinConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.throttle.services.len(), 1);

    let policy = config.backoff_policy().unwrap();
    assert_eq!(*policy.initial_delay(), Duration::from_millis(250));
    assert_eq!(*policy.max_attempts(), 6);

    let registry = config.build_registry().unwrap();
    assert!(registry.lookup("sts").is_some());
    assert!(registry.lookup("ec2").is_none());
}

#[test]
fn test_missing_sections_fall_back_to_defaults() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "[wait]\nmax_attempts = 7").unwrap();

    let config = CloudreinConfig::from_file(temp_file.path()).unwrap();
    assert!(config.throttle.services.is_empty());
    assert_eq!(config.wait.max_attempts, 7);
    assert_eq!(config.wait.initial_delay_ms, 2000);
}

#[test]
fn test_invalid_policy_surfaces_as_backoff_error() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "[wait]\nfactor = 0.5").unwrap();

    let config = CloudreinConfig::from_file(temp_file.path()).unwrap();
    let err = config.backoff_policy().unwrap_err();
    assert!(matches!(err.kind(), CloudreinErrorKind::Backoff(_)));
}

#[test]
fn test_missing_file_is_a_config_error() {
    let err = CloudreinConfig::from_file("/nonexistent/cloudrein.toml").unwrap_err();
    assert!(matches!(err.kind(), CloudreinErrorKind::Config(_)));
}

#[tokio::test]
async fn test_throttled_response_slows_the_next_call() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[[throttle.services.ec2.operations]]
operations = ["Describe"]
refill_rate = 5.0
burst = 10
"#
    )
    .unwrap();
    let registry = CloudreinConfig::from_file(temp_file.path())
        .unwrap()
        .build_registry()
        .unwrap();
    let cancel = CancellationToken::new();

    let start = Instant::now();
    registry
        .limit_request("ec2", "DescribeSubnets", &cancel)
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));

    assert!(registry.review_response("ec2", "DescribeSubnets", Some(codes::REQUEST_LIMIT_EXCEEDED)));

    let start = Instant::now();
    registry
        .limit_request("ec2", "DescribeSubnets", &cancel)
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(150));
}
