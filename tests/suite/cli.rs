//! Command-line parsing and end-to-end command runs

use std::io::Write as _;

use clap::{CommandFactory, FromArgMatches, Parser, error::ErrorKind};
use gantt_cli::{Cli, Command};
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    TENANT, TOKEN, auth_url, mount_identity, scheduler_path, scheduler_url, zone_json,
};

/// An empty config file so the user's own `~/.gantt/config.toml` is never read.
fn empty_config() -> NamedTempFile {
    NamedTempFile::new().unwrap()
}

fn token_args(config: &NamedTempFile, server_url: &str, rest: &[&str]) -> Vec<String> {
    let mut args = vec![
        "gantt".to_string(),
        "--config".to_string(),
        config.path().display().to_string(),
        "--os-auth-token".to_string(),
        TOKEN.to_string(),
        "--os-image-url".to_string(),
        server_url.to_string(),
    ];
    args.extend(rest.iter().map(ToString::to_string));
    args
}

/// Parse from `args` alone, ignoring `OS_*`/`GANTT_*` variables of the
/// environment running the tests.
fn parse_isolated(args: Vec<String>) -> Result<Cli, clap::Error> {
    let matches = Cli::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

async fn run_to_string(args: Vec<String>) -> anyhow::Result<String> {
    let cli = parse_isolated(args)?;
    let mut out = Vec::new();
    gantt_cli::run(cli, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

/// Writer whose flush fails, like stdout on a closed pipe.
struct BrokenPipe(Vec<u8>);

impl std::io::Write for BrokenPipe {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }
}

#[test]
fn help_subcommand_lists_commands() {
    let err = Cli::try_parse_from(["gantt", "help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);

    let help = Cli::command().render_help().to_string();
    for name in [
        "zone-list",
        "zone-show",
        "zone-add",
        "zone-update",
        "zone-delete",
        "zone-info",
        "token-get",
    ] {
        assert!(help.contains(name), "help is missing {name}:\n{help}");
    }
    assert!(help.contains("--os-username"));
}

#[test]
fn credential_flags_fall_back_to_os_environment() {
    let command = Cli::command();
    let env_of = |id: &str| {
        command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_env())
            .and_then(|env| env.to_str())
            .map(ToString::to_string)
    };
    for (id, var) in [
        ("os_username", "OS_USERNAME"),
        ("os_password", "OS_PASSWORD"),
        ("os_tenant_id", "OS_TENANT_ID"),
        ("os_auth_url", "OS_AUTH_URL"),
        ("os_image_url", "OS_IMAGE_URL"),
        ("os_auth_token", "OS_AUTH_TOKEN"),
        ("os_region_name", "OS_REGION_NAME"),
        ("os_service_type", "OS_SERVICE_TYPE"),
        ("os_endpoint_type", "OS_ENDPOINT_TYPE"),
        ("api_version", "GANTT_API_VERSION"),
        ("config", "GANTT_CONFIG"),
    ] {
        assert_eq!(env_of(id).as_deref(), Some(var), "{id}");
    }
}

#[test]
fn parses_zone_add_with_weights() {
    let cli = parse_isolated(
        [
            "gantt",
            "zone-add",
            "http://child:8774/v1",
            "admin",
            "pw",
            "--weight-scale",
            "2.5",
        ]
        .map(String::from)
        .to_vec(),
    )
    .unwrap();
    match cli.command {
        Command::ZoneAdd {
            api_url,
            weight_offset,
            weight_scale,
            ..
        } => {
            assert_eq!(api_url, "http://child:8774/v1");
            assert!(weight_offset.abs() < f64::EPSILON);
            assert!((weight_scale - 2.5).abs() < f64::EPSILON);
        }
        other => panic!("expected ZoneAdd, got {other:?}"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = parse_isolated(
        ["gantt", "zone-show", "12", "--os-region-name", "RegionTwo"]
            .map(String::from)
            .to_vec(),
    )
    .unwrap();
    assert!(matches!(cli.command, Command::ZoneShow { id: 12 }));
    assert_eq!(cli.global.os_region_name.as_deref(), Some("RegionTwo"));
}

#[test]
fn rejects_unsupported_api_version_and_bad_id() {
    let parse = |args: &[&str]| parse_isolated(args.iter().map(ToString::to_string).collect());
    assert!(parse(&["gantt", "--api-version", "2", "zone-list"]).is_err());
    assert!(parse(&["gantt", "zone-show", "abc"]).is_err());
    let cli = parse(&["gantt", "zone-list"]).unwrap();
    assert_eq!(cli.global.api_version, gantt_client::ApiVersion::V1);
}

#[tokio::test]
async fn zone_list_with_token_renders_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(scheduler_path("zones")))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "zones": [zone_json(1, "http://child-a:8774/v1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let out = run_to_string(token_args(&config, &url, &["zone-list"]))
        .await
        .unwrap();

    assert!(out.starts_with("+----+"));
    assert!(out.contains("| ID | API URL"));
    assert!(out.contains("http://child-a:8774/v1"));
}

#[tokio::test]
async fn zone_show_with_password_flags_authenticates_first() {
    let server = MockServer::start().await;
    mount_identity(&server, TOKEN).await;
    Mock::given(method("GET"))
        .and(path(scheduler_path("zones/3")))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"zone": zone_json(3, "http://child:8774/v1")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = empty_config();
    let args = vec![
        "gantt".to_string(),
        "--config".to_string(),
        config.path().display().to_string(),
        "--os-username".to_string(),
        "alice".to_string(),
        "--os-password".to_string(),
        "secret".to_string(),
        "--os-tenant-id".to_string(),
        TENANT.to_string(),
        "--os-auth-url".to_string(),
        auth_url(&server),
        "zone-show".to_string(),
        "3".to_string(),
    ];
    let out = run_to_string(args).await.unwrap();

    assert!(out.contains("| Property "));
    assert!(out.contains("| api_url "));
    assert!(out.contains("http://child:8774/v1"));
}

#[tokio::test]
async fn zone_update_sends_only_given_flags() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(scheduler_path("zones/8")))
        .and(body_json(serde_json::json!({"zone": {"username": "ops"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "zone": {"id": 8, "api_url": "http://child", "username": "ops"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let out = run_to_string(token_args(
        &config,
        &url,
        &["zone-update", "8", "--username", "ops"],
    ))
    .await
    .unwrap();
    assert!(out.contains("| username "));
    assert!(out.contains("ops"));
}

#[tokio::test]
async fn zone_update_without_changes_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let err = run_to_string(token_args(&config, &url, &["zone-update", "8"]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "zone-update: nothing to change");
}

#[tokio::test]
async fn zone_delete_prints_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(scheduler_path("zones/2")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let out = run_to_string(token_args(&config, &url, &["zone-delete", "2"]))
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn token_get_prints_token_service_url_and_expiry() {
    let server = MockServer::start().await;
    mount_identity(&server, TOKEN).await;

    let mut config = empty_config();
    writeln!(
        config,
        "[auth]\nusername = \"alice\"\npassword = \"secret\"\ntenant_id = \"{TENANT}\"\nauth_url = \"{}\"",
        auth_url(&server)
    )
    .unwrap();

    let args = vec![
        "gantt".to_string(),
        "--config".to_string(),
        config.path().display().to_string(),
        "token-get".to_string(),
    ];
    let out = run_to_string(args).await.unwrap();

    assert!(out.contains("| token       | "));
    assert!(out.contains(TOKEN));
    assert!(out.contains("| expires     | 2030-01-01T00:00:00+00:00"));
    assert!(out.contains(&format!("{}/", scheduler_url(&server))));
}

#[tokio::test]
async fn missing_credentials_name_the_flags() {
    let config = empty_config();
    let args = vec![
        "gantt".to_string(),
        "--config".to_string(),
        config.path().display().to_string(),
        "--os-username".to_string(),
        "alice".to_string(),
        "--os-auth-url".to_string(),
        "http://auth.invalid/v2.0".to_string(),
        "zone-list".to_string(),
    ];
    let err = run_to_string(args).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("--os-password or OS_PASSWORD"), "{message}");
}

#[tokio::test]
async fn token_and_url_win_over_password_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(scheduler_path("zones")))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"zones": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let auth = auth_url(&server);
    let args = token_args(
        &config,
        &url,
        &[
            "--os-username",
            "alice",
            "--os-password",
            "secret",
            "--os-auth-url",
            &auth,
            "zone-list",
        ],
    );
    let out = run_to_string(args).await.unwrap();
    assert!(out.contains("| ID | API URL"));
}

#[tokio::test]
async fn failed_output_flush_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(scheduler_path("zones")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"zones": []})))
        .mount(&server)
        .await;

    let config = empty_config();
    let url = scheduler_url(&server);
    let cli = parse_isolated(token_args(&config, &url, &["zone-list"])).unwrap();
    let mut out = BrokenPipe(Vec::new());
    let err = gantt_cli::run(cli, &mut out).await.unwrap_err();

    assert_eq!(err.to_string(), "failed to write output");
    assert!(!out.0.is_empty());
}

#[tokio::test]
async fn named_config_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let args = vec![
        "gantt".to_string(),
        "--config".to_string(),
        missing.display().to_string(),
        "zone-list".to_string(),
    ];
    let err = run_to_string(args).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("absent.toml"), "{message}");
}
