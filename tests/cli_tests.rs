// ABOUTME: Integration tests for the CLI application
// ABOUTME: Runs the built binary against temp-dir definitions and checks output and exit status

use std::process::{Command, Output};

mod common;
use common::{TestDefinitionBuilder, TestEnvironment, TestTemplate};

fn kompoze(env: &TestEnvironment, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kompoze"))
        .args(args)
        .current_dir(env.path())
        .env_remove("RUST_LOG")
        .env_remove("KOMPOZE_DELIMS")
        .env_remove("KOMPOZE_MAX_CONCURRENT")
        .env_remove("KOMPOZE_LOG_LEVEL")
        .env_remove("KOMPOZE_LOG_FORMAT")
        .output()
        .expect("Failed to execute kompoze")
}

#[tokio::test]
async fn test_cli_help_command() {
    let env = TestEnvironment::new();
    let output = kompoze(&env, &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kompoze"));
    assert!(stdout.contains("--no-overwrite"));
    assert!(stdout.contains("--delims"));
}

#[tokio::test]
async fn test_cli_version_command() {
    let env = TestEnvironment::new();
    let output = kompoze(&env, &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_cli_renders_default_definition() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "Env=<<env>> Name=<<name>>").await;
    env.create_definition_file(
        "definition.toml",
        &TestDefinitionBuilder::new()
            .with_global("env", "prod")
            .with_template(
                TestTemplate::new("t.tmpl", "out.txt")
                    .with_local("env", "dev")
                    .with_local("name", "svc"),
            ),
    )
    .await;

    let output = kompoze(&env, &["-D", "<<:>>"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(env.read_file("out.txt").await, "Env=prod Name=svc");
}

#[tokio::test]
async fn test_cli_stdout_flag_writes_to_stdout() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "image={{image}}\n").await;
    env.create_definition_file(
        "stack.toml",
        &TestDefinitionBuilder::new()
            .with_global("image", "nginx:1.25")
            .add_template("t.tmpl", "stack.yml"),
    )
    .await;

    let output = kompoze(&env, &["-s", "stack.toml"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "image=nginx:1.25\n");
    assert!(!env.path().join("stack.yml").exists());
}

#[tokio::test]
async fn test_cli_empty_dest_writes_to_stdout() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "hello").await;
    env.create_definition_file(
        "definition.toml",
        &TestDefinitionBuilder::new().add_template("t.tmpl", ""),
    )
    .await;

    let output = kompoze(&env, &[]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello");
}

#[tokio::test]
async fn test_cli_no_overwrite_keeps_existing_file() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "fresh").await;
    env.write_file("out.txt", "existing").await;
    env.create_definition_file(
        "definition.toml",
        &TestDefinitionBuilder::new().add_template("t.tmpl", "out.txt"),
    )
    .await;

    let output = kompoze(&env, &["-n"]);

    assert!(output.status.success());
    assert_eq!(env.read_file("out.txt").await, "existing");
}

#[tokio::test]
async fn test_cli_no_overwrite_with_stdout_skips_existing_destination() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "fresh").await;
    env.write_file("out.txt", "existing").await;
    env.create_definition_file(
        "definition.toml",
        &TestDefinitionBuilder::new().add_template("t.tmpl", "out.txt"),
    )
    .await;

    let output = kompoze(&env, &["-n", "-s"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(env.read_file("out.txt").await, "existing");
}

#[tokio::test]
async fn test_cli_base_path_resolves_relative_paths() {
    let env = TestEnvironment::new();
    env.write_file("project/t.tmpl", "based").await;
    env.create_definition_file(
        "project/definition.toml",
        &TestDefinitionBuilder::new().add_template("t.tmpl", "build/out.txt"),
    )
    .await;

    let output = kompoze(&env, &["-b", "project"]);

    assert!(output.status.success());
    assert_eq!(env.read_file("project/build/out.txt").await, "based");
}

#[tokio::test]
async fn test_cli_missing_definition_fails() {
    let env = TestEnvironment::new();
    let output = kompoze(&env, &["absent.toml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.toml"));
}

#[tokio::test]
async fn test_cli_bad_delimiters_fail() {
    let env = TestEnvironment::new();
    let output = kompoze(&env, &["-D", "nocolon"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Bad delimiters argument"));
}

#[tokio::test]
async fn test_cli_keep_going_still_fails_but_renders_the_rest() {
    let env = TestEnvironment::new();
    env.write_file("t.tmpl", "ok").await;
    env.write_file("broken.toml", "templates = []\n").await;
    env.create_definition_file(
        "good.toml",
        &TestDefinitionBuilder::new().add_template("t.tmpl", "good.txt"),
    )
    .await;

    let output = kompoze(
        &env,
        &["--keep-going", "--max-concurrent", "1", "broken.toml", "good.toml"],
    );

    assert!(!output.status.success());
    assert_eq!(env.read_file("good.txt").await, "ok");
}

#[tokio::test]
async fn test_cli_reads_config_file() {
    let env = TestEnvironment::new();
    env.write_file("kompoze.yaml", "delimiters: \"[[:]]\"\n").await;
    env.write_file("t.tmpl", "v=[[ value ]] {{kept}}").await;
    env.create_definition_file(
        "definition.toml",
        &TestDefinitionBuilder::new()
            .with_global("value", "42")
            .add_template("t.tmpl", "out.txt"),
    )
    .await;

    let output = kompoze(&env, &[]);

    assert!(output.status.success());
    assert_eq!(env.read_file("out.txt").await, "v=42 {{kept}}");
}
