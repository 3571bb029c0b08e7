//! End-to-end tests for the `taskerrand` binary.

mod support;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use support::{Mock, SEEKER};

/// A `taskerrand` command isolated from the caller's environment and config.
fn taskerrand(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("taskerrand");
    cmd.current_dir(dir.path())
        .env_remove("TASKERRAND_TOKEN")
        .env_remove("TASKERRAND_TOKEN_COMMAND")
        .env_remove("TASKERRAND_API_URL")
        .env_remove("TASKERRAND_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("taskerrand.toml"));
    cmd
}

/// Run off the async runtime so the mock backend keeps serving.
async fn run(mut cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("browse"))
            .stdout(predicate::str::contains("notifications"));
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_bad_status_filter_is_rejected() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .args(["dashboard", "--status", "finished"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid task status"));
    }
}

mod config {
    use super::*;

    #[test]
    fn test_init_creates_file() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let content = fs::read_to_string(dir.path().join("taskerrand.toml")).unwrap();
        assert!(content.contains("[api]"));
        assert!(content.contains("base_url"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taskerrand.toml"), "[poll]\ninterval_secs = 9\n").unwrap();
        taskerrand(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
        let content = fs::read_to_string(dir.path().join("taskerrand.toml")).unwrap();
        assert!(content.contains("interval_secs = 9"));
    }

    #[test]
    fn test_show_redacts_token() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .env("TASKERRAND_TOKEN", "eyJhbGciOiJSUzI1NiJ9.secret")
            .env("TASKERRAND_API_URL", "http://api.example.test")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://api.example.test"))
            .stdout(predicate::str::contains("********"))
            .stdout(predicate::str::contains("secret").not());
    }

    #[test]
    fn test_show_lists_validation_warnings() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taskerrand.toml"), "[poll]\ninterval_secs = 0\n").unwrap();
        taskerrand(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings:"))
            .stdout(predicate::str::contains("poll.interval_secs must be at least 1"));
    }
}

mod auth {
    use super::*;

    #[test]
    fn test_missing_token_reports_signed_out() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .args(["--api-url", "http://127.0.0.1:9", "whoami"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not signed in"));
    }

    #[test]
    fn test_failing_token_command_reports_signed_out() {
        let dir = TempDir::new().unwrap();
        taskerrand(&dir)
            .env("TASKERRAND_TOKEN_COMMAND", "exit 3")
            .args(["--api-url", "http://127.0.0.1:9", "browse"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not signed in"));
    }
}

mod against_backend {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_browse_lists_available_tasks() {
        let mock = Mock::new();
        mock.add_task("Buy groceries", "available", None);
        mock.add_task("Walk the dog", "ongoing", Some(SEEKER));
        let base = mock.spawn().await;
        let dir = TempDir::new().unwrap();

        let mut cmd = taskerrand(&dir);
        cmd.env("TASKERRAND_TOKEN", "seeker")
            .args(["--api-url", base.as_str(), "browse"]);
        run(cmd)
            .await
            .assert()
            .success()
            .stdout(predicate::str::contains("Buy groceries"))
            .stdout(predicate::str::contains("Ana Cruz"))
            .stdout(predicate::str::contains("Walk the dog").not());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_accept_with_yes_skips_prompt() {
        let mock = Mock::new();
        let task_id = mock.add_task("Buy groceries", "available", None);
        let base = mock.spawn().await;
        let dir = TempDir::new().unwrap();

        let mut cmd = taskerrand(&dir);
        cmd.env("TASKERRAND_TOKEN", "seeker").args([
            "--api-url",
            base.as_str(),
            "task",
            "accept",
            task_id.to_string().as_str(),
            "--yes",
        ]);
        run(cmd)
            .await
            .assert()
            .success()
            .stdout(predicate::str::contains("Task accepted successfully!"))
            .stdout(predicate::str::contains("[ongoing]"));
        assert_eq!(mock.task(task_id).unwrap()["seeker_id"], SEEKER);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_admin_commands_refuse_regular_users() {
        let mock = Mock::new();
        let base = mock.spawn().await;
        let dir = TempDir::new().unwrap();

        let mut cmd = taskerrand(&dir);
        cmd.env("TASKERRAND_TOKEN", "seeker")
            .args(["--api-url", base.as_str(), "admin", "stats"]);
        run(cmd)
            .await
            .assert()
            .failure()
            .stderr(predicate::str::contains("Access denied. Admin privileges required."));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_post_prints_dashboard_hint() {
        let mock = Mock::new();
        let base = mock.spawn().await;
        let dir = TempDir::new().unwrap();
        let schedule = (chrono::Local::now() + chrono::Duration::days(2))
            .format("%Y-%m-%dT09:30")
            .to_string();

        let mut cmd = taskerrand(&dir);
        cmd.env("TASKERRAND_TOKEN", "poster").args([
            "--api-url",
            base.as_str(),
            "post",
            "--title",
            "Buy groceries",
            "--description",
            "Milk and eggs",
            "--payment",
            "150.50",
            "--contact",
            "09171234567",
            "--address",
            "Cubao",
            "--lat",
            "14.62",
            "--lng",
            "121.05",
            "--schedule",
            schedule.as_str(),
        ]);
        run(cmd)
            .await
            .assert()
            .success()
            .stdout(predicate::str::contains("Task posted successfully!"))
            .stdout(predicate::str::contains("taskerrand dashboard"));
        assert_eq!(mock.calls("POST /api/tasks"), 1);
    }
}
