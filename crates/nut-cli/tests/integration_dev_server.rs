//! Integration tests for the dev server launcher and its supervisor.
#![cfg(unix)]

use clap::Parser;
use nut_build::{DevServerSupervisor, Phase, ServerLauncher};
use nut_cli::cli::{Cli, Command, DevArgs};
use nut_cli::dev::DevLauncher;
use nut_settings::SettingsChange;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, oneshot, watch};

/// Project whose engine just idles, with prebuilt output in `dist/`.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("src/entries")).unwrap();
    fs::write(root.join("src/entries/index.js"), "export default 1;\n").unwrap();
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::write(root.join("dist/index.html"), "<h1>dev</h1>").unwrap();
    fs::write(
        root.join("nut.toml"),
        r#"
[featureMatrix.dev]
debug = true

[featureMatrix.stable]
debug = false

[build.engine]
program = "sh"
args = ["-c", "sleep 30"]

[devServer]
host = "127.0.0.1"

[devServer.headers]
x-nut-variant = "dev"
"#,
    )
    .unwrap();

    dir
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn dev_args(root: &Path, port: u16) -> DevArgs {
    let port = port.to_string();
    let cli = Cli::try_parse_from([
        "nut",
        "dev",
        "--cwd",
        root.to_str().unwrap(),
        "--port",
        port.as_str(),
    ])
    .unwrap();
    match cli.command {
        Command::Dev(args) => args,
        other => panic!("expected dev command, got {other:?}"),
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn wait_for(phases: &mut watch::Receiver<Phase>, want: Phase) {
    tokio::time::timeout(Duration::from_secs(10), phases.wait_for(|p| *p == want))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {want:?}"))
        .unwrap();
}

#[tokio::test]
async fn launcher_serves_output_with_configured_headers() {
    let dir = project();
    let port = free_port();
    let launcher = DevLauncher::new(dev_args(dir.path(), port), dir.path().to_path_buf());

    let server = launcher.launch().await.unwrap();

    let response = client()
        .get(format!("http://127.0.0.1:{port}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["x-nut-variant"], "dev");
    assert_eq!(response.text().await.unwrap(), "<h1>dev</h1>");

    server.stop().await.unwrap();
    assert!(client()
        .get(format!("http://127.0.0.1:{port}/"))
        .send()
        .await
        .is_err());
}

#[tokio::test]
async fn launcher_rejects_unknown_variant() {
    let dir = project();
    let mut args = dev_args(dir.path(), free_port());
    args.build_target = Some("nightly".to_string());

    let launcher = DevLauncher::new(args, dir.path().to_path_buf());
    let err = launcher.launch().await.err().unwrap();
    assert!(err.to_string().contains("nightly"));
}

#[tokio::test]
async fn supervisor_restarts_on_settings_change() {
    let dir = project();
    let port = free_port();
    let launcher = DevLauncher::new(dev_args(dir.path(), port), dir.path().to_path_buf());

    let supervisor = DevServerSupervisor::new(launcher);
    let mut phases = supervisor.subscribe();
    let (changes_tx, changes_rx) = mpsc::channel(4);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = tokio::spawn(supervisor.run(changes_rx, async {
        let _ = stop_rx.await;
    }));

    wait_for(&mut phases, Phase::Running).await;

    let settings = dir.path().join("nut.toml");
    let updated = fs::read_to_string(&settings)
        .unwrap()
        .replace(r#"x-nut-variant = "dev""#, r#"x-nut-variant = "restarted""#);
    fs::write(&settings, updated).unwrap();
    changes_tx
        .send(SettingsChange {
            path: settings.clone(),
        })
        .await
        .unwrap();

    // Only the latest phase is observable, so watch the served header instead
    let restarted = async {
        loop {
            if let Ok(response) = client()
                .get(format!("http://127.0.0.1:{port}/"))
                .send()
                .await
            {
                let header = response.headers().get("x-nut-variant");
                if header.is_some_and(|value| value == "restarted") {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), restarted)
        .await
        .unwrap();
    wait_for(&mut phases, Phase::Running).await;

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(*phases.borrow(), Phase::Stopped);
}
