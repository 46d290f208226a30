#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs the archiefbeheer binary against a private config file
pub struct ArchiefTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl ArchiefTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        ArchiefTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_archiefbeheer"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("ARCHIEFBEHEER_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("ARCHIEFBEHEER_BASE_URL")
            .env_remove("ARCHIEFBEHEER_SESSION_ID")
            .env_remove("ARCHIEFBEHEER_CSRF_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute archiefbeheer command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config file")
    }
}

/// Serve `app` on an ephemeral local port
pub async fn spawn_server(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    addr
}

/// A records payload as the server returns it
pub fn zaken_payload(zaken: &[(&str, &str, &str)]) -> serde_json::Value {
    let zaken: Vec<serde_json::Value> = zaken
        .iter()
        .map(|(url, identificatie, zaaktype)| {
            serde_json::json!({
                "url": url,
                "identificatie": identificatie,
                "omschrijving": "Aanvraag",
                "zaaktype": { "url": zaaktype, "omschrijving": "Vergunning" },
                "bronorganisatie": "123456782",
                "startdatum": "2020-01-15",
                "einddatum": "2020-03-01",
                "archiefnominatie": "vernietigen",
                "archiefactiedatum": "2023-03-01",
                "available": true,
            })
        })
        .collect();
    serde_json::json!({ "zaken": zaken })
}

/// Bootstrap document pointing at a server on `addr`
pub fn bootstrap_json(addr: SocketAddr) -> String {
    serde_json::json!({
        "zaaktype-choices": [
            ["Vergunning", [
                ["https://zaaktypen/1", "Vergunning (2020)"],
                ["https://zaaktypen/2", "Vergunning (2022)"]
            ]],
            ["Melding", [["https://zaaktypen/3", "Melding"]]]
        ],
        "reviewer-choices": [["", "-----"], [1, "Bob"], [2, "Carol"]],
        "short-review-zaaktypes": [],
        "dataset": {
            "zakenUrl": format!("http://{addr}/vernietigen/_fetch-zaken"),
            "url": format!("http://{addr}/vernietigen/lijsten/toevoegen"),
            "currentDate": "2024-05-01",
            "exportZakenUrl": format!("http://{addr}/vernietigen/export/"),
            "csrftoken": "page-token"
        }
    })
    .to_string()
}
