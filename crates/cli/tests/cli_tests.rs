// End-to-end tests of the `verger` binary: exit codes, the --json stdout
// contract and a registry-then-reference import sequence.
//
// Run with: cargo test -p verger-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Scratch catalog with an empty config so the user's settings never leak in.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(settings: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), settings).unwrap();
        Self { dir }
    }

    /// Settings pointing the registry client at a mock server.
    fn with_registry(server: &MockServer) -> Self {
        Self::with_config(&format!("[hydroquebec]\nbase_url = \"{}\"\n", server.base_url()))
    }

    fn database(&self) -> PathBuf {
        self.dir.path().join("catalog.db")
    }

    fn verger(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_verger"))
            .args(args)
            .arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--database")
            .arg(self.database())
            .env_remove("VERGER_DATABASE")
            .env_remove("VERGER_CONFIG")
            .env("VERGER_LOG", "warn")
            .output()
            .expect("run verger")
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// stdout must be exactly one JSON document.
fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be valid JSON ({e}):\n{stdout}"))
}

#[test]
fn columns_lists_normalized_keys() {
    let ws = Workspace::new();
    let file = fixture("plants.csv");

    let val = stdout_json(&ws.verger(&["columns", path_arg(&file), "--json"]));

    assert_eq!(val["rows"], 2);
    let columns: Vec<&str> = val["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert!(columns.contains(&"latin_name"));
    assert!(columns.contains(&"common_name"));
    assert!(columns.contains(&"nitrogen_fixer"));
    assert!(val["identity_candidates"]["scientific"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "latin_name"));
}

#[test]
fn registry_then_reference_accumulates_zones() {
    let ws = Workspace::new();
    let registry = fixture("arbres.json");
    let reference = fixture("plants.csv");

    let first = stdout_json(&ws.verger(&[
        "import", "hydroquebec", "--file", path_arg(&registry), "--json",
    ]));
    assert_eq!(first["source"], "hydroquebec");
    assert_eq!(first["merge_mode"], "overwrite");
    assert_eq!(first["created"], 2);
    assert_eq!(first["skipped_empty_identity"], 1);

    let second = stdout_json(&ws.verger(&[
        "import", "pfaf", "--file", path_arg(&reference), "--json",
    ]));
    assert_eq!(second["merge_mode"], "fill_gaps");
    assert_eq!(second["created"], 1);
    assert_eq!(second["updated"], 1);

    let shown = stdout_json(&ws.verger(&["species", "show", "acer saccharinum", "--json"]));
    assert_eq!(shown["species"]["common_name"], "Érable argenté");
    assert_eq!(shown["primary_zone"], "4a");
    let zones = shown["species"]["hardiness_zones"].as_array().unwrap();
    assert_eq!(zones.len(), 2);
    assert!(zones.iter().any(|z| z["zone"] == "5b" && z["source"] == "pfaf"));
    // Registry values survive a fill_gaps pass.
    assert_eq!(shown["species"]["height_max"], 25.0);
}

#[test]
fn reimport_updates_instead_of_duplicating() {
    let ws = Workspace::new();
    let registry = fixture("arbres.json");
    let args = ["import", "hydroquebec", "--file", path_arg(&registry), "--json"];

    stdout_json(&ws.verger(&args));
    let again = stdout_json(&ws.verger(&args));

    assert_eq!(again["created"], 0);
    assert_eq!(again["updated"], 2);
}

#[test]
fn seed_import_creates_lots() {
    let ws = Workspace::new();
    let catalog = fixture("semences.csv");

    let report = stdout_json(&ws.verger(&[
        "import", "seeds", "--file", path_arg(&catalog), "--supplier", "Semences du Portage", "--json",
    ]));
    assert_eq!(report["created"], 1);
    assert_eq!(report["seed_lots"]["created"], 1);

    let shown = stdout_json(&ws.verger(&["species", "show", "Asclepias tuberosa", "--json"]));
    let lots = shown["seed_lots"].as_array().unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0]["lot_reference"], "AT-23");
    assert_eq!(lots[0]["supplier"], "Semences du Portage");

    let again = stdout_json(&ws.verger(&["import", "seeds", "--file", path_arg(&catalog), "--json"]));
    assert_eq!(again["seed_lots"]["skipped_existing"], 1);
}

#[test]
fn dry_run_leaves_no_database() {
    let ws = Workspace::new();
    let registry = fixture("arbres.json");

    let report = stdout_json(&ws.verger(&[
        "import", "hydroquebec", "--file", path_arg(&registry), "--dry-run", "--json",
    ]));

    assert_eq!(report["dry_run"], true);
    assert_eq!(report["created"], 2);
    assert!(!ws.database().exists());
}

#[test]
fn human_summary_goes_to_stderr() {
    let ws = Workspace::new();
    let registry = fixture("arbres.json");

    let output = ws.verger(&["import", "hydroquebec", "--file", path_arg(&registry)]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("created: 2"));
    assert!(stderr.contains("1 empty identity"));
}

#[test]
fn missing_file_exits_3() {
    let ws = Workspace::new();
    let absent = ws.dir.path().join("absent.csv");

    let output = ws.verger(&["import", "pfaf", "--file", path_arg(&absent)]);

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}

#[test]
fn unsupported_format_exits_5() {
    let ws = Workspace::new();
    let sheet = ws.dir.path().join("plants.xlsx");
    std::fs::write(&sheet, b"PK").unwrap();

    let output = ws.verger(&["import", "pfaf", "--file", path_arg(&sheet)]);

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn registry_rejects_csv() {
    let ws = Workspace::new();
    let reference = fixture("plants.csv");

    let output = ws.verger(&["import", "hydroquebec", "--file", path_arg(&reference)]);

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn broken_json_exits_4() {
    let ws = Workspace::new();
    let broken = ws.dir.path().join("arbres.json");
    std::fs::write(&broken, "[{\"nomLatin\": ").unwrap();

    let output = ws.verger(&["import", "hydroquebec", "--file", path_arg(&broken)]);

    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn unknown_species_exits_3() {
    let ws = Workspace::new();
    let registry = fixture("arbres.json");
    stdout_json(&ws.verger(&["import", "hydroquebec", "--file", path_arg(&registry), "--json"]));

    let output = ws.verger(&["species", "show", "Quercus alba"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_config_exits_8() {
    let ws = Workspace::new();
    std::fs::write(ws.dir.path().join("config.toml"), "[pfaf]\nmerge = \"replace\"\n").unwrap();

    let output = ws.verger(&["columns", path_arg(&fixture("plants.csv"))]);

    assert_eq!(output.status.code(), Some(8));
}

#[test]
fn bad_arguments_exit_2() {
    let ws = Workspace::new();

    let output = ws.verger(&["import", "pfaf", "--merge", "replace", "--file", "x.csv"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn registry_listing_is_paged_from_the_api() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/partiel/0/500");
        then.status(200).header("content-type", "application/json").json_body(json!([
            { "numeroFiche": 1, "nomLatin": "Acer rubrum", "nomFrancais": "Érable rouge", "zoneRusticite": "4a" },
            { "numeroFiche": 2, "nomLatin": "Betula papyrifera", "nomFrancais": "Bouleau à papier", "zoneRusticite": "2b" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/partiel/2/500");
        then.status(200).header("content-type", "application/json").json_body(json!([]));
    });
    let ws = Workspace::with_registry(&server);

    let report = stdout_json(&ws.verger(&["import", "hydroquebec", "--limit", "0", "--json"]));

    assert_eq!(report["rows"], 2);
    assert_eq!(report["created"], 2);
}

#[test]
fn enrichment_fills_saved_file_from_registry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/partiel/0/500");
        then.status(200).header("content-type", "application/json").json_body(json!([
            {
                "numeroFiche": 202,
                "nomLatin": "Acer saccharinum",
                "feuillesDescription": "Lobes profonds, revers argenté."
            }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/partiel/1/500");
        then.status(200).header("content-type", "application/json").json_body(json!([]));
    });
    let ws = Workspace::with_registry(&server);
    let registry = fixture("arbres.json");

    stdout_json(&ws.verger(&[
        "import", "hydroquebec", "--file", path_arg(&registry), "--enrich-from-api", "--json",
    ]));

    let shown = stdout_json(&ws.verger(&["species", "show", "Acer saccharinum", "--json"]));
    let description = shown["species"]["description"].as_str().unwrap();
    assert!(description.contains("Lobes profonds"), "{description}");
}

#[test]
fn unreachable_registry_falls_back_to_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/partiel/0/500");
        then.status(503);
    });
    let ws = Workspace::with_registry(&server);
    let registry = fixture("arbres.json");

    let report = stdout_json(&ws.verger(&[
        "import", "hydroquebec", "--file", path_arg(&registry), "--enrich-from-api", "--json",
    ]));

    assert_eq!(report["created"], 2);
}
