//! End-to-end checks of the `apload` binary's output streams.

use std::io::Write;
use std::process::Command;

use serde_json::Value;

fn export_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("fbl1n_cli_")
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_preview_stdout_is_only_json() {
    let file = export_file("1,X,,,,,,,,,,,,,\"10,00\"\n,Y\n2,Z,,,,,,,,,,,,,5.5\n");

    let output = Command::new(env!("CARGO_BIN_EXE_apload"))
        .arg("preview")
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["removedSociedad"], 1);
    assert_eq!(json["totalFilas"], 2);
    assert_eq!(json["sumaO"], 15.5);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Read 3 rows"));
}

#[test]
fn test_unsupported_extension_fails_on_stderr() {
    let file = tempfile::Builder::new().suffix(".ods").tempfile().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_apload"))
        .arg("preview")
        .arg(file.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("Formato no soportado"));
}
