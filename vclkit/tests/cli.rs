use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const UNFORMATTED: &str = "sub vcl_recv{\nif(req.http.A){esi;}elsif(req.http.B){restart;}\n}";
const FORMATTED: &str = "sub vcl_recv {\n  if (req.http.A) {\n    esi;\n  } elsif (req.http.B) {\n    restart;\n  }\n}\n";

fn vcl_file(body: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".vcl").tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

fn vclkit(args: &[&str], path: &Path) -> Output {
    // Use the compiled binary directly
    Command::new(env!("CARGO_BIN_EXE_vclkit"))
        .args(args)
        .arg(path)
        .output()
        .expect("Failed to run vclkit")
}

#[test]
fn test_fmt_prints_formatted_source() {
    let file = vcl_file(UNFORMATTED);
    let output = vclkit(&["fmt"], file.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), FORMATTED);
}

#[test]
fn test_fmt_style_override() {
    let file = vcl_file(UNFORMATTED);
    let output = vclkit(&["fmt", "--style", "ElseIf=true", "--style", "IndentStyle=tab"], file.path());
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "sub vcl_recv {\n\tif (req.http.A) {\n\t\tesi;\n\t} else if (req.http.B) {\n\t\trestart;\n\t}\n}\n"
    );
}

#[test]
fn test_fmt_config_file() {
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(config, "ElseIf = true\nIndentWidth = 4").unwrap();
    let file = vcl_file(UNFORMATTED);

    let config_path = config.path().to_str().unwrap().to_string();
    let output = vclkit(&["fmt", "--config", &config_path], file.path());
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "sub vcl_recv {\n    if (req.http.A) {\n        esi;\n    } else if (req.http.B) {\n        restart;\n    }\n}\n"
    );
}

#[test]
fn test_unknown_style_option_fails() {
    let file = vcl_file(UNFORMATTED);
    let output = vclkit(&["fmt", "--style", "Fancy=true"], file.path());
    assert!(!output.status.success());
}

#[test]
fn test_fmt_write_rewrites_file() {
    let file = vcl_file(UNFORMATTED);
    let output = vclkit(&["fmt", "--write"], file.path());
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), FORMATTED);
}

#[test]
fn test_check() {
    let formatted = vcl_file(FORMATTED);
    assert!(vclkit(&["check"], formatted.path()).status.success());

    let unformatted = vcl_file(UNFORMATTED);
    let output = vclkit(&["check"], unformatted.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Would reformat"));
}

#[test]
fn test_parse_error_exits_with_failure() {
    let file = vcl_file("sub vcl_recv {\n  set req.http.A = \"b\"\n}\n");
    let output = vclkit(&["fmt"], file.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected `;`"));
}

#[test]
fn test_parse_dumps_json() {
    let file = vcl_file("sub vcl_recv { esi; }");
    let output = vclkit(&["parse"], file.path());
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["statements"][0]["kind"], "Subroutine");
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = vclkit(&["check"], &dir.path().join("missing.vcl"));
    assert!(!output.status.success());
}

#[test]
fn test_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_vclkit"))
        .arg("version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("vclkit v"));
}
