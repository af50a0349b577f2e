use placement_pipeline::utils::validation::Validate;
use placement_pipeline::{Settings, TomlConfig};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[backend]
base_url = "http://localhost:5000"
token = "file-token"
timeout_seconds = 45

[export]
output_path = "./reports/pipeline.csv"
"#
    )
    .unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());

    let settings = Settings::from_file_config(&config);
    assert_eq!(settings.token.as_deref(), Some("file-token"));
    assert_eq!(settings.timeout_seconds, Some(45));
    assert_eq!(settings.export_path.as_deref(), Some("./reports/pipeline.csv"));

    let session = settings.session().unwrap();
    assert_eq!(
        session.endpoint("/api/officer/postings"),
        "http://localhost:5000/api/officer/postings"
    );
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = TomlConfig::from_file(dir.path().join("missing.toml"));
    assert!(result.is_err());
}
