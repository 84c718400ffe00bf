//! Integration tests for configuration loading

use coco_passport::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[rooms]
numbered = ["C1", "C2"]
named = ["Sunset Villa", "Garden"]

[surname]
connectors = ["ten", "van"]

[tour]
beach_url = "https://videos.test/beach"

[intake]
source = "front_desk"
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.numbered_rooms(), &["C1".to_string(), "C2".to_string()]);
    assert_eq!(config.named_rooms().len(), 2);
    assert_eq!(config.connectors(), &["ten".to_string(), "van".to_string()]);
    assert_eq!(config.tour_urls().beach_url, "https://videos.test/beach");
    assert_eq!(config.tour_urls().jungle_url, "https://youtu.be/b15Vj5_3Tuc");
    assert_eq!(config.intake_source(), "front_desk");
    assert_eq!(config.config_file(), temp_file.path().display().to_string());

    let resolver = config.resolver();
    let r = resolver.resolve("garden c2 sunset villa ten Bosch");
    assert_eq!(r.stay_id, "C2_Sunset_Villa_Garden_tenBosch");
    assert_eq!(resolver.resolve("A4 Smith").stay_id, "A4Smith");
}

#[test]
fn test_partial_sections_keep_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[intake]\nsource = \"whatsapp\"\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config.intake_source(), "whatsapp");
    assert_eq!(config.numbered_rooms().len(), 11);
    assert_eq!(config.resolver().resolve("New House Smith").stay_id, "New_House_Smith");
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[rooms\nnumbered = 4").unwrap();
    temp_file.flush().unwrap();

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{err}").contains("Failed to parse config file"));
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.config_file(), "default");
    assert_eq!(config.intake_source(), "mrz_batch");
    assert_eq!(config.resolver().resolve("a4 smith").stay_id, "A4_Smith");
}
