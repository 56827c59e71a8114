/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;

use crate::common;
use doctrans::app_config::{
    ensure_disjoint_roots, expand_tilde, Config, LogLevel, TranslationProvider,
};

#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ru");
    assert_eq!(config.workers, 5);
    assert_eq!(config.translation.provider, TranslationProvider::Google);
    assert!(config.source_dir.ends_with("blfs-book"));
    assert!(config.destination_dir.ends_with("blfs-ru"));
}

#[test]
fn test_config_fromPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(
        r#"{ "target_language": "de", "workers": 8, "translation": { "provider": "ollama" } }"#,
    )?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "de");
    assert_eq!(config.workers, 8);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert!(matches!(config.log_level, LogLevel::Info));
    Ok(())
}

#[test]
fn test_config_serialization_shouldRoundTripThroughJson() -> Result<()> {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed.source_dir, config.source_dir);
    assert_eq!(parsed.translation.available_providers.len(), 2);
    Ok(())
}

#[test]
fn test_validate_withSeparateDirectories_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(
        &temp_dir.path().join("book"),
        &temp_dir.path().join("book-ru"),
        3,
    );
    config.validate()?;
    Ok(())
}

#[test]
fn test_validate_withInvalidLanguage_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config =
        common::test_config(&temp_dir.path().join("a"), &temp_dir.path().join("b"), 1);
    config.target_language = "xx".to_string();

    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_validate_withZeroWorkers_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(&temp_dir.path().join("a"), &temp_dir.path().join("b"), 0);

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("workers"));
    Ok(())
}

#[test]
fn test_validate_withSameLanguages_shouldOnlyWarn() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config =
        common::test_config(&temp_dir.path().join("a"), &temp_dir.path().join("b"), 1);
    config.target_language = "en".to_string();

    config.validate()?;
    Ok(())
}

#[test]
fn test_validate_withIdenticalDirectories_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("book");
    let config = common::test_config(&root, &root.join("."), 1);

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("must differ"));
    Ok(())
}

#[test]
fn test_validate_withDestinationInsideSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("book");
    let config = common::test_config(&root, &root.join("translated"), 1);

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("inside the source tree"));
    Ok(())
}

#[test]
fn test_validate_withSourceInsideDestination_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = temp_dir.path().join("x/book");
    common::create_test_file(&book, "en/index.html", b"<p>Hello</p>")?;
    let config = common::test_config(&book.join("en"), &book, 1);

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("inside the destination"));
    assert!(book.join("en/index.html").is_file());
    Ok(())
}

#[test]
fn test_ensure_disjoint_roots_withSharedNamePrefix_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("book");
    let destination = temp_dir.path().join("book-ru");

    ensure_disjoint_roots(&source, &destination)?;
    ensure_disjoint_roots(&destination, &source)?;
    Ok(())
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config =
        common::test_config(&temp_dir.path().join("a"), &temp_dir.path().join("b"), 1);
    config.translation.available_providers[0].endpoint = "not a url".to_string();

    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_set_model_withActiveProvider_shouldUpdateModel() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.set_model("qwen2.5:7b");

    assert_eq!(config.translation.get_model(), "qwen2.5:7b");
}

#[test]
fn test_set_model_withMissingProviderEntry_shouldAddOne() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.set_model("mistral");

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "mistral");
    assert_eq!(config.translation.get_timeout_secs(), 120);
}

#[test]
fn test_expand_tilde_withHomePrefix_shouldUseHomeDirectory() {
    if let Some(home) = dirs::home_dir() {
        assert_eq!(expand_tilde("~/public_html"), home.join("public_html"));
    }
    assert_eq!(expand_tilde("/srv/book"), std::path::PathBuf::from("/srv/book"));
}
