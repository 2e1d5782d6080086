use golearn_probe::config::{ConfigLoader, EnvironmentConfig};
use golearn_probe::http::BaseUrl;
use golearn_probe::{ProbeError, Result};

#[test]
fn test_config_error() {
    let err = ProbeError::ConfigError("unknown environment 'prod'".to_string());
    assert_eq!(err.to_string(), "配置错误: unknown environment 'prod'");
}

#[test]
fn test_invalid_url() {
    let err = BaseUrl::parse("ftp://files.example.com").unwrap_err();
    assert!(matches!(err, ProbeError::InvalidUrl(_)));
    assert!(err.to_string().starts_with("无效的 URL"));
}

#[test]
fn test_missing_config_file() {
    let err = ConfigLoader::load_from_path("/definitely/not/here/golearn-probe.toml").unwrap_err();
    assert!(matches!(err, ProbeError::ConfigError(_)));
}

#[test]
fn test_result_type() {
    fn build() -> Result<()> {
        let cli = EnvironmentConfig {
            base_url: Some("http://".to_string()),
            ..Default::default()
        };
        ConfigLoader::build(None, None, &cli, |_| None).map(|_| ())
    }

    assert!(build().is_err());
}
