use crate::http::{BaseUrl, DEFAULT_TIMEOUT};
use crate::session::AccessCodes;
use crate::{ProbeError, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_API_PREFIX: &str = "api";

pub const ENV_BASE_URL: &str = "GOLEARN_BASE_URL";
pub const ENV_USER_CODE: &str = "GOLEARN_USER_CODE";
pub const ENV_ADMIN_CODE: &str = "GOLEARN_ADMIN_CODE";

/// 单个环境的配置，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_code: Option<String>,
    pub admin_code: Option<String>,
}

impl EnvironmentConfig {
    /// 用 `other` 中已设置的字段覆盖当前值
    fn merge(&mut self, other: &EnvironmentConfig) {
        if other.base_url.is_some() {
            self.base_url.clone_from(&other.base_url);
        }
        if other.api_prefix.is_some() {
            self.api_prefix.clone_from(&other.api_prefix);
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.user_code.is_some() {
            self.user_code.clone_from(&other.user_code);
        }
        if other.admin_code.is_some() {
            self.admin_code.clone_from(&other.admin_code);
        }
    }
}

/// 完整的配置文件 `golearn-probe.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub default_env: Option<String>,

    #[serde(default)]
    pub environments: HashMap<String, EnvironmentConfig>,
}

impl ConfigFile {
    pub fn get_environment(&self, env_name: &str) -> Option<&EnvironmentConfig> {
        self.environments.get(env_name)
    }
}

/// 解析完成、可直接使用的运行配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub base_url: BaseUrl,
    pub api_prefix: String,
    pub timeout: Duration,
    pub codes: AccessCodes,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::default(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            codes: AccessCodes::default(),
        }
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "golearn-probe.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProbeError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ProbeError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// 查找配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/golearn-probe/
    pub fn find() -> Option<PathBuf> {
        Self::find_in_ancestors(&std::env::current_dir().ok()?).or_else(Self::find_in_user_dir)
    }

    fn find_in_ancestors(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(Self::CONFIG_FILE))
            .find(|path| path.is_file())
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let path = dirs::home_dir()?
            .join(".config")
            .join("golearn-probe")
            .join(Self::CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// 构建运行配置
    ///
    /// 优先级（低到高）：内置默认值 → 配置文件环境 → 系统环境变量 → CLI 参数。
    /// `lookup` 用于读取系统环境变量，测试中可替换。
    pub fn build(
        file: Option<&ConfigFile>,
        env_name: Option<&str>,
        cli: &EnvironmentConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ProbeConfig> {
        let mut merged = EnvironmentConfig::default();

        // 1. 配置文件
        let selected = env_name.or(file.and_then(|f| f.default_env.as_deref()));
        if let Some(name) = selected {
            let env = file
                .and_then(|f| f.get_environment(name))
                .ok_or_else(|| ProbeError::ConfigError(format!("unknown environment '{}'", name)))?;
            merged.merge(env);
        }

        // 2. 系统环境变量
        merged.merge(&EnvironmentConfig {
            base_url: lookup(ENV_BASE_URL),
            api_prefix: None,
            timeout_secs: None,
            user_code: lookup(ENV_USER_CODE),
            admin_code: lookup(ENV_ADMIN_CODE),
        });

        // 3. CLI 覆盖（优先级最高）
        merged.merge(cli);

        let resolve = |value: &str| resolve_env_vars(value, &lookup);
        let defaults = ProbeConfig::default();

        let base_url = match merged.base_url.as_deref() {
            Some(url) => BaseUrl::parse(&resolve(url))?,
            None => defaults.base_url,
        };

        let timeout = match merged.timeout_secs {
            Some(0) => {
                return Err(ProbeError::ConfigError(
                    "timeout_secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(ProbeConfig {
            base_url,
            api_prefix: merged
                .api_prefix
                .map(|p| resolve(&p).trim_matches('/').to_string())
                .unwrap_or(defaults.api_prefix),
            timeout,
            codes: AccessCodes {
                user: merged.user_code.map(|c| resolve(&c)).unwrap_or(defaults.codes.user),
                admin: merged.admin_code.map(|c| resolve(&c)).unwrap_or(defaults.codes.admin),
            },
        })
    }
}

/// 解析并替换系统环境变量 ${VAR}；未找到的变量保持原样
pub fn resolve_env_vars(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(text, |caps: &Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .to_string()
}

/// 读取真实进程环境
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
