use std::{env, path::Path, path::PathBuf, sync::OnceLock, time::Duration};

use regex::Regex;

use crate::{
    domain::{ChatId, ChatKind, TargetDestination},
    errors::Error,
    Result,
};

const PROXY_KEYS: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetaBaseConfig {
    pub project_key: String,
    pub base_name: String,
}

/// Typed configuration, read once at startup from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub target: TargetDestination,
    pub request_timeout: Duration,

    // Canned replies
    pub start_message: String,
    pub help_message: String,
    pub health_message: String,
    pub group_message: String,

    // Admin; `None` means nobody is restricted.
    pub admin_id: Option<String>,

    // Audit storage
    pub sqlite: Option<SqliteConfig>,
    pub deta_base: Option<DetaBaseConfig>,
    pub audit_write_timeout: Duration,

    // Proxy variables seen at startup (reported, never modified).
    pub proxy_env: Vec<(String, String)>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_env_file(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key);
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let get_bool = |key: &str| lookup(key).map(|s| parse_bool(&s)).unwrap_or(false);

        // Required
        let telegram_bot_token = get("TOKEN").unwrap_or_default().trim().to_string();
        validate_token(&telegram_bot_token)?;

        let raw_send_id = get("SEND_ID").unwrap_or_default();
        let target_chat = raw_send_id.trim().parse::<i64>().map_err(|_| {
            Error::Config(format!("SEND_ID [{raw_send_id}] is not an integer"))
        })?;
        let raw_send_type = get_or("SEND_TYPE", "group");
        let target_kind = ChatKind::parse(&raw_send_type).ok_or_else(|| {
            Error::Config(format!(
                "SEND_TYPE [{raw_send_type}] must be one of private, group, supergroup, channel"
            ))
        })?;

        let request_timeout =
            Duration::from_secs(parse_u64(get("REQUEST_TIMEOUT_SECS")).unwrap_or(50));

        let admin_id = get("ADMIN_ID").and_then(non_empty);

        // Storage sinks
        let sqlite = if get_bool("USE_SQLITE") {
            Some(SqliteConfig {
                path: PathBuf::from(get_or("SQLITE_PATH", "relaybot.db")),
            })
        } else {
            None
        };

        let deta_base = if get_bool("USE_DETA_BASE") {
            let project_key = get("DETA_BASE_KEY").and_then(non_empty);
            let base_name = get("DETA_BASE_NAME").and_then(non_empty);
            match (project_key, base_name) {
                (Some(project_key), Some(base_name)) => Some(DetaBaseConfig {
                    project_key,
                    base_name,
                }),
                _ => {
                    return Err(Error::Config(
                        "DETA_BASE_KEY or DETA_BASE_NAME is empty".to_string(),
                    ))
                }
            }
        } else {
            None
        };

        let audit_write_timeout =
            Duration::from_millis(parse_u64(get("AUDIT_WRITE_TIMEOUT_MS")).unwrap_or(5000));

        Ok(Self {
            telegram_bot_token,
            target: TargetDestination {
                chat_id: ChatId(target_chat),
                kind: target_kind,
            },
            request_timeout,
            start_message: get_or("START_MESSAGE", "welcome!"),
            help_message: get_or("HELP_MESSAGE", "help"),
            health_message: get_or("HEALTH_MESSAGE", "health"),
            group_message: get_or("GROUP_MESSAGE", "group"),
            admin_id,
            sqlite,
            deta_base,
            audit_write_timeout,
            proxy_env: collect_proxy_env(&lookup),
        })
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+:.*$").expect("static regex"))
}

pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::Config(
            "TOKEN environment variable is required".to_string(),
        ));
    }
    if !token_regex().is_match(token) {
        return Err(Error::Config(
            "Telegram bot token is incorrect: it doesn't comply with `^[0-9]+:.*$`. \
             Provide a correct token through the TOKEN environment variable"
                .to_string(),
        ));
    }
    Ok(())
}

/// NO_PROXY wins over everything else, matching how it is reported at startup.
fn collect_proxy_env(lookup: &impl Fn(&str) -> Option<String>) -> Vec<(String, String)> {
    for key in ["NO_PROXY", "no_proxy"] {
        if let Some(v) = lookup(key).and_then(non_empty) {
            return vec![(key.to_string(), v)];
        }
    }

    PROXY_KEYS
        .iter()
        .filter_map(|key| {
            lookup(key)
                .and_then(non_empty)
                .map(|v| (key.to_string(), v))
        })
        .collect()
}

/// Variables already present in the environment win over the file.
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("failed to read {}: {e}", path.display()))),
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    const BASE: [(&str, &str); 2] = [("TOKEN", "123456:abc-def"), ("SEND_ID", "-1001234")];

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let cfg = load(&BASE).unwrap();
        assert_eq!(cfg.target.chat_id, ChatId(-1001234));
        assert_eq!(cfg.target.kind, ChatKind::Group);
        assert_eq!(cfg.start_message, "welcome!");
        assert_eq!(cfg.help_message, "help");
        assert_eq!(cfg.health_message, "health");
        assert_eq!(cfg.group_message, "group");
        assert_eq!(cfg.admin_id, None);
        assert!(cfg.sqlite.is_none());
        assert!(cfg.deta_base.is_none());
        assert_eq!(cfg.request_timeout, Duration::from_secs(50));
        assert_eq!(cfg.audit_write_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn token_must_match_pattern() {
        assert!(validate_token("123:abc").is_ok());
        assert!(validate_token("123:").is_ok());
        assert!(matches!(validate_token(""), Err(Error::Config(_))));
        assert!(matches!(validate_token("abc:123"), Err(Error::Config(_))));
        assert!(matches!(validate_token("123456"), Err(Error::Config(_))));

        let err = load(&[("SEND_ID", "1")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn send_id_must_be_numeric() {
        let err = load(&[("TOKEN", "1:x"), ("SEND_ID", "chan")]).unwrap_err();
        assert!(err.to_string().contains("SEND_ID"));
    }

    #[test]
    fn empty_admin_id_means_unrestricted() {
        let mut pairs = BASE.to_vec();
        pairs.push(("ADMIN_ID", "  "));
        assert_eq!(load(&pairs).unwrap().admin_id, None);

        let mut pairs = BASE.to_vec();
        pairs.push(("ADMIN_ID", "42"));
        assert_eq!(load(&pairs).unwrap().admin_id.as_deref(), Some("42"));
    }

    #[test]
    fn storage_toggles() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("USE_SQLITE", "yes"), ("SQLITE_PATH", "/tmp/a.db")]);
        let cfg = load(&pairs).unwrap();
        assert_eq!(
            cfg.sqlite,
            Some(SqliteConfig {
                path: PathBuf::from("/tmp/a.db")
            })
        );

        let mut pairs = BASE.to_vec();
        pairs.extend([("USE_DETA_BASE", "yes"), ("DETA_BASE_KEY", "abc_def")]);
        assert!(matches!(load(&pairs), Err(Error::Config(_))));

        pairs.push(("DETA_BASE_NAME", "relay"));
        let cfg = load(&pairs).unwrap();
        assert_eq!(cfg.deta_base.unwrap().base_name, "relay");

        let mut pairs = BASE.to_vec();
        pairs.push(("USE_DETA_BASE", "no"));
        assert!(load(&pairs).unwrap().deta_base.is_none());
    }

    #[test]
    fn no_proxy_shadows_other_proxy_vars() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("HTTPS_PROXY", "http://p:1"), ("all_proxy", "socks5://q:2")]);
        let cfg = load(&pairs).unwrap();
        assert_eq!(
            cfg.proxy_env,
            vec![
                ("HTTPS_PROXY".to_string(), "http://p:1".to_string()),
                ("all_proxy".to_string(), "socks5://q:2".to_string()),
            ]
        );

        pairs.push(("no_proxy", "*"));
        let cfg = load(&pairs).unwrap();
        assert_eq!(
            cfg.proxy_env,
            vec![("no_proxy".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn env_file_fills_gaps_without_overriding() {
        let path = env::temp_dir().join(format!("relaybot-env-{}.env", std::process::id()));
        std::fs::write(
            &path,
            "# relay settings\n\
             export RELAYBOT_TEST_EXPORTED=from_file\n\
             RELAYBOT_TEST_PRESET=\"from_file\"\n",
        )
        .unwrap();
        env::set_var("RELAYBOT_TEST_PRESET", "from_env");

        load_env_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(env::var("RELAYBOT_TEST_EXPORTED").unwrap(), "from_file");
        assert_eq!(env::var("RELAYBOT_TEST_PRESET").unwrap(), "from_env");
    }

    #[test]
    fn missing_env_file_is_fine() {
        assert!(load_env_file(Path::new("/nonexistent/relaybot/.env")).is_ok());
    }
}
