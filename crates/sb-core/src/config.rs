use crate::error::ConfigError;
use crate::types::RepoRef;

/// Chat backend selected once at startup. Presence of `OPENAI_API_KEY`
/// picks the OpenAI-compatible backend, otherwise the local Ollama one.
#[derive(Debug, Clone)]
pub enum LlmBackendConfig {
    Ollama {
        base_url: String,
        model: String,
    },
    OpenAi {
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// Process configuration, read from the environment once at startup.
/// Credentials stay optional here: a missing credential fails the
/// operation that needs it, never the whole process.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub repo: Option<RepoRef>,
    pub base_branch: String,
    pub webhook_secret: Option<String>,
    pub github_token: Option<String>,
    pub linear_api_key: Option<String>,
    pub cursor_api_key: Option<String>,
    pub cursor_api_url: String,
    pub llm: LlmBackendConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let repo = match env_non_empty("GITHUB_REPO") {
            Some(value) => Some(parse_repo(&value)?),
            None => None,
        };
        let llm = match env_non_empty("OPENAI_API_KEY") {
            Some(api_key) => LlmBackendConfig::OpenAi {
                base_url: env_non_empty("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                api_key,
                model: env_non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            },
            None => LlmBackendConfig::Ollama {
                base_url: env_non_empty("OLLAMA_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                model: env_non_empty("OLLAMA_MODEL").unwrap_or_else(|| "llama3.2".to_string()),
            },
        };
        Ok(Self {
            port: env_non_empty("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(3000),
            repo,
            base_branch: env_non_empty("GITHUB_DEFAULT_BRANCH")
                .unwrap_or_else(|| "main".to_string()),
            webhook_secret: env_non_empty("LINEAR_WEBHOOK_SECRET"),
            github_token: env_non_empty("GITHUB_TOKEN"),
            linear_api_key: env_non_empty("LINEAR_API_KEY"),
            cursor_api_key: env_non_empty("CURSOR_API_KEY"),
            cursor_api_url: env_non_empty("CURSOR_AGENT_API_URL")
                .unwrap_or_else(|| "https://api.cursor.com".to_string()),
            llm,
        })
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Accepts `owner/repo` or a full GitHub URL, with or without `.git`.
pub fn parse_repo(value: &str) -> Result<RepoRef, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://github.com/")
        .or_else(|| trimmed.strip_prefix("http://github.com/"))
        .unwrap_or(trimmed);
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => Err(ConfigError::InvalidRepo {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slug() {
        let repo = parse_repo("octo/widgets").unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn parses_full_url() {
        let repo = parse_repo("https://github.com/octo/widgets.git").unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn parses_url_with_trailing_slash() {
        let repo = parse_repo("https://github.com/octo/widgets/").unwrap();
        assert_eq!(repo.to_string(), "octo/widgets");
    }

    #[test]
    fn rejects_bare_name() {
        assert!(parse_repo("widgets").is_err());
    }

    #[test]
    fn rejects_extra_segments() {
        assert!(parse_repo("octo/widgets/tree/main").is_err());
    }
}
