use axum::http::HeaderValue;
use dotenvy::dotenv;
use std::env;
use url::Url;

/// Origins the console accepts cross-origin requests from.
#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub backoffice_api_url: String,
    /// Bearer credential for non-interactive (CLI) calls to the backoffice.
    pub service_token: Option<String>,
    /// Days a READY_FOR_COLLECTION order may wait before it is flagged overdue.
    pub collection_grace_days: i64,
    pub allowed_origins: AllowedOrigins,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let backoffice_api_url = env::var("BACKOFFICE_API_URL")?;
        // Fail startup on a malformed endpoint rather than on the first request.
        Url::parse(&backoffice_api_url)?;

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            backoffice_api_url,
            service_token: env::var("CONSOLE_SERVICE_TOKEN").ok(),
            collection_grace_days: env::var("COLLECTION_GRACE_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()?,
            allowed_origins: parse_allowed_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            )?,
        })
    }
}

fn parse_allowed_origins(raw: &str) -> anyhow::Result<AllowedOrigins> {
    let value = raw.trim();
    if value == "*" {
        return Ok(AllowedOrigins::Any);
    }

    let origins = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        anyhow::bail!("ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(AllowedOrigins::List(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wildcard_origins() {
        assert!(matches!(
            parse_allowed_origins("*").unwrap(),
            AllowedOrigins::Any
        ));
        assert!(matches!(
            parse_allowed_origins("  *  ").unwrap(),
            AllowedOrigins::Any
        ));
    }

    #[test]
    fn parses_origin_list() {
        let parsed =
            parse_allowed_origins("https://console.example.com, https://admin.example.com")
                .unwrap();
        match parsed {
            AllowedOrigins::List(origins) => assert_eq!(origins.len(), 2),
            AllowedOrigins::Any => panic!("expected explicit origin list"),
        }
    }

    #[test]
    fn rejects_empty_origin_list() {
        assert!(parse_allowed_origins("").is_err());
        assert!(parse_allowed_origins(" , ").is_err());
    }
}
