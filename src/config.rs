use crate::error::MenuError;

const DEFAULT_PDF_URL: &str =
    "https://www.stw.berlin/assets/speiseplaene/526/aktuelle_woche_de.pdf";

/// Runtime configuration, loaded from environment variables by the driver.
/// The parsing core only consumes the filter lists and the debug flag; the
/// rest belongs to the download and mail layers.
#[derive(Debug, Clone)]
pub struct Config {
    pub pdf_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_email: String,
    pub smtp_password: String,
    pub recipients: Vec<String>,
    pub filter_words: Vec<String>,
    pub filter_allergens: Vec<String>,
    pub debug: bool,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, MenuError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Split out from [`Config::from_env`] so
    /// tests can supply variables without touching the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, MenuError> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| MenuError::Config(format!("{key} is not set")))
        };

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| MenuError::Config(format!("SMTP_PORT is not a port: {raw:?}")))?,
            None => 465,
        };

        let recipients = split_list(&get("RECIPIENTS").unwrap_or_default());
        if recipients.is_empty() {
            return Err(MenuError::Config("RECIPIENTS is empty".to_string()));
        }

        Ok(Config {
            pdf_url: get("MENSA_PDF_URL").unwrap_or_else(|| DEFAULT_PDF_URL.to_string()),
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port,
            smtp_email: required("SMTP_EMAIL")?,
            smtp_password: required("SMTP_PASSWORD")?,
            recipients,
            filter_words: split_list(&get("FILTER_WORDS").unwrap_or_default()),
            filter_allergens: split_list(&get("FILTER_ALLERGENS").unwrap_or_default()),
            debug: get("DEBUG").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        })
    }
}
