use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use reqwest::Client;

pub const APP_USER_AGENT: &str = "PackLauncher/0.1.0";

/// Browser-like agent; the CurseForge site API rejects unknown agents.
pub const CURSEFORGE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    default_headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}
