use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::redirect;

use crate::error::ScrapeError;

const MAX_REDIRECTS: usize = 10;

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ScrapeError> {
    let redirect_policy = redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error(format!("Too many redirects (>{MAX_REDIRECTS})"))
        } else {
            attempt.follow()
        }
    });

    // The pt-BR storefront labels the detail bullets in Portuguese only when asked to.
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9"));

    let client = Client::builder()
        .redirect(redirect_policy)
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

pub fn fetch_html(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let body = client.get(url).send()?.error_for_status()?.text()?;
    Ok(body)
}
