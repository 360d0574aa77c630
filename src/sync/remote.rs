use anyhow::Result;

use crate::words::record::WordRecord;

/// Opaque, swappable source of the authoritative word collection.
pub trait RemoteWords: Send + Sync {
    fn fetch_words(&self, user_id: &str) -> Result<Vec<WordRecord>>;
}

#[cfg(feature = "network")]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpRemote {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[cfg(feature = "network")]
impl RemoteWords for HttpRemote {
    fn fetch_words(&self, user_id: &str) -> Result<Vec<WordRecord>> {
        let url = format!("{}/users/{}/words", self.base_url, user_id);
        let response = self.client.get(&url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}
