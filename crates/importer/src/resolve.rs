//! Name to coordinates through the CDS Sesame service.

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::ImportError;

pub const SESAME_URL: &str = "https://cds.unistra.fr/cgi-bin/nph-sesame/-oI/A";

/// Turns an object name into ICRS `(ra_deg, dec_deg)`.
pub trait NameResolver {
    fn resolve(&self, name: &str) -> Result<(f64, f64), ImportError>;
}

#[derive(Debug, Clone)]
pub struct SesameResolver {
    base_url: String,
}

impl SesameResolver {
    pub fn new() -> Self {
        Self::with_base_url(SESAME_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Query URL for `name`, with the name percent-encoded as the last path segment.
    pub fn query_url(&self, name: &str) -> Result<Url, ImportError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ImportError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ImportError::InvalidUrl(self.base_url.clone()))?
            .push(name.trim());
        Ok(url)
    }
}

impl Default for SesameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for SesameResolver {
    fn resolve(&self, name: &str) -> Result<(f64, f64), ImportError> {
        let url = self.query_url(name)?;
        info!(name, %url, "resolving target name");
        let client = Client::builder().build()?;
        let body = client.get(url).send()?.error_for_status()?.text()?;
        let position = parse_sesame(&body).ok_or_else(|| ImportError::Unresolved(name.to_string()))?;
        debug!(name, ra_deg = position.0, dec_deg = position.1, "resolved");
        Ok(position)
    }
}

/// Position from the first `%J ra dec` line of a Sesame reply.
pub fn parse_sesame(body: &str) -> Option<(f64, f64)> {
    body.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("%J ")?;
        let mut fields = rest.split_whitespace();
        let ra = fields.next()?.parse::<f64>().ok()?;
        let dec = fields.next()?.parse::<f64>().ok()?;
        (ra.is_finite() && (-90.0..=90.0).contains(&dec)).then_some((ra, dec))
    })
}
