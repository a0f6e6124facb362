//! HTTP client for the machine-composer service.
//!
//! Two calls: fetch the image catalog, and submit a creation request.
//! The catalog source can be overridden with a local JSON file or an
//! alternate URL. No retries — a failed creation attempt is reported
//! upward and the caller decides what to do with the session.

use std::path::PathBuf;
use std::time::Duration;

use facet::Facet;

use crate::catalog::Catalog;
use crate::error::ForgeError;
use crate::request::CreationRequest;

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);
/// Machine creation is long-running (image download, packer build).
const CREATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
}

impl CatalogSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Service response to a creation request.
#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct CreateOutcome {
    pub created: bool,
    pub machine_id: String,
    pub message: String,
}

#[allow(async_fn_in_trait)] // trait is internal-only
pub trait MachineService {
    async fn fetch_catalog_text(&self) -> Result<String, ForgeError>;
    async fn create(&self, request: &CreationRequest) -> Result<CreateOutcome, ForgeError>;

    /// Fetch and parse the catalog in one step.
    async fn fetch_catalog(&self) -> Result<Catalog, ForgeError> {
        Catalog::from_json(&self.fetch_catalog_text().await?)
    }
}

pub struct HttpMachineService {
    client: reqwest::Client,
    endpoint: String,
    catalog_source: CatalogSource,
}

impl HttpMachineService {
    /// `catalog_override` is a URL or local file path; without it the
    /// catalog comes from the service endpoint.
    pub fn new(endpoint: &str, catalog_override: Option<&str>) -> Result<Self, ForgeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ForgeError::Validation {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let catalog_source = match catalog_override {
            Some(s) => CatalogSource::parse(s),
            None => CatalogSource::Url(format!("{endpoint}/v1/catalog")),
        };
        Ok(Self {
            client,
            endpoint,
            catalog_source,
        })
    }
}

impl MachineService for HttpMachineService {
    async fn fetch_catalog_text(&self) -> Result<String, ForgeError> {
        match &self.catalog_source {
            CatalogSource::File(path) => {
                tracing::debug!(path = %path.display(), "loading catalog from file");
                std::fs::read_to_string(path).map_err(|e| ForgeError::CatalogFetch {
                    source_name: path.display().to_string(),
                    message: e.to_string(),
                })
            }
            CatalogSource::Url(url) => {
                tracing::debug!(url = %url, "fetching catalog");
                let response = self
                    .client
                    .get(url)
                    .timeout(CATALOG_TIMEOUT)
                    .send()
                    .await
                    .map_err(|e| ForgeError::CatalogFetch {
                        source_name: url.clone(),
                        message: e.to_string(),
                    })?;

                if !response.status().is_success() {
                    return Err(ForgeError::CatalogFetch {
                        source_name: url.clone(),
                        message: format!("HTTP {}", response.status()),
                    });
                }

                response.text().await.map_err(|e| ForgeError::CatalogFetch {
                    source_name: url.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    async fn create(&self, request: &CreationRequest) -> Result<CreateOutcome, ForgeError> {
        let url = format!("{}/v1/machines", self.endpoint);
        tracing::info!(name = %request.name, image = %request.image, "submitting creation request");

        let response = self
            .client
            .post(&url)
            .timeout(CREATE_TIMEOUT)
            .header("content-type", "application/json")
            .body(request.to_json())
            .send()
            .await
            .map_err(|e| ForgeError::Creation {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            };
            return Err(ForgeError::Creation { message });
        }

        let outcome: CreateOutcome =
            facet_json::from_str(&body).map_err(|e| ForgeError::Creation {
                message: format!("unreadable service response: {e}"),
            })?;

        if !outcome.created {
            return Err(ForgeError::Creation {
                message: if outcome.message.is_empty() {
                    "service declined the request".into()
                } else {
                    outcome.message
                },
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_source_distinguishes_urls_from_paths() {
        assert_eq!(
            CatalogSource::parse("https://svc.example.com/v1/catalog"),
            CatalogSource::Url("https://svc.example.com/v1/catalog".into())
        );
        assert_eq!(
            CatalogSource::parse("/srv/catalog.json"),
            CatalogSource::File(PathBuf::from("/srv/catalog.json"))
        );
    }

    #[tokio::test]
    async fn catalog_loads_from_a_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, crate::catalog::tests::sample_json()).unwrap();

        let service =
            HttpMachineService::new("http://127.0.0.1:1", Some(path.to_str().unwrap())).unwrap();
        let catalog = service.fetch_catalog().await.unwrap();
        assert!(catalog.os("linux").is_some());
    }

    #[tokio::test]
    async fn missing_catalog_file_reports_the_source() {
        let service = HttpMachineService::new("http://127.0.0.1:1", Some("/no/such.json")).unwrap();
        let err = service.fetch_catalog().await.unwrap_err();
        assert!(err.to_string().contains("/no/such.json"));
    }
}
