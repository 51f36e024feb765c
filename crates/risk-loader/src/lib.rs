//! Data Loader & Shaper: turns a local or remote CSV into the immutable
//! `RiskTable` every dashboard view reads.

pub mod encoding;
pub mod export;
pub mod parse;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use risk_core::{LoadError, RiskTable};

pub use encoding::{decode_text, detect_encoding, DETECTION_SAMPLE_BYTES};
pub use export::write_wide_csv;
pub use parse::{parse_records, required_columns, ColumnLayout};

/// Default bound on a remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the risk scores come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    Local(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` locations are remote, everything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Remote(location.to_string())
        } else {
            DataSource::Local(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Remote(_))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => f.write_str(url),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Clone)]
pub struct RiskLoader {
    client: Client,
    timeout: Duration,
}

impl Default for RiskLoader {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl RiskLoader {
    pub fn new(timeout: Duration) -> Self {
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    "Failed to build HTTP client with {:?} timeout, remote fetches are unbounded: {}",
                    timeout,
                    e
                );
                Client::new()
            }
        };

        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read, decode, validate and shape a source into a `RiskTable`.
    pub async fn load(&self, source: &DataSource) -> Result<RiskTable, LoadError> {
        let bytes = self.read_bytes(source).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), source);

        let table = load_from_bytes(&bytes)?;
        tracing::info!(
            "Loaded {} rows across {} years from {}",
            table.len(),
            table.years().len(),
            source
        );
        Ok(table)
    }

    /// Raw content of the source.
    pub async fn read_bytes(&self, source: &DataSource) -> Result<Vec<u8>, LoadError> {
        match source {
            DataSource::Remote(url) => self.fetch(url).await,
            DataSource::Local(path) => tokio::fs::read(path).await.map_err(|e| LoadError::Io {
                path: path.clone(),
                source: e,
            }),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_error = |reason: String| LoadError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_error(format!("timed out after {}s", self.timeout.as_secs()))
            } else {
                fetch_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Decode and shape an in-memory CSV body.
pub fn load_from_bytes(bytes: &[u8]) -> Result<RiskTable, LoadError> {
    let (text, encoding) = decode_text(bytes);
    tracing::debug!("Decoding input as {}", encoding.name());

    let records = parse_records(&text)?;
    Ok(RiskTable::from_raw(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const SAMPLE: &str = "company,year,industry,RD_0,RD_1,RD_2,RD_3,RD_4,RD_5,RD_6\n\
                          A,2021,Banking,1,2,3,4,5,6,7\n\
                          B,2021,Energy,0.1,0.2,0.3,0.4,0.5,0.6,0.7\n\
                          A,2020,Banking,0,0,0,0,0,0,0\n";

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse(" https://example.com/scores.csv "),
            DataSource::Remote("https://example.com/scores.csv".to_string())
        );
        assert!(DataSource::parse("http://localhost/x.csv").is_remote());
        assert_eq!(
            DataSource::parse("data/doc_risk_scores_k7.csv"),
            DataSource::Local(PathBuf::from("data/doc_risk_scores_k7.csv"))
        );
    }

    #[test]
    fn test_load_from_bytes_shapes_table() {
        let table = load_from_bytes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.years(), &["2020", "2021"]);
        let a = table.find("2021", "A").unwrap();
        assert_eq!(a.scores.operational, 9.0);
        assert_eq!(a.scores.technical, 12.0);
        assert_relative_eq!(a.composite(), 5.6, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let file = write_temp(SAMPLE.as_bytes());
        let loader = RiskLoader::default();

        let table = loader
            .load(&DataSource::Local(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(table.top_companies("2021", 8), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_reload_is_deterministic() {
        let file = write_temp(SAMPLE.as_bytes());
        let loader = RiskLoader::default();
        let source = DataSource::Local(file.path().to_path_buf());

        let first = loader.load(&source).await.unwrap();
        let second = loader.load(&source).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let loader = RiskLoader::default();
        let err = loader
            .load(&DataSource::Local(PathBuf::from("/nonexistent/scores.csv")))
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scores.csv"));
    }

    #[tokio::test]
    async fn test_schema_error_from_file() {
        let file = write_temp(b"company,RD_0,RD_1,RD_2,RD_3,RD_4\nA,1,1,1,1,1\n");
        let err = RiskLoader::default()
            .load(&DataSource::Local(file.path().to_path_buf()))
            .await
            .unwrap_err();

        assert_eq!(err.missing_columns(), &["RD_5", "RD_6"]);
    }

    #[tokio::test]
    async fn test_bundled_sample_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/doc_risk_scores_k7.csv");
        let table = RiskLoader::default()
            .load(&DataSource::Local(path))
            .await
            .unwrap();

        assert_eq!(table.years(), &["2021", "2022", "2023"]);
        assert_eq!(table.latest_year(), Some("2023"));
        assert_eq!(table.companies_for_year("2023").len(), 12);
        assert_eq!(table.top_companies("2023", 8).len(), 8);
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_remote_csv() {
        let router = axum::Router::new().route("/scores.csv", axum::routing::get(|| async { SAMPLE }));
        let base = serve(router).await;

        let source = DataSource::parse(&format!("{base}/scores.csv"));
        let table = RiskLoader::default().load(&source).await.unwrap();
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let router = axum::Router::new();
        let base = serve(router).await;

        let source = DataSource::parse(&format!("{base}/missing.csv"));
        let err = RiskLoader::default().load(&source).await.unwrap_err();
        match err {
            LoadError::Fetch { reason, .. } => assert!(reason.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let router = axum::Router::new().route(
            "/slow.csv",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                SAMPLE
            }),
        );
        let base = serve(router).await;

        let loader = RiskLoader::new(Duration::from_millis(200));
        assert_eq!(loader.timeout(), Duration::from_millis(200));
        let err = loader
            .load(&DataSource::parse(&format!("{base}/slow.csv")))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }
}
