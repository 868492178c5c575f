//! Connection settings and field layout loading

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use checkweigher_core::{
    constants::{
        DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_READ_TIMEOUT, DEFAULT_RETRY_ATTEMPTS,
        DEFAULT_RETRY_DELAY_MS,
    },
    FieldLayout,
};
use checkweigher_transport::TcpTransport;

/// Default location of the field layout file
pub const DEFAULT_LAYOUT_PATH: &str = "./configs/checkweigher.yaml";

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, String),

    #[error("invalid field layout in '{}': {1}", .0.display())]
    ValidationError(PathBuf, #[source] checkweigher_core::Error),
}

/// Load and validate the field layout table
///
/// The table is read once and shared; decoders never touch the file.
pub fn load_layout(path: impl AsRef<Path>) -> Result<Arc<FieldLayout>, ConfigError> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

    let layout = parse_layout(&content).map_err(|e| match e {
        LayoutError::Parse(msg) => ConfigError::ParseError(path.to_path_buf(), msg),
        LayoutError::Invalid(e) => ConfigError::ValidationError(path.to_path_buf(), e),
    })?;

    info!("Loaded field layout from {}", path.display());

    Ok(Arc::new(layout))
}

enum LayoutError {
    Parse(String),
    Invalid(checkweigher_core::Error),
}

fn parse_layout(content: &str) -> Result<FieldLayout, LayoutError> {
    let layout: FieldLayout =
        serde_yaml::from_str(content).map_err(|e| LayoutError::Parse(e.to_string()))?;

    layout.validate().map_err(LayoutError::Invalid)?;

    debug!(?layout, "Field layout validated");

    Ok(layout)
}

/// Connection settings for one controller
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Controller host name or IP address
    pub host: String,
    /// Controller port
    pub port: u16,
    /// Connection attempts before giving up
    pub retry_attempts: usize,
    /// Pause between connection attempts
    pub retry_delay: Duration,
    /// Bound on each connection attempt
    pub connect_timeout: Duration,
    /// Bound on each read while collecting a response
    pub read_timeout: Duration,
    /// Allow `DC` and `DT`, which alter controller state
    pub allow_destructive: bool,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT),
            allow_destructive: false,
        }
    }

    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_destructive_commands(mut self, enabled: bool) -> Self {
        self.allow_destructive = enabled;
        self
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the TCP transport described by these settings
    pub fn transport(&self) -> TcpTransport {
        TcpTransport::new(self.host.clone(), self.port)
            .with_connect_timeout(self.connect_timeout)
            .with_read_timeout(self.read_timeout)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkweigher_core::RecordKind;
    use std::io::Write;

    const LAYOUT: &str = r#"
dataFields:
  1:
    - name: Product number
      size: 4
    - name: Total count
      size: 7
  2:
    - name: Over weight count
      size: 7
"#;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.port, 1001);
        assert_eq!(config.retry_attempts, 5);
        assert!(!config.allow_destructive);
        assert_eq!(config.address(), "127.0.0.1:1001");
    }

    #[test]
    fn test_load_layout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LAYOUT.as_bytes()).unwrap();

        let layout = load_layout(file.path()).unwrap();
        assert_eq!(layout.total_width(RecordKind::Primary).unwrap(), 11);
        assert_eq!(layout.fields(RecordKind::Secondary).unwrap().len(), 1);
    }

    #[test]
    fn test_load_layout_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_layout(dir.path().join("absent.yaml"));

        assert!(matches!(result, Err(ConfigError::IoError(..))));
    }

    #[test]
    fn test_load_layout_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"dataFields: [not, a, map").unwrap();

        assert!(matches!(
            load_layout(file.path()),
            Err(ConfigError::ParseError(..))
        ));
    }

    #[test]
    fn test_load_layout_too_wide() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"dataFields:\n  1:\n    - name: a\n      size: 200\n  2:\n    - name: b\n      size: 1\n",
        )
        .unwrap();

        assert!(matches!(
            load_layout(file.path()),
            Err(ConfigError::ValidationError(..))
        ));
    }
}
