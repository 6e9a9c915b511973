use std::path::{Path, PathBuf};

/// Environment variable holding the database URL.
pub const DB_URL_ENV: &str = "QUIZ_DB_URL";

/// Database URL used when neither a flag nor the environment provides one.
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

/// Where the collection store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_url: String,
}

impl StoreConfig {
    /// Read `QUIZ_DB_URL`, falling back to [`DEFAULT_DB_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var(DB_URL_ENV).unwrap_or_else(|_| DEFAULT_DB_URL.into());
        Self::with_db_url(raw)
    }

    #[must_use]
    pub fn with_db_url(raw: impl Into<String>) -> Self {
        Self {
            db_url: normalize_sqlite_url(raw.into()),
        }
    }

    /// Filesystem path of the database, `None` for in-memory URLs.
    #[must_use]
    pub fn db_path(&self) -> Option<PathBuf> {
        if self.db_url.contains(":memory:") || self.db_url.contains("mode=memory") {
            return None;
        }
        let path = self.db_url.strip_prefix("sqlite://")?;
        let path = path.split('?').next().unwrap_or(path);
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Create the database file and its parent directory if missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory or file cannot be created.
    pub fn prepare_file(&self) -> std::io::Result<()> {
        let Some(path) = self.db_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&path)?;
        }
        Ok(())
    }
}

/// Turn `path`, `sqlite:path` or `sqlite://path` into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.contains("mode=memory") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
