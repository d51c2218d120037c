//! Persisted session state: which database to open and which user is
//! "current". Stored as a single JSON object, read once at startup and
//! rewritten in full on every user switch.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::{Result, TributaryError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    db_url: String,
    #[serde(default)]
    current_user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    pub db_url: String,
    pub current_user_name: Option<String>,
}

impl Session {
    pub fn new(path: PathBuf, db_url: String) -> Self {
        Self {
            path,
            db_url,
            current_user_name: None,
        }
    }

    /// Load the session from the default path, creating a default file
    /// (no current user, database under the platform data directory) on
    /// first run.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            let session = Self::new(path, Self::default_db_url()?);
            session.save()?;
            return Ok(session);
        }

        let content = fs::read_to_string(&path)?;
        let file: SessionFile = serde_json::from_str(&content)
            .map_err(|e| TributaryError::Config(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path,
            db_url: file.db_url,
            current_user_name: file.current_user_name,
        })
    }

    /// Switch the current user and persist immediately.
    pub fn set_user(&mut self, name: &str) -> Result<()> {
        self.current_user_name = Some(name.to_string());
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = SessionFile {
            db_url: self.db_url.clone(),
            current_user_name: self.current_user_name.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TributaryError::Config(e.to_string()))?;
        fs::write(&self.path, json)?;

        Ok(())
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TributaryError::Config("could not find config directory".into()))?;
        Ok(config_dir.join("tributary").join("session.json"))
    }

    fn default_db_url() -> Result<String> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TributaryError::Config("could not find data directory".into()))?;
        let db_path = data_dir.join("tributary").join("tributary.db");
        Ok(db_path.to_string_lossy().into_owned())
    }
}
