//! Persistence adapter. The bracket is always read and written as one document.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::error::BracketError;
use crate::types::Bracket;

pub trait BracketStore {
  fn load(&self) -> Result<Option<Bracket>, BracketError>;
  fn save(&mut self, bracket: &Bracket) -> Result<(), BracketError>;
  fn clear(&mut self) -> Result<(), BracketError>;
  fn location(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBracket {
  saved_at: String,
  bracket: Bracket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
  Wrapped(StoredBracket),
  Bare(Bracket),
}

/// One pretty-printed JSON file per tournament.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    JsonFileStore { path: path.into() }
  }

  pub fn path(&self) -> &PathBuf {
    &self.path
  }
}

impl BracketStore for JsonFileStore {
  fn load(&self) -> Result<Option<Bracket>, BracketError> {
    if !self.path.is_file() {
      return Ok(None);
    }
    let data = fs::read_to_string(&self.path)
      .map_err(|e| BracketError::Store(format!("read bracket {}: {e}", self.path.display())))?;
    if data.trim().is_empty() || data.trim() == "null" {
      return Ok(None);
    }
    let doc = serde_json::from_str::<StoredDocument>(&data)
      .map_err(|e| BracketError::Store(format!("parse bracket {}: {e}", self.path.display())))?;
    Ok(Some(match doc {
      StoredDocument::Wrapped(stored) => stored.bracket,
      StoredDocument::Bare(bracket) => bracket,
    }))
  }

  fn save(&mut self, bracket: &Bracket) -> Result<(), BracketError> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|e| {
        BracketError::Store(format!("create bracket dir {}: {e}", parent.display()))
      })?;
    }
    let doc = StoredBracket {
      saved_at: Utc::now().to_rfc3339(),
      bracket: bracket.clone(),
    };
    let payload = serde_json::to_string_pretty(&doc).map_err(|e| BracketError::Store(e.to_string()))?;
    fs::write(&self.path, payload)
      .map_err(|e| BracketError::Store(format!("write bracket {}: {e}", self.path.display())))?;
    debug!(path = %self.path.display(), "bracket saved");
    Ok(())
  }

  fn clear(&mut self) -> Result<(), BracketError> {
    if self.path.is_file() {
      fs::remove_file(&self.path)
        .map_err(|e| BracketError::Store(format!("remove bracket {}: {e}", self.path.display())))?;
    }
    Ok(())
  }

  fn location(&self) -> String {
    self.path.display().to_string()
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  bracket: Option<Bracket>,
}

impl MemoryStore {
  pub fn new() -> Self {
    MemoryStore::default()
  }

  pub fn with_bracket(bracket: Bracket) -> Self {
    MemoryStore { bracket: Some(bracket) }
  }
}

impl BracketStore for MemoryStore {
  fn load(&self) -> Result<Option<Bracket>, BracketError> {
    Ok(self.bracket.clone())
  }

  fn save(&mut self, bracket: &Bracket) -> Result<(), BracketError> {
    self.bracket = Some(bracket.clone());
    Ok(())
  }

  fn clear(&mut self) -> Result<(), BracketError> {
    self.bracket = None;
    Ok(())
  }

  fn location(&self) -> String {
    "memory".to_string()
  }
}
