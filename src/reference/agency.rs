//! Operator directory loaded from the agency table
//!
//! The table is a CSV with `agency_id, agency_name, agency_english_name`
//! columns (extra columns are ignored). Files exported from spreadsheet
//! tools often start with a UTF-8 byte order mark, which is stripped.

use crate::error::{HelpyError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Names of one operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    /// Name in the local language (`agency_name`)
    pub local_name: String,
    /// Name shown to non-local riders (`agency_english_name`)
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct AgencyRow {
    agency_id: String,
    #[serde(default)]
    agency_name: String,
    #[serde(default)]
    agency_english_name: String,
}

/// Read-only mapping from operator id to names
#[derive(Debug, Clone, Default)]
pub struct OperatorDirectory {
    operators: HashMap<String, OperatorInfo>,
}

impl OperatorDirectory {
    /// Load the directory from an agency CSV file
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::ReferenceData`] if the file cannot be read or a
    /// row is malformed
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HelpyError::ReferenceData(format!(
                "Failed to read agency file {}: {}",
                path.display(),
                e
            ))
        })?;
        let directory = Self::from_csv(&contents)?;
        tracing::info!(
            "Loaded {} operators from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// Load the directory, falling back to an empty one on error
    ///
    /// Unknown operators then render by id.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Operator names unavailable: {}", e);
            Self::default()
        })
    }

    /// Parse the directory from CSV text
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::ReferenceData`] if a row is malformed
    pub fn from_csv(contents: &str) -> Result<Self> {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut operators = HashMap::new();
        for row in reader.deserialize::<AgencyRow>() {
            let row = row.map_err(|e| HelpyError::ReferenceData(format!("Invalid agency row: {}", e)))?;
            operators.insert(
                row.agency_id,
                OperatorInfo {
                    local_name: row.agency_name,
                    display_name: row.agency_english_name,
                },
            );
        }

        Ok(Self { operators })
    }

    /// Names for `operator_id`, if known
    pub fn get(&self, operator_id: &str) -> Option<&OperatorInfo> {
        self.operators.get(operator_id)
    }

    /// `"{local} / {display}"`, or the bare id when unknown
    ///
    /// # Examples
    ///
    /// ```
    /// use helpy::reference::OperatorDirectory;
    ///
    /// let directory = OperatorDirectory::from_csv(
    ///     "agency_id,agency_name,agency_english_name\n3,אגד,Egged\n",
    /// ).unwrap();
    /// assert_eq!(directory.label("3"), "אגד / Egged");
    /// assert_eq!(directory.label("99"), "99");
    /// ```
    pub fn label(&self, operator_id: &str) -> String {
        match self.get(operator_id) {
            Some(info) => format!("{} / {}", info.local_name, info.display_name),
            None => operator_id.to_string(),
        }
    }

    /// Numbered menu entry, `idx` starting at 1
    pub fn option_label(&self, idx: usize, operator_id: &str) -> String {
        format!("{}. {}", idx, self.label(operator_id))
    }

    /// Number of known operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
