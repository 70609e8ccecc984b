//! Provenance records for generated raster maps

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// How a raster map was produced.
///
/// Stored as a small key/value sidecar file next to the map data; see
/// [`crate::io::Workspace::write_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    /// Full command line that produced the map
    pub command_line: String,
    /// User that ran the command
    pub creator: String,
    /// Creation time, UTC
    pub created: DateTime<Utc>,
}

impl History {
    /// Build a record for a command run now by the current user
    pub fn for_command(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            creator: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            created: Utc::now(),
        }
    }

    /// Serialize to the sidecar file format
    pub fn to_record(&self) -> String {
        format!(
            "created: {}\ncreator: {}\ncommand: {}\n",
            self.created.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.creator,
            self.command_line,
        )
    }

    /// Parse a sidecar record
    pub fn parse(text: &str) -> Result<Self> {
        let mut created = None;
        let mut creator = None;
        let mut command_line = None;
        for line in text.lines() {
            let Some((key, value)) = line.split_once(": ") else {
                continue;
            };
            match key {
                "created" => {
                    let ts = DateTime::parse_from_rfc3339(value).map_err(|e| {
                        Error::InvalidHistory {
                            reason: format!("bad timestamp {:?}: {}", value, e),
                        }
                    })?;
                    created = Some(ts.with_timezone(&Utc));
                }
                "creator" => creator = Some(value.to_string()),
                "command" => command_line = Some(value.to_string()),
                _ => {}
            }
        }
        match (created, creator, command_line) {
            (Some(created), Some(creator), Some(command_line)) => Ok(Self {
                command_line,
                creator,
                created,
            }),
            _ => Err(Error::InvalidHistory {
                reason: "missing created, creator or command field".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_round_trip() {
        let history = History {
            command_line: "gridkit times-two --input elev --output elev2".to_string(),
            creator: "tester".to_string(),
            created: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        };
        let parsed = History::parse(&history.to_record()).unwrap();
        assert_eq!(parsed, history);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(matches!(
            History::parse("creator: tester\n"),
            Err(Error::InvalidHistory { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_timestamp() {
        let text = "created: yesterday\ncreator: t\ncommand: c\n";
        assert!(matches!(
            History::parse(text),
            Err(Error::InvalidHistory { .. })
        ));
    }
}
