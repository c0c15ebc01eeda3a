use serde::{Deserialize, Serialize};
use std::fmt;

/// How one end of a rope is finished, and what hardware is on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TerminationRepr")]
pub struct Termination {
    /// Splice, whipping, knot...
    pub term_type: String,

    /// Shackle, snap shackle, swivel...
    pub hardware: Option<String>,
}

/// Overrides may give a bare term type or the full object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TerminationRepr {
    Bare(String),
    Full {
        term_type: String,
        #[serde(default)]
        hardware: Option<String>,
    },
}

impl From<TerminationRepr> for Termination {
    fn from(repr: TerminationRepr) -> Self {
        match repr {
            TerminationRepr::Bare(term_type) => Termination::bare(term_type),
            TerminationRepr::Full { term_type, hardware } => Termination {
                term_type,
                hardware: hardware.filter(|h| !h.trim().is_empty()),
            },
        }
    }
}

impl Termination {
    pub fn new(term_type: impl Into<String>, hardware: impl Into<String>) -> Self {
        Self {
            term_type: term_type.into(),
            hardware: Some(hardware.into()),
        }
    }

    pub fn bare(term_type: impl Into<String>) -> Self {
        Self {
            term_type: term_type.into(),
            hardware: None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hardware {
            Some(hardware) => write!(f, "{} ({})", self.term_type, hardware),
            None => f.write_str(&self.term_type),
        }
    }
}

/// Standard rope end finishes
pub mod terminations {
    use super::*;

    pub fn covered_splice_shackle() -> Termination {
        Termination::new("Covered Splice", "Shackle")
    }

    pub fn covered_splice_swivel_shackle() -> Termination {
        Termination::new("Covered Splice", "Swivel Shackle")
    }

    pub fn covered_splice_snap_shackle() -> Termination {
        Termination::new("Covered Splice", "Snap Shackle")
    }

    /// Small-bail snap shackles suit the lighter sheets
    pub fn splice_small_bail_snap_shackle() -> Termination {
        Termination::new("Splice", "Small-Bail Snap Shackle")
    }

    pub fn splice() -> Termination {
        Termination::bare("Splice")
    }

    pub fn pull_through_whipping() -> Termination {
        Termination::bare("Pull Through Whipping")
    }

    pub fn whipping() -> Termination {
        Termination::bare("Whipping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        assert_eq!(
            terminations::covered_splice_shackle().to_string(),
            "Covered Splice (Shackle)"
        );
        assert_eq!(terminations::pull_through_whipping().to_string(), "Pull Through Whipping");
    }

    #[test]
    fn test_deserialize_either_form() {
        let bare: Termination = serde_json::from_value(json!("Whipping")).unwrap();
        assert_eq!(bare, terminations::whipping());

        let full: Termination = serde_json::from_value(json!({
            "term_type": "Covered Splice",
            "hardware": "Snap Shackle"
        }))
        .unwrap();
        assert_eq!(full, terminations::covered_splice_snap_shackle());

        let empty_hardware: Termination =
            serde_json::from_value(json!({"term_type": "Splice", "hardware": ""})).unwrap();
        assert_eq!(empty_hardware, terminations::splice());
    }

    #[test]
    fn test_serializes_as_object() {
        let value = serde_json::to_value(terminations::splice_small_bail_snap_shackle()).unwrap();
        assert_eq!(
            value,
            json!({"term_type": "Splice", "hardware": "Small-Bail Snap Shackle"})
        );
    }
}
