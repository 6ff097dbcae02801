//! Pipeline stage markers, stored as lower-case TEXT.
//!
//! `parsing_status` and `analysis_status` are the two independent stage
//! markers on a config file; only the pipeline mutates them. Finding status
//! transitions are made by human reviewers, never by the pipeline.

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Database representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse the database representation; `None` for unknown text.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Parse stage of a config file.
    ParsingStatus {
        Pending = "pending",
        /// Transient in-flight marker while the parser runs.
        Parsing = "parsing",
        Parsed = "parsed",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Analysis stage of a config file.
    AnalysisStatus {
        Pending = "pending",
        /// Transient in-flight marker while the rule engine runs.
        Analyzing = "analyzing",
        Completed = "completed",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Reviewer-driven lifecycle of a finding. The pipeline only ever
    /// writes `Open`.
    FindingStatus {
        Open = "open",
        Acknowledged = "acknowledged",
        Mitigated = "mitigated",
        Resolved = "resolved",
        FalsePositive = "false_positive",
        AcceptedRisk = "accepted_risk",
    }
}

define_status_enum! {
    /// Lifecycle of a catalog standard; only `Active` rows are evaluated.
    StandardStatus {
        Active = "active",
        Deprecated = "deprecated",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_status_round_trips() {
        for status in [
            ParsingStatus::Pending,
            ParsingStatus::Parsing,
            ParsingStatus::Parsed,
            ParsingStatus::Failed,
        ] {
            assert_eq!(ParsingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ParsingStatus::parse("done"), None);
    }

    #[test]
    fn analysis_status_round_trips() {
        for status in [
            AnalysisStatus::Pending,
            AnalysisStatus::Analyzing,
            AnalysisStatus::Completed,
            AnalysisStatus::Failed,
        ] {
            assert_eq!(AnalysisStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn finding_status_round_trips() {
        assert_eq!(FindingStatus::parse("open"), Some(FindingStatus::Open));
        assert_eq!(
            FindingStatus::parse("false_positive"),
            Some(FindingStatus::FalsePositive)
        );
        assert_eq!(FindingStatus::parse("closed"), None);
    }
}
