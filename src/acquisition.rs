use chrono::Utc;

/// Outcome of pulling a snapshot from an external source.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition<T> {
    Fresh {
        data: T,
        fetched_at_unix: i64,
    },
    /// The live source failed and an older snapshot was used instead.
    Stale {
        data: T,
        fetched_at_unix: i64,
        error: String,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Fresh { fetched_at_unix: i64 },
    Stale { fetched_at_unix: i64, error: String },
    Unavailable { reason: String },
}

impl<T> Acquisition<T> {
    pub fn fresh_now(data: T) -> Self {
        Self::Fresh {
            data,
            fetched_at_unix: Utc::now().timestamp(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> SourceStatus {
        match self {
            Self::Fresh {
                fetched_at_unix, ..
            } => SourceStatus::Fresh {
                fetched_at_unix: *fetched_at_unix,
            },
            Self::Stale {
                fetched_at_unix,
                error,
                ..
            } => SourceStatus::Stale {
                fetched_at_unix: *fetched_at_unix,
                error: error.clone(),
            },
            Self::Unavailable { reason } => SourceStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    pub fn into_parts(self) -> (Option<T>, SourceStatus) {
        let status = self.status();
        let data = match self {
            Self::Fresh { data, .. } | Self::Stale { data, .. } => Some(data),
            Self::Unavailable { .. } => None,
        };
        (data, status)
    }
}

impl SourceStatus {
    pub fn label(&self, now_unix: i64) -> String {
        match self {
            Self::Fresh { .. } => "LIVE".to_string(),
            Self::Stale {
                fetched_at_unix, ..
            } => format!("STALE {}", age_label(now_unix - fetched_at_unix)),
            Self::Unavailable { .. } => "N/A".to_string(),
        }
    }

    /// When the data behind this status was fetched, if there is any.
    pub fn fetched_at(&self) -> Option<i64> {
        match self {
            Self::Fresh { fetched_at_unix } | Self::Stale { fetched_at_unix, .. } => {
                Some(*fetched_at_unix)
            }
            Self::Unavailable { .. } => None,
        }
    }
}

fn age_label(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::{Acquisition, SourceStatus};

    #[test]
    fn stale_label_shows_age() {
        let status = SourceStatus::Stale {
            fetched_at_unix: 1_000,
            error: "timeout".to_string(),
        };
        assert_eq!(status.label(1_000 + 12 * 60), "STALE 12m");
        assert_eq!(status.label(1_000 + 3 * 3600), "STALE 3h");
    }

    #[test]
    fn unavailable_has_no_data() {
        let acq: Acquisition<Vec<u8>> = Acquisition::unavailable("no key");
        let (data, status) = acq.into_parts();
        assert!(data.is_none());
        assert_eq!(status.fetched_at(), None);
        assert_eq!(status.label(0), "N/A");
    }
}
