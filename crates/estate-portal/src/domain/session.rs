use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::estate::Estate;
use super::id::EntityId;
use super::people::User;

/// A booked slot in the brokerage calendar (viewing, signing, handover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: EntityId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub estate: Option<Estate>,
    #[serde(default)]
    pub participants: Vec<SessionParticipant>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A user attached to a session with their share of the commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParticipant {
    pub user: User,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionShare {
    pub user_id: EntityId,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub estate_id: Option<EntityId>,
    pub participants: Vec<SessionShare>,
    pub note: Option<String>,
}

const SHARE_TOLERANCE: f64 = 0.01;

impl SessionDraft {
    /// Form-level checks run before the draft is sent.
    pub fn validate(&self) -> Result<(), SessionValidationError> {
        if self.title.trim().is_empty() {
            return Err(SessionValidationError::MissingTitle);
        }
        if self.ends_at <= self.starts_at {
            return Err(SessionValidationError::EndsBeforeStart);
        }
        if self.participants.is_empty() {
            return Err(SessionValidationError::NoParticipants);
        }

        let mut seen = HashSet::new();
        let mut total = 0.0;
        for share in &self.participants {
            if !seen.insert(&share.user_id) {
                return Err(SessionValidationError::DuplicateParticipant(
                    share.user_id.clone(),
                ));
            }
            if !(0.0..=100.0).contains(&share.percent) {
                return Err(SessionValidationError::PercentOutOfRange {
                    user_id: share.user_id.clone(),
                    percent: share.percent,
                });
            }
            total += share.percent;
        }

        if (total - 100.0).abs() > SHARE_TOLERANCE {
            return Err(SessionValidationError::SharesDoNotTotal { total });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionValidationError {
    #[error("session title is required")]
    MissingTitle,
    #[error("session must end after it starts")]
    EndsBeforeStart,
    #[error("session needs at least one participant")]
    NoParticipants,
    #[error("participant {0} is listed twice")]
    DuplicateParticipant(EntityId),
    #[error("share for participant {user_id} must be between 0 and 100, got {percent}")]
    PercentOutOfRange { user_id: EntityId, percent: f64 },
    #[error("participant shares must total 100%, got {total}%")]
    SharesDoNotTotal { total: f64 },
}

/// Follow-up tied to an estate or a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: EntityId,
    pub title: String,
    pub remind_at: DateTime<Utc>,
    #[serde(default)]
    pub estate_id: Option<EntityId>,
    #[serde(default)]
    pub session_id: Option<EntityId>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub title: String,
    pub remind_at: DateTime<Utc>,
    pub estate_id: Option<EntityId>,
    pub session_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(shares: &[(&str, f64)]) -> SessionDraft {
        SessionDraft {
            title: "Viewing: Chilonzor 3-room".to_string(),
            starts_at: Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2026, 10, 20, 10, 0, 0).unwrap(),
            estate_id: Some(EntityId::from(11u64)),
            participants: shares
                .iter()
                .map(|(id, percent)| SessionShare {
                    user_id: EntityId::from(*id),
                    percent: *percent,
                })
                .collect(),
            note: None,
        }
    }

    #[test]
    fn accepts_shares_totalling_one_hundred() {
        assert_eq!(draft(&[("a", 60.0), ("b", 40.0)]).validate(), Ok(()));
        assert_eq!(
            draft(&[("a", 33.33), ("b", 33.33), ("c", 33.34)]).validate(),
            Ok(())
        );
    }

    #[test]
    fn rejects_shares_that_do_not_total() {
        assert_eq!(
            draft(&[("a", 50.0), ("b", 40.0)]).validate(),
            Err(SessionValidationError::SharesDoNotTotal { total: 90.0 })
        );
    }

    #[test]
    fn rejects_duplicates_and_out_of_range_shares() {
        assert_eq!(
            draft(&[("a", 50.0), ("a", 50.0)]).validate(),
            Err(SessionValidationError::DuplicateParticipant(EntityId::from("a")))
        );
        assert!(matches!(
            draft(&[("a", 120.0), ("b", -20.0)]).validate(),
            Err(SessionValidationError::PercentOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_inverted_time_range_and_blank_title() {
        let mut inverted = draft(&[("a", 100.0)]);
        std::mem::swap(&mut inverted.starts_at, &mut inverted.ends_at);
        assert_eq!(inverted.validate(), Err(SessionValidationError::EndsBeforeStart));

        let mut untitled = draft(&[("a", 100.0)]);
        untitled.title = "  ".to_string();
        assert_eq!(untitled.validate(), Err(SessionValidationError::MissingTitle));

        assert_eq!(draft(&[]).validate(), Err(SessionValidationError::NoParticipants));
    }
}
