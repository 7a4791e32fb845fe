//! Turns accepted listings into concrete scheduling decisions. The
//! matching engine never performs side effects; this dispatcher is the
//! collaborator that consumes its output, so action failures and retries
//! stay out of the matching logic.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use scout_core::AnnotatedListing;
use serde::{Deserialize, Serialize};

const EVENT_EMAIL_LEAD_MIN: i64 = 24 * 60;
const EVENT_POPUP_LEAD_MIN: i64 = 30;
const DEADLINE_EMAIL_LEAD_MIN: i64 = 7 * 24 * 60;
const DEADLINE_POPUP_LEAD_MIN: i64 = 3 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Email,
    Popup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes_before: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    Event,
    Deadline,
}

/// One scheduling decision, ready for whatever calendar backend the
/// deployment wires up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaEntry {
    pub listing_id: String,
    pub kind: AgendaKind,
    pub summary: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<NaiveDateTime>,
    /// Set for all-day entries instead of the start/end pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<NaiveDate>,
    pub reminders: Vec<Reminder>,
}

/// Maps accepted listings to agenda entries: one event per listing, plus
/// an all-day application-deadline entry when a deadline is known.
pub fn plan_agenda(accepted: &[AnnotatedListing]) -> Vec<AgendaEntry> {
    let mut entries = Vec::with_capacity(accepted.len() * 2);

    for record in accepted {
        let listing = &record.listing;
        let link = listing.link.as_deref().unwrap_or("n/a");

        entries.push(AgendaEntry {
            listing_id: listing.id.clone(),
            kind: AgendaKind::Event,
            summary: format!("[Scout] {}", listing.title),
            body: format!(
                "{}\n\nRelevance score: {}\nLink: {}\nCheck the deadline on the listing page.",
                listing.description, record.similarity_score, link
            ),
            starts_at: listing.starts_at,
            ends_at: listing.ends_at,
            all_day: None,
            reminders: vec![
                Reminder {
                    method: ReminderMethod::Email,
                    minutes_before: EVENT_EMAIL_LEAD_MIN,
                },
                Reminder {
                    method: ReminderMethod::Popup,
                    minutes_before: EVENT_POPUP_LEAD_MIN,
                },
            ],
        });

        if let Some(deadline) = listing.deadline {
            entries.push(AgendaEntry {
                listing_id: listing.id.clone(),
                kind: AgendaKind::Deadline,
                summary: format!("[Scout deadline] Apply: {}", listing.title),
                body: format!("Link: {link}"),
                starts_at: None,
                ends_at: None,
                all_day: Some(deadline.date()),
                reminders: vec![
                    Reminder {
                        method: ReminderMethod::Email,
                        minutes_before: DEADLINE_EMAIL_LEAD_MIN,
                    },
                    Reminder {
                        method: ReminderMethod::Popup,
                        minutes_before: DEADLINE_POPUP_LEAD_MIN,
                    },
                ],
            });
        }
    }

    entries
}

pub fn write_agenda(path: &Path, entries: &[AgendaEntry]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        let line = serde_json::to_string(entry).context("serialize agenda entry")?;
        writer.write_all(line.as_bytes()).context("write entry")?;
        writer.write_all(b"\n").context("write newline")?;
    }

    writer.flush().context("flush agenda")
}
