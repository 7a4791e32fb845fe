use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One opportunity listing as produced by the acquisition step.
///
/// `topic`, `description`, and `eligibility` are the text fields the
/// matching engine reads. The schedule fields ride along for the
/// dispatcher and may be absent in the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Listing {
    /// Text fed to the embedder. The separator is part of the embedding
    /// input, so it is fixed: changing it changes every score.
    pub fn focus_text(&self) -> String {
        format!(
            "Topic: {}. Description: {}",
            self.topic, self.description
        )
    }

    /// A listing with neither topic nor description has nothing to embed.
    pub fn is_scoreable(&self) -> bool {
        !(self.topic.is_empty() && self.description.is_empty())
    }
}

/// A listing plus the fields the engine derives. Built in one step, so a
/// record is either fully annotated or not annotated at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Cosine similarity against the profile, rounded to 4 decimal digits.
    pub similarity_score: f32,
    /// Outcome of the eligibility rule. `None` when the listing never met
    /// the threshold and the rule was not consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_ok: Option<bool>,
}

/// Outcome of one matching run over a candidate pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Listings at or above threshold that passed the eligibility rule,
    /// in input order.
    pub accepted: Vec<AnnotatedListing>,
    /// Scored listings that were filtered out, in input order.
    pub rejected: Vec<AnnotatedListing>,
    /// Records dropped before scoring because they had no text to embed.
    pub skipped: usize,
}
