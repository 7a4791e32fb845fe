use tracing::{info, warn};

use crate::eligibility::{AudienceRule, EligibilityRule};
use crate::embed::EmbeddingProvider;
use crate::error::{MatchError, Result};
use crate::model::{AnnotatedListing, Listing, MatchReport};

/// Default cosine-similarity cutoff. Callers supply their own per
/// invocation; this is only the fallback for configuration surfaces.
pub const DEFAULT_THRESHOLD: f32 = 0.55;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

/// Scores are stored and logged at 4 decimal digits so runs stay
/// comparable across minor floating-point drift. Thresholding always
/// uses the raw score.
pub fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

/// Ranks a candidate pool against one profile and filters it down to the
/// listings worth acting on. Owns its embedder and eligibility rule and
/// holds no other state, so one engine can serve concurrent runs.
pub struct MatchEngine<E, R = AudienceRule> {
    embedder: E,
    rule: R,
}

impl<E: EmbeddingProvider> MatchEngine<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            rule: AudienceRule,
        }
    }
}

impl<E: EmbeddingProvider, R: EligibilityRule> MatchEngine<E, R> {
    pub fn with_rule(embedder: E, rule: R) -> Self {
        Self { embedder, rule }
    }

    /// Scores every scoreable listing against the profile and partitions
    /// the pool.
    ///
    /// A degraded embedder fails the whole run with
    /// [`MatchError::ModelUnavailable`]; an empty pool is `Ok` with an
    /// empty report, so the two cases are never confused. Listings with
    /// no text to embed are skipped and counted, never scored.
    pub fn evaluate(
        &self,
        profile: &str,
        listings: &[Listing],
        threshold: f32,
    ) -> Result<MatchReport> {
        if self.embedder.is_degraded() {
            return Err(MatchError::ModelUnavailable);
        }
        if listings.is_empty() {
            return Ok(MatchReport::default());
        }

        let mut texts = Vec::with_capacity(listings.len() + 1);
        texts.push(profile.to_string());

        let mut scoreable = Vec::with_capacity(listings.len());
        let mut skipped = 0usize;
        for listing in listings {
            if !listing.is_scoreable() {
                warn!(id = %listing.id, "skipping listing with no topic or description");
                skipped += 1;
                continue;
            }
            texts.push(listing.focus_text());
            scoreable.push(listing);
        }

        // One ordered batch, profile first.
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != texts.len() {
            return Err(MatchError::Embedding(anyhow::anyhow!(
                "embedder returned {} vectors for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        let profile_embedding = &embeddings[0];

        let mut report = MatchReport {
            skipped,
            ..MatchReport::default()
        };
        for (listing, embedding) in scoreable.into_iter().zip(&embeddings[1..]) {
            let raw = cosine_similarity(profile_embedding, embedding);
            let score = round_score(raw);

            if raw < threshold {
                info!(id = %listing.id, score, threshold, "filtered: below threshold");
                report.rejected.push(AnnotatedListing {
                    listing: listing.clone(),
                    similarity_score: score,
                    eligibility_ok: None,
                });
                continue;
            }

            let eligible = self.rule.is_eligible(&listing.eligibility, profile);
            let annotated = AnnotatedListing {
                listing: listing.clone(),
                similarity_score: score,
                eligibility_ok: Some(eligible),
            };
            if eligible {
                report.accepted.push(annotated);
            } else {
                info!(id = %listing.id, score, "filtered: eligibility mismatch");
                report.rejected.push(annotated);
            }
        }

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            skipped = report.skipped,
            "matching complete"
        );
        Ok(report)
    }

    /// The accepted subset only, in input order.
    pub fn find_best_matches(
        &self,
        profile: &str,
        listings: &[Listing],
        threshold: f32,
    ) -> Result<Vec<AnnotatedListing>> {
        Ok(self.evaluate(profile, listings, threshold)?.accepted)
    }
}
