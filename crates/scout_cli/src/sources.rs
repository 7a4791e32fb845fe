//! Acquisition boundary. Live scraping is a separate collaborator; this
//! module only knows how to hand the pipeline a pool of `Listing`s.

use chrono::NaiveDateTime;
use scout_core::Listing;

fn dt(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Built-in pool for demos and smoke tests.
pub fn sample_listings() -> Vec<Listing> {
    vec![
        Listing {
            id: "HACK-001".to_string(),
            title: "AI for Sustainable Cities Hackathon".to_string(),
            topic: "AI, Sustainability, Python".to_string(),
            description: "Develop models using Generative AI to solve urban planning and \
                          resource allocation challenges. Requires Python and cloud experience."
                .to_string(),
            eligibility: "Current University Students only.".to_string(),
            deadline: dt("2025-11-01T17:00:00"),
            starts_at: dt("2025-11-15T09:00:00"),
            ends_at: dt("2025-11-17T17:00:00"),
            link: Some("https://example.com/ai-hack".to_string()),
        },
        Listing {
            id: "CONF-005".to_string(),
            title: "Intro to Web Development Workshop".to_string(),
            topic: "Web Dev, HTML, CSS".to_string(),
            description: "A basic workshop on HTML and CSS. Suitable for beginners with no \
                          prior coding experience."
                .to_string(),
            eligibility: "Open to all.".to_string(),
            deadline: dt("2025-10-30T23:59:59"),
            starts_at: dt("2025-12-05T10:00:00"),
            ends_at: dt("2025-12-05T12:00:00"),
            link: Some("https://example.com/web-intro".to_string()),
        },
        Listing {
            id: "ML-010".to_string(),
            title: "Advanced SBERT and Transformer Models Seminar".to_string(),
            topic: "Machine Learning, NLP, SBERT".to_string(),
            description: "Deep dive into fine-tuning SBERT for specialized NLP tasks. Target \
                          audience: experienced ML engineers."
                .to_string(),
            eligibility: "Must have 2+ years professional ML experience.".to_string(),
            deadline: dt("2025-11-20T12:00:00"),
            starts_at: dt("2025-12-01T14:00:00"),
            ends_at: dt("2025-12-01T16:00:00"),
            link: Some("https://example.com/advanced-ml".to_string()),
        },
    ]
}
