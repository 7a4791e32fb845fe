pub mod eligibility;
pub mod embed;
pub mod error;
pub mod matching;
pub mod minilm;
pub mod model;
pub mod storage;

pub use eligibility::{AudienceRule, EligibilityRule};
pub use embed::{
    DegradedProvider, EmbeddingProvider, LexicalEmbeddingProvider, DEFAULT_EMBEDDING_DIM,
};
pub use error::MatchError;
pub use matching::{cosine_similarity, round_score, MatchEngine, DEFAULT_THRESHOLD};
pub use minilm::MiniLmEmbeddingProvider;
pub use model::{AnnotatedListing, Listing, MatchReport};
pub use storage::{load_listings_jsonl, save_annotated_jsonl};
