// Job matching: multi-factor scoring of a candidate against a corpus snapshot.
// Scorers are pure; the ranker fans postings out across the rayon pool.

pub mod corpus;
pub mod embedding;
pub mod handlers;
pub mod interest;
pub mod ranker;
pub mod request;
pub mod semantic;
pub mod seniority;
pub mod skills;
pub mod weights;

pub use corpus::{CorpusSnapshot, JobCorpus};
pub use embedding::{Embedder, HashingEmbedder};
pub use request::{run_rank, RankRequest, RankResponse};
pub use weights::{ConfigError, WeightVector};
