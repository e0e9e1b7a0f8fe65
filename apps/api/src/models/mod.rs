pub mod job;
pub mod profile;

pub use job::{ComponentScores, JobPosting, RankedResult};
pub use profile::{CandidateProfile, EducationEntry, Seniority};
