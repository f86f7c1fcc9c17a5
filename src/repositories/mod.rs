pub mod case_repo;
pub mod evidence_repo;
pub mod user_repo;

pub use case_repo::{CaseRepository, StoreCaseRepository};
pub use evidence_repo::{EvidenceEdit, EvidenceRepository, StoreEvidenceRepository};
pub use user_repo::{StoreUserRepository, UserRepository};
