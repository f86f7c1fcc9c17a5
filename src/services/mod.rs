pub mod case_service;
pub mod evidence_service;
pub mod user_service;

// Re-export commonly used types
pub use case_service::CaseService;
pub use evidence_service::EvidenceService;
pub use user_service::UserService;
