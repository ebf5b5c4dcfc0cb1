pub mod profile;
pub mod snippet;

pub use profile::{ExperienceEntry, Profile, ProjectEntry};
pub use snippet::Snippet;
