//! Snippet Extractor — flattens a structured profile into retrievable snippets.
//!
//! Pure function of its input. Output order is significant: experience
//! entries first (achievements in entry order), then projects. That order is
//! the tie-break order for keyword-fallback ranking, so it must stay stable.

use std::collections::HashMap;

use crate::models::{Profile, Snippet};

const UNKNOWN_COMPANY: &str = "Unknown";
const UNKNOWN_TITLE: &str = "Position";

/// Produces one snippet per achievement/responsibility and one per project.
///
/// Missing optional fields render as placeholders; extraction never fails.
pub fn extract_snippets(profile: &Profile) -> Vec<Snippet> {
    let mut snippets = Vec::new();

    for role in &profile.experience {
        let company = role.company.as_deref().unwrap_or(UNKNOWN_COMPANY);
        let title = role.title.as_deref().unwrap_or(UNKNOWN_TITLE);

        // Achievements take precedence; responsibilities only fill in when
        // the achievements field is absent entirely.
        let items = role
            .achievements
            .as_deref()
            .or(role.responsibilities.as_deref())
            .unwrap_or(&[]);

        for item in items {
            snippets.push(Snippet::new(
                format!("At {company} as {title}: {item}"),
                HashMap::from([
                    ("type".to_string(), "experience".to_string()),
                    ("company".to_string(), company.to_string()),
                    ("title".to_string(), title.to_string()),
                ]),
            ));
        }
    }

    for project in &profile.projects {
        let name = project.name.as_deref().unwrap_or("");
        let description = project.description.as_deref().unwrap_or("");

        snippets.push(Snippet::new(
            format!("Project {name}: {description}"),
            HashMap::from([
                ("type".to_string(), "project".to_string()),
                ("name".to_string(), name.to_string()),
            ]),
        ));
    }

    snippets
}
