//! The Pathcrafter guide planner.
//!
//! Ties the poedb lookup and the LLM clients together: a [`job::GuideJob`]
//! turns a [`job::GuideRequest`] into a guide, [`render`] formats it as
//! Markdown and [`snapshot`] saves and reloads it.

pub mod classes;
pub mod job;
pub mod prompt;
pub mod render;
pub mod snapshot;

pub use classes::{Ascendancy, BaseClass, Language, LeagueMode};
pub use job::{GuideJob, GuideOutcome, GuideRequest, GuideResult, JobError, Progress};
pub use render::{GuideView, render_markdown};
pub use snapshot::Snapshot;

use pathcrafter_config::PoedbSection;
use pathcrafter_poedb::PoedbSettings;

/// Fetcher settings from the `poedb` config section.
pub fn poedb_settings(section: &PoedbSection) -> PoedbSettings {
    PoedbSettings {
        base_url: section.base_url.clone(),
        user_agent: section.user_agent.clone(),
        timeout: section.timeout(),
        politeness_delay: section.politeness_delay(),
    }
}
