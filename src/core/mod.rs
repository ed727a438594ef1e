// Core algorithm exports
pub mod badge;
pub mod filters;
pub mod modifier;
pub mod ranker;
pub mod scoring;

pub use badge::classify_badge;
pub use filters::{check_inclusion, excluded_dimension, requirement_satisfied, satisfies_any_requirement, tag_matches};
pub use modifier::{compute_inclusion_exclusion_modifier, modifier_breakdown};
pub use ranker::{filter_and_rank_pathologies, DropTally, RankResult, TriageRanker};
pub use scoring::{apply_weighting, calculate_base_score};
