// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod pipeline;
pub mod resolver;

pub use distance::{distance, meters_to_miles, MILES_PER_METER};
pub use filters::{DestinationIndex, EligibilityFilter, MEDICINAL_ONLY_CATEGORY};
pub use matcher::{find_nearest, match_origin};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, PipelineOutput};
pub use resolver::{RoadDistance, RoadDistanceResolver};
