mod agency;
mod location;
mod pollution_record;
mod severity;

pub use agency::{responsible_agency_for, DEFAULT_AGENCY, POLLUTION_TYPES};
pub use location::{Confidence, LocationResult};
pub use pollution_record::PollutionRecord;
pub use severity::Severity;
