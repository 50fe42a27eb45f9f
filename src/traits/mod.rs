pub mod contributor;
pub mod tracker;
pub mod valve;

pub use contributor::ContextContributor;
pub use tracker::ServiceTracker;
pub use valve::Valve;
