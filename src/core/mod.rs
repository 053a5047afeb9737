mod compare;
mod engine;
mod types;

pub use compare::summarize;
pub use engine::{
    MAX_HORIZON_YEARS, net_growth_rate, project, projection_horizon, statutory_employee_rate,
};
pub use types::{ComparisonSummary, LeadingScheme, SimulationConfig, SimulationResult, YearlyRecord};
