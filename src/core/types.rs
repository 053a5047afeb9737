use serde::Serialize;

/// Inputs for one projection run. Rates are whole percent (5 means 5%)
/// except `private_tax_relief_rate`, which is a fraction in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub current_age: i32,
    pub retirement_age: i32,
    pub gross_salary: f64,
    pub salary_growth_rate: f64,
    pub investment_growth_rate: f64,
    pub fee_rate: f64,
    pub statutory_scheme_start_balance: f64,
    pub private_scheme_start_balance: f64,
    pub use_phased_statutory_rate: bool,
    pub statutory_fixed_employee_rate: f64,
    pub private_employee_rate: f64,
    pub private_employer_rate: f64,
    pub private_tax_relief_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: u32,
    pub salary_this_year: f64,
    pub statutory_employee_rate: f64,
    pub statutory_employer_rate: f64,
    pub statutory_employee_contribution: f64,
    pub statutory_employer_contribution: f64,
    pub statutory_state_top_up: f64,
    pub statutory_total_credited: f64,
    pub statutory_net_employee_cost: f64,
    pub private_employee_rate: f64,
    pub private_employer_rate: f64,
    pub private_employee_contribution: f64,
    pub private_employer_contribution: f64,
    pub private_total_credited: f64,
    pub private_net_employee_cost: f64,
    pub statutory_pot_balance: f64,
    pub private_pot_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub rows: Vec<YearlyRecord>,
    pub statutory_pot_balance: f64,
    pub private_pot_balance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadingScheme {
    Statutory,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub statutory_pot_balance: f64,
    pub private_pot_balance: f64,
    /// Private minus statutory.
    pub difference: f64,
    pub leader: LeadingScheme,
    pub note: &'static str,
    pub year_one_statutory_net_cost: f64,
    pub year_one_private_net_cost: f64,
}
