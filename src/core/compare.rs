use super::types::{ComparisonSummary, LeadingScheme, SimulationResult};

const PRIVATE_AHEAD_NOTE: &str = "Private projects higher than auto-enrolment.";
const STATUTORY_AHEAD_NOTE: &str = "Auto-enrolment projects higher than private.";

/// Headline comparison of the two final pots. A tie counts as private ahead.
pub fn summarize(result: &SimulationResult) -> ComparisonSummary {
    let difference = result.private_pot_balance - result.statutory_pot_balance;
    let (leader, note) = if difference >= 0.0 {
        (LeadingScheme::Private, PRIVATE_AHEAD_NOTE)
    } else {
        (LeadingScheme::Statutory, STATUTORY_AHEAD_NOTE)
    };

    let (year_one_statutory_net_cost, year_one_private_net_cost) = result
        .rows
        .first()
        .map(|row| (row.statutory_net_employee_cost, row.private_net_employee_cost))
        .unwrap_or((0.0, 0.0));

    ComparisonSummary {
        statutory_pot_balance: result.statutory_pot_balance,
        private_pot_balance: result.private_pot_balance,
        difference,
        leader,
        note,
        year_one_statutory_net_cost,
        year_one_private_net_cost,
    }
}
