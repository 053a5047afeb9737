use super::types::{SimulationConfig, SimulationResult, YearlyRecord};

pub const MAX_HORIZON_YEARS: u32 = 60;

// EUR 1 of state top-up for every EUR 3 the employee puts in.
const STATE_TOP_UP_DIVISOR: f64 = 3.0;

#[derive(Debug, Clone, Copy)]
struct StatutoryFlow {
    employee_rate: f64,
    employer_rate: f64,
    employee: f64,
    employer: f64,
    state_top_up: f64,
}

impl StatutoryFlow {
    fn for_year(config: &SimulationConfig, year: u32, salary: f64) -> Self {
        let employee_rate = statutory_employee_rate(
            year,
            config.use_phased_statutory_rate,
            config.statutory_fixed_employee_rate,
        );
        let employer_rate = employee_rate;
        let employee = salary * employee_rate;
        Self {
            employee_rate,
            employer_rate,
            employee,
            employer: salary * employer_rate,
            state_top_up: employee / STATE_TOP_UP_DIVISOR,
        }
    }

    fn total(self) -> f64 {
        self.employee + self.employer + self.state_top_up
    }

    // Contributions are paid from taxed income, so the employee bears all of it.
    fn net_employee_cost(self) -> f64 {
        self.employee
    }
}

#[derive(Debug, Clone, Copy)]
struct PrivateFlow {
    employee_rate: f64,
    employer_rate: f64,
    employee: f64,
    employer: f64,
    net_employee_cost: f64,
}

impl PrivateFlow {
    fn for_year(config: &SimulationConfig, salary: f64) -> Self {
        let employee_rate = config.private_employee_rate / 100.0;
        let employer_rate = config.private_employer_rate / 100.0;
        let employee = salary * employee_rate;
        Self {
            employee_rate,
            employer_rate,
            employee,
            employer: salary * employer_rate,
            net_employee_cost: employee * (1.0 - config.private_tax_relief_rate),
        }
    }

    fn total(self) -> f64 {
        self.employee + self.employer
    }
}

/// Number of simulated years: `retirement_age - current_age`, clamped to
/// `[0, MAX_HORIZON_YEARS]`.
pub fn projection_horizon(config: &SimulationConfig) -> u32 {
    let span = i64::from(config.retirement_age) - i64::from(config.current_age);
    span.clamp(0, i64::from(MAX_HORIZON_YEARS)) as u32
}

/// Investment growth net of fees as a fraction. Not clamped; fees above growth
/// give a negative rate.
pub fn net_growth_rate(config: &SimulationConfig) -> f64 {
    (config.investment_growth_rate - config.fee_rate) / 100.0
}

/// Statutory employee rate (fraction) for a 1-based simulation year.
///
/// With phasing the rate steps up every three years: 1.5%, 3%, 4.5%, then 6%
/// from year 10. Without phasing `fixed_rate` (whole percent) applies to every
/// year.
pub fn statutory_employee_rate(year: u32, phased: bool, fixed_rate: f64) -> f64 {
    if !phased {
        return fixed_rate / 100.0;
    }
    match year {
        0..=3 => 0.015,
        4..=6 => 0.03,
        7..=9 => 0.045,
        _ => 0.06,
    }
}

pub fn project(config: &SimulationConfig) -> SimulationResult {
    let years = projection_horizon(config);
    let mut statutory_pot = config.statutory_scheme_start_balance;
    let mut private_pot = config.private_scheme_start_balance;

    if years == 0 {
        return SimulationResult {
            rows: Vec::new(),
            statutory_pot_balance: statutory_pot,
            private_pot_balance: private_pot,
        };
    }

    let growth_factor = 1.0 + net_growth_rate(config);
    let salary_growth = config.salary_growth_rate / 100.0;
    let mut salary = config.gross_salary;
    let mut rows = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let statutory = StatutoryFlow::for_year(config, year, salary);
        let private = PrivateFlow::for_year(config, salary);

        statutory_pot = (statutory_pot + statutory.total()) * growth_factor;
        private_pot = (private_pot + private.total()) * growth_factor;

        rows.push(YearlyRecord {
            year,
            salary_this_year: salary,
            statutory_employee_rate: statutory.employee_rate,
            statutory_employer_rate: statutory.employer_rate,
            statutory_employee_contribution: statutory.employee,
            statutory_employer_contribution: statutory.employer,
            statutory_state_top_up: statutory.state_top_up,
            statutory_total_credited: statutory.total(),
            statutory_net_employee_cost: statutory.net_employee_cost(),
            private_employee_rate: private.employee_rate,
            private_employer_rate: private.employer_rate,
            private_employee_contribution: private.employee,
            private_employer_contribution: private.employer,
            private_total_credited: private.total(),
            private_net_employee_cost: private.net_employee_cost,
            statutory_pot_balance: statutory_pot,
            private_pot_balance: private_pot,
        });

        salary *= 1.0 + salary_growth;
    }

    SimulationResult {
        rows,
        statutory_pot_balance: statutory_pot,
        private_pot_balance: private_pot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_relative(actual: f64, expected: f64, tol: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tol * scale,
            "expected {expected}, got {actual}, relative tolerance {tol}"
        );
    }

    fn sample_config() -> SimulationConfig {
        SimulationConfig {
            current_age: 30,
            retirement_age: 66,
            gross_salary: 60_000.0,
            salary_growth_rate: 0.0,
            investment_growth_rate: 5.0,
            fee_rate: 0.8,
            statutory_scheme_start_balance: 0.0,
            private_scheme_start_balance: 0.0,
            use_phased_statutory_rate: true,
            statutory_fixed_employee_rate: 6.0,
            private_employee_rate: 10.0,
            private_employer_rate: 6.0,
            private_tax_relief_rate: 0.40,
        }
    }

    #[test]
    fn year_one_matches_hand_computed_figures() {
        let result = project(&sample_config());
        assert_eq!(result.rows.len(), 36);

        let first = &result.rows[0];
        assert_eq!(first.year, 1);
        assert_approx(first.salary_this_year, 60_000.0);
        assert_approx(first.statutory_employee_rate, 0.015);
        assert_approx(first.statutory_employer_rate, 0.015);
        assert_approx(first.statutory_employee_contribution, 900.0);
        assert_approx(first.statutory_employer_contribution, 900.0);
        assert_approx(first.statutory_state_top_up, 300.0);
        assert_approx(first.statutory_total_credited, 2_100.0);
        assert_approx(first.statutory_net_employee_cost, 900.0);
        assert_approx(first.statutory_pot_balance, 2_188.20);

        assert_approx(first.private_employee_rate, 0.10);
        assert_approx(first.private_employer_rate, 0.06);
        assert_approx(first.private_employee_contribution, 6_000.0);
        assert_approx(first.private_employer_contribution, 3_600.0);
        assert_approx(first.private_total_credited, 9_600.0);
        assert_approx(first.private_net_employee_cost, 3_600.0);
        assert_approx(first.private_pot_balance, 10_003.20);
    }

    #[test]
    fn year_two_compounds_on_year_one_balance() {
        let result = project(&sample_config());
        let second = &result.rows[1];
        assert_approx(second.statutory_pot_balance, (2_188.20 + 2_100.0) * 1.042);
        assert_approx(second.private_pot_balance, (10_003.20 + 9_600.0) * 1.042);
    }

    #[test]
    fn final_balances_match_last_row() {
        let result = project(&sample_config());
        let last = result.rows.last().expect("non-empty projection");
        assert_eq!(last.year, 36);
        assert_eq!(result.statutory_pot_balance, last.statutory_pot_balance);
        assert_eq!(result.private_pot_balance, last.private_pot_balance);
    }

    #[test]
    fn zero_horizon_returns_start_balances_untouched() {
        let mut config = sample_config();
        config.current_age = 66;
        config.retirement_age = 66;
        config.statutory_scheme_start_balance = 12_345.67;
        config.private_scheme_start_balance = 89_000.5;

        let result = project(&config);
        assert!(result.rows.is_empty());
        assert_eq!(result.statutory_pot_balance, 12_345.67);
        assert_eq!(result.private_pot_balance, 89_000.5);
    }

    #[test]
    fn horizon_is_clamped_to_sixty_years() {
        let mut config = sample_config();
        config.current_age = 18;
        config.retirement_age = 120;
        assert_eq!(projection_horizon(&config), MAX_HORIZON_YEARS);
        assert_eq!(project(&config).rows.len(), 60);

        config.current_age = 70;
        config.retirement_age = 65;
        assert_eq!(projection_horizon(&config), 0);
    }

    #[test]
    fn negative_ages_use_the_plain_difference() {
        let mut config = sample_config();
        config.current_age = -5;
        config.retirement_age = 3;
        assert_eq!(projection_horizon(&config), 8);
        assert_eq!(project(&config).rows.len(), 8);

        config.current_age = 10;
        config.retirement_age = -2;
        assert_eq!(projection_horizon(&config), 0);
        assert!(project(&config).rows.is_empty());
    }

    #[test]
    fn phase_in_schedule_steps_every_three_years() {
        let expected = [
            (1, 0.015),
            (3, 0.015),
            (4, 0.03),
            (6, 0.03),
            (7, 0.045),
            (9, 0.045),
            (10, 0.06),
            (40, 0.06),
        ];
        for (year, rate) in expected {
            assert_approx(statutory_employee_rate(year, true, 2.0), rate);
        }
    }

    #[test]
    fn fixed_statutory_rate_ignores_schedule() {
        for year in [1, 5, 12, 60] {
            assert_approx(statutory_employee_rate(year, false, 4.5), 0.045);
        }

        let mut config = sample_config();
        config.use_phased_statutory_rate = false;
        config.statutory_fixed_employee_rate = 8.0;
        let result = project(&config);
        for row in &result.rows {
            assert_approx(row.statutory_employee_rate, 0.08);
            assert_approx(row.statutory_employer_rate, 0.08);
        }
    }

    #[test]
    fn zero_tax_relief_makes_net_cost_equal_gross() {
        let mut config = sample_config();
        config.private_tax_relief_rate = 0.0;
        let result = project(&config);
        for row in &result.rows {
            assert_eq!(
                row.private_net_employee_cost,
                row.private_employee_contribution
            );
        }
    }

    #[test]
    fn fees_above_growth_give_negative_compounding() {
        let mut config = sample_config();
        config.investment_growth_rate = 2.0;
        config.fee_rate = 5.0;
        config.gross_salary = 1_000.0;
        config.statutory_scheme_start_balance = 100_000.0;
        config.private_scheme_start_balance = 100_000.0;

        assert_approx(net_growth_rate(&config), -0.03);

        let result = project(&config);
        let first = &result.rows[0];
        assert_approx(
            first.statutory_pot_balance,
            (100_000.0 + first.statutory_total_credited) * 0.97,
        );
        assert!(first.statutory_pot_balance < 100_000.0);
        assert!(first.private_pot_balance < 100_000.0);
        for pair in result.rows.windows(2) {
            assert!(pair[1].private_pot_balance < pair[0].private_pot_balance);
        }
    }

    #[test]
    fn salary_growth_applies_from_year_two() {
        let mut config = sample_config();
        config.salary_growth_rate = 3.0;
        let result = project(&config);
        assert_approx(result.rows[0].salary_this_year, 60_000.0);
        assert_approx(result.rows[1].salary_this_year, 61_800.0);
        assert_approx(result.rows[1].statutory_employee_contribution, 61_800.0 * 0.015);
    }

    #[test]
    fn negative_inputs_are_applied_mechanically() {
        let mut config = sample_config();
        config.gross_salary = -10_000.0;
        config.private_tax_relief_rate = 1.5;
        let result = project(&config);
        let first = &result.rows[0];
        assert_approx(first.statutory_employee_contribution, -150.0);
        assert_approx(first.private_net_employee_cost, -1_000.0 * (1.0 - 1.5));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_non_positive_span_returns_start_balances(
            retirement_age in -20i32..90,
            extra in 0i32..30,
            statutory_start in 0u32..500_000,
            private_start in 0u32..500_000,
            phased in any::<bool>()
        ) {
            let mut config = sample_config();
            config.retirement_age = retirement_age;
            config.current_age = retirement_age + extra;
            config.statutory_scheme_start_balance = statutory_start as f64;
            config.private_scheme_start_balance = private_start as f64;
            config.use_phased_statutory_rate = phased;

            let result = project(&config);
            prop_assert!(result.rows.is_empty());
            prop_assert_eq!(result.statutory_pot_balance, statutory_start as f64);
            prop_assert_eq!(result.private_pot_balance, private_start as f64);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_rows_are_sequential_and_follow_recurrence(
            current_age in -10i32..70,
            span in 1i32..80,
            salary in 0u32..250_000,
            salary_growth_bp in -500i32..1000,
            growth_bp in -1000i32..1500,
            fee_bp in 0u32..300,
            statutory_start in 0u32..300_000,
            private_start in 0u32..300_000,
            phased in any::<bool>(),
            fixed_rate_bp in 0u32..1500,
            private_employee_bp in 0u32..3000,
            private_employer_bp in 0u32..3000,
            relief_bp in 0u32..10_001
        ) {
            let config = SimulationConfig {
                current_age,
                retirement_age: current_age + span,
                gross_salary: salary as f64,
                salary_growth_rate: salary_growth_bp as f64 / 100.0,
                investment_growth_rate: growth_bp as f64 / 100.0,
                fee_rate: fee_bp as f64 / 100.0,
                statutory_scheme_start_balance: statutory_start as f64,
                private_scheme_start_balance: private_start as f64,
                use_phased_statutory_rate: phased,
                statutory_fixed_employee_rate: fixed_rate_bp as f64 / 100.0,
                private_employee_rate: private_employee_bp as f64 / 100.0,
                private_employer_rate: private_employer_bp as f64 / 100.0,
                private_tax_relief_rate: relief_bp as f64 / 10_000.0,
            };
            let result = project(&config);
            let horizon = (span as u32).min(MAX_HORIZON_YEARS);
            prop_assert_eq!(result.rows.len(), horizon as usize);

            let growth_factor = 1.0 + net_growth_rate(&config);
            let mut previous_statutory = config.statutory_scheme_start_balance;
            let mut previous_private = config.private_scheme_start_balance;

            for (idx, row) in result.rows.iter().enumerate() {
                prop_assert_eq!(row.year, idx as u32 + 1);

                prop_assert_eq!(row.statutory_employer_rate, row.statutory_employee_rate);
                prop_assert_eq!(
                    row.statutory_employer_contribution,
                    row.statutory_employee_contribution
                );
                prop_assert_eq!(
                    row.statutory_state_top_up,
                    row.statutory_employee_contribution / 3.0
                );
                prop_assert_eq!(
                    row.statutory_net_employee_cost,
                    row.statutory_employee_contribution
                );
                assert_approx(
                    row.statutory_total_credited,
                    row.statutory_employee_contribution
                        + row.statutory_employer_contribution
                        + row.statutory_state_top_up,
                );

                let expected_rate = statutory_employee_rate(
                    row.year,
                    phased,
                    config.statutory_fixed_employee_rate,
                );
                prop_assert_eq!(row.statutory_employee_rate, expected_rate);

                assert_approx(
                    row.private_net_employee_cost,
                    row.private_employee_contribution * (1.0 - config.private_tax_relief_rate),
                );
                assert_approx(
                    row.private_total_credited,
                    row.private_employee_contribution + row.private_employer_contribution,
                );

                let expected_salary = config.gross_salary
                    * (1.0 + config.salary_growth_rate / 100.0).powi(idx as i32);
                assert_relative(row.salary_this_year, expected_salary, 1e-9);

                prop_assert_eq!(
                    row.statutory_pot_balance,
                    (previous_statutory + row.statutory_total_credited) * growth_factor
                );
                prop_assert_eq!(
                    row.private_pot_balance,
                    (previous_private + row.private_total_credited) * growth_factor
                );
                previous_statutory = row.statutory_pot_balance;
                previous_private = row.private_pot_balance;
            }

            prop_assert_eq!(result.statutory_pot_balance, previous_statutory);
            prop_assert_eq!(result.private_pot_balance, previous_private);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_phased_rate_ignores_configured_fixed_rate(
            year in 1u32..=60,
            fixed_rate_bp in 0u32..2000
        ) {
            let fixed = fixed_rate_bp as f64 / 100.0;
            let expected = match year {
                1..=3 => 0.015,
                4..=6 => 0.03,
                7..=9 => 0.045,
                _ => 0.06,
            };
            prop_assert_eq!(statutory_employee_rate(year, true, fixed), expected);
            prop_assert_eq!(statutory_employee_rate(year, false, fixed), fixed / 100.0);
        }
    }
}
