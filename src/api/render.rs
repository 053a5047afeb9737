use crate::core::{ComparisonSummary, LeadingScheme, YearlyRecord};

const TABLE_HEADERS: [&str; 11] = [
    "Yr", "Salary", "AE Emp%", "AE Emp", "AE Er", "State", "AE Pot", "PP Emp%", "PP Emp", "PP Er",
    "PP Pot",
];
const YEAR_WIDTH: usize = 4;
const COLUMN_WIDTH: usize = 12;

/// Whole euros with thousands separators, e.g. `€1,234,568` or `-€2,500`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

/// Fraction rendered as a percentage with one decimal, e.g. `0.015` -> `1.5%`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn render_summary(summary: &ComparisonSummary, horizon_years: u32) -> String {
    let arrow = match summary.leader {
        LeadingScheme::Private => '▲',
        LeadingScheme::Statutory => '▼',
    };

    let mut out = String::new();
    out.push_str(&format!("Projection horizon: {horizon_years} years\n"));
    out.push_str(&format!(
        "Projected pot at retirement (auto-enrolment): {}\n",
        format_currency(summary.statutory_pot_balance)
    ));
    out.push_str(&format!(
        "Projected pot at retirement (private):        {}\n",
        format_currency(summary.private_pot_balance)
    ));
    out.push_str(&format!(
        "Difference (private - auto-enrolment):        {arrow} {}  {}\n",
        format_currency(summary.difference.abs()),
        summary.note
    ));
    out.push_str(&format!(
        "Year 1 net employee cost (auto-enrolment):    {}\n",
        format_currency(summary.year_one_statutory_net_cost)
    ));
    out.push_str(&format!(
        "Year 1 net employee cost (private):           {}\n",
        format_currency(summary.year_one_private_net_cost)
    ));
    out
}

pub fn render_table(rows: &[YearlyRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<YEAR_WIDTH$}", TABLE_HEADERS[0]));
    for header in &TABLE_HEADERS[1..] {
        out.push_str(&format!("{header:>COLUMN_WIDTH$}"));
    }
    out.push('\n');

    for row in rows {
        let cells = [
            format_currency(row.salary_this_year),
            format_percent(row.statutory_employee_rate),
            format_currency(row.statutory_employee_contribution),
            format_currency(row.statutory_employer_contribution),
            format_currency(row.statutory_state_top_up),
            format_currency(row.statutory_pot_balance),
            format_percent(row.private_employee_rate),
            format_currency(row.private_employee_contribution),
            format_currency(row.private_employer_contribution),
            format_currency(row.private_pot_balance),
        ];
        out.push_str(&format!("{:<YEAR_WIDTH$}", row.year));
        for cell in &cells {
            out.push_str(&format!("{cell:>COLUMN_WIDTH$}"));
        }
        out.push('\n');
    }
    out
}
