use comfy_table::Table;
use configuration::AllocationLeg;
use core_types::{DecisionHistory, DualMomentumRecord, LaaRecord};

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Console table for the latest Dual Momentum decision, or `None` when the
/// run produced no records.
pub fn dual_momentum_summary(history: &DecisionHistory<DualMomentumRecord>) -> Option<Table> {
    let latest = history.records.last()?;

    let mut table = Table::new();
    table.set_header(vec!["As of", "Symbol", "Name", "12M Return", "Role"]);

    for candidate in &latest.candidates {
        let role = if candidate.symbol == latest.winner.symbol {
            "winner"
        } else {
            ""
        };
        table.add_row(vec![
            latest.as_of.to_string(),
            candidate.symbol.clone(),
            candidate.name.clone(),
            percent(candidate.trailing_return),
            role.to_string(),
        ]);
    }
    table.add_row(vec![
        latest.as_of.to_string(),
        String::new(),
        "threshold".to_string(),
        percent(latest.threshold_return),
        String::new(),
    ]);
    table.add_row(vec![
        latest.as_of.to_string(),
        latest.selection.symbol.clone(),
        latest.selection.name.clone(),
        percent(latest.winner_return.max(latest.threshold_return)),
        "selected".to_string(),
    ]);

    Some(table)
}

/// Console table for the current LAA target allocation: the fixed legs plus
/// the timing slot resolved from the latest record.
pub fn laa_summary(
    history: &DecisionHistory<LaaRecord>,
    fixed_legs: &[AllocationLeg],
    timing_weight: f64,
) -> Option<Table> {
    let latest = history.records.last()?;

    let mut table = Table::new();
    table.set_header(vec!["Leg", "Symbol", "Weight", "Note"]);

    for leg in fixed_legs {
        table.add_row(vec![
            leg.name.clone(),
            leg.symbol.clone(),
            percent(leg.weight),
            "annual rebalance".to_string(),
        ]);
    }
    table.add_row(vec![
        latest.selection.name.clone(),
        latest.selection.symbol.clone(),
        percent(timing_weight),
        format!(
            "timing slot as of {} ({})",
            latest.as_of,
            if latest.risk_off { "risk-off" } else { "risk-on" }
        ),
    ]);

    Some(table)
}
