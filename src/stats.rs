// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Impact Statistics
//
// Pure summarization of a scenario's traffic records. Called once per run by
// the timeline builder; the result is frozen into the SET_IMPACT_STATS action.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::{Catalog, CatalogError, TrafficRecord};
use crate::types::{Breakdown, ImpactStats, RankedEntry, ScenarioId};

/// Number of entries kept in the ranked list.
pub const TOP_IMPACTED_LIMIT: usize = 5;

/// Summarize the traffic that would be cut off by decommissioning the
/// scenario's mailbox.
///
/// Breakdowns are ordered by volume (descending), ties by key; the ranked
/// list by volume (descending), ties by counterparty name.
///
/// # Errors
/// - `UnknownScenario` if `scenario_id` is not in the catalog.
pub fn compute_impact_stats(
    catalog: &Catalog,
    scenario_id: &ScenarioId,
) -> Result<ImpactStats, CatalogError> {
    let scenario = catalog.scenario(scenario_id)?;
    let traffic = &scenario.traffic;
    let total_volume: u64 = traffic.iter().map(|t| t.monthly_volume).sum();

    let by_segment = breakdown(traffic, total_volume, |t| &t.segment);
    let by_region = breakdown(traffic, total_volume, |t| &t.region);

    let mut ranked: Vec<&TrafficRecord> = traffic.iter().collect();
    ranked.sort_by(|a, b| {
        b.monthly_volume
            .cmp(&a.monthly_volume)
            .then_with(|| a.counterparty.cmp(&b.counterparty))
    });
    let top_impacted = ranked
        .into_iter()
        .take(TOP_IMPACTED_LIMIT)
        .enumerate()
        .map(|(i, t)| RankedEntry {
            rank: i as u32 + 1,
            name: t.counterparty.clone(),
            segment: t.segment.clone(),
            region: t.region.clone(),
            volume: t.monthly_volume,
        })
        .collect();

    Ok(ImpactStats {
        scenario_id: scenario.id.clone(),
        total_volume,
        affected_entities: traffic.len() as u32,
        by_segment,
        by_region,
        top_impacted,
    })
}

/// Percent of `total`, rounded to one decimal place. Zero when `total` is zero.
pub fn share_pct(volume: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(volume) * dec!(100) / Decimal::from(total)).round_dp(1)
}

fn breakdown<F>(traffic: &[TrafficRecord], total: u64, key: F) -> Vec<Breakdown>
where
    F: Fn(&TrafficRecord) -> &String,
{
    let mut grouped: BTreeMap<&str, u64> = BTreeMap::new();
    for record in traffic {
        *grouped.entry(key(record).as_str()).or_default() += record.monthly_volume;
    }

    let mut rows: Vec<Breakdown> = grouped
        .into_iter()
        .map(|(k, volume)| Breakdown {
            key: k.to_string(),
            volume,
            share_pct: share_pct(volume, total),
        })
        .collect();
    // BTreeMap already yields keys ascending; a stable sort keeps that for ties.
    rows.sort_by(|a, b| b.volume.cmp(&a.volume));
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScenarioDef;

    fn record(name: &str, segment: &str, region: &str, volume: u64) -> TrafficRecord {
        TrafficRecord {
            counterparty: name.to_string(),
            segment: segment.to_string(),
            region: region.to_string(),
            monthly_volume: volume,
        }
    }

    fn single_scenario(traffic: Vec<TrafficRecord>) -> Catalog {
        Catalog::new(
            vec![ScenarioDef {
                id: "x".into(),
                title: "Test".to_string(),
                mailbox: "test@".to_string(),
                traffic,
            }],
            Vec::new(),
            Vec::new(),
        )
        .expect("test: non-empty catalog")
    }

    #[test]
    fn totals_and_breakdowns() {
        let catalog = single_scenario(vec![
            record("A", "Retail", "EMEA", 300),
            record("B", "Retail", "AMER", 100),
            record("C", "Wealth", "EMEA", 600),
        ]);
        let stats = compute_impact_stats(&catalog, &"x".into()).unwrap();

        assert_eq!(stats.total_volume, 1_000);
        assert_eq!(stats.affected_entities, 3);

        assert_eq!(stats.by_segment[0].key, "Wealth");
        assert_eq!(stats.by_segment[0].share_pct, dec!(60.0));
        assert_eq!(stats.by_segment[1].key, "Retail");
        assert_eq!(stats.by_segment[1].volume, 400);

        assert_eq!(stats.by_region[0].key, "EMEA");
        assert_eq!(stats.by_region[0].volume, 900);
        assert_eq!(stats.by_region[1].share_pct, dec!(10.0));
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let catalog = single_scenario(vec![
            record("Zeta", "Retail", "EMEA", 500),
            record("Alpha", "Retail", "EMEA", 500),
            record("Mid", "Retail", "EMEA", 700),
        ]);
        let stats = compute_impact_stats(&catalog, &"x".into()).unwrap();
        let names: Vec<&str> = stats.top_impacted.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
        assert_eq!(stats.top_impacted[0].rank, 1);
        assert_eq!(stats.top_impacted[2].rank, 3);
    }

    #[test]
    fn ranked_list_is_capped() {
        let stats = compute_impact_stats(&Catalog::builtin(), &"s1".into()).unwrap();
        assert_eq!(stats.affected_entities, 7);
        assert_eq!(stats.top_impacted.len(), TOP_IMPACTED_LIMIT);
        assert_eq!(stats.top_impacted[0].name, "Northwind Capital");
    }

    #[test]
    fn share_of_empty_total_is_zero() {
        assert_eq!(share_pct(0, 0), Decimal::ZERO);
        assert_eq!(share_pct(1, 3), dec!(33.3));
    }

    #[test]
    fn unknown_scenario_propagates() {
        let err = compute_impact_stats(&Catalog::builtin(), &"nope".into());
        assert!(
            matches!(err, Err(CatalogError::UnknownScenario(ref id)) if id == "nope"),
            "expected UnknownScenario, got {err:?}"
        );
    }
}
