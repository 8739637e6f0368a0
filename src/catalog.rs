// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Scenario Catalog
//
// Fixed, read-only demo data for the mailbox-decommissioning what-if: the
// scenarios a user can pick, the dependent systems and business scenarios
// revealed during a run, and the traffic records the impact stats are
// computed from.

use serde::{Deserialize, Serialize};

use crate::types::ScenarioId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("catalog has no scenarios")]
    Empty,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A system that depends on the mailbox being decommissioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentSystem {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// A business process that breaks or degrades when the mailbox goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessScenario {
    pub id: String,
    pub name: String,
    pub summary: String,
}

/// Monthly mail volume exchanged with one counterparty through the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub counterparty: String,
    pub segment: String,
    pub region: String,
    pub monthly_volume: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub id: ScenarioId,
    pub title: String,
    pub mailbox: String,
    pub traffic: Vec<TrafficRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub scenarios: Vec<ScenarioDef>,
    pub systems: Vec<DependentSystem>,
    pub business_scenarios: Vec<BusinessScenario>,
}

impl Catalog {
    pub fn new(
        scenarios: Vec<ScenarioDef>,
        systems: Vec<DependentSystem>,
        business_scenarios: Vec<BusinessScenario>,
    ) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { scenarios, systems, business_scenarios })
    }

    pub fn scenario(&self, id: &ScenarioId) -> Result<&ScenarioDef, CatalogError> {
        self.scenarios
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| CatalogError::UnknownScenario(id.0.clone()))
    }

    /// Look up a scenario by its 1-based menu number.
    pub fn scenario_by_index(&self, number: usize) -> Option<&ScenarioDef> {
        number.checked_sub(1).and_then(|i| self.scenarios.get(i))
    }

    pub fn system(&self, id: &str) -> Option<&DependentSystem> {
        self.systems.iter().find(|s| s.id == id)
    }

    pub fn business_scenario(&self, id: &str) -> Option<&BusinessScenario> {
        self.business_scenarios.iter().find(|b| b.id == id)
    }

    /// Numbered scenario list, one per line: `1. <title> (<mailbox>)`.
    pub fn menu(&self) -> String {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {} ({})", i + 1, s.title, s.mailbox))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The mailbox-decommissioning demo data.
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                ScenarioDef {
                    id: "s1".into(),
                    title: "Decommission the KYC onboarding mailbox".to_string(),
                    mailbox: "kyc-onboarding@".to_string(),
                    traffic: vec![
                        traffic("Northwind Capital", "Institutional", "EMEA", 1_840),
                        traffic("Harbor Retail Bank", "Retail", "EMEA", 960),
                        traffic("Sakura Trust", "Institutional", "APAC", 1_210),
                        traffic("Pinecrest Advisors", "Wealth", "AMER", 730),
                        traffic("Delta Freight Ltd", "Corporate", "EMEA", 410),
                        traffic("Orchid Family Office", "Wealth", "APAC", 520),
                        traffic("Granite Municipal Fund", "Institutional", "AMER", 1_050),
                    ],
                },
                ScenarioDef {
                    id: "s2".into(),
                    title: "Retire the sanctions alerts distribution list".to_string(),
                    mailbox: "sanctions-alerts@".to_string(),
                    traffic: vec![
                        traffic("Screening Vendor Feed", "Vendor", "Global", 4_200),
                        traffic("Correspondent Bank Desk", "Institutional", "EMEA", 1_380),
                        traffic("Trade Finance Ops", "Corporate", "APAC", 990),
                        traffic("Payments Investigations", "Internal", "AMER", 1_650),
                        traffic("Regional Compliance Leads", "Internal", "EMEA", 640),
                    ],
                },
                ScenarioDef {
                    id: "s3".into(),
                    title: "Sunset the legacy trade confirmations mailbox".to_string(),
                    mailbox: "trade-confirms@".to_string(),
                    traffic: vec![
                        traffic("Bluewater Asset Mgmt", "Institutional", "AMER", 2_760),
                        traffic("Kestrel Hedge Partners", "Institutional", "EMEA", 1_920),
                        traffic("Lotus Private Bank", "Wealth", "APAC", 870),
                        traffic("Summit Pension Trust", "Institutional", "AMER", 1_430),
                        traffic("Marigold Insurance", "Corporate", "EMEA", 560),
                        traffic("Cedar Credit Union", "Retail", "AMER", 310),
                    ],
                },
            ],
            systems: vec![
                system("crm-intake", "CRM Case Intake", "Client Services"),
                system("kyc-workflow", "KYC Workflow Engine", "Onboarding Ops"),
                system("sanctions-gateway", "Sanctions Screening Gateway", "Financial Crime"),
                system("doc-archive", "Document Archive (WORM)", "Records Management"),
                system("ops-ticketing", "Ops Ticketing Queue", "Service Desk"),
                system("reg-reporting", "Regulatory Reporting Warehouse", "Finance"),
            ],
            business_scenarios: vec![
                business(
                    "client-onboarding",
                    "New client onboarding",
                    "Document requests and approvals stall without the intake address.",
                ),
                business(
                    "periodic-review",
                    "Periodic KYC refresh",
                    "Refresh reminders bounce and reviews fall past their due date.",
                ),
                business(
                    "alert-escalation",
                    "Sanctions alert escalation",
                    "Escalations lose their audit trail between screening and case handling.",
                ),
                business(
                    "regulator-requests",
                    "Regulator information requests",
                    "Evidence packs can no longer be assembled from the mailbox history.",
                ),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn traffic(counterparty: &str, segment: &str, region: &str, monthly_volume: u64) -> TrafficRecord {
    TrafficRecord {
        counterparty: counterparty.to_string(),
        segment: segment.to_string(),
        region: region.to_string(),
        monthly_volume,
    }
}

fn system(id: &str, name: &str, owner: &str) -> DependentSystem {
    DependentSystem { id: id.to_string(), name: name.to_string(), owner: owner.to_string() }
}

fn business(id: &str, name: &str, summary: &str) -> BusinessScenario {
    BusinessScenario { id: id.to_string(), name: name.to_string(), summary: summary.to_string() }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_unique_ids() {
        let catalog = Catalog::builtin();
        let mut ids: Vec<&str> = catalog.systems.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.systems.len());

        let mut ids: Vec<&str> = catalog.business_scenarios.iter().map(|b| b.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.business_scenarios.len());
    }

    #[test]
    fn scenario_by_index_is_one_based() {
        let catalog = Catalog::builtin();
        assert!(catalog.scenario_by_index(0).is_none());
        assert_eq!(catalog.scenario_by_index(1).map(|s| s.id.0.as_str()), Some("s1"));
        assert_eq!(catalog.scenario_by_index(3).map(|s| s.id.0.as_str()), Some("s3"));
        assert!(catalog.scenario_by_index(4).is_none());
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let catalog = Catalog::builtin();
        let err = catalog.scenario(&ScenarioId::from("s9"));
        assert_eq!(err, Err(CatalogError::UnknownScenario("s9".to_string())));
    }

    #[test]
    fn reveal_ids_resolve_to_entries() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.system("sanctions-gateway").map(|s| s.id.as_str()), Some("sanctions-gateway"));
        assert!(catalog.system("mainframe").is_none());
        assert_eq!(
            catalog.business_scenario("alert-escalation").map(|b| b.id.as_str()),
            Some("alert-escalation")
        );
        assert!(catalog.business_scenario("crm-intake").is_none());

        for system in &catalog.systems {
            assert_eq!(catalog.system(&system.id), Some(system));
        }
    }

    #[test]
    fn empty_catalog_rejected() {
        let result = Catalog::new(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(result, Err(CatalogError::Empty));
    }

    #[test]
    fn menu_numbers_every_scenario() {
        let menu = Catalog::builtin().menu();
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. "));
        assert!(lines[2].starts_with("3. "));
        assert!(lines[1].contains("sanctions-alerts@"));
    }
}
