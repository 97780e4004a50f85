//! Per-rule simulation counts.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many sims ran under each rule. Kept in memory only.
#[derive(Debug, Default)]
pub struct RuleStats {
    counts: Mutex<BTreeMap<String, u64>>,
}

/// One rule and its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule: String,
    pub count: u64,
}

impl RuleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, rule: &str) {
        *self.counts.lock().entry(rule.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, rule: &str) -> u64 {
        self.counts.lock().get(rule).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().values().sum()
    }

    /// The `limit` most used rules, most used first; ties in rule order.
    pub fn top(&self, limit: usize) -> Vec<RuleCount> {
        let mut counts: Vec<RuleCount> = self
            .counts
            .lock()
            .iter()
            .map(|(rule, &count)| RuleCount {
                rule: rule.clone(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.rule.cmp(&b.rule)));
        counts.truncate(limit);
        counts
    }

    /// All counts as a JSON object keyed by rule.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&*self.counts.lock()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_ranking() {
        let stats = RuleStats::new();
        for rule in ["B3/S23", "B36/S23", "B3/S23", "B2/S", "B3/S23", "B36/S23"] {
            stats.record(rule);
        }
        assert_eq!(stats.get("B3/S23"), 3);
        assert_eq!(stats.get("B0/S"), 0);
        assert_eq!(stats.total(), 6);

        let top = stats.top(2);
        assert_eq!(top[0], RuleCount { rule: "B3/S23".into(), count: 3 });
        assert_eq!(top[1].rule, "B36/S23");
        assert_eq!(top.len(), 2);

        assert_eq!(stats.to_json()["B2/S"], 1);
    }
}
