//! Panel builder — long-format facts to one dense panel per company.

use std::collections::BTreeMap;

use crate::data::coerce::coerce_value;
use crate::data::panel::CompanyPanel;
use crate::domain::{CompanyKey, FiscalYears, Metric, RawFact, YearLabel};

/// Counters describing what the builder did with its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub facts: usize,
    /// Facts whose year label was unparsable or outside the fiscal range.
    pub skipped_year: usize,
    /// Facts whose value coerced to undefined.
    pub undefined_values: usize,
    /// Defined facts that lost to an earlier defined fact for the same slot.
    pub duplicates: usize,
}

/// Groups facts by company, then by canonical metric.
pub struct PanelBuilder {
    years: FiscalYears,
}

impl PanelBuilder {
    pub fn new(years: FiscalYears) -> Self {
        Self { years }
    }

    /// Build one panel per `(code, name)`, ordered by key.
    pub fn build(&self, facts: &[RawFact]) -> Vec<CompanyPanel> {
        self.build_with_stats(facts).0
    }

    /// Like [`build`](Self::build), also returning ingestion counters.
    ///
    /// Each `(company, metric, slot)` keeps the first defined value seen.
    /// A metric that appears only with undefined values or out-of-range
    /// years still gets an all-undefined row.
    pub fn build_with_stats(&self, facts: &[RawFact]) -> (Vec<CompanyPanel>, BuildStats) {
        let mut stats = BuildStats {
            facts: facts.len(),
            ..BuildStats::default()
        };
        let mut panels: BTreeMap<CompanyKey, CompanyPanel> = BTreeMap::new();

        for fact in facts {
            let key = CompanyKey::new(fact.code.trim(), fact.name.trim());
            let metric = Metric::resolve(&fact.metric);
            let panel = panels
                .entry(key)
                .or_insert_with_key(|k| CompanyPanel::new(k.clone(), self.years));
            let row = panel.ensure_row(metric);

            let value = coerce_value(&fact.value);
            if value.is_none() {
                stats.undefined_values += 1;
            }

            match YearLabel::parse(&fact.year) {
                Some(YearLabel::Current) => match (row.current(), value) {
                    (None, v) => row.set_current(v),
                    (Some(_), Some(_)) => stats.duplicates += 1,
                    (Some(_), None) => {}
                },
                Some(YearLabel::Fiscal(year)) => match self.years.index_of(year) {
                    Some(index) => match (row.get(index), value) {
                        (None, v) => row.set(index, v),
                        (Some(_), Some(_)) => stats.duplicates += 1,
                        (Some(_), None) => {}
                    },
                    None => stats.skipped_year += 1,
                },
                None => stats.skipped_year += 1,
            }
        }

        tracing::debug!(
            companies = panels.len(),
            facts = stats.facts,
            skipped_year = stats.skipped_year,
            undefined_values = stats.undefined_values,
            duplicates = stats.duplicates,
            "built company panels"
        );

        (panels.into_values().collect(), stats)
    }
}

impl Default for PanelBuilder {
    fn default() -> Self {
        Self::new(FiscalYears::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(code: &str, year: &str, metric: &str, value: &str) -> RawFact {
        RawFact::new(code, format!("Co{code}"), year, metric, value)
    }

    #[test]
    fn groups_by_company_and_metric() {
        let facts = vec![
            fact("A", "2021", "EPS", "1,000"),
            fact("A", "2026", "EPS", "2000"),
            fact("B", "2024", "PER", "7.5"),
            fact("A", "2023", "BPS(원)", "10,000"),
        ];
        let panels = PanelBuilder::default().build(&facts);
        assert_eq!(panels.len(), 2);

        let a = &panels[0];
        assert_eq!(a.key().code, "A");
        assert_eq!(a.value(&Metric::Eps, 2021), Some(1000.0));
        assert_eq!(a.value(&Metric::Eps, 2026), Some(2000.0));
        assert_eq!(a.value(&Metric::Bps, 2023), Some(10_000.0));
        assert_eq!(a.row_count(), 2);

        let b = &panels[1];
        assert_eq!(b.value(&Metric::Per, 2024), Some(7.5));
    }

    #[test]
    fn every_row_has_full_grid() {
        let facts = vec![fact("A", "2022", "DPS", "100")];
        let panels = PanelBuilder::default().build(&facts);
        let row = panels[0].row(&Metric::Dps).unwrap();
        assert_eq!(row.values().len(), 7);
        assert_eq!(row.defined_count(), 1);
    }

    #[test]
    fn current_label_goes_to_separate_slot() {
        let facts = vec![fact("A", "Current", "CurrentPrice", "5,000")];
        let panels = PanelBuilder::default().build(&facts);
        let row = panels[0].row(&Metric::CurrentPrice).unwrap();
        assert_eq!(row.current(), Some(5000.0));
        assert_eq!(row.defined_count(), 0);
    }

    #[test]
    fn unparsable_values_become_undefined_without_failing() {
        let facts = vec![
            fact("A", "2021", "EPS", "n/a"),
            fact("A", "2022", "EPS", "1200"),
        ];
        let (panels, stats) = PanelBuilder::default().build_with_stats(&facts);
        assert_eq!(panels[0].value(&Metric::Eps, 2021), None);
        assert_eq!(panels[0].value(&Metric::Eps, 2022), Some(1200.0));
        assert_eq!(stats.undefined_values, 1);
    }

    #[test]
    fn out_of_range_years_are_skipped() {
        let facts = vec![
            fact("A", "2019", "EPS", "1"),
            fact("A", "2027", "EPS", "1"),
            fact("A", "FY", "EPS", "1"),
        ];
        let (panels, stats) = PanelBuilder::default().build_with_stats(&facts);
        assert_eq!(stats.skipped_year, 3);
        assert_eq!(panels[0].row(&Metric::Eps).unwrap().defined_count(), 0);
    }

    #[test]
    fn first_defined_value_wins() {
        let facts = vec![
            fact("A", "2021", "EPS", ""),
            fact("A", "2021", "EPS", "10"),
            fact("A", "2021", "EPS", "20"),
        ];
        let (panels, stats) = PanelBuilder::default().build_with_stats(&facts);
        assert_eq!(panels[0].value(&Metric::Eps, 2021), Some(10.0));
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn same_code_different_name_is_a_different_company() {
        let facts = vec![
            RawFact::new("A", "Old Name", "2021", "EPS", "1"),
            RawFact::new("A", "New Name", "2021", "EPS", "2"),
        ];
        assert_eq!(PanelBuilder::default().build(&facts).len(), 2);
    }
}
