use super::domain::TidyRow;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Deduplicated, ordered output of one run. Row positions are the
/// contiguous zero-based index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<TidyRow>,
}

impl ResultTable {
    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TidyRow> {
        self.rows.get(index)
    }

    pub fn indexed(&self) -> impl Iterator<Item = (usize, &TidyRow)> {
        self.rows.iter().enumerate()
    }

    pub fn into_rows(self) -> Vec<TidyRow> {
        self.rows
    }
}

impl FromIterator<TidyRow> for ResultTable {
    fn from_iter<I: IntoIterator<Item = TidyRow>>(iter: I) -> Self {
        finalize(iter)
    }
}

/// Reads a plain row array; duplicates are removed on the way in.
impl<'de> Deserialize<'de> for ResultTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TidyRow>::deserialize(deserializer).map(finalize)
    }
}

/// Drops rows equal in all four fields to an earlier row, keeping order.
pub fn finalize<I>(rows: I) -> ResultTable
where
    I: IntoIterator<Item = TidyRow>,
{
    let mut seen = HashSet::new();
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    ResultTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::{ApplicantType, ApplicationStatus, CategoryLabel};

    fn row(name: &str, category: &CategoryLabel) -> TidyRow {
        TidyRow::new(name, "addr", "mail", category)
    }

    #[test]
    fn finalize_keeps_first_occurrence_in_order() {
        let bo = CategoryLabel::new(ApplicantType::BrandOwner, ApplicationStatus::Registered);
        let pro = CategoryLabel::new(ApplicantType::Producer, ApplicationStatus::Registered);

        let table = finalize(vec![
            row("A", &bo),
            row("B", &bo),
            row("A", &bo),
            row("A", &pro),
            row("B", &bo),
        ]);

        let names: Vec<_> = table
            .rows()
            .iter()
            .map(|row| (row.name.as_str(), row.category.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("A", "BO-Registered"),
                ("B", "BO-Registered"),
                ("A", "Pro-Registered"),
            ]
        );
        assert_eq!(
            table.indexed().map(|(index, _)| index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn finalize_is_idempotent() {
        let bo = CategoryLabel::new(ApplicantType::BrandOwner, ApplicationStatus::InProcess);
        let once = finalize(vec![row("A", &bo), row("A", &bo), row("C", &bo)]);
        let twice = finalize(once.clone().into_rows());
        assert_eq!(once, twice);
    }

    #[test]
    fn rows_differing_in_one_field_are_both_kept() {
        let bo = CategoryLabel::new(ApplicantType::BrandOwner, ApplicationStatus::InProcess);
        let mut other = row("A", &bo);
        other.email = "other".to_string();

        let table: ResultTable = vec![row("A", &bo), other].into_iter().collect();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn deserialized_tables_are_finalized() {
        let bo = CategoryLabel::new(ApplicantType::BrandOwner, ApplicationStatus::Registered);
        let rows = serde_json::to_value(vec![row("A", &bo), row("A", &bo), row("B", &bo)])
            .expect("rows serialize");

        let table: ResultTable = serde_json::from_value(rows).expect("table deserializes");
        assert_eq!(table, finalize(vec![row("A", &bo), row("B", &bo)]));
        assert_eq!(
            serde_json::to_value(&table).expect("table serializes"),
            serde_json::to_value(table.rows()).expect("rows serialize")
        );
    }
}
