//! Grouped counts shared by most widgets.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::constants::{CBS_PROVIDER_CODES, INJURY_SEVERITIES};
use crate::error::StoreError;
use crate::store::{
    AccidentStore, CountQuery, DateWindow, Field, FilterValue, Filters, GroupCount, Record, Scalar,
    SelectQuery, Table,
};

/// Restricts `filters` to the CBS provider codes unless a provider is
/// already pinned.
pub fn with_cbs_providers(filters: &Filters) -> Filters {
    let mut filters = filters.clone();
    if filters.get(Field::ProviderCode).is_none() {
        filters.insert(Field::ProviderCode, FilterValue::many(CBS_PROVIDER_CODES));
    }
    filters
}

/// Location filters rewritten for the involved-parties view, limited to
/// injured parties.
pub fn injured_filters(location: &Filters) -> Filters {
    let mut filters = Filters::new();
    for (field, value) in location.iter() {
        filters.insert(field.involved_counterpart(), value.clone());
    }
    filters.insert(Field::InjurySeverity, FilterValue::many(INJURY_SEVERITIES));
    filters
}

/// Grouped count over CBS-provided rows.
pub async fn count_by(
    store: &dyn AccidentStore,
    table: Table,
    filters: &Filters,
    group_by: Field,
    window: DateWindow,
) -> Result<Vec<GroupCount>, StoreError> {
    let query = CountQuery::new(table, group_by)
        .filters(with_cbs_providers(filters))
        .window(window);
    store.count_by(&query).await
}

/// `{<category>: value, "count": n}` where the category key is the column's
/// output key.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub field: Field,
    pub value: Scalar,
    pub count: i64,
}

impl Serialize for CategoryCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.field.output_key(), &self.value)?;
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}

pub fn category_counts(field: Field, groups: Vec<GroupCount>) -> Vec<CategoryCount> {
    groups
        .into_iter()
        .map(|g| CategoryCount {
            field,
            value: g.key,
            count: g.count,
        })
        .collect()
}

/// Sums every category containing `marker` into one leading bucket named
/// `marker`. Other categories follow unchanged, in input order.
pub fn merge_collision_types(groups: Vec<GroupCount>, marker: &str) -> Vec<GroupCount> {
    let mut merged = vec![GroupCount::new(marker, 0)];
    for group in groups {
        if group.key.as_str().is_some_and(|k| k.contains(marker)) {
            merged[0].count += group.count;
        } else {
            merged.push(group);
        }
    }
    merged
}

pub async fn accident_count_by_accident_type(
    store: &dyn AccidentStore,
    filters: &Filters,
    window: DateWindow,
    marker: &str,
) -> Result<Vec<CategoryCount>, StoreError> {
    let groups = count_by(
        store,
        Table::Accidents,
        filters,
        Field::AccidentTypeHebrew,
        window,
    )
    .await?;
    Ok(category_counts(
        Field::AccidentTypeHebrew,
        merge_collision_types(groups, marker),
    ))
}

/// Longitude/latitude of every matching accident.
pub async fn accidents_heat_map(
    store: &dyn AccidentStore,
    filters: &Filters,
    window: DateWindow,
) -> Result<Vec<Record>, StoreError> {
    let query = SelectQuery::new(Table::Accidents, &[Field::Longitude, Field::Latitude])
        .filters(with_cbs_providers(filters))
        .window(window);
    store.select(&query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_merge_collision_types() {
        let groups = vec![
            GroupCount::new("head-on collision A", 5),
            GroupCount::new("head-on collision B", 3),
            GroupCount::new("rear-end", 2),
        ];
        let merged = merge_collision_types(groups, "collision");
        assert_eq!(
            merged,
            vec![GroupCount::new("collision", 8), GroupCount::new("rear-end", 2)]
        );
    }

    #[test]
    fn test_merge_conserves_total_count() {
        let groups = vec![
            GroupCount::new("התנגשות חזית בחזית", 4),
            GroupCount::new("החלקה", 7),
            GroupCount::new("התנגשות חזית באחור", 1),
            GroupCount::new(Scalar::Null, 0),
        ];
        let total: i64 = groups.iter().map(|g| g.count).sum();
        let merged = merge_collision_types(groups, "התנגשות");
        assert_eq!(merged.iter().map(|g| g.count).sum::<i64>(), total);
        assert_eq!(merged[0], GroupCount::new("התנגשות", 5));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_without_collisions_keeps_empty_bucket() {
        let merged = merge_collision_types(vec![GroupCount::new("rear-end", 2)], "collision");
        assert_eq!(merged[0], GroupCount::new("collision", 0));
    }

    #[test]
    fn test_injured_filters_rename_area_columns() {
        let location = Filters::new()
            .with(Field::YishuvName, "חיפה")
            .with(Field::Street1Hebrew, "הרצל");
        let filters = injured_filters(&location);
        assert!(filters.get(Field::AccidentYishuvName).is_some());
        assert!(filters.get(Field::YishuvName).is_none());
        assert!(filters.get(Field::Street1Hebrew).is_some());
        assert_eq!(
            filters.get(Field::InjurySeverity),
            Some(&FilterValue::many([1i64, 2, 3, 4, 5]))
        );
    }

    #[test]
    fn test_cbs_providers_do_not_override_pinned_provider() {
        let pinned = Filters::new().with(Field::ProviderCode, 3i64);
        assert_eq!(
            with_cbs_providers(&pinned).get(Field::ProviderCode),
            Some(&FilterValue::from(3i64))
        );
        assert_eq!(
            with_cbs_providers(&Filters::new()).get(Field::ProviderCode),
            Some(&FilterValue::many([1i64, 3]))
        );
    }

    #[test]
    fn test_category_count_serializes_output_key() {
        let items = category_counts(Field::DayNightHebrew, vec![GroupCount::new("יום", 3)]);
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json, serde_json::json!([{"day_night": "יום", "count": 3}]));
    }

    #[tokio::test]
    async fn test_count_by_skips_non_cbs_providers() {
        let row = |provider: i64| {
            Record::new()
                .with(Field::ProviderCode, provider)
                .with(Field::AccidentYear, 2020i64)
        };
        let store = MemoryStore::new()
            .with_accident(row(1))
            .with_accident(row(2))
            .with_accident(row(3));
        let groups = count_by(
            &store,
            Table::Accidents,
            &Filters::new(),
            Field::AccidentYear,
            DateWindow::unbounded(),
        )
        .await
        .unwrap();
        assert_eq!(groups, vec![GroupCount::new(2020i64, 2)]);
    }
}
