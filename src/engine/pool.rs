use crate::catalog::CharacterRecord;
use crate::engine::filter::FilterSet;

/// Strict intersection of the catalog with the filter, in catalog order.
/// An empty filter gives an empty pool; fallback policy belongs to the caller.
pub fn build_pool(catalog: &[CharacterRecord], filter: &FilterSet) -> Vec<CharacterRecord> {
    catalog
        .iter()
        .filter(|r| filter.contains(&r.id))
        .cloned()
        .collect()
}
