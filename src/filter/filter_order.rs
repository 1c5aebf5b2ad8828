use super::types::{FilterOrderInfo, SortDirection};
use crate::entity::EntityDescriptor;

pub struct FilterOrder;

impl FilterOrder {
    /// Parse a single sort key, `-` prefixed for descending.
    /// Unknown columns fall back to newest-first.
    pub fn parse(entity: &'static EntityDescriptor, sort: Option<&str>) -> FilterOrderInfo {
        let Some(sort) = sort.map(str::trim).filter(|s| !s.is_empty()) else {
            return FilterOrderInfo::id_desc();
        };

        let (name, direction) = match sort.strip_prefix('-') {
            Some(name) => (name, SortDirection::Desc),
            None => (sort, SortDirection::Asc),
        };

        match entity.column(name) {
            Some(column) => FilterOrderInfo { column: column.name, sort: direction },
            None => {
                tracing::debug!("Ignoring unknown sort field '{}' on {}", name, entity.name);
                FilterOrderInfo::id_desc()
            }
        }
    }

    pub fn generate(info: &FilterOrderInfo) -> String {
        format!("ORDER BY \"{}\" {}", info.column, info.sort.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::find_entity;

    #[test]
    fn parses_direction_prefix() {
        let entity = find_entity("price_data").unwrap();
        assert_eq!(
            FilterOrder::parse(entity, Some("-prezzo_euro_m3")),
            FilterOrderInfo { column: "prezzo_euro_m3", sort: SortDirection::Desc }
        );
        assert_eq!(
            FilterOrder::parse(entity, Some("anno")),
            FilterOrderInfo { column: "anno", sort: SortDirection::Asc }
        );
    }

    #[test]
    fn missing_or_unknown_sort_defaults_to_id_desc() {
        let entity = find_entity("price_data").unwrap();
        assert_eq!(FilterOrder::parse(entity, None), FilterOrderInfo::id_desc());
        assert_eq!(FilterOrder::parse(entity, Some("")), FilterOrderInfo::id_desc());
        assert_eq!(FilterOrder::parse(entity, Some("-nope")), FilterOrderInfo::id_desc());
        assert_eq!(FilterOrder::parse(entity, Some("-id")), FilterOrderInfo::id_desc());
    }

    #[test]
    fn generates_order_clause() {
        assert_eq!(FilterOrder::generate(&FilterOrderInfo::id_desc()), "ORDER BY \"id\" DESC");
    }
}
