//! Absolute name resolution for catalog lookups: merges a caller-supplied
//! base path (project, dataset) with a query-local path that may already be
//! partially or fully qualified.

const INFORMATION_SCHEMA: &str = "information_schema";

/// Splits a dotted path into its components. A single component may itself
/// contain dots if the caller has already split it (e.g. a quoted
/// identifier); this only splits bare unquoted strings.
fn normalize(path: &[String]) -> Vec<String> {
    path.iter().flat_map(|p| p.split('.').map(str::to_string)).collect()
}

fn contains_information_schema(query: &[String]) -> bool {
    query.len() > 1
        && query[..query.len() - 1]
            .iter()
            .any(|c| c.eq_ignore_ascii_case(INFORMATION_SCHEMA))
}

/// Merges `base` with `query` into an absolute path. `max_depth`, when set,
/// caps the result length; a query already at that depth is used verbatim.
/// A query path that mentions `INFORMATION_SCHEMA` at a non-final position
/// gets one extra unit of depth to accommodate the pseudo-schema.
pub fn merge(base: &[String], query: &[String], max_depth: Option<usize>) -> Vec<String> {
    let base = normalize(base);
    let query = normalize(query);

    let effective_max_depth = max_depth.map(|d| if contains_information_schema(&query) { d + 1 } else { d });

    if let Some(max_depth) = effective_max_depth {
        if query.len() >= max_depth {
            return query;
        }
    }

    let mut result = Vec::new();
    for component in &base {
        if let Some(first) = query.first() {
            if component.eq_ignore_ascii_case(first) {
                break;
            }
        }
        if let Some(max_depth) = effective_max_depth {
            if result.len() + query.len() >= max_depth {
                break;
            }
        }
        result.push(component.clone());
    }
    result.extend(query);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prepends_base_when_query_is_bare_name() {
        let merged = merge(&v(&["proj", "ds"]), &v(&["table"]), None);
        assert_eq!(merged, v(&["proj", "ds", "table"]));
    }

    #[test]
    fn replaces_prefix_when_query_already_matches_a_base_element() {
        let merged = merge(&v(&["proj", "ds"]), &v(&["ds", "table"]), None);
        assert_eq!(merged, v(&["proj", "ds", "table"]));
    }

    #[test]
    fn query_at_max_depth_used_verbatim() {
        let merged = merge(&v(&["proj", "ds"]), &v(&["p2", "d2", "t2"]), Some(3));
        assert_eq!(merged, v(&["p2", "d2", "t2"]));
    }

    #[test]
    fn information_schema_gets_extra_depth() {
        let merged = merge(&v(&["proj", "ds"]), &v(&["INFORMATION_SCHEMA", "TABLES"]), Some(3));
        // effective max depth is 4; query len is 2, so base prepends.
        assert_eq!(merged, v(&["proj", "ds", "INFORMATION_SCHEMA", "TABLES"]));
    }

    #[test]
    fn dotted_single_component_is_split() {
        let merged = merge(&v(&["proj.ds"]), &v(&["table"]), None);
        assert_eq!(merged, v(&["proj", "ds", "table"]));
    }
}
