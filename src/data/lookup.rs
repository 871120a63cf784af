//! Lookups within an already fetched collection

use serde_json::Value;

use super::Record;

/// Finds the record whose `id` equals `id`
///
/// Returns `None` when no record matches; callers decide how to report it.
pub fn find_by_id<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records.iter().find(|record| record.id() == Some(id))
}

/// Finds the record whose `url` equals `url`
pub fn find_by_url<'a>(records: &'a [Record], url: &str) -> Option<&'a Record> {
    records.iter().find(|record| record.url() == Some(url))
}

/// Replaces cross-reference URLs in `field` with a field of the linked record
///
/// `field` is expected to hold an array of URLs pointing into `linked` (e.g. a
/// character's `films`). Each URL is swapped for the matching record's
/// `title_field`; URLs with no match, or whose match lacks `title_field`, are
/// kept as they are. A missing or non-array `field` leaves the record unchanged.
///
/// # Arguments
/// * `record` - The record holding the URL list
/// * `linked` - The collection the URLs point into
/// * `field` - Name of the URL list field, e.g. `"starships"`
/// * `title_field` - Field of the linked record to show instead, e.g. `"name"`
pub fn resolve_links(record: &Record, linked: &[Record], field: &str, title_field: &str) -> Record {
    let Some(Value::Array(links)) = record.get(field) else {
        return record.clone();
    };

    let resolved: Vec<Value> = links
        .iter()
        .map(|link| {
            link.as_str()
                .and_then(|url| find_by_url(linked, url))
                .and_then(|target| target.get(title_field))
                .cloned()
                .unwrap_or_else(|| link.clone())
        })
        .collect();

    record.clone().with(field, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn films() -> Vec<Record> {
        vec![
            Record::new()
                .with("title", "A New Hope")
                .with("url", "https://swapi.dev/api/films/1/"),
            Record::new()
                .with("title", "The Empire Strikes Back")
                .with("url", "https://swapi.dev/api/films/2/"),
        ]
    }

    #[test]
    fn test_find_by_id_hit_and_miss() {
        let people = vec![
            Record::new().with("name", "Ackbar").with("id", "1"),
            Record::new().with("name", "Adi Gallia").with("id", "2"),
        ];

        assert_eq!(find_by_id(&people, "2").and_then(Record::name), Some("Adi Gallia"));
        assert!(find_by_id(&people, "3").is_none());
    }

    #[test]
    fn test_find_by_url() {
        let films = films();
        let found = find_by_url(&films, "https://swapi.dev/api/films/2/").unwrap();
        assert_eq!(found.str_field("title"), Some("The Empire Strikes Back"));
        assert!(find_by_url(&films, "https://swapi.dev/api/films/9/").is_none());
    }

    #[test]
    fn test_resolve_links_replaces_known_urls() {
        let luke = Record::new().with("name", "Luke Skywalker").with(
            "films",
            json!([
                "https://swapi.dev/api/films/1/",
                "https://swapi.dev/api/films/7/",
                "https://swapi.dev/api/films/2/"
            ]),
        );

        let resolved = resolve_links(&luke, &films(), "films", "title");

        assert_eq!(
            resolved.get("films"),
            Some(&json!([
                "A New Hope",
                "https://swapi.dev/api/films/7/",
                "The Empire Strikes Back"
            ]))
        );
        assert_eq!(resolved.name(), Some("Luke Skywalker"));
    }

    #[test]
    fn test_resolve_links_keeps_url_when_title_missing() {
        let record = Record::new().with("films", json!(["https://swapi.dev/api/films/1/"]));

        let resolved = resolve_links(&record, &films(), "films", "name");

        assert_eq!(resolved.get("films"), Some(&json!(["https://swapi.dev/api/films/1/"])));
    }

    #[test]
    fn test_resolve_links_ignores_missing_field() {
        let record = Record::new().with("name", "Chewbacca");
        let resolved = resolve_links(&record, &films(), "starships", "name");
        assert_eq!(resolved, record);
    }
}
