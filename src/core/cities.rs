use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::html::{normalize_ws, ParseError};
use crate::models::CityDistrict;

/// Number of leading characters that identify a city for de-duplication
pub const CITY_PREFIX_LEN: usize = 3;

static RECOMMENDED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".recommended-cities").unwrap());
static OTHER_NAMES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".other-city-names").unwrap());
static ROW_DETAIL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".row-detail-wrapper").unwrap());

/// Keep the first city seen for each 3-character prefix, preserving order.
///
/// Distinct cities sharing a prefix ("New York NY", "Newark NJ") collapse to
/// the first one.
pub fn unique_city(cities: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(cities.len());

    for city in cities {
        let prefix: String = city.chars().take(CITY_PREFIX_LEN).collect();
        if seen.insert(prefix) {
            unique.push(city.clone());
        }
    }

    unique
}

/// Split "City Name DIST" into city and district.
///
/// The last whitespace token is the district; a single token yields an empty
/// city.
pub fn split_city_district(combined: &str) -> CityDistrict {
    let mut tokens: Vec<&str> = combined.split_whitespace().collect();
    let dist = tokens.pop().unwrap_or("");
    CityDistrict::new(tokens.join(" "), dist)
}

/// Extract city entries from a rendered ZIP lookup result page.
///
/// Recommended entries come first, then alternate names. Both regions are
/// matched by class; only the recommended region is mandatory.
pub fn parse_city_lookup_page(html: &str) -> Result<Vec<String>, ParseError> {
    let doc = Html::parse_document(html);

    let recommended = doc
        .select(&RECOMMENDED)
        .next()
        .ok_or(ParseError::MissingElement("recommended-cities"))?;

    let mut cities: Vec<String> = recommended
        .select(&ROW_DETAIL)
        .map(|entry| normalize_ws(&entry.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect();

    // Some ZIPs list no alternate names; an absent region adds nothing
    if let Some(other) = doc.select(&OTHER_NAMES).next() {
        cities.extend(
            other
                .select(&ROW_DETAIL)
                .map(|entry| normalize_ws(&entry.text().collect::<String>()))
                .filter(|text| !text.is_empty()),
        );
    }

    Ok(cities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unique_city_by_prefix() {
        let cities = strings(&["New York NY", "New Yowk NY", "Boston MA"]);
        assert_eq!(unique_city(&cities), strings(&["New York NY", "Boston MA"]));
    }

    #[test]
    fn test_unique_city_short_and_multibyte() {
        let cities = strings(&["Ab", "Ab X", "Ñoño PR", "Ñoñ TX"]);
        assert_eq!(unique_city(&cities), strings(&["Ab", "Ab X", "Ñoño PR"]));
    }

    #[test]
    fn test_unique_city_empty() {
        assert!(unique_city(&[]).is_empty());
    }

    #[test]
    fn test_split_city_district() {
        assert_eq!(
            split_city_district("Salt Lake City UT"),
            CityDistrict::new("Salt Lake City", "UT")
        );
        assert_eq!(split_city_district("NY"), CityDistrict::new("", "NY"));
        assert_eq!(split_city_district(""), CityDistrict::new("", ""));
    }

    #[test]
    fn test_parse_lookup_page() {
        let html = r#"
            <div class="recommended-cities">
              <div class="row-detail-wrapper"><p>NEW YORK   NY</p></div>
            </div>
            <div class="other-city-names">
              <div class="row-detail-wrapper">MANHATTAN NY</div>
              <div class="row-detail-wrapper">NEW YORK CITY NY</div>
            </div>"#;

        let cities = parse_city_lookup_page(html).unwrap();
        assert_eq!(cities, strings(&["NEW YORK NY", "MANHATTAN NY", "NEW YORK CITY NY"]));
    }

    #[test]
    fn test_parse_lookup_page_without_other_names() {
        let html = r#"<div class="recommended-cities">
            <div class="row-detail-wrapper">BOSTON MA</div></div>"#;
        assert_eq!(parse_city_lookup_page(html).unwrap(), strings(&["BOSTON MA"]));
    }

    #[test]
    fn test_parse_lookup_page_missing_results() {
        let err = parse_city_lookup_page("<html><body></body></html>").unwrap_err();
        assert_eq!(err, ParseError::MissingElement("recommended-cities"));
    }
}
