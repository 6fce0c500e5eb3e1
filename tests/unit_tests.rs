// Unit tests for Contact Enrich

use contact_enrich::config::default_allowed_domains;
use contact_enrich::core::{
    blank_duplicate_identities, decode_email_href, detail_links, expand_rows, is_allowed_email,
    merge_tables, parse_cards, search_url, split_city_district, unique_city, verify_card_text,
};
use contact_enrich::models::{CityDistrict, Identity, InputRecord, OutputRow, TableRow};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn denver_identity() -> Identity {
    let record = InputRecord::new("John Q", "A Smith", "9 Pine Rd", "80202");
    Identity::new(&record, &CityDistrict::new("Denver", "CO"))
}

#[test]
fn test_unique_city_first_prefix_wins() {
    let cities = strings(&["New York NY", "New Yowk NY", "Boston MA"]);
    assert_eq!(unique_city(&cities), strings(&["New York NY", "Boston MA"]));
}

#[test]
fn test_unique_city_preserves_order() {
    let cities = strings(&["Boston MA", "Brooklyn NY", "Bos Harbor MA", "Albany NY"]);
    assert_eq!(
        unique_city(&cities),
        strings(&["Boston MA", "Brooklyn NY", "Albany NY"])
    );
}

#[test]
fn test_split_multi_word_city() {
    let city = split_city_district("NEW YORK CITY NY");
    assert_eq!(city.city, "NEW YORK CITY");
    assert_eq!(city.dist, "NY");
}

#[test]
fn test_email_decoding_and_filter() {
    let domains = default_allowed_domains();

    let email = decode_email_href("https://site.test/email/jsmith_.gmail.com");
    assert_eq!(email, "jsmith@gmail.com");
    assert!(is_allowed_email(&email, &domains));
    assert!(!is_allowed_email("jsmith@unknownmail.io", &domains));
}

#[test]
fn test_card_verification_any_case_and_order() {
    let id = denver_identity();
    assert!(verify_card_text("denver resident SMITH john", &id));
    assert!(!verify_card_text("John Smith, Aurora", &id));
    assert!(!verify_card_text("John Jones, Denver", &id));
    assert!(!verify_card_text("Jane Smith, Denver", &id));
}

#[test]
fn test_search_url_lowercases_and_hyphenates() {
    let record = InputRecord::new("Mary Ann", "Van Der Berg", "", "84101");
    let id = Identity::new(&record, &CityDistrict::new("Salt Lake City", "UT"));
    assert_eq!(
        search_url("https://www.cyberbackgroundchecks.com", &id),
        "https://www.cyberbackgroundchecks.com/people/mary-berg/ut/salt-lake-city"
    );
}

#[test]
fn test_detail_links_only_for_verified_cards() {
    let html = r#"
        <div class="card card-hover">John Smith - Denver, CO
          <a href="/detail/a">VIEW DETAILS</a></div>
        <div class="card card-hover">John Smith - Denver, CO (no details)</div>
        <div class="card card-hover">Johnny Smithers - Aurora, CO
          <a href="/detail/b">VIEW DETAILS</a></div>"#;

    let cards = parse_cards(html);
    assert_eq!(cards.len(), 3);
    assert_eq!(detail_links(&cards, &denver_identity()), strings(&["/detail/a"]));
}

#[test]
fn test_expand_two_emails() {
    let record = InputRecord::new("Jane", "Doe", "1 Main St", "10001");
    let row = OutputRow::success(
        &record,
        &CityDistrict::new("New York", "NY"),
        strings(&["a@gmail.com", "b@yahoo.com"]),
    );

    let table = expand_rows(&[row]);
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].identity_key(), table[1].identity_key());
    assert_eq!(table[0].status, "SUCCESS");
    assert_eq!(table[1].status, "SUCCESS");
}

#[test]
fn test_duplicate_identity_blanked_not_removed() {
    let mut rows = vec![
        TableRow::from_fields(["Jane", "Doe", "1 Main St", "New York", "NY", "10001", "a@gmail.com", "SUCCESS"]),
        TableRow::from_fields(["Jane", "Doe", "1 Main St", "New York", "NY", "10001", "b@yahoo.com", "SUCCESS"]),
        TableRow::from_fields(["Jane", "Doe", "1 Main St", "Brooklyn", "NY", "10001", "", "SUCCESS"]),
    ];

    blank_duplicate_identities(&mut rows);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].identity_key(), ["", "", "", "", "", ""]);
    assert_eq!(rows[1].email, "b@yahoo.com");
    assert_eq!(rows[1].status, "SUCCESS");
    assert_eq!(rows[2].city, "Brooklyn");
}

#[test]
fn test_merge_blanks_against_existing_rows() {
    let existing = vec![TableRow::from_fields([
        "Jane", "Doe", "1 Main St", "New York", "NY", "10001", "old@aol.com", "SUCCESS",
    ])];
    let record = InputRecord::new("Jane", "Doe", "1 Main St", "10001");
    let new_row = OutputRow::success(&record, &CityDistrict::new("New York", "NY"), vec![]);

    let merged = merge_tables(existing, &[new_row]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].email, "old@aol.com");
    assert_eq!(merged[1].first_name, "");
}
