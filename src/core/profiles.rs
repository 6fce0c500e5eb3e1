use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::html::{element_text, ParseError};
use crate::models::Identity;

/// Marker text of the card anchor leading to a profile's detail page
pub const VIEW_DETAILS: &str = "VIEW DETAILS";

const EMAIL_SECTION_MARKER: &str = "email addresses";

const CARD_CLASSES: &str = "card card-hover";

static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card.card-hover").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static TEXT_SECONDARY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".text-secondary").unwrap());
static H3: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());

/// One search-result entry from a profile listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub text: String,
    /// Href of the first "VIEW DETAILS" anchor, if it carries one
    pub detail_href: Option<String>,
}

fn name_slug(identity: &Identity) -> String {
    format!(
        "{}-{}",
        identity.first_token().to_lowercase(),
        identity.last_token().to_lowercase()
    )
}

/// `{base}/people/{first}-{last}/{dist}/{city-with-hyphens}`, lowercased
pub fn search_url(base: &str, identity: &Identity) -> String {
    format!(
        "{}/people/{}/{}/{}",
        base.trim_end_matches('/'),
        name_slug(identity),
        identity.dist.to_lowercase(),
        identity.city.replace(' ', "-").to_lowercase()
    )
}

/// Name-only search, used when the city-scoped page can't be fetched
pub fn fallback_url(base: &str, identity: &Identity) -> String {
    format!("{}/people/{}", base.trim_end_matches('/'), name_slug(identity))
}

/// Case-insensitive check that a card mentions the first name, last name and city
pub fn verify_card_text(text: &str, identity: &Identity) -> bool {
    let haystack = text.to_lowercase();
    [identity.first_token(), identity.last_token(), identity.city.as_str()]
        .iter()
        .all(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Parse every result card on a listing page, in document order
pub fn parse_cards(html: &str) -> Vec<ProfileCard> {
    let doc = Html::parse_document(html);

    doc.select(&CARD)
        .filter(|card| is_plain_card(*card))
        .map(|card| {
            let detail_href = card
                .select(&ANCHOR)
                .find(|a| element_text(*a).contains(VIEW_DETAILS))
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);

            ProfileCard {
                text: element_text(card),
                detail_href,
            }
        })
        .collect()
}

/// Class list is exactly "card card-hover", whatever whitespace separates it
fn is_plain_card(el: ElementRef<'_>) -> bool {
    let classes = el.value().attr("class").unwrap_or("");
    classes.split_whitespace().collect::<Vec<_>>().join(" ") == CARD_CLASSES
}

/// Detail hrefs of the cards that advertise details and match the identity.
///
/// A card without an href-bearing "VIEW DETAILS" anchor is skipped.
pub fn detail_links(cards: &[ProfileCard], identity: &Identity) -> Vec<String> {
    cards
        .iter()
        .filter(|card| card.text.contains(VIEW_DETAILS))
        .filter(|card| verify_card_text(&card.text, identity))
        .filter_map(|card| card.detail_href.clone())
        .collect()
}

/// Decode an obfuscated email link: last path segment with `_.` read as `@`
pub fn decode_email_href(href: &str) -> String {
    let tail = href.rsplit('/').next().unwrap_or(href);
    tail.replace("_.", "@")
}

/// True if the email contains one of the allowed domains
pub fn is_allowed_email(email: &str, allowed_domains: &[String]) -> bool {
    allowed_domains.iter().any(|domain| email.contains(domain.as_str()))
}

/// Decode every email listed in the "email addresses" sections of a detail page.
///
/// Domain filtering is left to the caller.
pub fn extract_emails_from_detail(html: &str) -> Result<Vec<String>, ParseError> {
    let doc = Html::parse_document(html);
    let mut emails = Vec::new();

    for section in doc.select(&TEXT_SECONDARY) {
        if !element_text(section).to_lowercase().contains(EMAIL_SECTION_MARKER) {
            continue;
        }

        for entry in section.select(&H3) {
            let href = entry
                .select(&ANCHOR)
                .next()
                .ok_or(ParseError::MissingElement("email anchor"))?
                .value()
                .attr("href")
                .ok_or(ParseError::MissingElement("email href"))?;

            emails.push(decode_email_href(href));
        }
    }

    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_allowed_domains;
    use crate::models::{CityDistrict, InputRecord};

    fn identity() -> Identity {
        let record = InputRecord::new("John Q", "A Smith", "1 Main St", "80202");
        Identity::new(&record, &CityDistrict::new("Denver", "CO"))
    }

    #[test]
    fn test_search_url() {
        let record = InputRecord::new("Jane", "Doe", "", "10001");
        let id = Identity::new(&record, &CityDistrict::new("New York", "NY"));
        assert_eq!(
            search_url("https://example.com", &id),
            "https://example.com/people/jane-doe/ny/new-york"
        );
        assert_eq!(fallback_url("https://example.com/", &id), "https://example.com/people/jane-doe");
    }

    #[test]
    fn test_search_url_uses_name_tokens() {
        assert_eq!(
            search_url("https://example.com", &identity()),
            "https://example.com/people/john-smith/co/denver"
        );
    }

    #[test]
    fn test_verify_card_text() {
        let id = identity();
        assert!(verify_card_text("SMITH, john - lives in DENVER", &id));
        assert!(!verify_card_text("John Smith, Boulder", &id));
        assert!(!verify_card_text("John Denver", &id));
        assert!(!verify_card_text("Smith of Denver", &id));
    }

    #[test]
    fn test_decode_email_href() {
        assert_eq!(decode_email_href("/email/jsmith_.gmail.com"), "jsmith@gmail.com");
        assert_eq!(decode_email_href("jsmith_.gmail.com"), "jsmith@gmail.com");
    }

    #[test]
    fn test_is_allowed_email() {
        let domains = default_allowed_domains();
        assert!(is_allowed_email("jsmith@gmail.com", &domains));
        assert!(!is_allowed_email("jsmith@unknownmail.io", &domains));
    }

    #[test]
    fn test_parse_cards_and_detail_links() {
        let html = r#"
            <div class="card card-hover">
              <h2>John Smith</h2><span>Denver, CO</span>
              <a href="/other">Phone</a>
              <a href="/detail/1">VIEW DETAILS</a>
            </div>
            <div class="card card-hover">
              <h2>John Smith</h2><span>Boulder, CO</span>
              <a href="/detail/2">VIEW DETAILS</a>
            </div>
            <div class="card card-hover special">
              <h2>John Smith</h2><span>Denver, CO</span>
              <a href="/detail/3">VIEW DETAILS</a>
            </div>
            <div class="card card-hover">
              <h2>John Smith</h2><span>Denver, CO</span>
              <a>VIEW DETAILS</a>
            </div>
            <div class="card
                 card-hover">
              <h2>John Smith</h2><span>Denver, CO</span>
              <a href="/detail/4">VIEW DETAILS</a>
            </div>
            <div class="card-hover card">
              <h2>John Smith</h2><span>Denver, CO</span>
              <a href="/detail/5">VIEW DETAILS</a>
            </div>"#;

        let cards = parse_cards(html);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].detail_href.as_deref(), Some("/detail/1"));
        assert_eq!(cards[2].detail_href, None);
        assert_eq!(cards[3].detail_href.as_deref(), Some("/detail/4"));

        assert_eq!(
            detail_links(&cards, &identity()),
            vec!["/detail/1".to_string(), "/detail/4".to_string()]
        );
    }

    #[test]
    fn test_view_details_is_case_sensitive() {
        let html = r#"<div class="card card-hover">John Smith Denver
            <a href="/detail/1">View Details</a></div>"#;
        let cards = parse_cards(html);
        assert!(detail_links(&cards, &identity()).is_empty());
    }

    #[test]
    fn test_extract_emails_from_detail() {
        let html = r#"
            <div class="text-secondary">Phone Numbers<h3><a href="/phone/555">555</a></h3></div>
            <div class="text-secondary">
              <h2>Email Addresses</h2>
              <h3><a href="/email/jsmith_.gmail.com">jsmith at gmail</a></h3>
              <h3><a href="/email/js_.corp.io">js at corp</a></h3>
            </div>"#;

        let emails = extract_emails_from_detail(html).unwrap();
        assert_eq!(emails, vec!["jsmith@gmail.com", "js@corp.io"]);
    }

    #[test]
    fn test_extract_emails_missing_anchor() {
        let html = r#"<div class="text-secondary">Email Addresses<h3>hidden</h3></div>"#;
        assert_eq!(
            extract_emails_from_detail(html).unwrap_err(),
            ParseError::MissingElement("email anchor")
        );
    }
}
