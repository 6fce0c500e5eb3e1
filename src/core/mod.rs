// Core parsing and table exports
pub mod cities;
pub mod html;
pub mod profiles;
pub mod table;

pub use cities::{parse_city_lookup_page, split_city_district, unique_city};
pub use html::{normalize_ws, ParseError};
pub use profiles::{
    decode_email_href, detail_links, extract_emails_from_detail, fallback_url, is_allowed_email,
    parse_cards, search_url, verify_card_text, ProfileCard,
};
pub use table::{blank_duplicate_identities, expand_rows, merge_tables};
