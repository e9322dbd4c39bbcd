//! The WordPress REST wire schema, and its conversion into [`Event`]s
//!
//! The field names here (including the ACF block) are the remote's versioned
//! contract: they must match the deployed WordPress schema byte for byte.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::category::{Category, CategoryId};
use crate::event::{Event, EventId};

/// The ACF date format, e.g. `20260912`
const ACF_DATE_FORMAT: &str = "%Y%m%d";

/// One post of the paginated listing endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub title: WpRendered,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub acf: Option<WpAcf>,
    /// Some deployments expose the ACF block under `meta` instead
    #[serde(default)]
    pub meta: Option<WpAcf>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WpRendered {
    #[serde(default)]
    pub rendered: String,
}

/// The custom fields this crate reads from a post
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WpAcf {
    #[serde(default)]
    pub esemeny_kezdete: Option<String>,
    #[serde(default)]
    pub esemeny_vege: Option<String>,
    #[serde(default)]
    pub helyszin_rovid_neve: Option<String>,
    #[serde(default)]
    pub esemeny_terkep: Option<WpMap>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WpMap {
    #[serde(default)]
    pub city: Option<String>,
}

/// One entry of the category lookup endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct WpCategory {
    pub id: CategoryId,
    pub name: String,
}

impl From<WpCategory> for Category {
    fn from(wp: WpCategory) -> Self {
        Self {
            id: wp.id,
            name: wp.name,
        }
    }
}

fn parse_acf_date(text: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text?, ACF_DATE_FORMAT).ok()
}

/// Convert one post into an [`Event`].
///
/// Posts without a parsable start date are not events this crate can work with
/// (they cannot be date-filtered or ordered), so they yield `None`.
pub fn parse_post(post: WpPost) -> Option<Event> {
    let acf = post.acf.or(post.meta).unwrap_or_default();

    let start = match parse_acf_date(acf.esemeny_kezdete.as_deref()) {
        Some(date) => date,
        None => {
            log::debug!("Skipping post {}: no parsable start date", post.id);
            return None;
        }
    };
    let end = parse_acf_date(acf.esemeny_vege.as_deref());

    let terkep_city = acf.esemeny_terkep.and_then(|map| map.city);
    let location = acf
        .helyszin_rovid_neve
        .filter(|name| !name.is_empty())
        .or_else(|| terkep_city)
        .unwrap_or_default();

    Some(Event::new(
        EventId(post.id),
        post.title.rendered.trim().to_string(),
        start,
        end,
        location,
        post.categories,
        post.link,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_regular_post() {
        let json = r#"{
            "id": 4217,
            "title": {"rendered": "  Tavaszi borfesztivál "},
            "link": "https://example.org/tavaszi",
            "categories": [5, 6],
            "acf": {
                "esemeny_kezdete": "20260404",
                "esemeny_vege": "20260406",
                "helyszin_rovid_neve": "Villány"
            }
        }"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        let event = parse_post(post).unwrap();

        assert_eq!(event.id(), EventId(4217));
        assert_eq!(event.title(), "Tavaszi borfesztivál");
        assert_eq!(event.start(), NaiveDate::from_ymd_opt(2026, 4, 4).unwrap());
        assert_eq!(event.end(), Some(NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()));
        assert_eq!(event.location(), "Villány");
        assert_eq!(event.categories(), &[5, 6]);
        assert_eq!(event.link(), Some("https://example.org/tavaszi"));
    }

    #[test]
    fn location_falls_back_to_the_map_city() {
        let json = r#"{
            "id": 1,
            "title": {"rendered": "x"},
            "acf": {
                "esemeny_kezdete": "20260101",
                "esemeny_terkep": {"city": "Pécs"}
            }
        }"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        assert_eq!(parse_post(post).unwrap().location(), "Pécs");
    }

    #[test]
    fn meta_block_is_accepted_in_place_of_acf() {
        let json = r#"{
            "id": 2,
            "title": {"rendered": "x"},
            "meta": {"esemeny_kezdete": "20260101"}
        }"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        assert!(parse_post(post).is_some());
    }

    #[test]
    fn posts_without_a_start_date_are_skipped() {
        let json = r#"{"id": 3, "title": {"rendered": "x"}, "acf": {}}"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        assert!(parse_post(post).is_none());

        let json = r#"{"id": 4, "title": {"rendered": "x"}, "acf": {"esemeny_kezdete": "not-a-date"}}"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        assert!(parse_post(post).is_none());
    }
}
