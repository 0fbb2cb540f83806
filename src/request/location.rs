//! Location filters and display text derived from a news flash.

use tracing::warn;

use super::Resolution;
use crate::store::{Filters, NewsFlash};

/// Equality filters for every non-null location field of the resolution.
pub fn location_filters(news_flash: &NewsFlash, resolution: Resolution) -> Filters {
    let mut filters = Filters::new();
    for field in resolution.location_fields() {
        let value = news_flash.location_value(*field);
        if !value.is_null() {
            filters.insert(*field, value);
        }
    }
    filters
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Human readable location of the news flash, most specific rule first.
pub fn location_text(news_flash: &NewsFlash) -> String {
    let resolution = news_flash
        .resolution
        .as_deref()
        .and_then(Resolution::from_hebrew);
    let yishuv = non_empty(news_flash.yishuv_name.as_deref());
    let street1 = non_empty(news_flash.street1_hebrew.as_deref());
    let segment = non_empty(news_flash.road_segment_name.as_deref());
    let road1 = news_flash.road1.filter(|r| *r != 0);
    let road2 = news_flash.road2.filter(|r| *r != 0);
    let fallback = || news_flash.location.clone().unwrap_or_default();

    match (resolution, road1, road2, segment, yishuv, street1) {
        (Some(Resolution::InterCityRoad), Some(r1), _, Some(seg), _, _) => {
            format!("כביש {r1} במקטע {seg}")
        }
        (Some(Resolution::City), _, _, _, None, _) => fallback(),
        (Some(Resolution::City), _, _, _, Some(yishuv), _) => yishuv.to_string(),
        (Some(Resolution::InterCityJunction), Some(r1), Some(r2), _, _, _) => {
            format!("צומת כביש {r1} עם כביש {r2}")
        }
        (Some(Resolution::InterCityJunction), Some(r1), None, Some(seg), _, _) => {
            format!("כביש {r1} במקטע {seg}")
        }
        (Some(Resolution::Street), _, _, _, Some(yishuv), Some(street)) => {
            format!("רחוב {street} ב{yishuv}")
        }
        _ => {
            warn!(
                news_flash_id = news_flash.id,
                resolution = news_flash.resolution.as_deref().unwrap_or(""),
                "No location rule matched, using raw location text"
            );
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Field, FilterValue};

    fn news_flash(resolution: &str) -> NewsFlash {
        NewsFlash {
            id: 1,
            resolution: Some(resolution.to_string()),
            location: Some("מקום כלשהו".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_inter_city_road_text() {
        let nf = NewsFlash {
            road1: Some(90),
            road_segment_name: Some("עין גדי - מצדה".to_string()),
            ..news_flash("כביש בינעירוני")
        };
        assert_eq!(location_text(&nf), "כביש 90 במקטע עין גדי - מצדה");
    }

    #[test]
    fn test_city_text_prefers_yishuv() {
        let nf = NewsFlash {
            yishuv_name: Some("חיפה".to_string()),
            ..news_flash("עיר")
        };
        assert_eq!(location_text(&nf), "חיפה");
        assert_eq!(location_text(&news_flash("עיר")), "מקום כלשהו");
    }

    #[test]
    fn test_junction_text() {
        let nf = NewsFlash {
            road1: Some(1),
            road2: Some(6),
            ..news_flash("צומת בינעירוני")
        };
        assert_eq!(location_text(&nf), "צומת כביש 1 עם כביש 6");

        let nf = NewsFlash {
            road1: Some(1),
            road_segment_name: Some("שער הגיא".to_string()),
            ..news_flash("צומת בינעירוני")
        };
        assert_eq!(location_text(&nf), "כביש 1 במקטע שער הגיא");
    }

    #[test]
    fn test_street_text() {
        let nf = NewsFlash {
            yishuv_name: Some("תל אביב".to_string()),
            street1_hebrew: Some("בן יהודה".to_string()),
            ..news_flash("רחוב")
        };
        assert_eq!(location_text(&nf), "רחוב בן יהודה בתל אביב");
    }

    #[test]
    fn test_unmatched_rule_falls_back_to_location() {
        assert_eq!(location_text(&news_flash("כביש בינעירוני")), "מקום כלשהו");
        let nf = NewsFlash {
            location: None,
            ..news_flash("מחוז")
        };
        assert_eq!(location_text(&nf), "");
    }

    #[test]
    fn test_location_filters_skip_nulls() {
        let nf = NewsFlash {
            road1: Some(90),
            ..news_flash("כביש בינעירוני")
        };
        let filters = location_filters(&nf, Resolution::InterCityRoad);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get(Field::Road1), Some(&FilterValue::from(90i64)));
    }
}
