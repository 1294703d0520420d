//! UFC.com extractor.
//!
//! The promotion's own site. Event cards are React-rendered but ship with
//! stable `c-card-event` / `c-listing-fight` class names; when those rotate
//! (they have before), the card falls back to prose pair matching.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{RawEvent, RawFight, Source, WeightClass};
use scraper::{Html, Selector};
use tracing::debug;

pub struct UfcComExtractor;

impl SourceExtractor for UfcComExtractor {
    fn source(&self) -> Source {
        Source::UfcCom
    }

    fn events_url(&self) -> &'static str {
        "https://www.ufc.com/events"
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: event result cards.
        let card_sel = Selector::parse("h3.c-card-event--result__headline a").unwrap();
        let date_sel = Selector::parse("div.c-card-event--result__date").unwrap();
        let venue_sel = Selector::parse("div.c-card-event--result__location").unwrap();

        let names: Vec<_> = doc.select(&card_sel).collect();
        if !names.is_empty() {
            let dates: Vec<_> = doc.select(&date_sel).collect();
            let venues: Vec<_> = doc.select(&venue_sel).collect();
            let mut events = Vec::new();
            for (i, link) in names.iter().enumerate() {
                let name = element_text(link);
                if name.is_empty() {
                    continue;
                }
                events.push(RawEvent {
                    name,
                    date_text: dates.get(i).map(element_text),
                    location: venues.get(i).map(element_text).filter(|t| !t.is_empty()),
                    url: link
                        .value()
                        .attr("href")
                        .map(|h| absolutize("https://www.ufc.com", h)),
                    source: Source::UfcCom,
                });
            }
            debug!(count = events.len(), "ufc.com events via card strategy");
            return events;
        }

        // Strategy 2: bare event links.
        let bare_sel = Selector::parse("a[href^='/event/']").unwrap();
        let mut events = Vec::new();
        for link in doc.select(&bare_sel) {
            let name = element_text(&link);
            if name.is_empty() {
                continue;
            }
            events.push(RawEvent {
                name,
                date_text: None,
                location: None,
                url: link
                    .value()
                    .attr("href")
                    .map(|h| absolutize("https://www.ufc.com", h)),
                source: Source::UfcCom,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);

        // Strategy 1: fight listing items with two corner names each.
        let fight_sel = Selector::parse("div.c-listing-fight").unwrap();
        let corner_sel = Selector::parse("div.c-listing-fight__corner-name").unwrap();
        let class_sel = Selector::parse("div.c-listing-fight__class-text").unwrap();

        let mut fights = Vec::new();
        for item in doc.select(&fight_sel) {
            let corners: Vec<String> = item
                .select(&corner_sel)
                .map(|c| element_text(&c))
                .filter(|t| !t.is_empty())
                .collect();
            if corners.len() < 2 {
                continue;
            }
            let class_text = item
                .select(&class_sel)
                .next()
                .map(|c| element_text(&c))
                .unwrap_or_default();
            fights.push(RawFight {
                fighter1: corners[0].clone(),
                fighter2: corners[1].clone(),
                weight_class: WeightClass::infer(&class_text),
                card_position: None,
                completed: false,
            });
        }
        if !fights.is_empty() {
            return fights;
        }

        let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
        fights_from_prose(&text)
    }
}

fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_cards_parse_with_relative_urls() {
        let html = r#"
            <h3 class="c-card-event--result__headline"><a href="/event/ufc-312">Whittaker vs Chimaev</a></h3>
            <div class="c-card-event--result__date">Sat, Feb 7 / 10:00 PM EST</div>
            <div class="c-card-event--result__location">Sydney, Australia</div>"#;
        let events = UfcComExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].url.as_deref(), Some("https://www.ufc.com/event/ufc-312"));
        assert_eq!(events[0].location.as_deref(), Some("Sydney, Australia"));
    }

    #[test]
    fn fight_listing_pairs_corners() {
        let html = r#"
            <div class="c-listing-fight">
              <div class="c-listing-fight__class-text">Women's Flyweight Bout</div>
              <div class="c-listing-fight__corner-name">Valentina Shevchenko</div>
              <div class="c-listing-fight__corner-name">Alexa Grasso</div>
            </div>"#;
        let fights = UfcComExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].weight_class, WeightClass::WomensFlyweight);
        assert_eq!(fights[0].fighter1, "Valentina Shevchenko");
    }

    #[test]
    fn prose_fallback_when_listing_classes_rotate() {
        let html = "<p>Main Card</p><p>Jon Jones vs Tom Aspinall</p>";
        let fights = UfcComExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].fighter2, "Tom Aspinall");
    }
}
