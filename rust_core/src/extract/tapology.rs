//! Tapology extractor.
//!
//! Good at upcoming-card completeness, aggressive about bot blocking. The
//! fight center listing and bout rows are parsed here; fighter profiles
//! only reliably expose the record line.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{
    FightRecord, RawEvent, RawFight, RawFighterProfile, RawFighterRef, Source, WeightClass,
};
use scraper::{Html, Selector};

pub struct TapologyExtractor;

impl SourceExtractor for TapologyExtractor {
    fn source(&self) -> Source {
        Source::Tapology
    }

    fn events_url(&self) -> &'static str {
        "https://www.tapology.com/fightcenter?group=ufc&schedule=upcoming"
    }

    fn directory_url(&self) -> Option<&'static str> {
        Some("https://www.tapology.com/search/mma-fighters")
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: fightcenter promotion rows with a date sibling.
        let row_sel = Selector::parse("div.fightcenterEvents div.promotion").unwrap();
        let link_sel = Selector::parse("a[href*='/fightcenter/events/']").unwrap();
        let date_sel = Selector::parse("span.datetime").unwrap();

        let mut events = Vec::new();
        for row in doc.select(&row_sel) {
            let link = match row.select(&link_sel).next() {
                Some(l) => l,
                None => continue,
            };
            let name = element_text(&link);
            if name.is_empty() {
                continue;
            }
            events.push(RawEvent {
                name,
                date_text: row.select(&date_sel).next().map(|d| element_text(&d)),
                location: None,
                url: link.value().attr("href").map(|h| absolutize(h)),
                source: Source::Tapology,
            });
        }
        if !events.is_empty() {
            return events;
        }

        // Strategy 2: any event link on the page.
        for link in doc.select(&link_sel) {
            let name = element_text(&link);
            if name.is_empty() {
                continue;
            }
            events.push(RawEvent {
                name,
                date_text: None,
                location: None,
                url: link.value().attr("href").map(absolutize),
                source: Source::Tapology,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);

        // Strategy 1: bout rows, two fighter-name links each.
        let bout_sel = Selector::parse("li.fightCardBout, div.fightCardBout").unwrap();
        let name_sel = Selector::parse("div.fightCardFighterName a").unwrap();
        let weight_sel = Selector::parse("span.weight").unwrap();

        let mut fights = Vec::new();
        for bout in doc.select(&bout_sel) {
            let names: Vec<String> = bout
                .select(&name_sel)
                .map(|n| element_text(&n))
                .filter(|t| !t.is_empty())
                .collect();
            if names.len() < 2 {
                continue;
            }
            let weight_text = bout
                .select(&weight_sel)
                .next()
                .map(|w| element_text(&w))
                .unwrap_or_else(|| element_text(&bout));
            fights.push(RawFight {
                fighter1: names[0].clone(),
                fighter2: names[1].clone(),
                weight_class: WeightClass::infer(&weight_text),
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

    fn extract_fighter_directory(&self, html: &str) -> Vec<RawFighterRef> {
        let doc = Html::parse_document(html);
        let link_sel = Selector::parse("a[href*='/fightcenter/fighters/']").unwrap();
        doc.select(&link_sel)
            .filter_map(|link| {
                let name = element_text(&link);
                if name.is_empty() {
                    return None;
                }
                Some(RawFighterRef {
                    name,
                    url: link.value().attr("href").map(absolutize),
                })
            })
            .collect()
    }

    fn extract_fighter_profile(&self, html: &str) -> Option<RawFighterProfile> {
        let doc = Html::parse_document(html);
        let name_sel = Selector::parse("div.fighterUpcomingHeader h1, h1").unwrap();
        let name = element_text(&doc.select(&name_sel).next()?);
        if name.is_empty() {
            return None;
        }
        // Record appears as "Pro MMA Record: 15-3-0" somewhere in the page.
        let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
        let record = text
            .split("Record:")
            .nth(1)
            .and_then(FightRecord::parse);
        Some(RawFighterProfile {
            name,
            nickname: None,
            record,
            weight_class: Some(WeightClass::infer(&text)),
            stats: None,
        })
    }
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("https://www.tapology.com{}", href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fightcenter_rows_parse() {
        let html = r#"
            <div class="fightcenterEvents">
              <div class="promotion">
                <a href="/fightcenter/events/ufc-312">UFC 312: Whittaker vs. Chimaev</a>
                <span class="datetime">February 08, 2026</span>
              </div>
            </div>"#;
        let events = TapologyExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date_text.as_deref(), Some("February 08, 2026"));
        assert_eq!(
            events[0].url.as_deref(),
            Some("https://www.tapology.com/fightcenter/events/ufc-312")
        );
    }

    #[test]
    fn bout_rows_parse_with_weight_span() {
        let html = r#"
            <li class="fightCardBout">
              <div class="fightCardFighterName"><a href="/f/1">Robert Whittaker</a></div>
              <span class="weight">Middleweight</span>
              <div class="fightCardFighterName"><a href="/f/2">Khamzat Chimaev</a></div>
            </li>"#;
        let fights = TapologyExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].weight_class, WeightClass::Middleweight);
    }

    #[test]
    fn profile_record_line_parses() {
        let html = r#"<h1>Khamzat Chimaev</h1><div>Pro MMA Record: 14-0-0</div>"#;
        let profile = TapologyExtractor.extract_fighter_profile(html).unwrap();
        assert_eq!(profile.name, "Khamzat Chimaev");
        assert_eq!(profile.record, Some(FightRecord { wins: 14, losses: 0, draws: 0 }));
    }
}
