//! Sherdog extractor.
//!
//! Organization pages list events in a `new_table` grid; event pages split
//! the main event into left/right fighter panes and the rest of the card
//! into result rows.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{FightRecord, RawEvent, RawFight, RawFighterProfile, Source, WeightClass};
use scraper::{Html, Selector};

pub struct SherdogExtractor;

impl SourceExtractor for SherdogExtractor {
    fn source(&self) -> Source {
        Source::Sherdog
    }

    fn events_url(&self) -> &'static str {
        "https://www.sherdog.com/organizations/Ultimate-Fighting-Championship-UFC-2"
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: organization event table.
        let row_sel = Selector::parse("table.new_table tr").unwrap();
        let link_sel = Selector::parse("a[href*='/events/']").unwrap();
        let date_sel = Selector::parse("meta[content], span.date").unwrap();
        let cell_sel = Selector::parse("td").unwrap();

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
            let date_text = row
                .select(&date_sel)
                .next()
                .and_then(|d| d.value().attr("content").map(str::to_string))
                .or_else(|| row.select(&cell_sel).next().map(|c| element_text(&c)))
                .filter(|t| !t.is_empty());
            let location = row
                .select(&cell_sel)
                .last()
                .map(|c| element_text(&c))
                .filter(|t| !t.is_empty() && t.contains(','));
            events.push(RawEvent {
                name,
                date_text,
                location,
                url: link.value().attr("href").map(absolutize),
                source: Source::Sherdog,
            });
        }
        if !events.is_empty() {
            return events;
        }

        // Strategy 2: bare event links.
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
                source: Source::Sherdog,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);
        let mut fights = Vec::new();

        // Strategy 1: the headline bout panes.
        let left_sel = Selector::parse("div.fight_card div.left_side h3 a").unwrap();
        let right_sel = Selector::parse("div.fight_card div.right_side h3 a").unwrap();
        let class_sel = Selector::parse("div.fight_card span.weight_class").unwrap();
        if let (Some(left), Some(right)) = (
            doc.select(&left_sel).next(),
            doc.select(&right_sel).next(),
        ) {
            let f1 = element_text(&left);
            let f2 = element_text(&right);
            if !f1.is_empty() && !f2.is_empty() {
                let class_text = doc
                    .select(&class_sel)
                    .next()
                    .map(|c| element_text(&c))
                    .unwrap_or_default();
                fights.push(RawFight {
                    fighter1: f1,
                    fighter2: f2,
                    weight_class: WeightClass::infer(&class_text),
                    card_position: Some(crate::types::CardPosition::Main),
                    completed: false,
                });
            }
        }

        // Remaining bouts: result rows with two fighter links each.
        let row_sel = Selector::parse("table.new_table tr").unwrap();
        let fighter_sel = Selector::parse("a[href*='/fighter/']").unwrap();
        for row in doc.select(&row_sel) {
            let names: Vec<String> = row
                .select(&fighter_sel)
                .map(|l| element_text(&l))
                .filter(|t| !t.is_empty())
                .collect();
            if names.len() < 2 {
                continue;
            }
            fights.push(RawFight {
                fighter1: names[0].clone(),
                fighter2: names[1].clone(),
                weight_class: WeightClass::infer(&element_text(&row)),
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

    fn extract_fighter_profile(&self, html: &str) -> Option<RawFighterProfile> {
        let doc = Html::parse_document(html);
        let name_sel = Selector::parse("span.fn, h1 span.fn, h1").unwrap();
        let name = element_text(&doc.select(&name_sel).next()?);
        if name.is_empty() {
            return None;
        }
        let nick_sel = Selector::parse("span.nickname").unwrap();
        let nickname = doc
            .select(&nick_sel)
            .next()
            .map(|n| element_text(&n).trim_matches('"').to_string())
            .filter(|n| !n.is_empty());

        // Wins/losses sit in separate counter blocks.
        let win_sel = Selector::parse("div.winloses.win span:nth-of-type(2)").unwrap();
        let lose_sel = Selector::parse("div.winloses.lose span:nth-of-type(2)").unwrap();
        let wins = doc
            .select(&win_sel)
            .next()
            .and_then(|e| element_text(&e).parse::<u16>().ok());
        let losses = doc
            .select(&lose_sel)
            .next()
            .and_then(|e| element_text(&e).parse::<u16>().ok());
        let record = match (wins, losses) {
            (Some(w), Some(l)) => Some(FightRecord { wins: w, losses: l, draws: 0 }),
            _ => None,
        };

        let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
        Some(RawFighterProfile {
            name,
            nickname,
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
        format!("https://www.sherdog.com{}", href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardPosition;

    #[test]
    fn organization_event_rows_parse() {
        let html = r#"
            <table class="new_table event"><tr>
              <td><meta content="2026-02-08"><span class="date">Feb 08</span></td>
              <td><a href="/events/UFC-312-Whittaker-vs-Chimaev-109942">UFC 312</a></td>
              <td>Qudos Bank Arena, Sydney</td>
            </tr></table>"#;
        let events = SherdogExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date_text.as_deref(), Some("2026-02-08"));
        assert!(events[0].url.as_deref().unwrap().contains("sherdog.com/events/"));
        assert_eq!(events[0].location.as_deref(), Some("Qudos Bank Arena, Sydney"));
    }

    #[test]
    fn headline_panes_become_the_main_event() {
        let html = r#"
            <div class="fight_card">
              <span class="weight_class">Heavyweight</span>
              <div class="left_side"><h3><a href="/fighter/Jon-Jones-27944">Jon Jones</a></h3></div>
              <div class="right_side"><h3><a href="/fighter/Tom-Aspinall-73145">Tom Aspinall</a></h3></div>
            </div>"#;
        let fights = SherdogExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].card_position, Some(CardPosition::Main));
        assert_eq!(fights[0].weight_class, WeightClass::Heavyweight);
    }

    #[test]
    fn profile_counters_build_a_record() {
        let html = r#"
            <h1><span class="fn">Tom Aspinall</span></h1>
            <span class="nickname">"The Honey Badger"</span>
            <div class="winloses win"><span>Wins</span><span>15</span></div>
            <div class="winloses lose"><span>Losses</span><span>3</span></div>"#;
        let profile = SherdogExtractor.extract_fighter_profile(html).unwrap();
        assert_eq!(profile.record, Some(FightRecord { wins: 15, losses: 3, draws: 0 }));
        assert_eq!(profile.nickname.as_deref(), Some("The Honey Badger"));
    }
}
