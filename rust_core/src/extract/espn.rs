//! ESPN MMA extractor.
//!
//! ESPN's schedule tables and fightcenter pages reshuffle markup more often
//! than any other source, so the selector strategies here are thin and the
//! prose fallback does most of the work in practice.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{RawEvent, RawFight, Source};
use scraper::{Html, Selector};

pub struct EspnExtractor;

impl SourceExtractor for EspnExtractor {
    fn source(&self) -> Source {
        Source::Espn
    }

    fn events_url(&self) -> &'static str {
        "https://www.espn.com/mma/schedule/_/league/ufc"
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: schedule table rows.
        let row_sel = Selector::parse("tr.Table__TR").unwrap();
        let link_sel = Selector::parse("a.AnchorLink[href*='/mma/fightcenter']").unwrap();
        let cell_sel = Selector::parse("td.Table__TD").unwrap();

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
                .select(&cell_sel)
                .next()
                .map(|c| element_text(&c))
                .filter(|t| !t.is_empty());
            let location = row
                .select(&cell_sel)
                .nth(2)
                .map(|c| element_text(&c))
                .filter(|t| !t.is_empty());
            events.push(RawEvent {
                name,
                date_text,
                location,
                url: link
                    .value()
                    .attr("href")
                    .map(|h| absolutize(h)),
                source: Source::Espn,
            });
        }
        if !events.is_empty() {
            return events;
        }

        // Strategy 2: any fightcenter link.
        let bare_sel = Selector::parse("a[href*='/mma/fightcenter']").unwrap();
        for link in doc.select(&bare_sel) {
            let name = element_text(&link);
            if name.is_empty() {
                continue;
            }
            events.push(RawEvent {
                name,
                date_text: None,
                location: None,
                url: link.value().attr("href").map(absolutize),
                source: Source::Espn,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);

        // Strategy 1: gamestrip competitor blocks, two names per strip.
        let strip_sel = Selector::parse("div.MMAGamestrip").unwrap();
        let name_sel = Selector::parse("span.truncate, h2.MMACompetitor__Name").unwrap();

        let mut fights = Vec::new();
        for strip in doc.select(&strip_sel) {
            let names: Vec<String> = strip
                .select(&name_sel)
                .map(|n| element_text(&n))
                .filter(|t| !t.is_empty())
                .collect();
            if names.len() >= 2 {
                let strip_text = element_text(&strip);
                fights.push(RawFight {
                    fighter1: names[0].clone(),
                    fighter2: names[names.len() - 1].clone(),
                    weight_class: crate::types::WeightClass::infer(&strip_text),
                    card_position: None,
                    completed: strip_text.to_lowercase().contains("final"),
                });
            }
        }
        if !fights.is_empty() {
            return fights;
        }

        // ESPN fight pages are mostly prose anyway.
        let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
        fights_from_prose(&text)
    }
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("https://www.espn.com{}", href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeightClass;

    #[test]
    fn schedule_rows_parse() {
        let html = r#"
            <table><tbody>
            <tr class="Table__TR">
              <td class="Table__TD">Feb 7</td>
              <td class="Table__TD"><a class="AnchorLink" href="/mma/fightcenter/_/id/600041">UFC 312: Whittaker vs Chimaev</a></td>
              <td class="Table__TD">Qudos Bank Arena, Sydney</td>
            </tr>
            </tbody></table>"#;
        let events = EspnExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date_text.as_deref(), Some("Feb 7"));
        assert_eq!(events[0].location.as_deref(), Some("Qudos Bank Arena, Sydney"));
        assert!(events[0].url.as_deref().unwrap().starts_with("https://www.espn.com/"));
    }

    #[test]
    fn gamestrip_pairs_first_and_last_competitor() {
        let html = r#"
            <div class="MMAGamestrip">
              <span class="truncate">Jon Jones</span>
              <span>Heavyweight - Final</span>
              <span class="truncate">Tom Aspinall</span>
            </div>"#;
        let fights = EspnExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].fighter1, "Jon Jones");
        assert_eq!(fights[0].fighter2, "Tom Aspinall");
        assert_eq!(fights[0].weight_class, WeightClass::Heavyweight);
        assert!(fights[0].completed);
    }

    #[test]
    fn prose_fallback_rejects_decoys() {
        let html = "<div>Main Card Jon Jones vs Tom Aspinall. Fight Night Coverage vs ESPN.</div>";
        let fights = EspnExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].fighter1, "Jon Jones");
    }
}
