//! Wikipedia extractor.
//!
//! The "List of UFC events" page and per-event articles. Wikitables are the
//! most regular markup of any source, but cell ordering drifts between
//! editors, so fight rows are matched on the "def."/"vs." separator column
//! rather than fixed indices.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{RawEvent, RawFight, Source, WeightClass};
use scraper::{Html, Selector};

pub struct WikipediaExtractor;

impl SourceExtractor for WikipediaExtractor {
    fn source(&self) -> Source {
        Source::Wikipedia
    }

    fn events_url(&self) -> &'static str {
        "https://en.wikipedia.org/wiki/List_of_UFC_events"
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: scheduled-events wikitable rows.
        let row_sel = Selector::parse("table.wikitable tbody tr").unwrap();
        let cell_sel = Selector::parse("td").unwrap();
        let link_sel = Selector::parse("a[href^='/wiki/UFC']").unwrap();

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
            let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
            // Event | Date | Venue | Location is the long-standing layout.
            events.push(RawEvent {
                name,
                date_text: cells.get(1).cloned().filter(|t| !t.is_empty()),
                location: cells.get(3).or(cells.get(2)).cloned().filter(|t| !t.is_empty()),
                url: link
                    .value()
                    .attr("href")
                    .map(|h| format!("https://en.wikipedia.org{}", h)),
                source: Source::Wikipedia,
            });
        }
        if !events.is_empty() {
            return events;
        }

        // Strategy 2: bare UFC article links.
        for link in doc.select(&link_sel) {
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
                    .map(|h| format!("https://en.wikipedia.org{}", h)),
                source: Source::Wikipedia,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);
        let row_sel = Selector::parse("table.toccolours tr, table.wikitable tr").unwrap();
        let cell_sel = Selector::parse("td").unwrap();

        let mut fights = Vec::new();
        for row in doc.select(&row_sel) {
            let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
            if cells.len() < 4 {
                continue;
            }
            // Weight class | Fighter A | def./vs. | Fighter B | ...
            let sep = cells[2].to_lowercase();
            let completed = sep.starts_with("def");
            if !completed && !sep.starts_with("vs") {
                continue;
            }
            if cells[1].is_empty() || cells[3].is_empty() {
                continue;
            }
            fights.push(RawFight {
                fighter1: cells[1].clone(),
                fighter2: cells[3].clone(),
                weight_class: WeightClass::infer(&cells[0]),
                card_position: None,
                completed,
            });
        }
        if !fights.is_empty() {
            return fights;
        }

        let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
        fights_from_prose(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_events_table_parses() {
        let html = r#"
            <table class="wikitable"><tbody>
              <tr><th>Event</th><th>Date</th><th>Venue</th><th>Location</th></tr>
              <tr>
                <td><a href="/wiki/UFC_312">UFC 312</a></td>
                <td>February 8, 2026</td>
                <td>Qudos Bank Arena</td>
                <td>Sydney, Australia</td>
              </tr>
            </tbody></table>"#;
        let events = WikipediaExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "UFC 312");
        assert_eq!(events[0].date_text.as_deref(), Some("February 8, 2026"));
        assert_eq!(events[0].location.as_deref(), Some("Sydney, Australia"));
        assert_eq!(events[0].url.as_deref(), Some("https://en.wikipedia.org/wiki/UFC_312"));
    }

    #[test]
    fn fight_rows_match_on_separator_column() {
        let html = r#"
            <table class="toccolours">
              <tr><td>Middleweight</td><td>Robert Whittaker</td><td>vs.</td><td>Khamzat Chimaev</td><td></td></tr>
              <tr><td>Heavyweight</td><td>Tom Aspinall</td><td>def.</td><td>Curtis Blaydes</td><td>TKO</td></tr>
              <tr><td>Notes</td><td>something</td><td>else</td><td>entirely</td></tr>
            </table>"#;
        let fights = WikipediaExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 2);
        assert!(!fights[0].completed);
        assert_eq!(fights[0].weight_class, WeightClass::Middleweight);
        assert!(fights[1].completed);
        assert_eq!(fights[1].fighter2, "Curtis Blaydes");
    }
}
