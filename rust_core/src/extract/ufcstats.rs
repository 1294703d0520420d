//! UFCStats.com extractor.
//!
//! The statistically richest source: tabular event listings, full fight
//! cards with win/loss flags, and per-fighter career statistics. Markup has
//! been stable for years but the cascade still carries a bare-link fallback
//! for the day it is not.

use super::{element_text, fights_from_prose, SourceExtractor};
use crate::types::{
    FightRecord, FightStats, RawEvent, RawFight, RawFighterProfile, RawFighterRef, Source,
    WeightClass,
};
use scraper::{Html, Selector};
use tracing::debug;

pub struct UfcStatsExtractor;

impl SourceExtractor for UfcStatsExtractor {
    fn source(&self) -> Source {
        Source::UfcStats
    }

    fn events_url(&self) -> &'static str {
        "http://ufcstats.com/statistics/events/upcoming?page=all"
    }

    fn directory_url(&self) -> Option<&'static str> {
        Some("http://ufcstats.com/statistics/fighters?char=a&page=all")
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent> {
        let doc = Html::parse_document(html);

        // Strategy 1: the events table.
        let row_sel =
            Selector::parse("table.b-statistics__table-events tr.b-statistics__table-row")
                .unwrap();
        let link_sel = Selector::parse("a.b-link").unwrap();
        let date_sel = Selector::parse("span.b-statistics__date").unwrap();
        let col_sel = Selector::parse("td.b-statistics__table-col").unwrap();

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
            let date_text = row.select(&date_sel).next().map(|d| element_text(&d));
            let location = row
                .select(&col_sel)
                .nth(1)
                .map(|c| element_text(&c))
                .filter(|t| !t.is_empty());
            events.push(RawEvent {
                name,
                date_text,
                location,
                url: link.value().attr("href").map(str::to_string),
                source: Source::UfcStats,
            });
        }
        if !events.is_empty() {
            debug!(count = events.len(), "ufcstats events via table strategy");
            return events;
        }

        // Strategy 2: any event-details link on the page.
        let bare_sel = Selector::parse("a[href*='event-details']").unwrap();
        for link in doc.select(&bare_sel) {
            let name = element_text(&link);
            if name.is_empty() {
                continue;
            }
            events.push(RawEvent {
                name,
                date_text: None,
                location: None,
                url: link.value().attr("href").map(str::to_string),
                source: Source::UfcStats,
            });
        }
        events
    }

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight> {
        let doc = Html::parse_document(html);
        let row_sel =
            Selector::parse("tbody.b-fight-details__table-body tr.b-fight-details__table-row")
                .unwrap();
        let fighter_sel = Selector::parse("a[href*='fighter-details']").unwrap();
        let flag_sel = Selector::parse("a.b-flag").unwrap();

        let mut fights = Vec::new();
        for row in doc.select(&row_sel) {
            let names: Vec<String> = row
                .select(&fighter_sel)
                .map(|l| element_text(&l))
                .filter(|n| !n.is_empty())
                .collect();
            if names.len() < 2 {
                continue;
            }
            let completed = row
                .select(&flag_sel)
                .any(|f| element_text(&f).to_lowercase() == "win");
            fights.push(RawFight {
                fighter1: names[0].clone(),
                fighter2: names[1].clone(),
                weight_class: WeightClass::infer(&element_text(&row)),
                card_position: None,
                completed,
            });
        }
        if !fights.is_empty() {
            return fights;
        }

        // The table is gone: scrape whatever prose survives.
        fights_from_prose(&page_text(&doc))
    }

    fn extract_fighter_directory(&self, html: &str) -> Vec<RawFighterRef> {
        let doc = Html::parse_document(html);
        let row_sel = Selector::parse("tr.b-statistics__table-row").unwrap();
        let link_sel = Selector::parse("a[href*='fighter-details']").unwrap();

        let mut refs = Vec::new();
        for row in doc.select(&row_sel) {
            // First and last name are separate linked columns; join them.
            let mut url = None;
            let parts: Vec<String> = row
                .select(&link_sel)
                .map(|l| {
                    if url.is_none() {
                        url = l.value().attr("href").map(str::to_string);
                    }
                    element_text(&l)
                })
                .filter(|t| !t.is_empty())
                .collect();
            if parts.is_empty() {
                continue;
            }
            refs.push(RawFighterRef { name: parts.join(" "), url });
        }
        refs
    }

    fn extract_fighter_profile(&self, html: &str) -> Option<RawFighterProfile> {
        let doc = Html::parse_document(html);
        let name_sel = Selector::parse("span.b-content__title-highlight").unwrap();
        let record_sel = Selector::parse("span.b-content__title-record").unwrap();
        let item_sel = Selector::parse("li.b-list__box-list-item").unwrap();

        let name = element_text(&doc.select(&name_sel).next()?);
        if name.is_empty() {
            return None;
        }
        let record = doc
            .select(&record_sel)
            .next()
            .and_then(|r| FightRecord::parse(&element_text(&r)));

        let mut stats = FightStats::default();
        let mut saw_stats = false;
        for item in doc.select(&item_sel) {
            let text = element_text(&item);
            let Some(value) = stat_value(&text) else { continue };
            let slot = if text.starts_with("SLpM") {
                Some(&mut stats.sig_strikes_landed_per_min)
            } else if text.starts_with("Str. Acc.") {
                Some(&mut stats.striking_accuracy_pct)
            } else if text.starts_with("SApM") {
                Some(&mut stats.strikes_absorbed_per_min)
            } else if text.starts_with("Str. Def") {
                Some(&mut stats.striking_defense_pct)
            } else if text.starts_with("TD Avg.") {
                Some(&mut stats.takedowns_per_15_min)
            } else if text.starts_with("TD Acc.") {
                Some(&mut stats.takedown_accuracy_pct)
            } else if text.starts_with("TD Def.") {
                Some(&mut stats.takedown_defense_pct)
            } else if text.starts_with("Sub. Avg.") {
                Some(&mut stats.submissions_per_15_min)
            } else {
                None
            };
            if let Some(slot) = slot {
                *slot = value;
                saw_stats = true;
            }
        }

        Some(RawFighterProfile {
            weight_class: Some(WeightClass::infer(&page_text(&doc))),
            stats: saw_stats.then_some(stats),
            nickname: None,
            name,
            record,
        })
    }
}

fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect::<Vec<_>>().join(" ")
}

/// "SLpM: 4.30" -> 4.30, "Str. Acc.: 58%" -> 58.0
fn stat_value(text: &str) -> Option<f64> {
    let value = text.split(':').nth(1)?.trim().trim_end_matches('%');
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS_HTML: &str = r#"
        <table class="b-statistics__table-events"><tbody>
          <tr class="b-statistics__table-row">
            <td class="b-statistics__table-col">
              <a class="b-link" href="http://ufcstats.com/event-details/abc123">UFC 312: Whittaker vs Chimaev</a>
              <span class="b-statistics__date">February 08, 2026</span>
            </td>
            <td class="b-statistics__table-col">Sydney, New South Wales, Australia</td>
          </tr>
        </tbody></table>"#;

    #[test]
    fn events_table_strategy() {
        let events = UfcStatsExtractor.extract_events(EVENTS_HTML);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "UFC 312: Whittaker vs Chimaev");
        assert_eq!(events[0].date_text.as_deref(), Some("February 08, 2026"));
        assert_eq!(
            events[0].location.as_deref(),
            Some("Sydney, New South Wales, Australia")
        );
        assert_eq!(
            events[0].url.as_deref(),
            Some("http://ufcstats.com/event-details/abc123")
        );
    }

    #[test]
    fn bare_link_fallback_when_table_is_gone() {
        let html = r#"<div><a href="/event-details/zzz">UFC 313</a></div>"#;
        let events = UfcStatsExtractor.extract_events(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "UFC 313");
        assert!(events[0].date_text.is_none());
    }

    #[test]
    fn fight_card_rows_with_completion_flags() {
        let html = r#"
            <table class="b-fight-details__table"><tbody class="b-fight-details__table-body">
              <tr class="b-fight-details__table-row">
                <td><a class="b-flag"><i>win</i></a></td>
                <td><a href="/fighter-details/f1">Robert Whittaker</a>
                    <a href="/fighter-details/f2">Khamzat Chimaev</a></td>
                <td>Middleweight Bout</td>
              </tr>
              <tr class="b-fight-details__table-row">
                <td><a href="/fighter-details/f3">Jon Jones</a>
                    <a href="/fighter-details/f4">Tom Aspinall</a></td>
                <td>Heavyweight Bout</td>
              </tr>
            </tbody></table>"#;
        let fights = UfcStatsExtractor.extract_fight_card(html);
        assert_eq!(fights.len(), 2);
        assert!(fights[0].completed);
        assert_eq!(fights[0].weight_class, WeightClass::Middleweight);
        assert!(!fights[1].completed);
        assert_eq!(fights[1].fighter1, "Jon Jones");
    }

    #[test]
    fn empty_card_yields_empty_not_error() {
        assert!(UfcStatsExtractor.extract_fight_card("<html><body></body></html>").is_empty());
    }

    #[test]
    fn directory_joins_name_columns() {
        // Rows must sit in table context or html5ever drops them.
        let html = r#"
            <table><tbody>
              <tr class="b-statistics__table-row">
                <td><a href="/fighter-details/x">Tom</a></td>
                <td><a href="/fighter-details/x">Aspinall</a></td>
              </tr>
            </tbody></table>"#;
        let refs = UfcStatsExtractor.extract_fighter_directory(html);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Tom Aspinall");
        assert_eq!(refs[0].url.as_deref(), Some("/fighter-details/x"));
    }

    #[test]
    fn fighter_profile_stats_parse() {
        let html = r#"
            <span class="b-content__title-highlight">Tom Aspinall</span>
            <span class="b-content__title-record">Record: 15-3-0</span>
            <ul class="b-list__box-list">
              <li class="b-list__box-list-item">SLpM: 7.62</li>
              <li class="b-list__box-list-item">Str. Acc.: 61%</li>
              <li class="b-list__box-list-item">TD Avg.: 2.45</li>
            </ul>
            <p>Heavyweight</p>"#;
        let profile = UfcStatsExtractor.extract_fighter_profile(html).unwrap();
        assert_eq!(profile.name, "Tom Aspinall");
        assert_eq!(profile.record, Some(FightRecord { wins: 15, losses: 3, draws: 0 }));
        let stats = profile.stats.unwrap();
        assert!((stats.sig_strikes_landed_per_min - 7.62).abs() < 1e-9);
        assert!((stats.striking_accuracy_pct - 61.0).abs() < 1e-9);
        assert_eq!(profile.weight_class, Some(WeightClass::Heavyweight));
    }
}
