//! Postgres persistence sink.
//!
//! Upserts are idempotent by id; the fighters upsert carries the
//! synthesized-never-overwrites-real rule in its conflict clause so the
//! invariant holds even if two orchestrator runs race.

use super::{EventFilter, FighterFilter, PersistenceSink};
use crate::db::retry::execute_with_retry;
use crate::types::{
    CardPosition, Event, Fight, FightRecord, FightStats, Fighter, FightStatus, Provenance,
    WeightClass,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

const UPSERT_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceSink for PgSink {
    async fn upsert_fighter(&self, fighter: &Fighter) -> Result<()> {
        execute_with_retry(
            || async {
                sqlx::query(
                    r#"
                    INSERT INTO fighters (
                        id, name, nickname, wins, losses, draws, weight_class,
                        slpm, str_acc, sapm, str_def, td_avg, td_acc, td_def,
                        sub_avg, finish_rate, avg_fight_minutes,
                        provenance, last_scraped, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                            $13, $14, $15, $16, $17, $18, $19, NOW())
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        nickname = COALESCE(EXCLUDED.nickname, fighters.nickname),
                        wins = EXCLUDED.wins,
                        losses = EXCLUDED.losses,
                        draws = EXCLUDED.draws,
                        weight_class = EXCLUDED.weight_class,
                        slpm = EXCLUDED.slpm,
                        str_acc = EXCLUDED.str_acc,
                        sapm = EXCLUDED.sapm,
                        str_def = EXCLUDED.str_def,
                        td_avg = EXCLUDED.td_avg,
                        td_acc = EXCLUDED.td_acc,
                        td_def = EXCLUDED.td_def,
                        sub_avg = EXCLUDED.sub_avg,
                        finish_rate = EXCLUDED.finish_rate,
                        avg_fight_minutes = EXCLUDED.avg_fight_minutes,
                        provenance = EXCLUDED.provenance,
                        last_scraped = EXCLUDED.last_scraped,
                        updated_at = NOW()
                    WHERE fighters.provenance <> 'real'
                       OR EXCLUDED.provenance = 'real'
                    "#,
                )
                .bind(&fighter.id)
                .bind(&fighter.name)
                .bind(&fighter.nickname)
                .bind(fighter.record.wins as i32)
                .bind(fighter.record.losses as i32)
                .bind(fighter.record.draws as i32)
                .bind(fighter.weight_class.as_str())
                .bind(fighter.stats.sig_strikes_landed_per_min)
                .bind(fighter.stats.striking_accuracy_pct)
                .bind(fighter.stats.strikes_absorbed_per_min)
                .bind(fighter.stats.striking_defense_pct)
                .bind(fighter.stats.takedowns_per_15_min)
                .bind(fighter.stats.takedown_accuracy_pct)
                .bind(fighter.stats.takedown_defense_pct)
                .bind(fighter.stats.submissions_per_15_min)
                .bind(fighter.stats.finish_rate_pct)
                .bind(fighter.stats.avg_fight_minutes)
                .bind(fighter.provenance.as_str())
                .bind(fighter.last_scraped)
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(Into::into)
            },
            UPSERT_ATTEMPTS,
        )
        .await
    }

    async fn upsert_event(&self, event: &Event) -> Result<()> {
        execute_with_retry(
            || async {
                sqlx::query(
                    r#"
                    INSERT INTO events (id, name, date, location, venue, cancelled, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, NOW())
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        date = EXCLUDED.date,
                        location = COALESCE(EXCLUDED.location, events.location),
                        venue = COALESCE(EXCLUDED.venue, events.venue),
                        cancelled = EXCLUDED.cancelled,
                        updated_at = NOW()
                    "#,
                )
                .bind(&event.id)
                .bind(&event.name)
                .bind(event.date)
                .bind(&event.location)
                .bind(&event.venue)
                .bind(event.cancelled)
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(Into::into)
            },
            UPSERT_ATTEMPTS,
        )
        .await
    }

    async fn upsert_fight(&self, fight: &Fight) -> Result<()> {
        execute_with_retry(
            || async {
                sqlx::query(
                    r#"
                    INSERT INTO fights (
                        id, event_id, fighter1_id, fighter2_id, weight_class,
                        scheduled_rounds, card_position, status, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
                    ON CONFLICT (id) DO UPDATE SET
                        weight_class = EXCLUDED.weight_class,
                        scheduled_rounds = EXCLUDED.scheduled_rounds,
                        card_position = EXCLUDED.card_position,
                        status = EXCLUDED.status,
                        updated_at = NOW()
                    "#,
                )
                .bind(&fight.id)
                .bind(&fight.event_id)
                .bind(&fight.fighter1_id)
                .bind(&fight.fighter2_id)
                .bind(fight.weight_class.as_str())
                .bind(fight.scheduled_rounds as i32)
                .bind(fight.card_position.as_str())
                .bind(fight.status.as_str())
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(Into::into)
            },
            UPSERT_ATTEMPTS,
        )
        .await
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, date, location, venue, cancelled
            FROM events
            WHERE ($1 OR NOT cancelled)
              AND ($2::timestamptz IS NULL OR date >= $2)
            ORDER BY date
            "#,
        )
        .bind(filter.include_cancelled)
        .bind(filter.after)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let fights = self.fights_for_event(&id).await?;
            events.push(Event {
                id,
                name: row.try_get("name")?,
                date: row.try_get::<DateTime<Utc>, _>("date")?,
                location: row.try_get("location")?,
                venue: row.try_get("venue")?,
                fights,
                cancelled: row.try_get("cancelled")?,
            });
        }
        Ok(events)
    }

    async fn find_fighters(&self, filter: &FighterFilter) -> Result<Vec<Fighter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, nickname, wins, losses, draws, weight_class,
                   slpm, str_acc, sapm, str_def, td_avg, td_acc, td_def,
                   sub_avg, finish_rate, avg_fight_minutes, provenance, last_scraped
            FROM fighters
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            "#,
        )
        .bind(&filter.name_contains)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| fighter_from_row(&row)).collect()
    }
}

impl PgSink {
    async fn fights_for_event(&self, event_id: &str) -> Result<Vec<Fight>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_id, fighter1_id, fighter2_id, weight_class,
                   scheduled_rounds, card_position, status
            FROM fights
            WHERE event_id = $1
            ORDER BY id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Fight {
                    id: row.try_get("id")?,
                    event_id: row.try_get("event_id")?,
                    fighter1_id: row.try_get("fighter1_id")?,
                    fighter2_id: row.try_get("fighter2_id")?,
                    weight_class: weight_class_from_str(row.try_get::<String, _>("weight_class")?.as_str()),
                    scheduled_rounds: row.try_get::<i32, _>("scheduled_rounds")? as u8,
                    card_position: card_position_from_str(
                        row.try_get::<String, _>("card_position")?.as_str(),
                    ),
                    status: status_from_str(row.try_get::<String, _>("status")?.as_str()),
                })
            })
            .collect()
    }
}

fn fighter_from_row(row: &sqlx::postgres::PgRow) -> Result<Fighter> {
    Ok(Fighter {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        nickname: row.try_get("nickname")?,
        record: FightRecord {
            wins: row.try_get::<i32, _>("wins")? as u16,
            losses: row.try_get::<i32, _>("losses")? as u16,
            draws: row.try_get::<i32, _>("draws")? as u16,
        },
        weight_class: weight_class_from_str(row.try_get::<String, _>("weight_class")?.as_str()),
        stats: FightStats {
            sig_strikes_landed_per_min: row.try_get("slpm")?,
            striking_accuracy_pct: row.try_get("str_acc")?,
            strikes_absorbed_per_min: row.try_get("sapm")?,
            striking_defense_pct: row.try_get("str_def")?,
            takedowns_per_15_min: row.try_get("td_avg")?,
            takedown_accuracy_pct: row.try_get("td_acc")?,
            takedown_defense_pct: row.try_get("td_def")?,
            submissions_per_15_min: row.try_get("sub_avg")?,
            finish_rate_pct: row.try_get("finish_rate")?,
            avg_fight_minutes: row.try_get("avg_fight_minutes")?,
        },
        provenance: if row.try_get::<String, _>("provenance")? == "real" {
            Provenance::Real
        } else {
            Provenance::Synthesized
        },
        last_scraped: row.try_get("last_scraped")?,
    })
}

fn weight_class_from_str(s: &str) -> WeightClass {
    match s {
        "flyweight" => WeightClass::Flyweight,
        "bantamweight" => WeightClass::Bantamweight,
        "featherweight" => WeightClass::Featherweight,
        "lightweight" => WeightClass::Lightweight,
        "welterweight" => WeightClass::Welterweight,
        "middleweight" => WeightClass::Middleweight,
        "light_heavyweight" => WeightClass::LightHeavyweight,
        "heavyweight" => WeightClass::Heavyweight,
        "womens_strawweight" => WeightClass::WomensStrawweight,
        "womens_flyweight" => WeightClass::WomensFlyweight,
        "womens_bantamweight" => WeightClass::WomensBantamweight,
        "womens_featherweight" => WeightClass::WomensFeatherweight,
        "catchweight" => WeightClass::Catchweight,
        _ => WeightClass::Unknown,
    }
}

fn card_position_from_str(s: &str) -> CardPosition {
    match s {
        "main" => CardPosition::Main,
        "early_prelim" => CardPosition::EarlyPreliminary,
        _ => CardPosition::Preliminary,
    }
}

fn status_from_str(s: &str) -> FightStatus {
    match s {
        "completed" => FightStatus::Completed,
        "cancelled" => FightStatus::Cancelled,
        _ => FightStatus::Scheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_round_trips_through_db_strings() {
        for wc in [
            WeightClass::Flyweight,
            WeightClass::LightHeavyweight,
            WeightClass::WomensStrawweight,
            WeightClass::Catchweight,
            WeightClass::Unknown,
        ] {
            assert_eq!(weight_class_from_str(wc.as_str()), wc);
        }
        for pos in [
            CardPosition::Main,
            CardPosition::Preliminary,
            CardPosition::EarlyPreliminary,
        ] {
            assert_eq!(card_position_from_str(pos.as_str()), pos);
        }
        for status in [FightStatus::Scheduled, FightStatus::Completed, FightStatus::Cancelled] {
            assert_eq!(status_from_str(status.as_str()), status);
        }
    }
}
