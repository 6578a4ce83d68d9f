//! Read-side views computed from loaded rows.
//!
//! Nothing here is persisted. Past/upcoming is decided against the
//! caller's [`Clock`]: a show is past when `start_time <= now`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, QueryFilter, QueryOrder, Related,
};
use serde::Serialize;

use crate::clock::Clock;
use crate::db::{get_by_id, list_recent, search_by_name, Booked, SearchResult};
use crate::model::{artist, show, venue};
use crate::Result;

pub const TIME_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistSlot {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VenueSlot {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Partition<T> {
    pub past_shows: Vec<T>,
    pub upcoming_shows: Vec<T>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl<T> Partition<T> {
    /// Splits timed entries around `now`, each side ordered by time.
    pub fn split<I>(entries: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, T)>,
    {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|(t, _)| *t);

        let (past, upcoming): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|(t, _)| *t <= now);
        let past_shows: Vec<T> = past.into_iter().map(|(_, v)| v).collect();
        let upcoming_shows: Vec<T> = upcoming.into_iter().map(|(_, v)| v).collect();
        Partition {
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

/// A booked entity whose detail page lists the counterpart of each show.
pub trait Billed: Booked {
    /// The entity on the other end of each show.
    type Other: Booked;
    type Slot: Serialize;

    fn slot(other: <Self::Other as EntityTrait>::Model, start_time: &DateTime<Utc>) -> Self::Slot;
}

impl Billed for venue::Entity {
    type Other = artist::Entity;
    type Slot = ArtistSlot;

    fn slot(artist: artist::Model, start_time: &DateTime<Utc>) -> ArtistSlot {
        ArtistSlot {
            artist_id: artist.id,
            artist_name: artist.name,
            artist_image_link: artist.image_link,
            start_time: format_time(start_time),
        }
    }
}

impl Billed for artist::Entity {
    type Other = venue::Entity;
    type Slot = VenueSlot;

    fn slot(venue: venue::Model, start_time: &DateTime<Utc>) -> VenueSlot {
        VenueSlot {
            venue_id: venue.id,
            venue_name: venue.name,
            venue_image_link: venue.image_link,
            start_time: format_time(start_time),
        }
    }
}

/// The record itself with its shows split around "now".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detail<M, S> {
    #[serde(flatten)]
    pub record: M,
    #[serde(flatten)]
    pub shows: Partition<S>,
}

pub async fn detail<E, C>(
    db: &C,
    clock: &dyn Clock,
    id: i64,
) -> Result<Option<Detail<E::Model, E::Slot>>>
where
    E: Billed,
    C: ConnectionTrait,
    show::Entity: Related<E::Other>,
    <E::Other as EntityTrait>::Model: Sync,
{
    let Some(record) = get_by_id::<E, _>(db, id).await? else {
        return Ok(None);
    };
    let shows = show::Entity::find()
        .filter(E::show_column().eq(id))
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;
    let others = shows.load_one(E::Other::default(), db).await?;

    let entries = shows.iter().zip(others).filter_map(|(show, other)| {
        Some((show.start_time, E::slot(other?, &show.start_time)))
    });
    Ok(Some(Detail {
        record,
        shows: Partition::split(entries, clock.now()),
    }))
}

/// Future shows per owner id, for every id in `ids`. Ids without upcoming
/// shows map to 0.
pub async fn upcoming_counts<E, C>(
    db: &C,
    clock: &dyn Clock,
    ids: &[i64],
) -> Result<HashMap<i64, u64>>
where
    E: Booked,
    C: ConnectionTrait,
{
    let mut counts: HashMap<i64, u64> = ids.iter().map(|id| (*id, 0)).collect();
    if ids.is_empty() {
        return Ok(counts);
    }
    let now = clock.now();
    let shows = show::Entity::find()
        .filter(E::show_column().is_in(ids.iter().copied()))
        .all(db)
        .await?;
    for show in shows.iter().filter(|s| s.start_time > now) {
        *counts.entry(E::owner_of(show)).or_default() += 1;
    }
    Ok(counts)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub id: i64,
    pub name: String,
}

/// Search and area rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountedSummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<CountedSummary>,
}

async fn counted<E, C>(
    db: &C,
    clock: &dyn Clock,
    models: Vec<E::Model>,
) -> Result<Vec<CountedSummary>>
where
    E: Booked,
    C: ConnectionTrait,
{
    let ids: Vec<i64> = models.iter().map(E::id_of).collect();
    let counts = upcoming_counts::<E, _>(db, clock, &ids).await?;
    Ok(models
        .iter()
        .map(|m| {
            let id = E::id_of(m);
            CountedSummary {
                id,
                name: E::name_of(m).to_string(),
                num_upcoming_shows: counts.get(&id).copied().unwrap_or(0),
            }
        })
        .collect())
}

/// Recent venues grouped by `(city, state)`, areas in first-seen order.
pub async fn venue_areas<C>(db: &C, clock: &dyn Clock, limit: u64) -> Result<Vec<Area>>
where
    C: ConnectionTrait,
{
    let venues = list_recent::<venue::Entity, _>(db, limit).await?;
    let places: Vec<(String, String)> = venues
        .iter()
        .map(|v| (v.city.clone(), v.state.clone()))
        .collect();
    let rows = counted::<venue::Entity, _>(db, clock, venues).await?;

    let mut areas: Vec<Area> = Vec::new();
    for ((city, state), row) in places.into_iter().zip(rows) {
        match areas
            .iter_mut()
            .find(|a| a.city == city && a.state == state)
        {
            Some(area) => area.venues.push(row),
            None => areas.push(Area {
                city,
                state,
                venues: vec![row],
            }),
        }
    }
    Ok(areas)
}

pub async fn recent_summaries<E, C>(db: &C, limit: u64) -> Result<Vec<Summary>>
where
    E: Booked,
    C: ConnectionTrait,
{
    let models = list_recent::<E, _>(db, limit).await?;
    Ok(models
        .iter()
        .map(|m| Summary {
            id: E::id_of(m),
            name: E::name_of(m).to_string(),
        })
        .collect())
}

/// Name search with each match's upcoming count.
pub async fn search<E, C>(
    db: &C,
    clock: &dyn Clock,
    term: &str,
) -> Result<SearchResult<CountedSummary>>
where
    E: Booked,
    C: ConnectionTrait,
{
    let found = search_by_name::<E, _>(db, term).await?;
    Ok(SearchResult::new(counted::<E, _>(db, clock, found.data).await?))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// Every show, ordered by start time.
pub async fn show_listing<C>(db: &C) -> Result<Vec<ShowListing>>
where
    C: ConnectionTrait,
{
    let mut shows = show::Entity::find()
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;
    shows.sort_by_key(|s| s.start_time);

    let venues = shows.load_one(venue::Entity, db).await?;
    let artists = shows.load_one(artist::Entity, db).await?;

    Ok(shows
        .iter()
        .zip(venues)
        .zip(artists)
        .filter_map(|((show, venue), artist)| {
            let (venue, artist) = (venue?, artist?);
            Some(ShowListing {
                venue_id: venue.id,
                venue_name: venue.name,
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: format_time(&show.start_time),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::testing::{artist_form, memory_db, venue_form};
    use crate::db::{create, create_show};
    use crate::form::ShowForm;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 21, 21, 30, 0).unwrap())
    }

    #[test]
    fn test_format_time() {
        let t = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        assert_eq!(format_time(&t), "04/01/2035, 20:00:00");
    }

    #[test]
    fn test_partition_boundary() {
        let now = clock().now();
        let p = Partition::split(
            [
                (now + Duration::hours(1), "later"),
                (now, "now"),
                (now - Duration::days(1), "yesterday"),
            ],
            now,
        );
        assert_eq!(p.past_shows, vec!["yesterday", "now"]);
        assert_eq!(p.upcoming_shows, vec!["later"]);
        assert_eq!(p.past_shows_count, 2);
        assert_eq!(p.upcoming_shows_count, 1);
    }

    #[tokio::test]
    async fn test_detail_partitions_both_sides() {
        let db = memory_db().await;
        let clock = clock();
        let hop = create(&db, venue_form("The Musical Hop")).await.unwrap();
        let gnp = create(&db, artist_form("Guns N Petals")).await.unwrap();
        let sax = create(&db, artist_form("The Wild Sax Band")).await.unwrap();

        let past = clock.now() - Duration::days(30);
        let future = clock.now() + Duration::days(30);
        for (artist, start) in [(gnp.id, past), (sax.id, future)] {
            create_show(
                &db,
                &clock,
                ShowForm {
                    venue_id: hop.id,
                    artist_id: artist,
                    start_time: Some(start),
                },
            )
            .await
            .unwrap();
        }

        let venue = detail::<venue::Entity, _>(&db, &clock, hop.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(venue.record, hop);
        assert_eq!(venue.shows.past_shows_count, 1);
        assert_eq!(venue.shows.upcoming_shows_count, 1);
        assert_eq!(venue.shows.past_shows[0].artist_id, gnp.id);
        assert_eq!(venue.shows.upcoming_shows[0].artist_id, sax.id);
        assert_eq!(
            venue.shows.upcoming_shows[0].start_time,
            format_time(&future)
        );

        let gnp_view = detail::<artist::Entity, _>(&db, &clock, gnp.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gnp_view.record, gnp);
        assert_eq!(gnp_view.shows.past_shows.len(), 1);
        assert!(gnp_view.shows.upcoming_shows.is_empty());
        assert_eq!(gnp_view.shows.past_shows[0].venue_name, "The Musical Hop");

        let sax_view = detail::<artist::Entity, _>(&db, &clock, sax.id)
            .await
            .unwrap()
            .unwrap();
        assert!(sax_view.shows.past_shows.is_empty());
        assert_eq!(sax_view.shows.upcoming_shows.len(), 1);

        // record and partition share one flat object
        let json = serde_json::to_value(&sax_view).unwrap();
        assert_eq!(json["name"], "The Wild Sax Band");
        assert_eq!(json["upcoming_shows_count"], 1);
        assert_eq!(json["upcoming_shows"][0]["venue_id"], hop.id);

        assert!(detail::<venue::Entity, _>(&db, &clock, 999)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upcoming_counts_and_areas() {
        let db = memory_db().await;
        let clock = clock();
        let hop = create(&db, venue_form("The Musical Hop")).await.unwrap();
        let mut pianos = venue_form("The Dueling Pianos Bar");
        pianos.city = "New York".into();
        pianos.state = "NY".into();
        let pianos = create(&db, pianos).await.unwrap();
        let park = create(&db, venue_form("Park Square Live Music & Coffee"))
            .await
            .unwrap();
        let artist = create(&db, artist_form("Guns N Petals")).await.unwrap();

        for (venue, days) in [(hop.id, -3), (hop.id, 3), (hop.id, 10), (park.id, -1)] {
            create_show(
                &db,
                &clock,
                ShowForm {
                    venue_id: venue,
                    artist_id: artist.id,
                    start_time: Some(clock.now() + Duration::days(days)),
                },
            )
            .await
            .unwrap();
        }

        let ids = [hop.id, pianos.id, park.id];
        let counts = upcoming_counts::<venue::Entity, _>(&db, &clock, &ids)
            .await
            .unwrap();
        assert_eq!(counts[&hop.id], 2);
        assert_eq!(counts[&pianos.id], 0);
        assert_eq!(counts[&park.id], 0);

        let artist_counts = upcoming_counts::<artist::Entity, _>(&db, &clock, &[artist.id])
            .await
            .unwrap();
        assert_eq!(artist_counts[&artist.id], 2);

        let areas = venue_areas(&db, &clock, 10).await.unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        let ids: Vec<i64> = areas[0].venues.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![park.id, hop.id]);
        assert_eq!(areas[0].venues[1].num_upcoming_shows, 2);
        assert_eq!(areas[1].state, "NY");
    }

    #[tokio::test]
    async fn test_search_rows_and_listing() {
        let db = memory_db().await;
        let clock = clock();
        let hop = create(&db, venue_form("The Musical Hop")).await.unwrap();
        let sax = create(&db, artist_form("The Wild Sax Band")).await.unwrap();
        let later = clock.now() + Duration::days(2);
        let earlier = clock.now() + Duration::days(1);
        for start in [later, earlier] {
            create_show(
                &db,
                &clock,
                ShowForm {
                    venue_id: hop.id,
                    artist_id: sax.id,
                    start_time: Some(start),
                },
            )
            .await
            .unwrap();
        }

        let found = search::<artist::Entity, _>(&db, &clock, "sax").await.unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.data[0].num_upcoming_shows, 2);

        let listing = show_listing(&db).await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].start_time, format_time(&earlier));
        // month first, same as the detail pages
        assert_eq!(listing[0].start_time, "05/22/2024, 21:30:00");
        assert_eq!(listing[1].artist_name, "The Wild Sax Band");
        assert_eq!(listing[1].venue_name, "The Musical Hop");

        let recent = recent_summaries::<venue::Entity, _>(&db, 10).await.unwrap();
        assert_eq!(
            recent,
            vec![Summary {
                id: hop.id,
                name: "The Musical Hop".into()
            }]
        );
    }
}
