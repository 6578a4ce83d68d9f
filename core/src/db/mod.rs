pub mod values;
pub mod write;

pub use write::{create, create_show, delete, update, Submission};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::model::{artist, show, type_enum::EntityKind, venue};
use crate::Result;

/// Row count of the "recently listed" views.
pub const RECENT_LIMIT: u64 = 10;

/// An entity the catalog can list and look up by its surrogate id.
pub trait Catalogued: EntityTrait {
    const KIND: EntityKind;
    fn id_column() -> Self::Column;
    fn id_of(model: &Self::Model) -> i64;
}

/// A catalogued entity searchable by name.
pub trait Named: Catalogued {
    fn name_column() -> Self::Column;
    fn name_of(model: &Self::Model) -> &str;
}

/// A catalogued entity that shows point at.
pub trait Booked: Named {
    /// The show column holding this entity's id.
    fn show_column() -> show::Column;
    /// The id this entity has in `show`.
    fn owner_of(show: &show::Model) -> i64;
}

impl Catalogued for venue::Entity {
    const KIND: EntityKind = EntityKind::Venue;
    fn id_column() -> Self::Column {
        venue::Column::Id
    }
    fn id_of(model: &venue::Model) -> i64 {
        model.id
    }
}

impl Named for venue::Entity {
    fn name_column() -> Self::Column {
        venue::Column::Name
    }
    fn name_of(model: &venue::Model) -> &str {
        &model.name
    }
}

impl Booked for venue::Entity {
    fn show_column() -> show::Column {
        show::Column::VenueId
    }
    fn owner_of(show: &show::Model) -> i64 {
        show.venue_id
    }
}

impl Catalogued for artist::Entity {
    const KIND: EntityKind = EntityKind::Artist;
    fn id_column() -> Self::Column {
        artist::Column::Id
    }
    fn id_of(model: &artist::Model) -> i64 {
        model.id
    }
}

impl Named for artist::Entity {
    fn name_column() -> Self::Column {
        artist::Column::Name
    }
    fn name_of(model: &artist::Model) -> &str {
        &model.name
    }
}

impl Booked for artist::Entity {
    fn show_column() -> show::Column {
        show::Column::ArtistId
    }
    fn owner_of(show: &show::Model) -> i64 {
        show.artist_id
    }
}

impl Catalogued for show::Entity {
    const KIND: EntityKind = EntityKind::Show;
    fn id_column() -> Self::Column {
        show::Column::Id
    }
    fn id_of(model: &show::Model) -> i64 {
        model.id
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SearchResult<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> SearchResult<U> {
        SearchResult::new(self.data.into_iter().map(f).collect())
    }
}

/// The `limit` most recently created rows, newest first.
pub async fn list_recent<E, C>(db: &C, limit: u64) -> Result<Vec<E::Model>>
where
    E: Catalogued,
    C: ConnectionTrait,
{
    Ok(E::find()
        .order_by_desc(E::id_column())
        .limit(limit)
        .all(db)
        .await?)
}

/// Case-insensitive substring match on the name, ordered by id. The term is
/// used as given and the empty term matches every row.
///
/// Both sides are folded with Unicode lowercasing in Rust; SQLite's `LOWER`
/// only folds ASCII.
pub async fn search_by_name<E, C>(db: &C, term: &str) -> Result<SearchResult<E::Model>>
where
    E: Named,
    C: ConnectionTrait,
{
    let needle = term.to_lowercase();
    let rows = E::find().order_by_asc(E::id_column()).all(db).await?;
    let data = rows
        .into_iter()
        .filter(|m| E::name_of(m).to_lowercase().contains(&needle))
        .collect();
    Ok(SearchResult::new(data))
}

pub async fn get_by_id<E, C>(db: &C, id: i64) -> Result<Option<E::Model>>
where
    E: Catalogued,
    C: ConnectionTrait,
{
    Ok(E::find().filter(E::id_column().eq(id)).one(db).await?)
}


#[cfg(test)]
mod tests {
    use super::testing::{artist_form, memory_db, venue_form};
    use super::*;

    async fn fixture_venues(db: &sea_orm::DatabaseConnection) {
        for name in [
            "The Musical Hop",
            "The Dueling Pianos Bar",
            "Park Square Live Music & Coffee",
        ] {
            create(db, venue_form(name)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_search_venues_by_substring() {
        let db = memory_db().await;
        fixture_venues(&db).await;

        let hop = search_by_name::<venue::Entity, _>(&db, "Hop").await.unwrap();
        assert_eq!(hop.count, 1);
        assert_eq!(hop.data[0].name, "The Musical Hop");

        let music = search_by_name::<venue::Entity, _>(&db, "Music").await.unwrap();
        assert_eq!(music.count, 2);
        let names: Vec<_> = music.data.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["The Musical Hop", "Park Square Live Music & Coffee"]
        );
    }

    #[tokio::test]
    async fn test_search_empty_term_matches_all() {
        let db = memory_db().await;
        fixture_venues(&db).await;

        let all = search_by_name::<venue::Entity, _>(&db, "").await.unwrap();
        assert_eq!(all.count, 3);

        let one = search_by_name::<venue::Entity, _>(&db, "dUELING pIANOS")
            .await
            .unwrap();
        assert_eq!(one.count, 1);
        assert_eq!(one.data[0].name, "The Dueling Pianos Bar");
    }

    #[tokio::test]
    async fn test_search_artists_case_insensitive() {
        let db = memory_db().await;
        for name in ["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"] {
            create(&db, artist_form(name)).await.unwrap();
        }

        let band = search_by_name::<artist::Entity, _>(&db, "band").await.unwrap();
        assert_eq!(band.count, 1);
        assert_eq!(band.data[0].name, "The Wild Sax Band");

        let a = search_by_name::<artist::Entity, _>(&db, "A").await.unwrap();
        assert_eq!(a.count, 3);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let db = memory_db().await;
        fixture_venues(&db).await;

        let none = search_by_name::<venue::Entity, _>(&db, "%").await.unwrap();
        assert_eq!(none.count, 0);
        let amp = search_by_name::<venue::Entity, _>(&db, "& C").await.unwrap();
        assert_eq!(amp.count, 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii() {
        let db = memory_db().await;
        for name in ["CAFÉ ÉCLAIR", "Ölhafen Bühne", "The Musical Hop"] {
            create(&db, venue_form(name)).await.unwrap();
        }

        for term in ["ÉCLAIR", "éclair", "Café"] {
            let found = search_by_name::<venue::Entity, _>(&db, term).await.unwrap();
            assert_eq!(found.count, 1, "term {term:?}");
            assert_eq!(found.data[0].name, "CAFÉ ÉCLAIR");
        }
        let found = search_by_name::<venue::Entity, _>(&db, "ölhafen").await.unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.data[0].name, "Ölhafen Bühne");
    }

    #[tokio::test]
    async fn test_search_term_is_not_trimmed() {
        let db = memory_db().await;
        for name in ["The Musical Hop", "Hopscotch"] {
            create(&db, venue_form(name)).await.unwrap();
        }

        let found = search_by_name::<venue::Entity, _>(&db, "Hop ").await.unwrap();
        assert_eq!(found.count, 0);
        let found = search_by_name::<venue::Entity, _>(&db, " Hop").await.unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.data[0].name, "The Musical Hop");
        let found = search_by_name::<venue::Entity, _>(&db, " ").await.unwrap();
        assert_eq!(found.count, 1);
    }

    #[tokio::test]
    async fn test_list_recent_venues() {
        let db = memory_db().await;
        let mut ids = Vec::new();
        for i in 0..15 {
            let v = create(&db, venue_form(&format!("Venue {i}"))).await.unwrap();
            ids.push(v.id);
        }

        let recent = list_recent::<venue::Entity, _>(&db, RECENT_LIMIT)
            .await
            .unwrap();
        let got: Vec<i64> = recent.iter().map(|v| v.id).collect();
        let expected: Vec<i64> = ids.iter().rev().take(10).copied().collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let db = memory_db().await;
        let missing = get_by_id::<artist::Entity, _>(&db, 42).await.unwrap();
        assert!(missing.is_none());
    }
}
