use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::{Booked, Catalogued};
use crate::clock::Clock;
use crate::error::CatalogError;
use crate::form::ShowForm;
use crate::model::{artist, show, type_enum::EntityKind, venue};
use crate::Result;

/// A validated request that knows how to write itself onto a row.
pub trait Submission: Send {
    type Entity: Catalogued;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send;

    /// Overwrites every mutable field of the row.
    fn fill(self, model: &mut Self::ActiveModel);
}

type ModelOf<S> = <<S as Submission>::Entity as EntityTrait>::Model;

/// Inserts a new row in its own transaction and returns it as stored.
pub async fn create<S>(db: &DatabaseConnection, form: S) -> Result<ModelOf<S>>
where
    S: Submission,
    ModelOf<S>: IntoActiveModel<S::ActiveModel>,
{
    let mut model = <S::ActiveModel as ActiveModelBehavior>::new();
    form.fill(&mut model);

    let txn = db.begin().await?;
    let result = model.insert(&txn).await.map_err(CatalogError::from);
    finish(txn, S::Entity::KIND, "create", result).await
}

/// Loads row `id` and overwrites its mutable fields, all in one
/// transaction. The stored row is untouched when anything fails.
pub async fn update<S>(db: &DatabaseConnection, id: i64, form: S) -> Result<ModelOf<S>>
where
    S: Submission,
    ModelOf<S>: IntoActiveModel<S::ActiveModel>,
{
    let txn = db.begin().await?;
    let result: Result<ModelOf<S>> = async {
        let current = S::Entity::find()
            .filter(S::Entity::id_column().eq(id))
            .one(&txn)
            .await?
            .ok_or(CatalogError::not_found(S::Entity::KIND, id))?;
        let mut model: S::ActiveModel = current.into_active_model();
        form.fill(&mut model);
        Ok(model.update(&txn).await?)
    }
    .await;
    finish(txn, S::Entity::KIND, "update", result).await
}

/// Removes row `id` unless a show still references it.
pub async fn delete<E>(db: &DatabaseConnection, id: i64) -> Result<()>
where
    E: Booked,
{
    let txn = db.begin().await?;
    let result: Result<()> = async {
        if E::find()
            .filter(E::id_column().eq(id))
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(CatalogError::not_found(E::KIND, id));
        }
        let shows = show::Entity::find()
            .filter(E::show_column().eq(id))
            .count(&txn)
            .await?;
        if shows > 0 {
            return Err(CatalogError::InUse {
                kind: E::KIND,
                id,
                shows,
            });
        }
        E::delete_many()
            .filter(E::id_column().eq(id))
            .exec(&txn)
            .await?;
        Ok(())
    }
    .await;
    finish(txn, E::KIND, "delete", result).await
}

/// Books `form.artist_id` at `form.venue_id`. Both must exist; a missing
/// start time falls back to the clock's "now" at insert time.
pub async fn create_show(
    db: &DatabaseConnection,
    clock: &dyn Clock,
    form: ShowForm,
) -> Result<show::Model> {
    let txn = db.begin().await?;
    let result: Result<show::Model> = async {
        if venue::Entity::find_by_id(form.venue_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(CatalogError::MissingReference {
                kind: EntityKind::Venue,
                id: form.venue_id,
            });
        }
        if artist::Entity::find_by_id(form.artist_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(CatalogError::MissingReference {
                kind: EntityKind::Artist,
                id: form.artist_id,
            });
        }
        let model = show::ActiveModel {
            id: NotSet,
            venue_id: Set(form.venue_id),
            artist_id: Set(form.artist_id),
            start_time: Set(form.start_time.unwrap_or_else(|| clock.now())),
        };
        Ok(model.insert(&txn).await?)
    }
    .await;
    finish(txn, EntityKind::Show, "create", result).await
}

async fn finish<T>(
    txn: DatabaseTransaction,
    kind: EntityKind,
    op: &str,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(v) => {
            txn.commit().await?;
            Ok(v)
        }
        Err(e) => {
            match &e {
                CatalogError::Db(db_err) => {
                    log::error!("{op} {kind} failed, rolling back: {db_err}")
                }
                other => log::warn!("{op} {kind} rejected: {other}"),
            }
            if let Err(rb) = txn.rollback().await {
                log::error!("rollback of {op} {kind} failed: {rb}");
            }
            Err(e)
        }
    }
}
