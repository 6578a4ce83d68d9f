use encore_core::db::{self, SearchResult};
use encore_core::form::{ArtistForm, FieldMap, ShowForm, VenueForm};
use encore_core::model::{artist, type_enum::EntityKind, venue};
use encore_core::view::{self, CountedSummary};
use encore_core::CatalogError;
use hyper::header::{HeaderValue, LOCATION};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{OrFail, ProcessError};
use crate::event::BackendContext;
use crate::http::body_type::{json_response, ResponseBody};

type HttpResult = Result<Response<ResponseBody>, ProcessError>;

fn reply<T: Serialize>(status: StatusCode, value: &T) -> HttpResult {
    Ok(json_response(status, serde_json::to_vec(value)?))
}

fn created<T: Serialize>(message: String, data: &T) -> HttpResult {
    log::info!("{message}");
    reply(
        StatusCode::CREATED,
        &json!({ "message": message, "data": data }),
    )
}

fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Venue => "Venues",
        EntityKind::Artist => "Artists",
        EntityKind::Show => "Shows",
    }
}

pub async fn home(ctx: &Arc<BackendContext>) -> HttpResult {
    let venues = view::recent_summaries::<venue::Entity, _>(&ctx.db, ctx.recent_limit)
        .await
        .or_fail(|| "Venues could not be loaded.".to_string())?;
    let artists = view::recent_summaries::<artist::Entity, _>(&ctx.db, ctx.recent_limit)
        .await
        .or_fail(|| "Artists could not be loaded.".to_string())?;
    reply(
        StatusCode::OK,
        &json!({ "venues": venues, "artists": artists }),
    )
}

pub async fn venues(ctx: &Arc<BackendContext>) -> HttpResult {
    let areas = view::venue_areas(&ctx.db, ctx.clock.as_ref(), ctx.recent_limit)
        .await
        .or_fail(|| "Venues could not be loaded.".to_string())?;
    reply(StatusCode::OK, &json!({ "areas": areas }))
}

pub async fn artists(ctx: &Arc<BackendContext>) -> HttpResult {
    let artists = view::recent_summaries::<artist::Entity, _>(&ctx.db, ctx.recent_limit)
        .await
        .or_fail(|| "Artists could not be loaded.".to_string())?;
    reply(StatusCode::OK, &json!({ "artists": artists }))
}

pub async fn shows(ctx: &Arc<BackendContext>) -> HttpResult {
    let shows = view::show_listing(&ctx.db)
        .await
        .or_fail(|| "Shows could not be loaded.".to_string())?;
    reply(StatusCode::OK, &json!({ "shows": shows }))
}

#[derive(Serialize)]
struct SearchReply<'a> {
    #[serde(flatten)]
    result: SearchResult<CountedSummary>,
    search_term: &'a str,
}

pub async fn search(ctx: &Arc<BackendContext>, kind: EntityKind, term: &str) -> HttpResult {
    let clock = ctx.clock.as_ref();
    let result = match kind {
        EntityKind::Venue => view::search::<venue::Entity, _>(&ctx.db, clock, term).await,
        EntityKind::Artist => view::search::<artist::Entity, _>(&ctx.db, clock, term).await,
        EntityKind::Show => return Err(ProcessError::NoRoute("/shows/search".to_string())),
    }
    .or_fail(|| format!("{} could not be searched.", plural(kind)))?;
    reply(
        StatusCode::OK,
        &SearchReply {
            result,
            search_term: term,
        },
    )
}

pub async fn detail(ctx: &Arc<BackendContext>, kind: EntityKind, id: i64) -> HttpResult {
    let clock = ctx.clock.as_ref();
    let failed = || format!("{kind} {id} could not be loaded.");
    match kind {
        EntityKind::Venue => match view::detail::<venue::Entity, _>(&ctx.db, clock, id)
            .await
            .or_fail(failed)?
        {
            Some(d) => reply(StatusCode::OK, &d),
            None => Err(ProcessError::NoSuch(kind, id)),
        },
        EntityKind::Artist => match view::detail::<artist::Entity, _>(&ctx.db, clock, id)
            .await
            .or_fail(failed)?
        {
            Some(d) => reply(StatusCode::OK, &d),
            None => Err(ProcessError::NoSuch(kind, id)),
        },
        EntityKind::Show => Err(ProcessError::NoRoute(format!("/shows/{id}"))),
    }
}

/// The stored record, for prefilling an edit form.
pub async fn edit_form(ctx: &Arc<BackendContext>, kind: EntityKind, id: i64) -> HttpResult {
    let failed = || format!("{kind} {id} could not be loaded.");
    match kind {
        EntityKind::Venue => match db::get_by_id::<venue::Entity, _>(&ctx.db, id)
            .await
            .or_fail(failed)?
        {
            Some(m) => reply(StatusCode::OK, &m),
            None => Err(ProcessError::NoSuch(kind, id)),
        },
        EntityKind::Artist => match db::get_by_id::<artist::Entity, _>(&ctx.db, id)
            .await
            .or_fail(failed)?
        {
            Some(m) => reply(StatusCode::OK, &m),
            None => Err(ProcessError::NoSuch(kind, id)),
        },
        EntityKind::Show => Err(ProcessError::NoRoute(format!("/shows/{id}/edit"))),
    }
}

pub async fn create(ctx: &Arc<BackendContext>, kind: EntityKind, fields: &FieldMap) -> HttpResult {
    match kind {
        EntityKind::Venue => {
            let form = VenueForm::from_fields(fields).map_err(CatalogError::from)?;
            let name = form.name.clone();
            let model = db::create(&ctx.db, form)
                .await
                .or_fail(|| format!("Venue {name} could not be listed."))?;
            created(format!("Venue {} was successfully listed!", model.name), &model)
        }
        EntityKind::Artist => {
            let form = ArtistForm::from_fields(fields).map_err(CatalogError::from)?;
            let name = form.name.clone();
            let model = db::create(&ctx.db, form)
                .await
                .or_fail(|| format!("Artist {name} could not be listed."))?;
            created(format!("Artist {} was successfully listed!", model.name), &model)
        }
        EntityKind::Show => {
            let form = ShowForm::from_fields(fields).map_err(CatalogError::from)?;
            let model = db::create_show(&ctx.db, ctx.clock.as_ref(), form)
                .await
                .or_fail(|| "Show could not be listed.".to_string())?;
            created("Show was successfully listed!".to_string(), &model)
        }
    }
}

/// Overwrites the record and redirects to its detail page.
pub async fn update(
    ctx: &Arc<BackendContext>,
    kind: EntityKind,
    id: i64,
    fields: &FieldMap,
) -> HttpResult {
    let failed = || format!("{kind} {id} could not be updated.");
    match kind {
        EntityKind::Venue => {
            let form = VenueForm::from_fields(fields).map_err(CatalogError::from)?;
            db::update(&ctx.db, id, form).await.or_fail(failed)?;
        }
        EntityKind::Artist => {
            let form = ArtistForm::from_fields(fields).map_err(CatalogError::from)?;
            db::update(&ctx.db, id, form).await.or_fail(failed)?;
        }
        EntityKind::Show => return Err(ProcessError::NoRoute(format!("/shows/{id}/edit"))),
    }
    log::info!("{kind} {id} was successfully updated");

    let location = format!("/{}/{}", kind.path_segment(), id);
    let mut rsp = Response::new(ResponseBody::Empty);
    *rsp.status_mut() = StatusCode::SEE_OTHER;
    rsp.headers_mut().insert(
        LOCATION,
        HeaderValue::try_from(location).map_err(|e| ProcessError::Decode(e.to_string()))?,
    );
    Ok(rsp)
}

pub async fn remove(ctx: &Arc<BackendContext>, kind: EntityKind, id: i64) -> HttpResult {
    let failed = || format!("{kind} {id} could not be deleted.");
    match kind {
        EntityKind::Venue => db::delete::<venue::Entity>(&ctx.db, id)
            .await
            .or_fail(failed)?,
        EntityKind::Artist => db::delete::<artist::Entity>(&ctx.db, id)
            .await
            .or_fail(failed)?,
        EntityKind::Show => return Err(ProcessError::NoRoute(format!("/shows/{id}"))),
    }
    let message = format!("{kind} {id} was successfully deleted.");
    log::info!("{message}");
    reply(StatusCode::OK, &json!({ "message": message }))
}
