use bytes::Bytes;
use encore_core::form::FieldMap;
use encore_core::model::type_enum::EntityKind;
use encore_core::CatalogError;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, CONTENT_TYPE};
use hyper::{Method, Request, Response, Uri};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use super::handler;
use crate::error::{HttpError, ProcessError};
use crate::event::BackendContext;
use crate::http::body_type::{json_response, ResponseBody};

const SECURE_MAX_SIZE: usize = 64 * 1024;

/// Reads the (bounded) request body and answers the request. Never fails:
/// errors are rendered as JSON responses.
pub async fn process_http<B>(ctx: &Arc<BackendContext>, req: Request<B>) -> Response<ResponseBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let result = match Limited::new(body, SECURE_MAX_SIZE).collect().await {
        Ok(collected) => {
            dispatch(
                ctx,
                &parts.method,
                &parts.uri,
                &parts.headers,
                collected.to_bytes(),
            )
            .await
        }
        Err(e) => Err(HttpError::from_limited(e, SECURE_MAX_SIZE).into()),
    };

    let rsp = result.unwrap_or_else(|err| {
        let status = err.status();
        if status.is_server_error() {
            match std::error::Error::source(&err) {
                Some(source) => log::error!(
                    "{} {}: {err}: {source}",
                    parts.method,
                    parts.uri.path()
                ),
                None => log::error!("{} {}: {err}", parts.method, parts.uri.path()),
            }
        }
        error_response(&err)
    });
    log::debug!("{} {} -> {}", parts.method, parts.uri.path(), rsp.status());
    rsp
}

fn error_response(err: &ProcessError) -> Response<ResponseBody> {
    let body = match err {
        ProcessError::Catalog(CatalogError::Invalid(fields)) => {
            json!({ "error": err.public_message(), "fields": fields })
        }
        _ => json!({ "error": err.public_message() }),
    };
    json_response(err.status(), body.to_string().into_bytes())
}

fn allow(method: &Method, allowed: &[Method]) -> Result<(), ProcessError> {
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(ProcessError::MethodNotAllowed(method.clone()))
    }
}

fn urlencoded(data: &[u8]) -> Result<FieldMap, ProcessError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(data).map_err(|e| ProcessError::Decode(e.to_string()))?;
    Ok(FieldMap::from_pairs(pairs))
}

/// Field map of a form or JSON body. A missing content type is read as a
/// form.
fn body_fields(headers: &HeaderMap, body: &Bytes) -> Result<FieldMap, ProcessError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "application/json" => {
            let value: serde_json::Value =
                serde_json::from_slice(body).map_err(|e| ProcessError::Decode(e.to_string()))?;
            Ok(FieldMap::from_json(&value).map_err(CatalogError::from)?)
        }
        "" | "application/x-www-form-urlencoded" => urlencoded(body),
        other => Err(ProcessError::UnsupportedMediaType(other.to_string())),
    }
}

async fn dispatch(
    ctx: &Arc<BackendContext>,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response<ResponseBody>, ProcessError> {
    let path = uri.path();
    let path_segments: Vec<&str> = path.trim_end_matches('/').split('/').skip(1).collect();

    let parse_id = |id: &str| -> Result<i64, ProcessError> {
        id.parse()
            .map_err(|_| ProcessError::WrongId(id.to_string()))
    };
    let parse_kind = |kind: &str| -> Result<EntityKind, ProcessError> {
        EntityKind::from_str(kind).map_err(|_| ProcessError::NoRoute(path.to_string()))
    };

    match path_segments.as_slice() {
        [] => {
            allow(method, &[Method::GET])?;
            handler::home(ctx).await
        }
        ["venues"] => {
            allow(method, &[Method::GET])?;
            handler::venues(ctx).await
        }
        ["artists"] => {
            allow(method, &[Method::GET])?;
            handler::artists(ctx).await
        }
        ["shows"] => {
            allow(method, &[Method::GET])?;
            handler::shows(ctx).await
        }
        [kind @ ("venues" | "artists"), "search"] => {
            allow(method, &[Method::GET, Method::POST])?;
            let fields = if *method == Method::GET {
                urlencoded(uri.query().unwrap_or("").as_bytes())?
            } else {
                body_fields(headers, &body)?
            };
            let term = fields.get("search_term").unwrap_or("");
            handler::search(ctx, parse_kind(*kind)?, term).await
        }
        [kind @ ("venues" | "artists" | "shows"), "create"] => {
            allow(method, &[Method::POST])?;
            handler::create(ctx, parse_kind(*kind)?, &body_fields(headers, &body)?).await
        }
        [kind @ ("venues" | "artists"), id] => {
            let (kind, id) = (parse_kind(*kind)?, parse_id(*id)?);
            match *method {
                Method::GET => handler::detail(ctx, kind, id).await,
                Method::DELETE => handler::remove(ctx, kind, id).await,
                _ => Err(ProcessError::MethodNotAllowed(method.clone())),
            }
        }
        [kind @ ("venues" | "artists"), id, "edit"] => {
            let (kind, id) = (parse_kind(*kind)?, parse_id(*id)?);
            match *method {
                Method::GET => handler::edit_form(ctx, kind, id).await,
                Method::POST => {
                    handler::update(ctx, kind, id, &body_fields(headers, &body)?).await
                }
                _ => Err(ProcessError::MethodNotAllowed(method.clone())),
            }
        }
        _ => Err(ProcessError::NoRoute(path.to_string())),
    }
}
