use http_body_util::{combinators, BodyExt, Full};
use hyper::body::{Body, Bytes, Frame};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::pin::Pin;

use super::error::HttpError;

/// Type for synthetic boxed body
pub type BoxBody = combinators::BoxBody<Bytes, HttpError>;

/// helper function to build a full body
pub(crate) fn full(body: Bytes) -> BoxBody {
    Full::new(body).map_err(|never| match never {}).boxed()
}

/// Response body used in this project
/// - Empty: redirects and other bodiless responses.
/// - Boxed: a synthetic body, e.g. a rendered JSON document.
pub enum ResponseBody {
    Empty,
    Boxed(BoxBody),
}

impl ResponseBody {
    pub fn json(bytes: Vec<u8>) -> Self {
        ResponseBody::Boxed(full(Bytes::from(bytes)))
    }
}

/// A response with `status` and an `application/json` body.
pub fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response<ResponseBody> {
    let mut rsp = Response::new(ResponseBody::json(bytes));
    *rsp.status_mut() = status;
    rsp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    rsp
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = HttpError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            ResponseBody::Empty => std::task::Poll::Ready(None),
            ResponseBody::Boxed(boxed) => Pin::new(boxed).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            ResponseBody::Empty => true,
            ResponseBody::Boxed(boxed) => boxed.is_end_stream(),
        }
    }

    fn size_hint(&self) -> hyper::body::SizeHint {
        match self {
            ResponseBody::Empty => hyper::body::SizeHint::with_exact(0),
            ResponseBody::Boxed(boxed) => boxed.size_hint(),
        }
    }
}
