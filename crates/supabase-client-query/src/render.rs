use reqwest::header::{HeaderName, HeaderValue, ACCEPT, RANGE};
use reqwest::Method;
use supabase_client_core::ApiRequest;
use url::Url;

use crate::error::PostgrestError;
use crate::parts::{NullsPosition, Operation, OrderDirection, QueryParts};

const ACCEPT_PROFILE: HeaderName = HeaderName::from_static("accept-profile");
const CONTENT_PROFILE: HeaderName = HeaderName::from_static("content-profile");
const PREFER: HeaderName = HeaderName::from_static("prefer");
const RANGE_UNIT: HeaderName = HeaderName::from_static("range-unit");

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Render the request parts into a PostgREST HTTP request.
///
/// `rest_url` is the REST endpoint (`<project>/rest/v1`).
pub fn build_request(
    rest_url: &str,
    schema: &str,
    parts: &QueryParts,
) -> Result<ApiRequest, PostgrestError> {
    parts.check()?;

    let base = rest_url.trim_end_matches('/');
    let path = match parts.operation {
        Operation::Rpc => format!("{base}/rpc/{}", parts.target),
        _ => format!("{base}/{}", parts.target),
    };
    let mut url = Url::parse(&path)?;
    append_query(&mut url, parts);

    let method = match parts.operation {
        Operation::Select => Method::GET,
        Operation::Insert | Operation::Upsert { .. } | Operation::Rpc => Method::POST,
        Operation::Update => Method::PATCH,
        Operation::Delete => Method::DELETE,
    };

    let mut request = ApiRequest::new(method, url.to_string());

    let profile = if parts.operation.is_read() {
        ACCEPT_PROFILE
    } else {
        CONTENT_PROFILE
    };
    request = request.header(profile, header_value(schema)?);

    if let Some(prefer) = prefer(parts) {
        request = request.header(PREFER, header_value(&prefer)?);
    }

    if parts.single {
        request = request.header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
    }

    if parts.operation.is_read() {
        if let Some(range) = range(parts) {
            request = request
                .header(RANGE, header_value(&range)?)
                .header(RANGE_UNIT, HeaderValue::from_static("items"));
        }
    }

    if let Some(body) = &parts.body {
        request = request.json(body)?;
    }

    Ok(request)
}

fn append_query(url: &mut Url, parts: &QueryParts) {
    let mut query = url.query_pairs_mut();

    if let Some(columns) = &parts.columns {
        let cleaned: String = columns.chars().filter(|c| !c.is_whitespace()).collect();
        query.append_pair("select", &cleaned);
    }

    if let Operation::Upsert {
        on_conflict: Some(target),
    } = &parts.operation
    {
        query.append_pair("on_conflict", target);
    }

    for filter in &parts.filters {
        query.append_pair(&filter.column, &filter.expression);
    }

    if !parts.orders.is_empty() {
        let order = parts
            .orders
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    OrderDirection::Ascending => "asc",
                    OrderDirection::Descending => "desc",
                };
                let nulls = match o.nulls {
                    Some(NullsPosition::First) => ".nullsfirst",
                    Some(NullsPosition::Last) => ".nullslast",
                    None => "",
                };
                format!("{}.{}{}", o.column, dir, nulls)
            })
            .collect::<Vec<_>>()
            .join(",");
        query.append_pair("order", &order);
    }

    if let Some(limit) = parts.limit {
        query.append_pair("limit", &limit.to_string());
    }
    if let Some(offset) = parts.offset {
        query.append_pair("offset", &offset.to_string());
    }
    drop(query);

    if url.query() == Some("") {
        url.set_query(None);
    }
}

fn prefer(parts: &QueryParts) -> Option<String> {
    let mut prefer = Vec::new();
    match parts.operation {
        Operation::Insert | Operation::Update | Operation::Delete => {
            prefer.push(if parts.returning {
                "return=representation"
            } else {
                "return=minimal"
            });
        }
        Operation::Upsert { .. } => {
            prefer.push("resolution=merge-duplicates");
            prefer.push(if parts.returning {
                "return=representation"
            } else {
                "return=minimal"
            });
        }
        Operation::Select | Operation::Rpc => {}
    }
    if let Some(count) = parts.count.prefer() {
        prefer.push(count);
    }
    if prefer.is_empty() {
        None
    } else {
        Some(prefer.join(","))
    }
}

fn range(parts: &QueryParts) -> Option<String> {
    if parts.limit.is_none() && parts.offset.is_none() {
        return None;
    }
    let from = parts.offset.unwrap_or(0);
    match parts.limit {
        Some(limit) if limit <= 0 => None,
        Some(limit) => Some(format!("{}-{}", from, from.saturating_add(limit - 1))),
        None => Some(format!("{from}-")),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, PostgrestError> {
    HeaderValue::from_str(value)
        .map_err(|e| PostgrestError::InvalidQuery(format!("invalid header value {value:?}: {e}")))
}
