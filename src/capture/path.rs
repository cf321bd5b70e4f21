use uuid::Uuid;

/// Drop everything from the first `?`.
#[must_use]
pub fn strip_query(raw: &str) -> &str {
    raw.split_once('?').map_or(raw, |(path, _)| path)
}

/// Path portion of an absolute or relative URL.
#[must_use]
pub fn path_of_url(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };
    rest.find('/')
        .and_then(|idx| rest.get(idx..))
        .unwrap_or("/")
}

/// Strip the query string and replace numeric or UUID segments with `:id`.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    strip_query(raw)
        .split('/')
        .map(|segment| {
            if is_identifier(segment) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_identifier(segment: &str) -> bool {
    let numeric = !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit());
    numeric || (segment.len() == 36 && Uuid::try_parse(segment).is_ok())
}

/// Rebuild the full URL, preferring a forwarded protocol header.
#[must_use]
pub fn full_url(
    forwarded_proto: Option<&str>,
    protocol: &str,
    host: &str,
    original_url: &str,
) -> String {
    let scheme = forwarded_proto
        .map(str::trim)
        .filter(|proto| !proto.is_empty())
        .unwrap_or(protocol);
    format!("{}://{}{}", scheme, host, original_url)
}
