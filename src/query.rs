/// Upper bound on the car name we accept; anything longer is almost
/// certainly junk and would only bloat the search and prompt strings.
const MAX_QUERY_LEN: usize = 80;

/// Trims surrounding whitespace and truncates to [`MAX_QUERY_LEN`] characters.
/// An empty result is the caller's problem (400 at the route level).
pub fn sanitize(raw: &str) -> String {
    raw.trim().chars().take(MAX_QUERY_LEN).collect()
}
