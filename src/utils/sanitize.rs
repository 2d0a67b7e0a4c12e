use ammonia;

/// Clean user-authored HTML (lesson content, review comments) using the
/// ammonia library.
///
/// Whitelist-based sanitization: safe tags like <b> and <p> survive,
/// <script>/<iframe> and event-handler attributes are stripped. This is the
/// backend's fail-safe against Stored XSS regardless of what clients render.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
