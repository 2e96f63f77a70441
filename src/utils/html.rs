// src/utils/html.rs

/// Sanitises author-supplied HTML (text module bodies, course descriptions).
///
/// Whitelist based: formatting tags survive, `<script>`/`<style>` are dropped
/// together with their content, event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
