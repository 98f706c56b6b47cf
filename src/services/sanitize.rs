/// Escapes the five HTML metacharacters `< > " ' /` with their entity
/// equivalents, in that order, applied once (not recursively).
///
/// This is a best-effort escape for interpolating user text into generated
/// HTML email bodies, not a general-purpose HTML sanitizer.
#[must_use]
pub fn sanitize(input: &str) -> String {
    input
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('/', "&#x2F;")
}
