use std::path::Path;

const FALLBACK: &str = "application/octet-stream";
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("webm", "audio/webm"),
    ("ogg", "audio/ogg"),
    ("zip", "application/zip"),
    ("ico", "image/x-icon"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
];

pub fn content_type_for(filename: &str) -> &'static str {
    let Some(ext) = Path::new(filename).extension().and_then(|x| x.to_str()) else {
        return FALLBACK;
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map_or(FALLBACK, |(_, content_type)| *content_type)
}
