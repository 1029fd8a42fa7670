use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const CONTENT_MARKER: &str = "{{CONTENT}}";

pub fn landing() -> String {
    render("")
}

pub fn success(filename: &str, video_title: &str) -> String {
    let href = format!(
        "/download/{}",
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    );

    render(&format!(
        r#"<div class="success">
        <p>Converted <strong>{title}</strong>.</p>
        <p><a href="{href}" download="{file}">Download {file}</a></p>
    </div>"#,
        title = escape_html(video_title),
        href = escape_html(&href),
        file = escape_html(filename),
    ))
}

pub fn error(message: &str) -> String {
    render(&format!(
        r#"<p class="error">{}</p>"#,
        escape_html(message)
    ))
}

fn render(content: &str) -> String {
    INDEX_TEMPLATE.replacen(CONTENT_MARKER, content, 1)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_has_form_and_no_marker() {
        let page = landing();

        assert!(page.contains(r#"name="url""#));
        assert!(!page.contains(CONTENT_MARKER));
        assert!(!page.contains(r#"class="error""#));
    }

    #[test]
    fn success_links_to_download() {
        let page = success("Rick Astley - Never Gonna Give You Up.ogg", "Rick <Astley>");

        assert!(page.contains(
            r#"href="/download/Rick%20Astley%20%2D%20Never%20Gonna%20Give%20You%20Up%2Eogg""#
        ));
        assert!(page.contains("Rick &lt;Astley&gt;"));
    }

    #[test]
    fn error_is_escaped() {
        let page = error(r#"<script>alert("x")</script>"#);

        assert!(page.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
        assert!(!page.contains(r#"<script>alert("#));
    }
}
