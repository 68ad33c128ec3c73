//! Minimal HTML to text conversion for EPUB chapters.

const BLOCK_CLOSERS: [&str; 10] = ["/p", "/div", "/h1", "/h2", "/h3", "/h4", "/h5", "/h6", "/li", "/tr"];

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Strips markup, keeping paragraph breaks as newlines. Script and style
/// bodies are dropped; blank lines are removed and each line is trimmed.
pub fn extract_plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            rest = "";
            break;
        };

        let tag = after[..end].trim().to_ascii_lowercase();
        let name = tag_name(&tag);
        rest = &after[end + 1..];

        if name == "script" || name == "style" {
            rest = skip_block(rest, name);
        } else if name == "br" || BLOCK_CLOSERS.contains(&name) {
            text.push('\n');
        }
    }
    text.push_str(rest);

    decode_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn tag_name(tag: &str) -> &str {
    let tag = tag.trim_end_matches('/');
    tag.split(|c: char| c.is_whitespace()).next().unwrap_or("")
}

/// Skips past the matching close tag of a script or style block.
fn skip_block<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let close = format!("</{}", name);
    match lower.find(&close) {
        Some(pos) => match rest[pos..].find('>') {
            Some(end) => &rest[pos + end + 1..],
            None => "",
        },
        None => "",
    }
}

fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    // `&amp;` goes last so `&amp;lt;` stays `&lt;`.
    for (entity, replacement) in ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let html = "<html><body><p>Hello World</p></body></html>";
        assert_eq!(extract_plain_text(html), "Hello World");
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let html = "<h1>Title</h1><p>First.</p><p>Second.<br/>Third.</p>";
        assert_eq!(extract_plain_text(html), "Title\nFirst.\nSecond.\nThird.");
    }

    #[test]
    fn test_script_and_style_are_dropped() {
        let html = "<style>p { color: red; }</style><p>Body</p><SCRIPT>alert(1)</SCRIPT>";
        assert_eq!(extract_plain_text(html), "Body");
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = "<p>Fish&nbsp;&amp;&nbsp;chips &lt;3 &quot;yum&quot; it&#39;s &amp;lt;</p>";
        assert_eq!(extract_plain_text(html), "Fish & chips <3 \"yum\" it's &lt;");
    }

    #[test]
    fn test_unclosed_tag_is_dropped() {
        assert_eq!(extract_plain_text("Text <b"), "Text");
    }
}
