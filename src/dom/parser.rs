//! Tolerant HTML fragment parser.
//!
//! Tokenizes into start tags, end tags, text and comments, then builds the
//! tree with a stack of open elements. This is far smaller than the HTML5
//! tree construction algorithm but repairs what editors and clipboards
//! actually produce: unclosed `p`/`li`/`td`, stray end tags, misnested
//! inline formatting, vendor namespaced tags (`o:p`, `w:sdt`), comments and
//! doctype noise. Parsing never fails.

use super::{is_void, Attribute, Document, Element, NodeId};

/// Elements whose content is taken verbatim up to the matching end tag
const RAW_TEXT: &[&str] = &["script", "style"];
/// Like raw text, but entities are decoded
const ESCAPABLE_RAW_TEXT: &[&str] = &["textarea", "title"];

/// Deepest element nesting kept. Start tags past it are dropped and their
/// content lands in the innermost open element.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Starting any of these closes an open `p`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
    Comment(String),
}

pub(crate) fn parse_fragment(html: &str) -> Document {
    let mut tokenizer = Tokenizer::new(html);
    let mut builder = TreeBuilder::new();
    while let Some(token) = tokenizer.next_token() {
        builder.process(token);
    }
    builder.doc
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after a raw text start tag; the next token is its verbatim content
    raw_text: Option<String>,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.')
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            if let Some(name) = self.raw_text.take() {
                let text = self.consume_raw_text(&name);
                if !text.is_empty() {
                    return Some(Token::Text(text));
                }
            }
            if self.pos >= self.input.len() {
                return None;
            }

            let rest = self.rest();
            if let Some(body) = rest.strip_prefix("<!--") {
                let (comment, consumed) = match body.find("-->") {
                    Some(end) => (&body[..end], 4 + end + 3),
                    None => (body, rest.len()),
                };
                self.pos += consumed;
                return Some(Token::Comment(comment.to_string()));
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                // Doctype, CDATA, Word's <![if ...]> markers: dropped
                self.skip_past_gt();
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                if after.as_bytes().first().is_some_and(u8::is_ascii_alphabetic) {
                    return Some(self.consume_end_tag());
                }
                self.skip_past_gt();
                continue;
            }
            if rest.len() > 1 && rest.as_bytes()[0] == b'<' && rest.as_bytes()[1].is_ascii_alphabetic()
            {
                if let Some(token) = self.consume_start_tag() {
                    return Some(token);
                }
                // Unterminated tag: the '<' is literal text
                self.pos += 1;
                return Some(Token::Text("<".to_string()));
            }

            // Text up to the next '<' (a leading literal '<' belongs to this run)
            let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(decode_entities(&rest[..end])));
        }
    }

    fn skip_past_gt(&mut self) {
        match self.rest().find('>') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn consume_end_tag(&mut self) -> Token {
        let bytes = self.input.as_bytes();
        let start = self.pos + 2;
        let mut i = start;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        let name = self.input[start..i].to_ascii_lowercase();
        self.pos = i;
        self.skip_past_gt();
        Token::EndTag { name }
    }

    /// Returns `None` when the tag is never closed by `>`
    fn consume_start_tag(&mut self) -> Option<Token> {
        let input = self.input;
        let bytes = input.as_bytes();
        let len = bytes.len();
        let mut i = self.pos + 1;
        let name_start = i;
        while i < len && is_name_byte(bytes[i]) {
            i += 1;
        }
        let name = input[name_start..i].to_ascii_lowercase();

        let mut attrs: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        loop {
            while i < len && is_space(bytes[i]) {
                i += 1;
            }
            if i >= len {
                return None;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' if i + 1 < len && bytes[i + 1] == b'>' => {
                    self_closing = true;
                    i += 2;
                    break;
                }
                b'/' => i += 1,
                _ => {
                    let attr_start = i;
                    while i < len
                        && !is_space(bytes[i])
                        && !matches!(bytes[i], b'>' | b'=')
                        && !(bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'>')
                    {
                        i += 1;
                    }
                    if i == attr_start {
                        // A lone '=' with no name; step over it
                        i += 1;
                        continue;
                    }
                    let attr_name = input[attr_start..i].to_ascii_lowercase();

                    let mut j = i;
                    while j < len && is_space(bytes[j]) {
                        j += 1;
                    }
                    let mut value = String::new();
                    if j < len && bytes[j] == b'=' {
                        j += 1;
                        while j < len && is_space(bytes[j]) {
                            j += 1;
                        }
                        if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                            let quote = bytes[j];
                            let value_start = j + 1;
                            j = value_start;
                            while j < len && bytes[j] != quote {
                                j += 1;
                            }
                            value = decode_entities(&input[value_start..j]);
                            if j < len {
                                j += 1;
                            }
                        } else {
                            let value_start = j;
                            while j < len && !is_space(bytes[j]) && bytes[j] != b'>' {
                                j += 1;
                            }
                            value = decode_entities(&input[value_start..j]);
                        }
                        i = j;
                    }

                    if !attrs.iter().any(|a| a.name == attr_name) {
                        attrs.push(Attribute::new(attr_name, value));
                    }
                }
            }
        }

        self.pos = i;
        if !self_closing && (RAW_TEXT.contains(&name.as_str()) || ESCAPABLE_RAW_TEXT.contains(&name.as_str())) {
            self.raw_text = Some(name.clone());
        }
        Some(Token::StartTag {
            name,
            attrs,
            self_closing,
        })
    }

    fn consume_raw_text(&mut self, name: &str) -> String {
        let rest = self.rest();
        let needle = format!("</{}", name);
        let end = rest
            .to_ascii_lowercase()
            .find(&needle)
            .unwrap_or(rest.len());
        self.pos += end;
        let raw = &rest[..end];
        if ESCAPABLE_RAW_TEXT.contains(&name) {
            decode_entities(raw)
        } else {
            raw.to_string()
        }
    }
}

struct TreeBuilder {
    doc: Document,
    /// Open elements; the root is implicit below the first entry
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            open: Vec::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn process(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.append_text(text),
            Token::Comment(text) => {
                let node = self.doc.create_comment(text);
                let parent = self.current();
                self.doc.append_child(parent, node);
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                self.close_implied(&name);
                let leaf = self_closing || is_void(&name);
                if !leaf && self.open.len() >= MAX_NESTING_DEPTH {
                    return;
                }
                let node = self.doc.create_element(Element { name, attrs });
                let parent = self.current();
                self.doc.append_child(parent, node);
                if !leaf {
                    self.open.push(node);
                }
            }
            Token::EndTag { name } => self.close_element(&name),
        }
    }

    fn append_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        if let Some(&last) = self.doc.children(parent).last() {
            if let Some(existing) = self.doc.text_mut(last) {
                existing.push_str(&text);
                return;
            }
        }
        let node = self.doc.create_text(text);
        self.doc.append_child(parent, node);
    }

    /// Pop up to and including the nearest open `target`, unless one of
    /// `boundaries` is reached first
    fn close_within(&mut self, target: &str, boundaries: &[&str]) {
        for depth in (0..self.open.len()).rev() {
            let tag = self.doc.tag(self.open[depth]).unwrap_or_default();
            if tag == target {
                self.open.truncate(depth);
                return;
            }
            if boundaries.contains(&tag) {
                return;
            }
        }
    }

    fn close_implied(&mut self, name: &str) {
        match name {
            "li" => self.close_within("li", &["ul", "ol", "table"]),
            "dt" | "dd" => {
                self.close_within("dt", &["dl", "table"]);
                self.close_within("dd", &["dl", "table"]);
            }
            "tr" => self.close_within("tr", &["table"]),
            "td" | "th" => {
                self.close_within("td", &["tr", "table"]);
                self.close_within("th", &["tr", "table"]);
            }
            "thead" | "tbody" | "tfoot" => {
                for section in ["thead", "tbody", "tfoot"] {
                    self.close_within(section, &["table"]);
                }
            }
            "option" => self.close_within("option", &["select"]),
            _ => {}
        }
        if CLOSES_PARAGRAPH.contains(&name) {
            self.close_within("p", &["td", "th", "li", "table", "button", "caption"]);
        }
    }

    fn close_element(&mut self, name: &str) {
        if let Some(depth) = self
            .open
            .iter()
            .rposition(|&id| self.doc.tag(id) == Some(name))
        {
            self.open.truncate(depth);
        }
    }
}

/// Decode character references (`&amp;`, `&#39;`, `&#x2014;`, `&nbsp;` ...).
/// Unknown or malformed references are kept literally.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_reference(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `tail` starts with '&'. Returns the decoded char and bytes consumed.
fn decode_reference(tail: &str) -> Option<(char, usize)> {
    let body = &tail[1..];
    if let Some(numeric) = body.strip_prefix('#') {
        let (digits, radix, prefix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (numeric, 10, 1),
        };
        let len = digits
            .bytes()
            .take_while(|b| {
                if radix == 16 {
                    b.is_ascii_hexdigit()
                } else {
                    b.is_ascii_digit()
                }
            })
            .count();
        if len == 0 {
            return None;
        }
        let code = u32::from_str_radix(&digits[..len], radix).ok()?;
        let ch = char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or('\u{FFFD}');
        let terminated = digits[len..].starts_with(';');
        return Some((ch, 1 + prefix + len + usize::from(terminated)));
    }

    let len = body.bytes().take_while(u8::is_ascii_alphanumeric).count();
    if len == 0 {
        return None;
    }
    let name = &body[..len];
    let ch = named_entity(name)?;
    let terminated = body[len..].starts_with(';');
    if !terminated && !matches!(name, "amp" | "lt" | "gt" | "quot" | "nbsp") {
        return None;
    }
    Some((ch, 1 + len + usize::from(terminated)))
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "shy" => '\u{ad}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "deg" => '°',
        "times" => '×',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "euro" => '€',
        "pound" => '£',
        _ => return None,
    };
    Some(ch)
}
