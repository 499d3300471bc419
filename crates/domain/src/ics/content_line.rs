/// A raw content line split at the end of its property name. Parameters
/// and value are left to the icalendar parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawLine<'a> {
    /// Property name, upper cased
    pub name: String,
    /// Everything after the name, starting with `;` or `:`
    pub rest: &'a str,
}

impl<'a> RawLine<'a> {
    /// Returns `None` when the line has no name or no `:` at all
    pub fn split(line: &'a str) -> Option<Self> {
        if !line.contains(':') {
            return None;
        }
        let name_end = line.find([';', ':'])?;
        let name = line[..name_end].trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }

        Some(Self {
            name: name.to_ascii_uppercase(),
            rest: &line[name_end..],
        })
    }

    /// The line with its property name upper cased, so that lookups by
    /// name and value unescaping behave the same for every producer
    pub fn normalized(&self) -> String {
        format!("{}{}", self.name, self.rest)
    }

    /// Component name of a `BEGIN` or `END` line, upper cased
    pub fn component(&self) -> Option<String> {
        self.rest
            .strip_prefix(':')
            .map(|component| component.trim().to_ascii_uppercase())
    }

    /// The still escaped value, found after the first `:` that is not
    /// inside a quoted parameter value
    pub fn raw_value(&self) -> Option<&'a str> {
        let mut quoted = false;
        for (i, c) in self.rest.char_indices() {
            match c {
                '"' => quoted = !quoted,
                ':' if !quoted => return Some(&self.rest[i + 1..]),
                _ => (),
            }
        }
        None
    }
}

/// Resolves the TEXT escapes `\n`, `\N`, `\,`, `\;` and `\\`
pub(crate) fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits a TEXT list on commas that are not escaped
pub(crate) fn split_text_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(current);
    items.iter().map(|item| unescape_text(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_from_rest() {
        let line = RawLine::split("summary:Ward council").unwrap();
        assert_eq!(line.name, "SUMMARY");
        assert_eq!(line.rest, ":Ward council");
        assert_eq!(line.normalized(), "SUMMARY:Ward council");

        let line = RawLine::split("DTSTART;TZID=America/Denver:20260701T180000").unwrap();
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.raw_value(), Some("20260701T180000"));
    }

    #[test]
    fn raw_value_skips_quoted_parameters() {
        let line = RawLine::split(
            "ATTENDEE;DELEGATED-TO=\"mailto:a@x.org\",\"mailto:b@x.org\":mailto:c@x.org",
        )
        .unwrap();
        assert_eq!(line.raw_value(), Some("mailto:c@x.org"));

        let line = RawLine::split("URL:https://example.org/a").unwrap();
        assert_eq!(line.raw_value(), Some("https://example.org/a"));
    }

    #[test]
    fn rejects_lines_without_name_or_value() {
        assert!(RawLine::split("garbage line").is_none());
        assert!(RawLine::split(":no-name").is_none());
        assert!(RawLine::split("DTSTART;VALUE").is_none());
        assert!(RawLine::split("not a: property").is_none());
    }

    #[test]
    fn reads_component_names() {
        assert_eq!(
            RawLine::split("begin:vevent").unwrap().component(),
            Some("VEVENT".to_string())
        );
        assert_eq!(RawLine::split("BEGIN;X=1:VEVENT").unwrap().component(), None);
    }

    #[test]
    fn unescapes_text() {
        assert_eq!(unescape_text(r"Bring\, please\; thanks\nBye\\"), "Bring, please; thanks\nBye\\");
    }

    #[test]
    fn splits_on_unescaped_commas_only() {
        assert_eq!(
            split_text_list(r"ward,youth\, young women,leadership"),
            vec!["ward", "youth, young women", "leadership"]
        );
    }
}
