//! Structured search queries for the remote store.
//!
//! Queries are rendered into the Drive query language with every
//! interpolated value quoted and escaped, so file names such as
//! `it's.txt` cannot break out of their string literal.

use std::fmt;

use drivegate_common::FolderId;

use crate::provider::RemoteFile;

/// A search over files in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveQuery {
    /// Files whose name is exactly the given string.
    NameEquals(String),
    /// Files that have the given folder as a parent.
    InParents(FolderId),
    /// Files with the exact name inside one folder.
    NameInFolder { name: String, folder: FolderId },
}

impl DriveQuery {
    /// Render the query in the Drive `q` parameter syntax.
    pub fn render(&self) -> String {
        match self {
            DriveQuery::NameEquals(name) => format!("name = {}", quote(name)),
            DriveQuery::InParents(folder) => format!("{} in parents", quote(folder.as_str())),
            DriveQuery::NameInFolder { name, folder } => format!(
                "name = {} and {} in parents",
                quote(name),
                quote(folder.as_str())
            ),
        }
    }

    /// Evaluate the query against a file without going to the store.
    pub fn matches(&self, file: &RemoteFile) -> bool {
        match self {
            DriveQuery::NameEquals(name) => file.name == *name,
            DriveQuery::InParents(folder) => file.parents.iter().any(|p| p == folder.as_str()),
            DriveQuery::NameInFolder { name, folder } => {
                file.name == *name && file.parents.iter().any(|p| p == folder.as_str())
            }
        }
    }
}

impl fmt::Display for DriveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote a value as a Drive query string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Read one quoted literal from the start of `input`.
    ///
    /// Returns the unescaped value and the rest of the input after the
    /// closing quote.
    fn read_literal(input: &str) -> Option<(String, &str)> {
        let mut chars = input.char_indices();
        if chars.next()?.1 != '\'' {
            return None;
        }
        let mut value = String::new();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => value.push(chars.next()?.1),
                '\'' => return Some((value, &input[i + 1..])),
                _ => value.push(c),
            }
        }
        None
    }

    fn file(name: &str, parents: &[&str]) -> RemoteFile {
        RemoteFile {
            id: "id".to_string(),
            name: name.to_string(),
            mime_type: None,
            parents: parents.iter().map(|p| p.to_string()).collect(),
            web_view_link: None,
        }
    }

    #[test]
    fn test_render_name_equals() {
        let query = DriveQuery::NameEquals("report.pdf".to_string());
        assert_eq!(query.render(), "name = 'report.pdf'");
    }

    #[test]
    fn test_render_in_parents() {
        let query = DriveQuery::InParents(FolderId::new("0Bfolder").unwrap());
        assert_eq!(query.to_string(), "'0Bfolder' in parents");
    }

    #[test]
    fn test_render_name_in_folder() {
        let query = DriveQuery::NameInFolder {
            name: "a.txt".to_string(),
            folder: FolderId::new("f1").unwrap(),
        };
        assert_eq!(query.render(), "name = 'a.txt' and 'f1' in parents");
    }

    #[test]
    fn test_render_escapes_quotes_and_backslashes() {
        let query = DriveQuery::NameEquals(r"it's a \ test".to_string());
        assert_eq!(query.render(), r"name = 'it\'s a \\ test'");
    }

    #[test]
    fn test_injection_attempt_stays_inside_literal() {
        let query = DriveQuery::NameEquals("x' or name != '".to_string());
        let rendered = query.render();
        let (value, rest) = read_literal(rendered.strip_prefix("name = ").unwrap()).unwrap();
        assert_eq!(value, "x' or name != '");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_matches() {
        let folder = FolderId::new("f1").unwrap();
        let f = file("a.txt", &["f1"]);

        assert!(DriveQuery::NameEquals("a.txt".to_string()).matches(&f));
        assert!(!DriveQuery::NameEquals("A.txt".to_string()).matches(&f));
        assert!(DriveQuery::InParents(folder.clone()).matches(&f));
        assert!(!DriveQuery::InParents(FolderId::new("f2").unwrap()).matches(&f));
        assert!(DriveQuery::NameInFolder {
            name: "a.txt".to_string(),
            folder
        }
        .matches(&f));
    }

    proptest! {
        #[test]
        fn prop_name_literal_round_trips(name in any::<String>()) {
            let rendered = DriveQuery::NameEquals(name.clone()).render();
            let (value, rest) = read_literal(rendered.strip_prefix("name = ").unwrap()).unwrap();
            prop_assert_eq!(value, name);
            prop_assert!(rest.is_empty());
        }
    }
}
