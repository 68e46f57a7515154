use crate::cache::ShelfCache;
use crate::models::{Book, Note};
use chrono::{DateTime, Utc};
use icu_normalizer::DecomposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Sidebar ordering, persisted under the `sort_choice` setting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub(crate) enum SortChoice {
    #[default]
    NameAsc,
    NameDesc,
    UpdatedAsc,
    UpdatedDesc,
    CreatedAsc,
    CreatedDesc,
}

impl SortChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::UpdatedAsc => "Updated (oldest)",
            Self::UpdatedDesc => "Updated (newest)",
            Self::CreatedAsc => "Created (oldest)",
            Self::CreatedDesc => "Created (newest)",
        }
    }
}

/// Anything the sidebar can order.
pub(crate) trait Sortable {
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

impl Sortable for Book {
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Sortable for Note {
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Marks left over after canonical decomposition (the accent in "é").
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Base letters only: NFD, accents dropped, lowercased.
fn fold_base(s: &str) -> String {
    DecomposingNormalizerBorrowed::new_nfd()
        .normalize(s)
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Name comparison at base-letter strength: case and accents are ignored,
/// and runs of digits compare by value, so "note2" < "note10" and
/// "École" < "Zebra".
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (fold_base(a), fold_base(b));
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let da = take_digits(&mut a);
                let db = take_digits(&mut b);
                let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(&db));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.cmp(&y);
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

/// Consume a digit run, dropping leading zeros.
fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.next_if(char::is_ascii_digit) {
        if !(digits.is_empty() && c == '0') {
            digits.push(c);
        }
    }
    digits
}

fn compare<T: Sortable>(a: &T, b: &T, sort: SortChoice) -> Ordering {
    match sort {
        SortChoice::NameAsc => natural_cmp(a.name(), b.name()),
        SortChoice::NameDesc => natural_cmp(b.name(), a.name()),
        SortChoice::UpdatedAsc => a.updated_at().cmp(&b.updated_at()),
        SortChoice::UpdatedDesc => b.updated_at().cmp(&a.updated_at()),
        SortChoice::CreatedAsc => a.created_at().cmp(&b.created_at()),
        SortChoice::CreatedDesc => b.created_at().cmp(&a.created_at()),
    }
}

/// Stable in-place sort; ties keep their incoming order.
pub(crate) fn sort_rows<T: Sortable>(rows: &mut [T], sort: SortChoice) {
    rows.sort_by(|a, b| compare(a, b, sort));
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TreeNode {
    pub title: String,
    pub href: String,
    pub children: Vec<TreeNode>,
}

pub(crate) fn book_href(username: &str, book_slug: &str) -> String {
    format!("/{username}/{book_slug}")
}

pub(crate) fn note_href(username: &str, book_slug: &str, note_slug: &str) -> String {
    format!("/{username}/{book_slug}/{note_slug}")
}

/// Project the cache into the sorted sidebar tree.
pub(crate) fn build_tree(cache: &ShelfCache, username: &str, sort: SortChoice) -> Vec<TreeNode> {
    let mut books: Vec<&Book> = cache.books().collect();
    books.sort_by(|a, b| compare(*a, *b, sort));

    books
        .into_iter()
        .map(|book| {
            let mut notes: Vec<&Note> = cache.notes_of(&book.id).collect();
            notes.sort_by(|a, b| compare(*a, *b, sort));
            TreeNode {
                title: book.name.clone(),
                href: book_href(username, &book.slug),
                children: notes
                    .into_iter()
                    .map(|note| TreeNode {
                        title: note.name.clone(),
                        href: note_href(username, &book.slug, &note.slug),
                        children: vec![],
                    })
                    .collect(),
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Breadcrumb {
    pub username: String,
    pub full_name: Option<String>,
    pub book_slug: Option<String>,
    pub book_name: Option<String>,
    pub note_slug: Option<String>,
    pub note_name: Option<String>,
}

impl Breadcrumb {
    /// Resolve route slugs to display names through the cache. Slugs that are
    /// not cached yet are still shown, without a name.
    pub fn resolve(
        cache: Option<&ShelfCache>,
        username: &str,
        book_slug: Option<&str>,
        note_slug: Option<&str>,
    ) -> Self {
        let book = cache.zip(book_slug).and_then(|(c, s)| c.book_by_slug(s));
        let note = cache
            .zip(book)
            .zip(note_slug)
            .and_then(|((c, b), s)| c.note_by_slug(&b.id, s));

        Self {
            username: username.to_string(),
            full_name: cache.and_then(|c| c.user.name.clone()),
            book_slug: book_slug.map(str::to_string),
            book_name: book.map(|b| b.name.clone()),
            note_slug: book_slug.and(note_slug).map(str::to_string),
            note_name: note.map(|n| n.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::{book, note, user_with};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn dated(id: &str, name: &str, created: u32, updated: u32) -> Note {
        let mut n = note(id, "a", name, id);
        n.created_at = at(created);
        n.updated_at = at(updated);
        n
    }

    fn ids(rows: &[Note]) -> Vec<&str> {
        rows.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(natural_cmp("note2", "note10"), Ordering::Less);
        assert_eq!(natural_cmp("Note10", "note2"), Ordering::Greater);
        assert_eq!(natural_cmp("v007", "v7"), Ordering::Equal);
        assert_eq!(natural_cmp("Apple", "apple"), Ordering::Equal);
        assert_eq!(natural_cmp("abc", "abcd"), Ordering::Less);
    }

    #[test]
    fn name_sort_puts_note10_after_note2() {
        let mut rows = vec![
            dated("x", "note10", 1, 1),
            dated("y", "note2", 1, 1),
            dated("z", "Note1", 1, 1),
        ];
        sort_rows(&mut rows, SortChoice::NameAsc);
        assert_eq!(ids(&rows), vec!["z", "y", "x"]);

        sort_rows(&mut rows, SortChoice::NameDesc);
        assert_eq!(ids(&rows), vec!["x", "y", "z"]);
    }

    #[test]
    fn accented_names_sort_by_base_letter() {
        let mut rows = vec![dated("z", "Zebra", 1, 1), dated("e", "École", 1, 1)];
        sort_rows(&mut rows, SortChoice::NameAsc);
        assert_eq!(ids(&rows), vec!["e", "z"]);

        assert_eq!(natural_cmp("é", "E"), Ordering::Equal);
        assert_eq!(natural_cmp("Ñandú 2", "nandu 10"), Ordering::Less);
    }

    #[test]
    fn sorting_twice_is_idempotent_and_stable() {
        let rows = vec![
            dated("1", "beta", 3, 2),
            dated("2", "Alpha", 1, 2),
            dated("3", "alpha", 2, 5),
            dated("4", "gamma", 3, 1),
        ];
        for choice in SortChoice::iter() {
            let mut once = rows.clone();
            sort_rows(&mut once, choice);
            let mut twice = once.clone();
            sort_rows(&mut twice, choice);
            assert_eq!(ids(&once), ids(&twice), "{choice}");
        }

        // equal keys keep incoming order
        let mut by_name = rows.clone();
        sort_rows(&mut by_name, SortChoice::NameAsc);
        assert_eq!(ids(&by_name), vec!["2", "3", "1", "4"]);

        let mut by_created = rows;
        sort_rows(&mut by_created, SortChoice::CreatedDesc);
        assert_eq!(ids(&by_created), vec!["1", "4", "3", "2"]);
    }

    #[test]
    fn sort_choice_round_trips_through_setting_string() {
        assert_eq!(SortChoice::UpdatedDesc.to_string(), "updated_desc");
        assert_eq!(SortChoice::from_str("created_asc"), Ok(SortChoice::CreatedAsc));
        assert_eq!(SortChoice::default(), SortChoice::NameAsc);
    }

    #[test]
    fn tree_sorts_books_and_notes_with_same_comparator() {
        let mut a = book("a", "Recipes", "recipes");
        a.notes = Some(vec![
            note("n1", "a", "note10", "note10"),
            note("n2", "a", "note2", "note2"),
        ]);
        let cache = ShelfCache::from_user(user_with(vec![a, book("b", "Archive", "archive")]));

        let tree = build_tree(&cache, "leo", SortChoice::NameAsc);
        assert_eq!(
            tree.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(),
            vec!["Archive", "Recipes"]
        );
        assert!(tree[0].children.is_empty());
        assert_eq!(tree[1].href, "/leo/recipes");
        assert_eq!(
            tree[1]
                .children
                .iter()
                .map(|n| n.href.as_str())
                .collect::<Vec<_>>(),
            vec!["/leo/recipes/note2", "/leo/recipes/note10"]
        );
    }

    #[test]
    fn breadcrumb_resolves_names_from_cache() {
        let mut a = book("a", "Recipes", "recipes");
        a.notes = Some(vec![note("n1", "a", "Pasta", "pasta")]);
        let cache = ShelfCache::from_user(user_with(vec![a]));

        let crumb = Breadcrumb::resolve(Some(&cache), "leo", Some("recipes"), Some("pasta"));
        assert_eq!(
            crumb,
            Breadcrumb {
                username: "leo".to_string(),
                full_name: Some("Leo".to_string()),
                book_slug: Some("recipes".to_string()),
                book_name: Some("Recipes".to_string()),
                note_slug: Some("pasta".to_string()),
                note_name: Some("Pasta".to_string()),
            }
        );

        let unknown = Breadcrumb::resolve(Some(&cache), "leo", Some("nope"), Some("pasta"));
        assert_eq!(unknown.book_name, None);
        assert_eq!(unknown.note_name, None);
    }
}
