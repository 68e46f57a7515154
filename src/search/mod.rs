use crate::models::{BookId, NoteId};

/// Results shown per category in the search modal.
pub(crate) const SEARCH_SIZE_LIMIT: usize = 8;

pub(crate) trait Searchable {
    /// Pre-lowercased text matched against the search term.
    fn value(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SearchableBook {
    pub value: String,
    pub book_title: String,
    pub book_id: BookId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SearchableNote {
    pub value: String,
    pub book_title: String,
    pub book_id: BookId,
    pub note_title: String,
    pub note_id: NoteId,
}

impl Searchable for SearchableBook {
    fn value(&self) -> &str {
        &self.value
    }
}

impl Searchable for SearchableNote {
    fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SearchResults {
    pub books: Vec<SearchableBook>,
    pub notes: Vec<SearchableNote>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.notes.is_empty()
    }
}

async fn filter_category<T: Searchable + Clone>(term: &str, rows: &[T], limit: usize) -> Vec<T> {
    rows.iter()
        .filter(|s| s.value().contains(term))
        .take(limit)
        .cloned()
        .collect()
}

/// Substring search over already loaded books and notes.
///
/// The term is lower-cased, values are expected to be lower-cased already.
/// Each category is capped at `limit`.
pub(crate) async fn search_searchables(
    term: &str,
    books: &[SearchableBook],
    notes: &[SearchableNote],
    limit: usize,
) -> SearchResults {
    let term = term.to_lowercase();
    if term.is_empty() {
        return SearchResults::default();
    }

    let (books, notes) = futures::join!(
        filter_category(&term, books, limit),
        filter_category(&term, notes, limit),
    );
    SearchResults { books, notes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    fn searchable_book(title: &str) -> SearchableBook {
        SearchableBook {
            value: title.to_lowercase(),
            book_title: title.to_string(),
            book_id: format!("b-{title}"),
        }
    }

    fn searchable_note(title: &str) -> SearchableNote {
        SearchableNote {
            value: title.to_lowercase(),
            book_title: "Recipes".to_string(),
            book_id: "b1".to_string(),
            note_title: title.to_string(),
            note_id: format!("n-{title}"),
        }
    }

    #[test]
    fn no_match_yields_empty_categories() {
        let books = vec![searchable_book("Recipes")];
        let notes = vec![searchable_note("Pasta")];
        let found = block_on(search_searchables("zzz", &books, &notes, SEARCH_SIZE_LIMIT));
        assert!(found.is_empty());
    }

    #[test]
    fn empty_term_matches_nothing() {
        let books = vec![searchable_book("Recipes")];
        let found = block_on(search_searchables("", &books, &[], SEARCH_SIZE_LIMIT));
        assert_eq!(found, SearchResults::default());
    }

    #[test]
    fn term_is_lowercased_before_matching() {
        let books = vec![searchable_book("Pasta Dishes"), searchable_book("Travel")];
        let notes = vec![searchable_note("Pasta"), searchable_note("Pizza")];
        let found = block_on(search_searchables("PASTA", &books, &notes, SEARCH_SIZE_LIMIT));

        assert_eq!(found.books.len(), 1);
        assert_eq!(found.books[0].book_title, "Pasta Dishes");
        assert_eq!(found.notes.len(), 1);
        assert_eq!(found.notes[0].note_id, "n-Pasta");
    }

    #[test]
    fn each_category_is_capped() {
        let notes: Vec<_> = (0..20).map(|i| searchable_note(&format!("note {i}"))).collect();
        let books: Vec<_> = (0..3).map(|i| searchable_book(&format!("note book {i}"))).collect();
        let found = block_on(search_searchables("note", &books, &notes, SEARCH_SIZE_LIMIT));

        assert_eq!(found.notes.len(), SEARCH_SIZE_LIMIT);
        assert_eq!(found.notes[0].note_title, "note 0");
        assert_eq!(found.books.len(), 3);
    }
}
