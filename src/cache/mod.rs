use crate::models::{Book, BookId, Note, NoteId, User};
use crate::search::{SearchableBook, SearchableNote};
use std::collections::BTreeMap;

/// A cached book together with the notes loaded for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookEntry {
    pub book: Book,
    pub notes: BTreeMap<NoteId, Note>,
}

impl BookEntry {
    fn new(mut book: Book) -> Self {
        let notes = book
            .notes
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        Self { book, notes }
    }
}

/// What the shell currently shows; mutations reconcile against it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Displayed {
    pub book_id: Option<BookId>,
    pub note_id: Option<NoteId>,
}

/// Which displayed resources must be refetched after a cache mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CacheEffect {
    pub refresh_book: bool,
    pub refresh_note: bool,
}

/// The user → book → note tree for the username in the current route.
///
/// Built from `GET /slug/@{username}?include=books` and patched locally after
/// every create/update/delete. `revision` moves on every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ShelfCache {
    pub user: User,
    pub books: BTreeMap<BookId, BookEntry>,
    pub revision: u64,
}

impl ShelfCache {
    pub fn from_user(mut user: User) -> Self {
        let books = user
            .books
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|b| (b.id.clone(), BookEntry::new(b)))
            .collect();
        Self {
            user,
            books,
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values().map(|e| &e.book)
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.get(id).map(|e| &e.book)
    }

    pub fn book_by_slug(&self, slug: &str) -> Option<&Book> {
        self.books().find(|b| b.slug == slug)
    }

    pub fn notes_of(&self, book_id: &str) -> impl Iterator<Item = &Note> + '_ {
        self.books
            .get(book_id)
            .into_iter()
            .flat_map(|e| e.notes.values())
    }

    pub fn note_by_slug(&self, book_id: &str, slug: &str) -> Option<&Note> {
        self.notes_of(book_id).find(|n| n.slug == slug)
    }

    /// Insert a new book with no notes, or replace an existing book's fields
    /// while keeping its notes.
    pub fn update_book(&mut self, mut new_book: Book, displayed: &Displayed) -> CacheEffect {
        new_book.notes = None;
        let is_displayed = displayed.book_id.as_deref() == Some(new_book.id.as_str());

        match self.books.get_mut(&new_book.id) {
            Some(entry) => entry.book = new_book,
            None => {
                self.books.insert(
                    new_book.id.clone(),
                    BookEntry {
                        book: new_book,
                        notes: BTreeMap::new(),
                    },
                );
            }
        }
        self.touch();

        CacheEffect {
            refresh_book: is_displayed,
            refresh_note: false,
        }
    }

    /// File `new_note` under its own book.
    ///
    /// Any previous copy is removed from the *displayed* book's notes, not from
    /// the book named by `new_note.book_id`.
    pub fn update_note(&mut self, new_note: Note, displayed: &Displayed) -> CacheEffect {
        let is_displayed = displayed.note_id.as_deref() == Some(new_note.id.as_str());

        if let Some(entry) = displayed
            .book_id
            .as_deref()
            .and_then(|id| self.books.get_mut(id))
        {
            entry.notes.remove(&new_note.id);
        }
        match self.books.get_mut(&new_note.book_id) {
            Some(entry) => {
                entry.notes.insert(new_note.id.clone(), new_note);
            }
            None => tracing::debug!(
                book_id = %new_note.book_id,
                "note belongs to a book outside the cache; not filed"
            ),
        }
        self.touch();

        CacheEffect {
            refresh_book: false,
            refresh_note: is_displayed,
        }
    }

    pub fn delete_book(&mut self, id: &str) {
        self.books.remove(id);
        self.touch();
    }

    /// Remove a note from the displayed book's notes.
    pub fn delete_note(&mut self, id: &str, displayed: &Displayed) {
        if let Some(entry) = displayed
            .book_id
            .as_deref()
            .and_then(|book_id| self.books.get_mut(book_id))
        {
            entry.notes.remove(id);
        }
        self.touch();
    }

    /// Lower-cased titles of every cached book and note, for the search modal.
    pub fn searchables(&self) -> (Vec<SearchableBook>, Vec<SearchableNote>) {
        let books = self
            .books()
            .map(|b| SearchableBook {
                value: b.name.to_lowercase(),
                book_title: b.name.clone(),
                book_id: b.id.clone(),
            })
            .collect();
        let notes = self
            .books
            .values()
            .flat_map(|e| {
                e.notes.values().map(move |n| SearchableNote {
                    value: n.name.to_lowercase(),
                    book_title: e.book.name.clone(),
                    book_id: e.book.id.clone(),
                    note_title: n.name.clone(),
                    note_id: n.id.clone(),
                })
            })
            .collect();
        (books, notes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::search::{search_searchables, SEARCH_SIZE_LIMIT};
    use futures::executor::block_on;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    pub(crate) fn book(id: &str, name: &str, slug: &str) -> Book {
        Book {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            is_public: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            notes: None,
        }
    }

    pub(crate) fn note(id: &str, book_id: &str, name: &str, slug: &str) -> Note {
        Note {
            id: id.to_string(),
            book_id: book_id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub(crate) fn user_with(books: Vec<Book>) -> User {
        User {
            id: "u1".to_string(),
            username: "leo".to_string(),
            name: Some("Leo".to_string()),
            books: Some(books),
        }
    }

    fn recipes_shelf() -> ShelfCache {
        let mut recipes = book("a", "Recipes", "recipes");
        recipes.notes = Some(vec![note("n1", "a", "Pasta", "pasta")]);
        ShelfCache::from_user(user_with(vec![recipes, book("b", "Travel", "travel")]))
    }

    fn displaying(book_id: &str, note_id: Option<&str>) -> Displayed {
        Displayed {
            book_id: Some(book_id.to_string()),
            note_id: note_id.map(str::to_string),
        }
    }

    #[test]
    fn from_user_files_notes_under_their_books() {
        let cache = recipes_shelf();
        assert_eq!(cache.books.len(), 2);
        assert_eq!(cache.book_by_slug("recipes").map(|b| b.id.as_str()), Some("a"));
        assert_eq!(cache.note_by_slug("a", "pasta").map(|n| n.name.as_str()), Some("Pasta"));
        assert!(cache.user.books.is_none());
        assert!(cache.book("a").is_some_and(|b| b.notes.is_none()));
    }

    #[test]
    fn update_book_with_new_id_inserts_empty_entry() {
        let mut cache = recipes_shelf();
        let effect = cache.update_book(book("c", "Garden", "garden"), &displaying("a", None));

        assert_eq!(cache.book("c").map(|b| b.name.as_str()), Some("Garden"));
        assert_eq!(cache.notes_of("c").count(), 0);
        assert_eq!(effect, CacheEffect::default());
    }

    #[test]
    fn update_book_keeps_existing_notes() {
        let mut cache = recipes_shelf();
        let before = cache.revision;
        let effect = cache.update_book(book("a", "Cooking", "cooking"), &displaying("a", None));

        assert_eq!(cache.book("a").map(|b| b.slug.as_str()), Some("cooking"));
        assert_eq!(cache.notes_of("a").count(), 1);
        assert!(effect.refresh_book);
        assert_ne!(cache.revision, before);
    }

    #[test]
    fn delete_note_removes_from_displayed_book() {
        let mut cache = recipes_shelf();
        let before = cache.clone();
        cache.delete_note("n1", &displaying("a", Some("n1")));

        assert!(cache.note_by_slug("a", "pasta").is_none());
        assert_ne!(cache.revision, before.revision);
        assert_ne!(cache, before);
    }

    #[test]
    fn delete_book_drops_its_notes() {
        let mut cache = recipes_shelf();
        cache.delete_book("a");
        assert!(cache.book("a").is_none());
        assert_eq!(cache.notes_of("a").count(), 0);
    }

    #[test]
    fn update_note_in_displayed_book_signals_refresh() {
        let mut cache = recipes_shelf();
        let effect = cache.update_note(
            note("n1", "a", "Pasta Bake", "pasta-bake"),
            &displaying("a", Some("n1")),
        );
        assert!(effect.refresh_note);
        assert_eq!(cache.notes_of("a").count(), 1);
        assert!(cache.note_by_slug("a", "pasta-bake").is_some());
    }

    #[test]
    fn update_note_moves_from_displayed_book_to_its_own() {
        let mut cache = recipes_shelf();
        let effect = cache.update_note(note("n1", "b", "Pasta", "pasta"), &displaying("a", None));

        assert!(cache.note_by_slug("a", "pasta").is_none());
        assert_eq!(cache.note_by_slug("b", "pasta").map(|n| n.id.as_str()), Some("n1"));
        assert!(!effect.refresh_note);
    }

    #[test]
    fn update_note_leaves_stale_entry_outside_displayed_book() {
        // note lives in "a" but "b" is displayed: the copy in "a" survives
        let mut cache = recipes_shelf();
        cache.update_note(note("n1", "b", "Pasta", "pasta"), &displaying("b", None));

        assert!(cache.note_by_slug("a", "pasta").is_some());
        assert!(cache.note_by_slug("b", "pasta").is_some());
    }

    #[test]
    fn update_note_replaces_same_id_in_target_book() {
        let mut shelf = recipes_shelf();
        shelf.update_note(note("n2", "b", "Rome", "rome"), &displaying("b", None));
        shelf.update_note(note("n2", "b", "Rome 2024", "rome-2024"), &displaying("a", None));

        let names: Vec<_> = shelf.notes_of("b").map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Rome 2024"]);
    }

    #[test]
    fn search_matches_titles_not_slugs() {
        let mut cache = recipes_shelf();
        cache.update_book(book("c", "Weekend Trips", "trips-2024"), &Displayed::default());
        let (books, notes) = cache.searchables();

        let by_slug = block_on(search_searchables("2024", &books, &notes, SEARCH_SIZE_LIMIT));
        assert!(by_slug.is_empty());

        let by_title = block_on(search_searchables("weekend", &books, &notes, SEARCH_SIZE_LIMIT));
        assert_eq!(by_title.books.len(), 1);
        assert_eq!(by_title.books[0].book_id, "c");
    }

    #[test]
    fn searchables_are_lowercased() {
        let (books, notes) = recipes_shelf().searchables();
        assert_eq!(books.len(), 2);
        assert!(books.iter().any(|b| b.value == "recipes" && b.book_title == "Recipes"));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].value, "pasta");
        assert_eq!(notes[0].book_id, "a");
    }
}
