use crate::library::SongFilter;
use crate::lyrics::SongSections;
use crate::models::{Language, Song};

/// The streamed song list plus the view state layered over it.
pub(crate) struct SongListScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) filtered_songs: Vec<Song>,
    pub(crate) filter: SongFilter,
    pub(crate) selected: usize,
}

impl SongListScreen {
    pub(crate) fn new(songs: Vec<Song>) -> Self {
        let mut screen = Self {
            filtered_songs: Vec::new(),
            songs,
            filter: SongFilter::default(),
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    /// Recompute the visible rows, keeping the same song highlighted when it
    /// survives the change.
    pub(crate) fn apply_filter(&mut self) {
        let previous = self.current_song().map(|song| song.id.clone());
        self.filtered_songs = self.filter.apply(&self.songs);
        match previous {
            Some(id) if self.select_id(&id) => {}
            _ => self.ensure_in_bounds(),
        }
    }

    /// Replace the whole list with a fresh snapshot.
    pub(crate) fn set_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.apply_filter();
    }

    pub(crate) fn set_query(&mut self, query: &str) {
        self.filter.set_query(query);
        self.apply_filter();
    }

    pub(crate) fn toggle_language(&mut self, language: Language) -> bool {
        let active = self.filter.toggle_language(language);
        self.apply_filter();
        active
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.filtered_songs.get(self.selected)
    }

    /// Highlight the song with `id` if it is visible.
    pub(crate) fn select_id(&mut self, id: &str) -> bool {
        match self.filtered_songs.iter().position(|song| song.id == id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered_songs.is_empty() {
            return;
        }
        let len = self.filtered_songs.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.filtered_songs.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered_songs.is_empty() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered_songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_songs.len() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }

    /// Title for the list pane, including active filters.
    pub(crate) fn title(&self) -> String {
        if !self.filter.is_active() {
            return format!("Songs ({})", self.songs.len());
        }
        let mut title = format!("Songs ({}/{})", self.filtered_songs.len(), self.songs.len());
        let query = self.filter.query().trim();
        if !query.is_empty() {
            title.push_str(&format!(" \"{query}\""));
        }
        if !self.filter.languages().is_empty() {
            let names: Vec<&str> = self
                .filter
                .languages()
                .iter()
                .map(|language| language.label())
                .collect();
            title.push_str(&format!(" [{}]", names.join(" | ")));
        }
        title
    }
}

/// The song chosen for preview, with its sections parsed once on load.
#[derive(Debug, Clone)]
pub(crate) struct PreviewedSong {
    pub(crate) song: Song,
    pub(crate) sections: SongSections,
}

impl PreviewedSong {
    pub(crate) fn new(song: Song) -> Self {
        let sections = SongSections::from_song(&song);
        Self { song, sections }
    }
}
