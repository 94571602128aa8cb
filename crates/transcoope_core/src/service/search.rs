//! Simulated global search.
//!
//! Results are a fixed catalog regardless of the query; only blank queries
//! are treated differently.

#[derive(Debug, Clone, PartialEq)]
pub struct SongHit {
    pub name: &'static str,
    pub artist: &'static str,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectHit {
    pub name: &'static str,
    pub author: &'static str,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserHit {
    pub name: &'static str,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub songs: Vec<SongHit>,
    pub projects: Vec<ProjectHit>,
    pub users: Vec<UserHit>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.songs.len() + self.projects.len() + self.users.len()
    }
}

/// Trims the raw input; `None` when nothing is left to search for.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn search_catalog(query: &str) -> SearchResults {
    SearchResults {
        query: query.to_string(),
        songs: vec![
            SongHit {
                name: "Example song 1",
                artist: "Artist A",
                score: 0.95,
            },
            SongHit {
                name: "Example song 2",
                artist: "Artist B",
                score: 0.87,
            },
        ],
        projects: vec![ProjectHit {
            name: "Collaborative project",
            author: "User X",
            score: 0.92,
        }],
        users: vec![UserHit {
            name: "creative_musician",
            score: 0.78,
        }],
    }
}
