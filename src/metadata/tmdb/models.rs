use serde::Deserialize;

use crate::state::game::{ActorId, CastMember, FilmCredit, MovieId};

/// Highest page `/discover/movie` will serve.
pub const MAX_DISCOVER_PAGE: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct MovieDetailsResponse {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub cast: Vec<CreditsCastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CreditsCastEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PersonCreditsResponse {
    #[serde(default)]
    pub cast: Vec<PersonCastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PersonCastEntry {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverResponse {
    #[serde(default)]
    pub results: Vec<DiscoverEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverEntry {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl CreditsResponse {
    /// Cast members ordered by billing.
    pub fn into_cast(self) -> Vec<CastMember> {
        let mut entries = self.cast;
        entries.sort_by_key(|entry| entry.order.unwrap_or(u32::MAX));
        entries
            .into_iter()
            .map(|entry| CastMember {
                id: ActorId(entry.id),
                name: entry.name,
                photo_path: entry.profile_path,
            })
            .collect()
    }
}

impl PersonCreditsResponse {
    /// Films the person acted in, skipping untitled entries and repeated roles.
    pub fn into_filmography(self) -> Vec<FilmCredit> {
        let mut seen = std::collections::HashSet::new();
        self.cast
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .filter_map(|entry| {
                let title = entry.title.filter(|title| !title.trim().is_empty())?;
                Some(FilmCredit {
                    id: MovieId(entry.id),
                    title,
                    poster_path: entry.poster_path,
                    year: release_year(entry.release_date.as_deref()),
                })
            })
            .collect()
    }
}

/// Extract the year from a `YYYY-MM-DD` release date.
pub fn release_year(release_date: Option<&str>) -> Option<u16> {
    release_date?.split('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_year_handles_missing_dates() {
        assert_eq!(release_year(Some("1995-12-15")), Some(1995));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn credits_are_sorted_by_billing() {
        let response: CreditsResponse = serde_json::from_str(
            r#"{ "id": 949, "cast": [
                { "id": 2, "name": "Robert De Niro", "profile_path": "/dn.jpg", "order": 1 },
                { "id": 1, "name": "Al Pacino", "profile_path": null, "order": 0 }
            ] }"#,
        )
        .unwrap();

        let cast = response.into_cast();
        assert_eq!(cast[0].name, "Al Pacino");
        assert_eq!(cast[1].photo_path.as_deref(), Some("/dn.jpg"));
    }

    #[test]
    fn filmography_skips_duplicates_and_untitled_entries() {
        let response: PersonCreditsResponse = serde_json::from_str(
            r#"{ "cast": [
                { "id": 949, "title": "Heat", "release_date": "1995-12-15" },
                { "id": 949, "title": "Heat", "release_date": "1995-12-15" },
                { "id": 5, "title": "", "release_date": null },
                { "id": 524, "title": "Casino", "release_date": "" }
            ] }"#,
        )
        .unwrap();

        let films = response.into_filmography();
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].year, Some(1995));
        assert_eq!(films[1].title, "Casino");
        assert_eq!(films[1].year, None);
    }
}
