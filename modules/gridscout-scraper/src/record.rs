//! Fixed-schema output record. Every column is a `String` that starts as
//! the `NA` sentinel and is overwritten as extraction progresses, so a
//! row is always fully populated no matter where extraction gave up.

use chrono::Local;
use serde::Serialize;

use crate::text::extract_player_id;

/// Sentinel for "not available". Consumers rely on this exact token.
pub const NA: &str = "NA";

/// Column order of the output CSV. The validator enforces this exactly.
pub const HEADERS: [&str; 38] = [
    "247 ID",
    "Player Name",
    "Position",
    "Height",
    "Weight",
    "City, ST",
    "Class",
    "Junior College",
    "High School",
    "HS Class Year",
    "247 JUCO Stars",
    "247 JUCO Rating",
    "247 JUCO National Rank",
    "247 JUCO Position",
    "247 JUCO Position Rank",
    "Composite JUCO Stars",
    "Composite JUCO Rating",
    "Composite JUCO National Rank",
    "Composite JUCO Position",
    "Composite JUCO Position Rank",
    "247 HS Stars",
    "247 HS Rating",
    "247 HS National Rank",
    "247 HS Position",
    "247 HS Position Rank",
    "Composite HS Stars",
    "Composite HS Rating",
    "Composite HS National Rank",
    "Composite HS Position",
    "Composite HS Position Rank",
    "Signed Date",
    "Signed Team",
    "Draft Date",
    "Draft Team",
    "Recruiting Year",
    "Profile URL",
    "Scrape Date",
    "Data Source",
];

/// One row per (player, recruiting year).
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecord {
    #[serde(rename = "247 ID")]
    pub player_id: String,
    #[serde(rename = "Player Name")]
    pub player_name: String,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Height")]
    pub height: String,
    #[serde(rename = "Weight")]
    pub weight: String,
    #[serde(rename = "City, ST")]
    pub city_st: String,
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Junior College")]
    pub junior_college: String,
    #[serde(rename = "High School")]
    pub high_school: String,
    #[serde(rename = "HS Class Year")]
    pub hs_class_year: String,

    #[serde(rename = "247 JUCO Stars")]
    pub juco_247_stars: String,
    #[serde(rename = "247 JUCO Rating")]
    pub juco_247_rating: String,
    #[serde(rename = "247 JUCO National Rank")]
    pub juco_247_national_rank: String,
    #[serde(rename = "247 JUCO Position")]
    pub juco_247_position: String,
    #[serde(rename = "247 JUCO Position Rank")]
    pub juco_247_position_rank: String,

    #[serde(rename = "Composite JUCO Stars")]
    pub juco_composite_stars: String,
    #[serde(rename = "Composite JUCO Rating")]
    pub juco_composite_rating: String,
    #[serde(rename = "Composite JUCO National Rank")]
    pub juco_composite_national_rank: String,
    #[serde(rename = "Composite JUCO Position")]
    pub juco_composite_position: String,
    #[serde(rename = "Composite JUCO Position Rank")]
    pub juco_composite_position_rank: String,

    #[serde(rename = "247 HS Stars")]
    pub hs_247_stars: String,
    #[serde(rename = "247 HS Rating")]
    pub hs_247_rating: String,
    #[serde(rename = "247 HS National Rank")]
    pub hs_247_national_rank: String,
    #[serde(rename = "247 HS Position")]
    pub hs_247_position: String,
    #[serde(rename = "247 HS Position Rank")]
    pub hs_247_position_rank: String,

    #[serde(rename = "Composite HS Stars")]
    pub hs_composite_stars: String,
    #[serde(rename = "Composite HS Rating")]
    pub hs_composite_rating: String,
    #[serde(rename = "Composite HS National Rank")]
    pub hs_composite_national_rank: String,
    #[serde(rename = "Composite HS Position")]
    pub hs_composite_position: String,
    #[serde(rename = "Composite HS Position Rank")]
    pub hs_composite_position_rank: String,

    #[serde(rename = "Signed Date")]
    pub signed_date: String,
    #[serde(rename = "Signed Team")]
    pub signed_team: String,
    #[serde(rename = "Draft Date")]
    pub draft_date: String,
    #[serde(rename = "Draft Team")]
    pub draft_team: String,

    #[serde(rename = "Recruiting Year")]
    pub recruiting_year: String,
    #[serde(rename = "Profile URL")]
    pub profile_url: String,
    #[serde(rename = "Scrape Date")]
    pub scrape_date: String,
    #[serde(rename = "Data Source")]
    pub data_source: String,
}

/// Which institution level a ranking group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionLevel {
    Juco,
    HighSchool,
}

/// Which rating system a ranking section reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSystem {
    Site247,
    Composite,
}

/// Mutable view over one of the four ranking field groups.
pub struct RankSlots<'a> {
    pub stars: &'a mut String,
    pub rating: &'a mut String,
    pub national_rank: &'a mut String,
    pub position: &'a mut String,
    pub position_rank: &'a mut String,
}

impl PlayerRecord {
    /// A record with every field set to the sentinel except identity
    /// fields, which are known the moment the URL is dequeued.
    pub fn new(profile_url: &str, recruiting_year: i32) -> Self {
        let na = || NA.to_string();
        Self {
            player_id: extract_player_id(profile_url),
            player_name: na(),
            position: na(),
            height: na(),
            weight: na(),
            city_st: na(),
            class: na(),
            junior_college: na(),
            high_school: na(),
            hs_class_year: na(),
            juco_247_stars: na(),
            juco_247_rating: na(),
            juco_247_national_rank: na(),
            juco_247_position: na(),
            juco_247_position_rank: na(),
            juco_composite_stars: na(),
            juco_composite_rating: na(),
            juco_composite_national_rank: na(),
            juco_composite_position: na(),
            juco_composite_position_rank: na(),
            hs_247_stars: na(),
            hs_247_rating: na(),
            hs_247_national_rank: na(),
            hs_247_position: na(),
            hs_247_position_rank: na(),
            hs_composite_stars: na(),
            hs_composite_rating: na(),
            hs_composite_national_rank: na(),
            hs_composite_position: na(),
            hs_composite_position_rank: na(),
            signed_date: na(),
            signed_team: na(),
            draft_date: na(),
            draft_team: na(),
            recruiting_year: recruiting_year.to_string(),
            profile_url: profile_url.to_string(),
            scrape_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            data_source: "247Sports JUCO".to_string(),
        }
    }

    /// Slots for one (level, system) ranking group. A parsed section is
    /// written through exactly one of these views, never two.
    pub fn rank_slots(&mut self, level: InstitutionLevel, system: RatingSystem) -> RankSlots<'_> {
        match (level, system) {
            (InstitutionLevel::Juco, RatingSystem::Site247) => RankSlots {
                stars: &mut self.juco_247_stars,
                rating: &mut self.juco_247_rating,
                national_rank: &mut self.juco_247_national_rank,
                position: &mut self.juco_247_position,
                position_rank: &mut self.juco_247_position_rank,
            },
            (InstitutionLevel::Juco, RatingSystem::Composite) => RankSlots {
                stars: &mut self.juco_composite_stars,
                rating: &mut self.juco_composite_rating,
                national_rank: &mut self.juco_composite_national_rank,
                position: &mut self.juco_composite_position,
                position_rank: &mut self.juco_composite_position_rank,
            },
            (InstitutionLevel::HighSchool, RatingSystem::Site247) => RankSlots {
                stars: &mut self.hs_247_stars,
                rating: &mut self.hs_247_rating,
                national_rank: &mut self.hs_247_national_rank,
                position: &mut self.hs_247_position,
                position_rank: &mut self.hs_247_position_rank,
            },
            (InstitutionLevel::HighSchool, RatingSystem::Composite) => RankSlots {
                stars: &mut self.hs_composite_stars,
                rating: &mut self.hs_composite_rating,
                national_rank: &mut self.hs_composite_national_rank,
                position: &mut self.hs_composite_position,
                position_rank: &mut self.hs_composite_position_rank,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_all_sentinel_except_identity() {
        let record = PlayerRecord::new("https://247sports.com/player/jo-smith-12345/", 2024);
        assert_eq!(record.player_id, "12345");
        assert_eq!(record.recruiting_year, "2024");
        assert_eq!(
            record.profile_url,
            "https://247sports.com/player/jo-smith-12345/"
        );
        assert_eq!(record.data_source, "247Sports JUCO");
        assert_eq!(record.player_name, NA);
        assert_eq!(record.juco_composite_stars, NA);
        assert_eq!(record.signed_date, NA);
    }

    #[test]
    fn serialized_column_order_matches_headers() {
        let record = PlayerRecord::new("https://247sports.com/player/jo-smith-12345/", 2024);
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header_line = text.lines().next().unwrap();

        let mut reader = csv::Reader::from_reader(header_line.as_bytes());
        let parsed: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(|h| h.to_string())
            .collect();
        assert_eq!(parsed, HEADERS.to_vec());
    }
}
