//! Generic parser for the "rankings section" markup shape shared by JUCO
//! and high-school profile pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::record::{InstitutionLevel, PlayerRecord, RatingSystem};
use crate::text::{clean_text, parse_rank};

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid regex"));

const MAX_STARS: usize = 5;

fn sel(selectors: &str) -> Selector {
    Selector::parse(selectors).expect("valid selector")
}

/// Classify a section header against the two rating systems. The
/// composite keyword always wins so a section is never written through
/// two field groups; a site-native header only applies when the
/// composite keyword is absent.
fn classify_header(header_text: &str) -> Option<RatingSystem> {
    let upper = header_text.to_uppercase();
    if upper.contains("COMPOSITE") {
        Some(RatingSystem::Composite)
    } else if upper.contains("247SPORTS") {
        Some(RatingSystem::Site247)
    } else {
        None
    }
}

/// Parse every ranking section in `html` and write matched sections into
/// the record's field group for `level`. National ranks are accepted only
/// when the rank link carries `InstitutionGroup=<institution_filter>`, so
/// JUCO and overall-national ranks sharing a page never get conflated.
pub fn parse_ranking_sections(
    html: &str,
    record: &mut PlayerRecord,
    level: InstitutionLevel,
    institution_filter: &str,
) {
    let document = Html::parse_document(html);
    let section_sel = sel("section.rankings, section.rankings-section, div.ranking-section");
    let header_sel = sel(".rankings-header h3, h3.title, h3");
    let star_sel = sel("span.icon-starsolid.yellow, i.icon-starsolid.yellow");
    let rating_sel = sel(".rank-block, .score, .rating");
    let ranks_list_sel = sel("ul.ranks-list");
    let li_sel = sel("li");
    let bold_sel = sel("b");
    let anchor_sel = sel("a");
    let strong_sel = sel("strong");

    for section in document.select(&section_sel) {
        let Some(header) = section.select(&header_sel).next() else {
            continue;
        };
        let Some(system) = classify_header(&element_text(&header)) else {
            continue;
        };

        let slots = record.rank_slots(level, system);

        let star_count = section.select(&star_sel).count();
        if star_count > 0 {
            *slots.stars = star_count.min(MAX_STARS).to_string();
        }

        if let Some(rating_elem) = section.select(&rating_sel).next() {
            if let Some(rating) = RATING_RE.captures(&element_text(&rating_elem)) {
                *slots.rating = rating[1].to_string();
            }
        }

        let Some(ranks_list) = section.select(&ranks_list_sel).next() else {
            continue;
        };
        for entry in ranks_list.select(&li_sel) {
            let Some(link) = entry.select(&anchor_sel).next() else {
                continue;
            };
            let href = link.value().attr("href").unwrap_or_default();

            // Prefer the emphasized rank sub-node; fall back to the
            // link's own text when it is missing.
            let rank_text = link
                .select(&strong_sel)
                .next()
                .map(|node| element_text(&node))
                .unwrap_or_else(|| element_text(&link));
            let rank_value = parse_rank(&rank_text);

            if href.contains("Position=") {
                if let Some(label) = entry.select(&bold_sel).next() {
                    *slots.position = element_text(&label);
                }
                *slots.position_rank = rank_value;
            } else if href.contains("State=") || href.contains("state=") {
                // State ranks are out of scope for this record shape.
            } else if href.contains(&format!("InstitutionGroup={institution_filter}")) {
                *slots.national_rank = rank_value;
            }
        }
    }
}

fn element_text(element: &ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NA;

    fn record() -> PlayerRecord {
        PlayerRecord::new("https://247sports.com/player/jo-smith-12345/", 2024)
    }

    fn composite_section(stars: usize, rating: &str) -> String {
        let icons: String = (0..stars)
            .map(|_| r#"<span class="icon-starsolid yellow"></span>"#)
            .collect();
        format!(
            r#"<section class="rankings">
                <div class="rankings-header"><h3>247Sports Composite</h3></div>
                {icons}
                <div class="rank-block">{rating} Rating</div>
                <ul class="ranks-list">
                    <li><a href="/Season/2024-Football/CompositeRecruitRankings/?InstitutionGroup=JuniorCollege"><strong>#12</strong></a></li>
                    <li><b>DL</b><a href="/Season/2024-Football/CompositeRecruitRankings/?Position=DL"><strong>#4</strong></a></li>
                    <li><a href="/Season/2024-Football/CompositeRecruitRankings/?State=KS"><strong>#2</strong></a></li>
                </ul>
            </section>"#
        )
    }

    #[test]
    fn composite_section_end_to_end() {
        let html = composite_section(4, "89.5");
        let mut rec = record();
        parse_ranking_sections(&html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");

        assert_eq!(rec.juco_composite_stars, "4");
        assert_eq!(rec.juco_composite_rating, "89.5");
        assert_eq!(rec.juco_composite_national_rank, "12");
        assert_eq!(rec.juco_composite_position, "DL");
        assert_eq!(rec.juco_composite_position_rank, "4");
    }

    #[test]
    fn star_count_is_capped_at_five() {
        let html = composite_section(7, "99.0");
        let mut rec = record();
        parse_ranking_sections(&html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");
        assert_eq!(rec.juco_composite_stars, "5");
    }

    #[test]
    fn composite_header_never_feeds_the_site_group() {
        // "247Sports Composite" loosely matches both labels; composite
        // precedence keeps the site-native group untouched.
        let html = composite_section(4, "89.5");
        let mut rec = record();
        parse_ranking_sections(&html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");

        assert_eq!(rec.juco_247_stars, NA);
        assert_eq!(rec.juco_247_rating, NA);
        assert_eq!(rec.juco_247_national_rank, NA);
    }

    #[test]
    fn site_native_section_feeds_the_site_group() {
        let html = r#"<section class="rankings-section">
            <h3 class="title">247Sports</h3>
            <span class="icon-starsolid yellow"></span>
            <span class="icon-starsolid yellow"></span>
            <span class="icon-starsolid yellow"></span>
            <div class="score">91 Rating</div>
            <ul class="ranks-list">
                <li><a href="/rankings/?InstitutionGroup=HighSchool"><strong>#30</strong></a></li>
            </ul>
        </section>"#;
        let mut rec = record();
        parse_ranking_sections(html, &mut rec, InstitutionLevel::HighSchool, "HighSchool");

        assert_eq!(rec.hs_247_stars, "3");
        assert_eq!(rec.hs_247_rating, "91");
        assert_eq!(rec.hs_247_national_rank, "30");
        assert_eq!(rec.hs_composite_stars, NA);
    }

    #[test]
    fn unknown_headers_and_state_ranks_are_skipped() {
        let html = r#"<div class="ranking-section">
            <h3>Scouting Grades</h3>
            <span class="icon-starsolid yellow"></span>
        </div>"#;
        let mut rec = record();
        parse_ranking_sections(html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");
        assert_eq!(rec.juco_247_stars, NA);
        assert_eq!(rec.juco_composite_stars, NA);
    }

    #[test]
    fn national_rank_requires_matching_institution_group() {
        // Overall-national link on a shared page must not be attributed
        // to the JUCO group.
        let html = r#"<section class="rankings">
            <h3>247Sports Composite</h3>
            <ul class="ranks-list">
                <li><a href="/rankings/?InstitutionGroup=HighSchool"><strong>#7</strong></a></li>
            </ul>
        </section>"#;
        let mut rec = record();
        parse_ranking_sections(html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");
        assert_eq!(rec.juco_composite_national_rank, NA);
    }

    #[test]
    fn rank_falls_back_to_anchor_text_without_strong_node() {
        let html = r#"<section class="rankings">
            <h3>247Sports Composite</h3>
            <ul class="ranks-list">
                <li><a href="/rankings/?InstitutionGroup=JuniorCollege">#15</a></li>
            </ul>
        </section>"#;
        let mut rec = record();
        parse_ranking_sections(html, &mut rec, InstitutionLevel::Juco, "JuniorCollege");
        assert_eq!(rec.juco_composite_national_rank, "15");
    }
}
