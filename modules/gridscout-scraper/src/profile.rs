//! Profile extraction: one fully-populated `PlayerRecord` per profile
//! URL. Never raises past its boundary — any failure leaves the fields
//! collected so far intact and the rest at the sentinel.
//!
//! All HTML parsing is synchronous and confined to this module's helper
//! functions; the async layer only moves rendered HTML strings around,
//! which keeps extraction futures `Send` and the parsers testable
//! without a browser.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::browser::PageBrowser;
use crate::rankings::parse_ranking_sections;
use crate::record::{InstitutionLevel, PlayerRecord, NA};
use crate::text::{clean_text, normalize_height};
use crate::timeline::{resolve, TimelineOutcome};

const BASE_URL: &str = "https://247sports.com";

const TIMELINE_ITEM_SELECTORS: &str =
    ".timeline-item, .timeline li, ul.timeline > li, .vertical-timeline-element-content";
const DEEP_TIMELINE_ITEM_SELECTOR: &str = "ul.timeline-event-index_lst li";
const TIMELINE_NEXT_SELECTOR: &str = "li.next_itm a";
const MAX_TIMELINE_PAGES: u32 = 10;
const TIMELINE_SETTLE_MS: u64 = 1_000;

const VITALS_SELECTORS: &str = ".metrics-list li, .details li, ul.vitals li";

static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Pos|Position)[:\s]*(.*)").expect("valid regex"));
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Height[:\s]*(.*)").expect("valid regex"));
static WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Weight[:\s]*(.*)").expect("valid regex"));
static JUCO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Junior College[:\s]*(.*)").expect("valid regex"));
static HOMETOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Home Town|Hometown|City)[:\s]*(.*)").expect("valid regex"));
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Class[:\s]*(.*)").expect("valid regex"));

fn sel(selectors: &str) -> Selector {
    Selector::parse(selectors).expect("valid selector")
}

pub struct ProfileExtractor<'a> {
    browser: &'a dyn PageBrowser,
    recruiting_year: i32,
    deep_dive_cutoff: usize,
}

impl<'a> ProfileExtractor<'a> {
    pub fn new(browser: &'a dyn PageBrowser, recruiting_year: i32, deep_dive_cutoff: usize) -> Self {
        Self {
            browser,
            recruiting_year,
            deep_dive_cutoff,
        }
    }

    /// Extract one player. `ordinal` is the 1-based roster position and
    /// decides whether the timeline deep dive runs.
    pub async fn extract(&self, url: &str, ordinal: usize) -> PlayerRecord {
        let mut record = PlayerRecord::new(url, self.recruiting_year);
        if let Err(e) = self.extract_into(&mut record, url, ordinal).await {
            warn!(url, error = %e, "Profile extraction degraded to partial record");
        }
        record
    }

    async fn extract_into(
        &self,
        record: &mut PlayerRecord,
        url: &str,
        ordinal: usize,
    ) -> Result<()> {
        let mut html = self
            .browser
            .content(url, Some("body"))
            .await
            .context("Failed to load profile page")?;

        // Some profile variants hide the recruiting view behind a tab
        // link; follow it when present.
        if let Some(tab_url) = find_recruiting_tab(&html) {
            debug!(url, tab_url = tab_url.as_str(), "Following recruiting-profile tab");
            match self.browser.content(&tab_url, Some("body")).await {
                Ok(tab_html) => html = tab_html,
                Err(e) => warn!(url, error = %e, "Recruiting tab load failed, using base page"),
            }
        }

        let scan = scan_juco_page(&html, record, self.recruiting_year);

        let mut outcome = scan.outcome;
        if ordinal <= self.deep_dive_cutoff && !outcome.commitment_resolved() {
            if let Some(ref timeline_url) = scan.timeline_link {
                self.deep_dive(&mut outcome, timeline_url).await;
            }
        }
        outcome.merge_into(record);

        // HS cross-reference is independently fail-soft: losing it must
        // not discard the JUCO data already on the record.
        if let Some((hs_url, hs_name)) = scan.hs_profile {
            record.high_school = hs_name;
            if let Err(e) = self.extract_high_school(record, &hs_url).await {
                warn!(url, hs_url = hs_url.as_str(), error = %e, "HS cross-reference failed");
            }
        }

        if record.signed_team == NA {
            if let Some(team) = scan.banner_team {
                record.signed_team = team;
            }
        }

        Ok(())
    }

    /// Re-run tier/date extraction over the paginated full-timeline
    /// index. Scanning stops the instant a commitment is accepted.
    async fn deep_dive(&self, outcome: &mut TimelineOutcome, timeline_url: &str) {
        let pages = match self
            .browser
            .paged_content(
                timeline_url,
                TIMELINE_NEXT_SELECTOR,
                MAX_TIMELINE_PAGES,
                TIMELINE_SETTLE_MS,
            )
            .await
        {
            Ok(pages) => pages,
            Err(e) => {
                warn!(timeline_url, error = %e, "Full timeline fetch failed");
                return;
            }
        };

        'pages: for page in &pages {
            for item in deep_timeline_items(page) {
                outcome.observe(&item, self.recruiting_year);
                if outcome.commitment_resolved() {
                    break 'pages;
                }
            }
        }
    }

    /// Steps 2–3 of extraction repeated against the cross-referenced
    /// high-school profile, mapped to the HS field group.
    async fn extract_high_school(&self, record: &mut PlayerRecord, hs_url: &str) -> Result<()> {
        let html = self
            .browser
            .content(hs_url, Some("body"))
            .await
            .context("Failed to load HS profile page")?;

        if let Some(class_year) = hs_class_year(&html) {
            record.hs_class_year = class_year;
        }
        parse_ranking_sections(&html, record, InstitutionLevel::HighSchool, "HighSchool");
        Ok(())
    }
}

/// Everything the async layer needs from the JUCO page, produced by one
/// synchronous parse.
struct JucoPageScan {
    outcome: TimelineOutcome,
    timeline_link: Option<String>,
    hs_profile: Option<(String, String)>,
    banner_team: Option<String>,
}

fn scan_juco_page(html: &str, record: &mut PlayerRecord, recruiting_year: i32) -> JucoPageScan {
    let document = Html::parse_document(html);

    if let Some(name) = document.select(&sel(".name, h1.name")).next() {
        record.player_name = clean_text(&name.text().collect::<String>());
    }
    parse_vitals(&document, record);

    // The class label on the page is whatever season the profile was
    // last touched for; the recruiting year is authoritative.
    record.class = recruiting_year.to_string();

    parse_ranking_sections(html, record, InstitutionLevel::Juco, "JuniorCollege");

    let items: Vec<String> = document
        .select(&sel(TIMELINE_ITEM_SELECTORS))
        .map(|item| item.text().collect::<String>())
        .collect();
    let outcome = resolve(items.iter().map(String::as_str), recruiting_year);

    JucoPageScan {
        outcome,
        timeline_link: document
            .select(&sel(r#"a[href*="TimelineEvents"]"#))
            .next()
            .and_then(|link| link.value().attr("href"))
            .map(absolutize),
        hs_profile: find_hs_profile(&document),
        banner_team: banner_team(&document),
    }
}

fn parse_vitals(document: &Html, record: &mut PlayerRecord) {
    for item in document.select(&sel(VITALS_SELECTORS)) {
        let text = clean_text(&item.text().collect::<String>());

        if text.contains("Pos") || text.contains("Position") {
            if let Some(value) = captured(&POSITION_RE, &text) {
                record.position = value;
            }
        } else if text.contains("Height") {
            if let Some(value) = captured(&HEIGHT_RE, &text) {
                record.height = normalize_height(&value);
            }
        } else if text.contains("Weight") {
            if let Some(value) = captured(&WEIGHT_RE, &text) {
                record.weight = value;
            }
        } else if text.contains("Junior College") {
            if let Some(value) = captured(&JUCO_RE, &text) {
                record.junior_college = value;
            }
        } else if text.contains("Home Town") || text.contains("Hometown") || text.contains("City") {
            if let Some(value) = captured(&HOMETOWN_RE, &text) {
                record.city_st = value;
            }
        } else if text.contains("Class") {
            if let Some(value) = captured(&CLASS_RE, &text) {
                record.class = value;
            }
        }
    }
}

fn captured(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| clean_text(&c[1]))
}

/// The institution list holds one anchor per institution the player has
/// been profiled under; the first one carrying the "(HS)" marker is
/// taken as the most recently associated high school. Returns
/// (absolute URL, school name).
fn find_hs_profile(document: &Html) -> Option<(String, String)> {
    for link in document.select(&sel("a")) {
        let text = link.text().collect::<String>();
        if !text.contains("(HS)") {
            continue;
        }
        let href = link.value().attr("href")?;
        if href.is_empty() {
            return None;
        }
        let name = clean_text(&text.replace("(HS)", ""));
        return Some((absolutize(href), name));
    }
    None
}

/// Commitment-banner fallback for the signed team, excluding the known
/// non-team placeholder words.
fn banner_team(document: &Html) -> Option<String> {
    let banner = document.select(&sel(".commit-banner, .commitment")).next()?;
    let team_elem = banner.select(&sel("span, a")).next()?;
    let team = clean_text(&team_elem.text().collect::<String>());
    let lower = team.to_lowercase();
    if team == NA || ["committed", "commitment", "signed"].contains(&lower.as_str()) {
        return None;
    }
    Some(team)
}

fn find_recruiting_tab(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for link in document.select(&sel("a")) {
        let text = link.text().collect::<String>();
        if text.contains("View recruiting profile") || text.contains("Recruiting Profile") {
            return link.value().attr("href").map(absolutize);
        }
    }
    None
}

fn hs_class_year(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for item in document.select(&sel(VITALS_SELECTORS)) {
        let text = clean_text(&item.text().collect::<String>());
        if text.contains("Class") {
            if let Some(value) = captured(&CLASS_RE, &text) {
                return Some(value);
            }
        }
    }
    None
}

fn deep_timeline_items(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&sel(DEEP_TIMELINE_ITEM_SELECTOR))
        .map(|item| item.text().collect::<String>())
        .collect()
}

fn absolutize(href: &str) -> String {
    if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PlayerRecord {
        PlayerRecord::new("https://247sports.com/player/jo-smith-12345/", 2024)
    }

    #[test]
    fn vitals_end_to_end() {
        let html = r#"<ul class="vitals">
            <li>Pos: DL</li>
            <li>Height: 6-3</li>
            <li>Weight: 285</li>
            <li>Junior College: Iowa Western</li>
            <li>Home Town: Council Bluffs, IA</li>
        </ul>"#;
        let document = Html::parse_document(html);
        let mut rec = record();
        parse_vitals(&document, &mut rec);

        assert_eq!(rec.position, "DL");
        assert_eq!(rec.height, "'6-3");
        assert_eq!(rec.weight, "285");
        assert_eq!(rec.junior_college, "Iowa Western");
        assert_eq!(rec.city_st, "Council Bluffs, IA");
    }

    #[test]
    fn vitals_match_by_label_not_position() {
        // Reordered list still lands every field.
        let html = r#"<div class="details">
            <ul>
                <li>Weight: 285</li>
                <li>Position: DL</li>
            </ul>
        </div>"#;
        let document = Html::parse_document(html);
        let mut rec = record();
        parse_vitals(&document, &mut rec);

        assert_eq!(rec.position, "DL");
        assert_eq!(rec.weight, "285");
    }

    #[test]
    fn first_hs_marker_anchor_wins() {
        let html = r#"<div class="institution-block">
            <ul class="institution-list">
                <li><a href="/college/iowa-western/">Iowa Western (JC)</a></li>
                <li><a href="/player/jo-smith-12345/high-school/">Lincoln East (HS)</a></li>
                <li><a href="/player/jo-smith-12345/other-hs/">Older School (HS)</a></li>
            </ul>
        </div>"#;
        let document = Html::parse_document(html);
        let (url, name) = find_hs_profile(&document).unwrap();

        assert_eq!(url, "https://247sports.com/player/jo-smith-12345/high-school/");
        assert_eq!(name, "Lincoln East");
    }

    #[test]
    fn banner_placeholder_words_are_not_teams() {
        let committed = Html::parse_document(
            r#"<div class="commit-banner"><span>Committed</span></div>"#,
        );
        assert!(banner_team(&committed).is_none());

        let team = Html::parse_document(
            r#"<div class="commit-banner"><span>Iowa Western</span></div>"#,
        );
        assert_eq!(banner_team(&team).as_deref(), Some("Iowa Western"));
    }

    #[test]
    fn scan_fills_record_and_collects_links() {
        let html = r#"<html><body>
            <h1 class="name">Jo Smith</h1>
            <ul class="vitals">
                <li>Pos: DL</li>
                <li>Height: 6-3</li>
                <li>Weight: 285</li>
            </ul>
            <section class="rankings">
                <h3>247Sports Composite</h3>
                <span class="icon-starsolid yellow"></span>
                <span class="icon-starsolid yellow"></span>
                <span class="icon-starsolid yellow"></span>
                <span class="icon-starsolid yellow"></span>
                <div class="rank-block">89.5 Rating</div>
            </section>
            <ul class="timeline">
                <li>Commits to Iowa Western on Jun 5, 2024</li>
            </ul>
            <a href="/player/jo-smith-12345/TimelineEvents/">See all</a>
        </body></html>"#;

        let mut rec = record();
        let scan = scan_juco_page(html, &mut rec, 2024);

        assert_eq!(rec.player_name, "Jo Smith");
        assert_eq!(rec.position, "DL");
        assert_eq!(rec.height, "'6-3");
        assert_eq!(rec.class, "2024");
        assert_eq!(rec.juco_composite_stars, "4");
        assert_eq!(rec.juco_composite_rating, "89.5");
        assert!(scan.outcome.commitment_resolved());
        assert_eq!(
            scan.timeline_link.as_deref(),
            Some("https://247sports.com/player/jo-smith-12345/TimelineEvents/")
        );
        assert!(scan.hs_profile.is_none());
    }
}
