//! Roster discovery: expand one season's ranking listing until it stops
//! growing, then collect the distinct player profile URLs in first-seen
//! order.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::browser::PageBrowser;

const BASE_URL: &str = "https://247sports.com";

/// Known markup variants for the listing's item container, tried in order.
const ITEM_SELECTORS: [&str; 3] = [
    "li.rankings-page__list-item",
    "li.recruit",
    ".rankings-page__container ul > li",
];

const MORE_SELECTOR: &str = "a.load-more, button.load-more, a.rankings-page__showmore";

const EXPAND_SETTLE_MS: u64 = 1_500;
const MAX_EXPAND_ROUNDS: u32 = 500;

/// Diagnostic mode: few expansion rounds, small roster, fast feedback.
const DIAGNOSTIC_EXPAND_ROUNDS: u32 = 3;
const DIAGNOSTIC_ROSTER_CAP: usize = 50;

pub struct RosterDiscovery<'a> {
    browser: &'a dyn PageBrowser,
    diagnostic_mode: bool,
}

impl<'a> RosterDiscovery<'a> {
    pub fn new(browser: &'a dyn PageBrowser, diagnostic_mode: bool) -> Self {
        Self {
            browser,
            diagnostic_mode,
        }
    }

    fn listing_url(year: i32) -> String {
        format!(
            "{BASE_URL}/Season/{year}-Football/CompositeRecruitRankings/?InstitutionGroup=JuniorCollege"
        )
    }

    /// Deduplicated profile URLs for one season, in discovery order.
    /// Discovery failure is a per-season signal, not a crash: an
    /// unreachable listing or unmatched container yields an empty roster.
    pub async fn discover(&self, year: i32) -> Vec<String> {
        let url = Self::listing_url(year);
        let max_rounds = if self.diagnostic_mode {
            DIAGNOSTIC_EXPAND_ROUNDS
        } else {
            MAX_EXPAND_ROUNDS
        };

        let combined_items = ITEM_SELECTORS.join(", ");
        let html = match self
            .browser
            .expand_and_content(&url, &combined_items, MORE_SELECTOR, max_rounds, EXPAND_SETTLE_MS)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                warn!(year, error = %e, "Failed to load season listing");
                return Vec::new();
            }
        };

        let mut urls = collect_profile_urls(&html);
        if self.diagnostic_mode && urls.len() > DIAGNOSTIC_ROSTER_CAP {
            urls.truncate(DIAGNOSTIC_ROSTER_CAP);
            info!(cap = DIAGNOSTIC_ROSTER_CAP, "Diagnostic mode: roster capped");
        }

        info!(year, players = urls.len(), "Roster discovered");
        urls
    }
}

/// Pull profile links out of an expanded listing page.
pub fn collect_profile_urls(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Some(item_selector) = ITEM_SELECTORS.iter().find_map(|variant| {
        let selector = Selector::parse(variant).expect("valid selector");
        let count = document.select(&selector).count();
        (count > 0).then(|| {
            info!(selector = *variant, count, "Listing container matched");
            selector
        })
    }) else {
        warn!("No listing item container matched any known selector");
        return Vec::new();
    };

    let name_link = Selector::parse("a.rankings-page__name-link, a.recruit").expect("valid selector");
    let any_player_link = Selector::parse(r#"a[href*="/player/"]"#).expect("valid selector");

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for item in document.select(&item_selector) {
        for link in item.select(&name_link) {
            if let Some(href) = link.value().attr("href") {
                push_profile_url(&mut seen, &mut urls, href);
            }
        }
    }

    // Older listing markup has no name-link class at all.
    if urls.is_empty() {
        for item in document.select(&item_selector) {
            for link in item.select(&any_player_link) {
                if let Some(href) = link.value().attr("href") {
                    push_profile_url(&mut seen, &mut urls, href);
                }
            }
        }
    }

    urls
}

fn push_profile_url(seen: &mut HashSet<String>, urls: &mut Vec<String>, href: &str) {
    if !href.contains("/player/") {
        return;
    }
    let absolute = if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        href.to_string()
    };
    if seen.insert(absolute.clone()) {
        urls.push(absolute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_and_absolutizes_profile_links() {
        let html = r#"<ul>
            <li class="rankings-page__list-item">
                <a class="rankings-page__name-link" href="/player/jo-smith-111/">Jo Smith</a>
            </li>
            <li class="rankings-page__list-item">
                <a class="rankings-page__name-link" href="https://247sports.com/player/max-jones-222/">Max Jones</a>
            </li>
        </ul>"#;

        let urls = collect_profile_urls(html);
        assert_eq!(
            urls,
            vec![
                "https://247sports.com/player/jo-smith-111/",
                "https://247sports.com/player/max-jones-222/",
            ]
        );
    }

    #[test]
    fn duplicate_hrefs_keep_first_position_only() {
        let html = r#"<ul>
            <li class="rankings-page__list-item">
                <a class="rankings-page__name-link" href="/player/jo-smith-111/">Jo Smith</a>
            </li>
            <li class="rankings-page__list-item">
                <a class="rankings-page__name-link" href="/player/max-jones-222/">Max Jones</a>
            </li>
            <li class="rankings-page__list-item">
                <a class="rankings-page__name-link" href="/player/jo-smith-111/">Jo Smith again</a>
            </li>
        </ul>"#;

        let urls = collect_profile_urls(html);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://247sports.com/player/jo-smith-111/");
    }

    #[test]
    fn falls_back_to_bare_player_links() {
        let html = r#"<ul>
            <li class="recruit">
                <a href="/player/jo-smith-111/">Jo Smith</a>
                <a href="/college/iowa-western/">Iowa Western</a>
            </li>
        </ul>"#;

        let urls = collect_profile_urls(html);
        assert_eq!(urls, vec!["https://247sports.com/player/jo-smith-111/"]);
    }

    #[test]
    fn unmatched_container_yields_empty_roster() {
        let html = "<div><p>Season not found</p></div>";
        assert!(collect_profile_urls(html).is_empty());
    }
}
