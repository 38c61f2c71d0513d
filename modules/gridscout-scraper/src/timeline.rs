//! Timeline resolution: picks one commitment/signing event and one draft
//! event out of an unordered set of rendered timeline fragments.
//!
//! Commitment language ("commits to") is a stronger signal of the actual
//! decision than a generic "signed" mention, which shows up in unrelated
//! timeline noise. Each item is classified into a tier and a candidate
//! only replaces the current resolution when its tier is strictly higher,
//! so the final answer is independent of scan order apart from first-seen
//! tie-breaking among equal tiers.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{PlayerRecord, NA};
use crate::text::{before_class_cutoff, clean_text, normalize_date};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]+\s+\d{1,2},\s+\d{4}|\d{1,2}/\d{1,2}/\d{4})").expect("valid regex")
});

static COMMIT_TEAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:to|with|at|commits to)\s+([A-Z][^,.]+)").expect("valid regex"));

static DRAFT_TEAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Draft[:\s]+)?([A-Z][A-Za-z0-9\s\.]+?)\s+(?:select|pick)")
        .expect("valid regex")
});

static DRAFT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Draft\s*").expect("valid regex"));

/// Priority tier of a timeline item. Commitment always beats signing;
/// anything else is noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    None,
    Signing,
    Commitment,
}

impl Tier {
    pub fn classify(text: &str) -> Tier {
        let lower = text.to_lowercase();
        if lower.contains("commitment") || lower.contains("committed") || lower.contains("commits to")
        {
            Tier::Commitment
        } else if lower.contains("signed") || lower.contains("signing") {
            Tier::Signing
        } else {
            Tier::None
        }
    }
}

/// Accumulated resolution state. Built by a pure scan over item texts and
/// merged into the output record only after resolution completes.
#[derive(Debug, Clone, Default)]
pub struct TimelineOutcome {
    pub signed_date: Option<String>,
    pub signed_team: Option<String>,
    pub draft_date: Option<String>,
    pub draft_team: Option<String>,
    tier: Option<Tier>,
}

impl TimelineOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// A commitment was accepted; nothing can outrank it, so extended
    /// scans (deep-dive pagination) may stop.
    pub fn commitment_resolved(&self) -> bool {
        self.tier == Some(Tier::Commitment)
    }

    /// Feed one timeline item into the resolution.
    pub fn observe(&mut self, item_text: &str, recruiting_year: i32) {
        let text = clean_text(item_text);

        if text.to_lowercase().contains("draft") {
            self.observe_draft(&text);
        }

        let tier = Tier::classify(&text);
        if tier == Tier::None {
            return;
        }

        let Some(date) = DATE_RE.captures(&text).map(|c| normalize_date(&c[1])) else {
            return;
        };
        if !before_class_cutoff(&date, recruiting_year) {
            return;
        }

        // Strictly-greater comparison: equal-tier candidates never
        // replace the first one seen.
        if self.tier.is_some_and(|current| tier <= current) {
            return;
        }

        self.signed_date = Some(date);
        self.tier = Some(tier);
        if let Some(team) = COMMIT_TEAM_RE.captures(&text) {
            self.signed_team = Some(clean_text(&team[1]));
        }
    }

    /// Draft date and team are each set at most once; first match wins.
    fn observe_draft(&mut self, text: &str) {
        if self.draft_date.is_none() {
            if let Some(date) = DATE_RE.captures(text) {
                self.draft_date = Some(normalize_date(&date[1]));
            }
        }
        if self.draft_team.is_none() {
            if let Some(team) = DRAFT_TEAM_RE.captures(text) {
                let team = clean_text(DRAFT_PREFIX_RE.replace(&clean_text(&team[1]), "").trim());
                if team != NA && !team.eq_ignore_ascii_case("draft") {
                    self.draft_team = Some(team);
                }
            }
        }
    }

    /// Copy resolved fields onto the record. Unresolved fields leave the
    /// record's sentinels untouched.
    pub fn merge_into(&self, record: &mut PlayerRecord) {
        if let Some(ref date) = self.signed_date {
            record.signed_date = date.clone();
        }
        if let Some(ref team) = self.signed_team {
            record.signed_team = team.clone();
        }
        if let Some(ref date) = self.draft_date {
            record.draft_date = date.clone();
        }
        if let Some(ref team) = self.draft_team {
            record.draft_team = team.clone();
        }
    }
}

/// Resolve a full item sequence in one pass.
pub fn resolve<'a, I>(items: I, recruiting_year: i32) -> TimelineOutcome
where
    I: IntoIterator<Item = &'a str>,
{
    let mut outcome = TimelineOutcome::new();
    for item in items {
        outcome.observe(item, recruiting_year);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2024;

    #[test]
    fn commitment_beats_signing_regardless_of_order() {
        let signing = "Signed with Hutchinson CC on 12/20/2023";
        let commit = "Commits to Iowa Western on Jun 5, 2024";

        let forward = resolve([signing, commit], YEAR);
        let backward = resolve([commit, signing], YEAR);

        for outcome in [forward, backward] {
            assert_eq!(outcome.signed_date.as_deref(), Some("06/05/2024"));
            assert_eq!(outcome.signed_team.as_deref(), Some("Iowa Western on Jun 5"));
            assert!(outcome.commitment_resolved());
        }
    }

    #[test]
    fn equal_tier_first_seen_wins() {
        let first = "Signed with Garden City on 12/18/2023";
        let second = "Signing day at Snow College on 02/07/2024";

        let outcome = resolve([first, second], YEAR);
        assert_eq!(outcome.signed_date.as_deref(), Some("12/18/2023"));
        assert_eq!(outcome.signed_team.as_deref(), Some("Garden City on 12/18/2023"));
    }

    #[test]
    fn commitment_is_never_overwritten() {
        let mut outcome = TimelineOutcome::new();
        outcome.observe("Commits to Butler CC on 01/15/2024", YEAR);
        outcome.observe("Commitment announced: to Coffeyville on 03/01/2024", YEAR);
        outcome.observe("Signed with Dodge City on 02/01/2024", YEAR);

        assert_eq!(outcome.signed_date.as_deref(), Some("01/15/2024"));
        assert!(outcome.commitment_resolved());
    }

    #[test]
    fn dates_on_or_after_cutoff_are_rejected_at_any_tier() {
        let outcome = resolve(
            [
                "Commits to Iowa Western on 09/01/2024",
                "Signed with Hutchinson on 10/05/2024",
            ],
            YEAR,
        );
        assert!(outcome.signed_date.is_none());
        assert!(outcome.signed_team.is_none());
    }

    #[test]
    fn items_without_dates_are_skipped() {
        let outcome = resolve(["Commits to Iowa Western"], YEAR);
        assert!(outcome.signed_date.is_none());
    }

    #[test]
    fn unclassified_items_are_noise() {
        let outcome = resolve(["Visited campus on 05/01/2024", "Ranked #3 on 04/02/2024"], YEAR);
        assert!(outcome.signed_date.is_none());
        assert!(outcome.draft_date.is_none());
    }

    #[test]
    fn draft_date_and_team_set_once() {
        let outcome = resolve(
            [
                "MLB Draft: Kansas City Royals select RHP on Jul 14, 2024",
                "Draft update: Texas Rangers pick again on Jul 15, 2024",
            ],
            YEAR,
        );
        assert_eq!(outcome.draft_date.as_deref(), Some("07/14/2024"));
        assert_eq!(outcome.draft_team.as_deref(), Some("Kansas City Royals"));
    }

    #[test]
    fn bare_draft_label_is_not_a_team() {
        let mut outcome = TimelineOutcome::new();
        outcome.observe_draft("Draft select happens 07/14/2024");
        assert!(outcome.draft_team.is_none());
    }

    #[test]
    fn merge_preserves_sentinels_for_unresolved_fields() {
        let mut record = PlayerRecord::new("https://247sports.com/player/a-b-1/", YEAR);
        let outcome = resolve(["Signed with Garden City on 12/18/2023"], YEAR);
        outcome.merge_into(&mut record);

        assert_eq!(record.signed_date, "12/18/2023");
        assert_eq!(record.draft_date, NA);
        assert_eq!(record.draft_team, NA);
    }
}
