use crate::domain::product::LoanProduct;
use crate::domain::profile::{map_loan_type, Qualification, UserProfile};
use crate::domain::recommendation::TopProducts;
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

const MATCH_LIMIT: i64 = 5;
const POOL_LIMIT: i64 = 20;
const FALLBACK_LIMIT: i64 = 6;
const ALTERNATE_SLOTS: usize = 5;

/// Read access to the loan catalog, ranked by APR ascending. Implemented over
/// Postgres in `storage::products` and over an in-memory vector in tests.
#[async_trait::async_trait]
pub trait CatalogReader: Send + Sync {
    /// Products whose loan type contains `category` (case-insensitive).
    async fn by_category(&self, category: &str, limit: i64) -> anyhow::Result<Vec<LoanProduct>>;

    /// Products the given thresholds qualify for, optionally restricted to a
    /// category. Unknown user values never filter; a product without an
    /// income requirement qualifies for any income.
    async fn qualified(
        &self,
        category: Option<&str>,
        qualification: Qualification,
        limit: i64,
    ) -> anyhow::Result<Vec<LoanProduct>>;

    /// The catalog with no filters applied.
    async fn top_by_apr(&self, limit: i64) -> anyhow::Result<Vec<LoanProduct>>;
}

/// Composes one best-match product plus up to five alternates for a profile.
///
/// The attempts are ordered so that a declared loan-type preference is never
/// suppressed by credit/income thresholds: the category probe runs without
/// qualification filters, and qualification only decides ranking among
/// category matches. Degrades through a qualified pool and finally the raw
/// catalog; an empty catalog yields `{None, []}` rather than an error.
pub async fn top_products(
    catalog: &dyn CatalogReader,
    profile: Option<&UserProfile>,
) -> anyhow::Result<TopProducts> {
    let qualification = Qualification::from_profile(profile);
    let category = profile
        .and_then(|p| p.loan_type.as_deref())
        .map(map_loan_type);

    // Cheapest match the user's declared category has to offer, regardless of
    // whether they qualify for it.
    let mut category_best: Option<LoanProduct> = None;
    if let Some(cat) = category.as_deref() {
        category_best = catalog.by_category(cat, 1).await?.into_iter().next();
    }

    // Category matches that also clear the credit/income thresholds.
    let mut matching: Vec<LoanProduct> = Vec::new();
    if let Some(cat) = category.as_deref() {
        matching = catalog
            .qualified(Some(cat), qualification, MATCH_LIMIT)
            .await?;
    }
    if let Some(best) = &category_best {
        if !matching.iter().any(|p| p.id == best.id) {
            matching.insert(0, best.clone());
            matching.truncate(MATCH_LIMIT as usize);
        }
    }

    // Everything the profile qualifies for, category aside.
    let pool = catalog.qualified(None, qualification, POOL_LIMIT).await?;

    let matched_ids: HashSet<Uuid> = matching.iter().map(|p| p.id).collect();
    let mut alternates: Vec<LoanProduct> = pool
        .iter()
        .filter(|p| !matched_ids.contains(&p.id))
        .take(ALTERNATE_SLOTS)
        .cloned()
        .collect();

    // Not enough qualified alternates; top up from the unfiltered catalog,
    // preserving APR order.
    if alternates.len() < ALTERNATE_SLOTS {
        let unfiltered = catalog.top_by_apr(POOL_LIMIT).await?;
        let mut used: HashSet<Uuid> = matched_ids.clone();
        used.extend(alternates.iter().map(|p| p.id));
        let missing = ALTERNATE_SLOTS - alternates.len();
        alternates.extend(
            unfiltered
                .into_iter()
                .filter(|p| !used.contains(&p.id))
                .take(missing),
        );
    }

    let mut best_match: Option<LoanProduct> = None;
    if !matching.is_empty() {
        // The prepended category probe may carry a higher APR than the
        // qualified matches, so re-rank before picking the head.
        let mut ranked = matching;
        ranked.sort_by(|a, b| a.apr.partial_cmp(&b.apr).unwrap_or(Ordering::Equal));
        best_match = ranked.into_iter().next();
    } else if category_best.is_some() {
        best_match = category_best;
    }

    // No category signal at all: promote the qualified pool's head, pulling it
    // back out of the alternates and backfilling the freed slot.
    if best_match.is_none() {
        if let Some(top) = pool.first().cloned() {
            if let Some(idx) = alternates.iter().position(|p| p.id == top.id) {
                alternates.remove(idx);
            }
            let used: HashSet<Uuid> = alternates.iter().map(|p| p.id).collect();
            if let Some(extra) = pool
                .iter()
                .find(|p| p.id != top.id && !used.contains(&p.id))
            {
                alternates.push(extra.clone());
            }
            best_match = Some(top);
        }
    }

    // Last resort: raw catalog, head as best match, tail as alternates.
    if best_match.is_none() && alternates.is_empty() {
        let fallback = catalog.top_by_apr(FALLBACK_LIMIT).await?;
        if !fallback.is_empty() {
            let mut it = fallback.into_iter();
            best_match = it.next();
            alternates = it.collect();
        }
    }

    alternates.truncate(ALTERNATE_SLOTS);
    Ok(TopProducts {
        best_match,
        top5: alternates,
    })
}
