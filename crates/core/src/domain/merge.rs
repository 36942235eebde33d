use crate::domain::product::ProductKey;
use crate::domain::snapshot::{RateProduct, Snapshot, Trend, DEFAULT_UPDATE_FREQUENCY};
use crate::ingest::types::{ParsedRate, ParsedRates};
use crate::time::stamp::UpdateStamp;
use anyhow::{ensure, Context};

/// What changed for one product, as reported to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChange {
    pub key: ProductKey,
    pub label: String,
    pub rate: String,
    pub rate_value: f64,
    pub rate_change: f64,
    pub trend: Trend,
}

impl Trend {
    pub fn from_change(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Up
        } else if delta < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

/// `current - previous` rounded to three decimals.
pub fn round_rate_change(current: f64, previous: f64) -> f64 {
    let delta = ((current - previous) * 1000.0).round() / 1000.0;
    // -0.0 would otherwise be written as "-0.0".
    if delta == 0.0 {
        0.0
    } else {
        delta
    }
}

pub fn format_rate(value: f64) -> String {
    format!("{value}%")
}

pub fn format_apr(value: f64) -> String {
    format!("{value}% APR")
}

/// Overlays `rates` onto `prior`, keeping every product in its slot.
///
/// Entries the prior snapshot lacks are seeded from the product catalog;
/// entries past the tracked slots are left as they are.
pub fn apply_update(
    mut snapshot: Snapshot,
    rates: &ParsedRates,
    stamp: &UpdateStamp,
) -> anyhow::Result<(Snapshot, Vec<ProductChange>)> {
    let mut changes = Vec::with_capacity(ProductKey::ALL.len());

    for key in ProductKey::ALL {
        let rate = rates
            .get(key)
            .with_context(|| format!("no parsed rate for product {key}"))?;

        let (section, index) = key.slot();
        let entries = snapshot.section_mut(section);
        // Holds while `ProductKey::ALL` lists each section's slots in ascending order.
        ensure!(
            index <= entries.len(),
            "{} section has a gap before slot {index} ({key})",
            section.as_str()
        );

        let updated = update_product(entries.get(index).cloned(), key, rate);
        changes.push(ProductChange {
            key,
            label: updated.label.clone(),
            rate: updated.rate.clone(),
            rate_value: updated.rate_value,
            rate_change: updated.rate_change,
            trend: updated.trend,
        });

        if index < entries.len() {
            entries[index] = updated;
        } else {
            entries.push(updated);
        }
    }

    snapshot.last_updated = stamp.display_date.clone();
    snapshot.last_updated_time = Some(stamp.updated_at);
    if snapshot.update_frequency.trim().is_empty() {
        snapshot.update_frequency = DEFAULT_UPDATE_FREQUENCY.to_string();
    }

    Ok((snapshot, changes))
}

fn update_product(existing: Option<RateProduct>, key: ProductKey, rate: &ParsedRate) -> RateProduct {
    let profile = key.profile();
    let mut product = existing.unwrap_or_default();

    fill_blank(&mut product.label, profile.label);
    fill_blank(&mut product.tag, profile.tag);
    fill_blank(&mut product.tag_class, profile.tag_class);
    fill_blank(&mut product.sub, profile.sub);
    if product.term == 0 {
        product.term = profile.term;
    }
    if product.featured.is_none() {
        product.featured = profile.featured;
    }

    let previous = rate.previous_or_current();
    let rate_change = round_rate_change(rate.current, previous);

    product.rate = format_rate(rate.current);
    product.apr = format_apr(rate.apr);
    product.rate_value = rate.current;
    product.prev_rate_value = previous;
    product.rate_change = rate_change;
    product.trend = Trend::from_change(rate_change);
    product.avg30day = Some(carry_average(product.avg30day, rate.current));
    product.market_avg = Some(carry_average(product.market_avg, rate.current));

    product
}

fn fill_blank(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

// Averages are maintained elsewhere; zero counts as "never set".
fn carry_average(prior: Option<f64>, current: f64) -> f64 {
    prior
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Section;
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn stamp() -> UpdateStamp {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 13, 5, 0).unwrap();
        UpdateStamp::at(at, FixedOffset::east_opt(0).unwrap())
    }

    fn rates(values: &[(ProductKey, f64, f64, Option<f64>)]) -> ParsedRates {
        let products: BTreeMap<_, _> = values
            .iter()
            .map(|&(key, current, apr, previous)| {
                (
                    key,
                    ParsedRate {
                        current,
                        apr,
                        previous,
                    },
                )
            })
            .collect();
        ParsedRates { products }
    }

    fn typical_rates() -> ParsedRates {
        rates(&[
            (ProductKey::Fixed30, 6.625, 6.701, Some(6.75)),
            (ProductKey::Fixed15, 5.875, 5.99, Some(5.75)),
            (ProductKey::Fha30, 6.25, 6.9, Some(6.25)),
            (ProductKey::CashOut, 7.125, 7.3, Some(7.0)),
            (ProductKey::NoPoint, 6.99, 7.01, None),
        ])
    }

    fn prior_snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "lastUpdated": "Oct 17, 2026",
            "lastUpdatedTime": "2026-10-17T13:00:00.000Z",
            "updateFrequency": "Updated weekdays",
            "purchase": [
                { "label": "30 Year Fixed", "tag": "Conventional", "tagClass": "x", "sub": "0 Points",
                  "rate": "6.75%", "apr": "6.8% APR", "rateValue": 6.75, "term": 30,
                  "avg30day": 6.81, "marketAvg": 6.92 },
                { "label": "15-Yr Fixed", "rateValue": 5.75, "term": 15, "avg30day": 0 },
                { "label": "30-Yr FHA", "rateValue": 6.25, "term": 30 }
            ],
            "refi": [
                { "label": "Cash-Out", "rateValue": 7.0, "term": 30, "marketAvg": 7.2 },
                { "label": "No-Point Refi", "featured": true, "rateValue": 6.99, "term": 30 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn rate_change_rounds_to_three_decimals() {
        assert_eq!(round_rate_change(6.625, 6.75), -0.125);
        assert_eq!(round_rate_change(5.875, 5.75), 0.125);
        assert_eq!(round_rate_change(6.1234, 6.0), 0.123);
        assert_eq!(round_rate_change(0.3, 0.1), 0.2);
    }

    #[test]
    fn rate_change_never_negative_zero() {
        let delta = round_rate_change(6.0, 6.0004);
        assert_eq!(delta, 0.0);
        assert!(delta.is_sign_positive());
    }

    #[test]
    fn trend_follows_sign_of_rounded_change() {
        let values = [5.0, 5.0004, 5.125, 6.75, 6.7504, 7.0];
        for &current in &values {
            for &previous in &values {
                let change = round_rate_change(current, previous);
                let trend = Trend::from_change(change);
                assert_eq!(trend == Trend::Up, change > 0.0, "{current} vs {previous}");
                assert_eq!(trend == Trend::Down, change < 0.0, "{current} vs {previous}");
                assert_eq!(trend == Trend::Stable, change == 0.0, "{current} vs {previous}");
            }
        }
    }

    #[test]
    fn display_strings() {
        assert_eq!(format_rate(6.625), "6.625%");
        assert_eq!(format_rate(6.99), "6.99%");
        assert_eq!(format_rate(7.0), "7%");
        assert_eq!(format_apr(6.701), "6.701% APR");
    }

    #[test]
    fn thirty_year_drop_is_down() {
        let (snapshot, changes) = apply_update(prior_snapshot(), &typical_rates(), &stamp()).unwrap();

        let p = snapshot.product(ProductKey::Fixed30).unwrap();
        assert_eq!(p.rate_change, -0.125);
        assert_eq!(p.trend, Trend::Down);
        assert_eq!(p.rate, "6.625%");
        assert_eq!(p.apr, "6.701% APR");
        assert_eq!(p.prev_rate_value, 6.75);

        assert_eq!(changes[0].key, ProductKey::Fixed30);
        assert_eq!(changes[0].trend, Trend::Down);
        assert_eq!(changes[1].trend, Trend::Up);
        assert_eq!(changes[2].trend, Trend::Stable);
    }

    #[test]
    fn missing_previous_is_stable() {
        let (snapshot, _) = apply_update(prior_snapshot(), &typical_rates(), &stamp()).unwrap();
        let p = snapshot.product(ProductKey::NoPoint).unwrap();
        assert_eq!(p.rate_value, 6.99);
        assert_eq!(p.prev_rate_value, 6.99);
        assert_eq!(p.rate_change, 0.0);
        assert_eq!(p.trend, Trend::Stable);
    }

    #[test]
    fn unchanged_rates_are_all_stable_but_timestamps_advance() {
        let same = rates(
            &ProductKey::ALL
                .iter()
                .map(|&k| (k, 6.5, 6.6, Some(6.5)))
                .collect::<Vec<_>>(),
        );
        let prior = prior_snapshot();
        let (snapshot, changes) = apply_update(prior.clone(), &same, &stamp()).unwrap();

        assert!(changes.iter().all(|c| c.rate_change == 0.0 && c.trend == Trend::Stable));
        assert_eq!(snapshot.last_updated, "Oct 18, 2026");
        assert_ne!(snapshot.last_updated_time, prior.last_updated_time);
        assert_eq!(
            snapshot.last_updated_time,
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 13, 5, 0).unwrap())
        );
    }

    #[test]
    fn averages_carry_over_or_default_to_current() {
        let (snapshot, _) = apply_update(prior_snapshot(), &typical_rates(), &stamp()).unwrap();

        let fixed30 = snapshot.product(ProductKey::Fixed30).unwrap();
        assert_eq!(fixed30.avg30day, Some(6.81));
        assert_eq!(fixed30.market_avg, Some(6.92));

        // Zero means never set.
        let fixed15 = snapshot.product(ProductKey::Fixed15).unwrap();
        assert_eq!(fixed15.avg30day, Some(5.875));
        assert_eq!(fixed15.market_avg, Some(5.875));

        let cash_out = snapshot.product(ProductKey::CashOut).unwrap();
        assert_eq!(cash_out.avg30day, Some(7.125));
        assert_eq!(cash_out.market_avg, Some(7.2));
    }

    #[test]
    fn identity_and_order_are_preserved() {
        let prior = prior_snapshot();
        let (snapshot, _) = apply_update(prior.clone(), &typical_rates(), &stamp()).unwrap();

        assert_eq!(snapshot.purchase.len(), 3);
        assert_eq!(snapshot.refi.len(), 2);
        for section in [Section::Purchase, Section::Refi] {
            let before: Vec<_> = prior.section(section).iter().map(|p| &p.label).collect();
            let after: Vec<_> = snapshot.section(section).iter().map(|p| &p.label).collect();
            assert_eq!(before, after);
        }

        let fixed30 = snapshot.product(ProductKey::Fixed30).unwrap();
        assert_eq!(fixed30.label, "30 Year Fixed");
        assert_eq!(fixed30.tag_class, "x");
        assert_eq!(snapshot.update_frequency, "Updated weekdays");
    }

    #[test]
    fn blank_identity_fields_are_filled_from_catalog() {
        let (snapshot, _) = apply_update(prior_snapshot(), &typical_rates(), &stamp()).unwrap();
        let fha = snapshot.product(ProductKey::Fha30).unwrap();
        assert_eq!(fha.tag, "Govt.");
        assert_eq!(fha.sub, "Low Down Pmt");
    }

    #[test]
    fn empty_snapshot_is_seeded_from_catalog() {
        let (snapshot, changes) =
            apply_update(Snapshot::default(), &typical_rates(), &stamp()).unwrap();

        assert_eq!(snapshot.purchase.len(), 3);
        assert_eq!(snapshot.refi.len(), 2);
        assert_eq!(snapshot.update_frequency, DEFAULT_UPDATE_FREQUENCY);

        let labels: Vec<_> = changes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["30-Yr Fixed", "15-Yr Fixed", "30-Yr FHA", "Cash-Out", "No-Point Refi"]
        );
        let no_point = snapshot.product(ProductKey::NoPoint).unwrap();
        assert_eq!(no_point.featured, Some(true));
        assert_eq!(no_point.term, 30);
        assert_eq!(snapshot.product(ProductKey::Fixed15).unwrap().term, 15);
    }

    #[test]
    fn untracked_trailing_entries_are_untouched() {
        let mut prior = prior_snapshot();
        let extra: RateProduct =
            serde_json::from_value(json!({ "label": "Jumbo", "rateValue": 7.5, "trend": "up" }))
                .unwrap();
        prior.purchase.push(extra.clone());

        let (snapshot, _) = apply_update(prior, &typical_rates(), &stamp()).unwrap();
        assert_eq!(snapshot.purchase.len(), 4);
        assert_eq!(snapshot.purchase[3], extra);
    }

    #[test]
    fn missing_parsed_rate_is_an_error() {
        let mut partial = typical_rates();
        partial.products.remove(&ProductKey::CashOut);
        assert!(apply_update(prior_snapshot(), &partial, &stamp()).is_err());
    }
}
