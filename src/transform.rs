use crate::core::{CleanRecord, Customer, Result, StreamEvent, Transform};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// Per-customer churn flags: true when any of the customer's events
/// stopped the subscription. Customers absent from the map are treated
/// as not churned.
pub type ChurnMap = HashMap<i64, bool>;

pub fn churn_map(events: &[StreamEvent]) -> ChurnMap {
    let mut churned = ChurnMap::new();
    for event in events {
        let entry = churned.entry(event.customer_id).or_insert(false);
        *entry = *entry || event.stopped();
    }
    churned
}

/// Aggregates derived from one customer's stream events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub num_streams: u64,
    pub dominant_item: Option<i64>,
}

pub fn stream_stats(events: &[StreamEvent]) -> HashMap<i64, StreamStats> {
    let mut counts: HashMap<i64, u64> = HashMap::new();
    let mut votes: HashMap<i64, HashMap<i64, u64>> = HashMap::new();
    for event in events {
        *counts.entry(event.customer_id).or_default() += 1;
        if let Some(item) = event.invoice_item_id {
            *votes
                .entry(event.customer_id)
                .or_default()
                .entry(item)
                .or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(customer_id, num_streams)| {
            let dominant_item = votes.get(&customer_id).and_then(dominant_vote);
            (
                customer_id,
                StreamStats {
                    num_streams,
                    dominant_item,
                },
            )
        })
        .collect()
}

/// Most frequent invoice item; ties break to the lowest identifier so the
/// result does not depend on hash iteration order.
fn dominant_vote(votes: &HashMap<i64, u64>) -> Option<i64> {
    votes
        .iter()
        .max_by(|(id_a, n_a), (id_b, n_b)| n_a.cmp(n_b).then(id_b.cmp(id_a)))
        .map(|(id, _)| *id)
}

/// Parses a date of birth in two-digit-year form. Unparsable values
/// coerce to None instead of failing the run.
pub fn parse_dob(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw.trim(), "%m/%d/%y").ok()?;
    if parsed > today {
        // two-digit years roll into the next century; nobody is born in
        // the future, so shift back 100 years
        parsed.with_year(parsed.year() - 100)
    } else {
        Some(parsed)
    }
}

/// Whole years between birth and today, one less if the birthday has not
/// yet occurred this year.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = i64::from(today.year() - dob.year());
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Builds the clean analytical row for each customer with stream
/// activity; customers without retained events produce no output.
pub struct CleanTransform {
    churned: ChurnMap,
    stats: HashMap<i64, StreamStats>,
    invoice_items: HashMap<i64, String>,
    today: NaiveDate,
}

impl CleanTransform {
    pub fn new(
        churned: ChurnMap,
        stats: HashMap<i64, StreamStats>,
        invoice_items: HashMap<i64, String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            churned,
            stats,
            invoice_items,
            today,
        }
    }
}

#[async_trait]
impl Transform for CleanTransform {
    type Input = Customer;
    type Output = CleanRecord;

    async fn transform(&self, customer: Customer) -> Result<Vec<CleanRecord>> {
        let Some(stats) = self.stats.get(&customer.customer_id) else {
            return Ok(Vec::new());
        };
        let subscription_type = stats
            .dominant_item
            .and_then(|id| self.invoice_items.get(&id))
            .cloned();
        let Some(subscription_type) = subscription_type else {
            debug!(
                customer_id = customer.customer_id,
                "no subscription type resolved, dropping row"
            );
            return Ok(Vec::new());
        };

        let age = customer
            .dob
            .as_deref()
            .and_then(|raw| parse_dob(raw, self.today))
            .map(|dob| age_on(dob, self.today));
        let is_subscriber = self
            .churned
            .get(&customer.customer_id)
            .copied()
            .unwrap_or(false);
        let customer_name = customer.full_name();

        Ok(vec![CleanRecord {
            customer_id: customer.customer_id,
            country_name: customer.country_name,
            age,
            customer_name,
            is_subscriber,
            subscription_type,
            num_streams: stats.num_streams,
        }])
    }
}
