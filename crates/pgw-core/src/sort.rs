// ── View ordering ──
//
// Stable single-key sort for the proxy and mapping tables. Each table
// keeps one active key and a direction; selecting the active key again
// flips the direction, selecting another key resets to ascending.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::model::{Mapping, Proxy};

/// Comparable projection of one column.
///
/// Variant order matters: numbers sort before text, and `Unbounded`
/// sorts after everything (a missing latency is "infinitely slow").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Number(u64),
    Text(String),
    Unbounded,
}

/// A column a table can be ordered by.
pub trait SortKey<T>: Copy + Eq + Default + FromStr + AsRef<str> {
    fn value(self, item: &T) -> SortValue;
}

// ── Proxy table ────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProxySortKey {
    Id,
    Type,
    #[default]
    Address,
    Status,
    Latency,
    Exit,
    Last,
}

impl SortKey<Proxy> for ProxySortKey {
    fn value(self, p: &Proxy) -> SortValue {
        match self {
            Self::Id => SortValue::Text(p.id.to_string()),
            Self::Type => SortValue::Text(p.proxy_type.as_str().to_owned()),
            Self::Address => SortValue::Text(p.address().to_lowercase()),
            Self::Status => SortValue::Text(p.status.sort_text().to_owned()),
            Self::Latency => p.latency_ms.map_or(SortValue::Unbounded, SortValue::Number),
            Self::Exit => SortValue::Text(p.exit_ip.clone().unwrap_or_default()),
            // Fixed-width UTC timestamps compare correctly as strings.
            Self::Last => SortValue::Text(
                p.last_checked_at
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
                    .unwrap_or_default(),
            ),
        }
    }
}

// ── Mapping table ──────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MappingSortKey {
    Id,
    #[default]
    Client,
    Proxy,
    State,
    Port,
}

impl SortKey<Mapping> for MappingSortKey {
    fn value(self, m: &Mapping) -> SortValue {
        match self {
            Self::Id => SortValue::Text(m.id.to_string()),
            Self::Client => SortValue::Text(
                m.client
                    .as_ref()
                    .map(|c| c.ip_cidr.clone())
                    .unwrap_or_default(),
            ),
            Self::Proxy => SortValue::Text(m.proxy_address().unwrap_or_default()),
            Self::State => SortValue::Text(m.state.as_str().to_owned()),
            Self::Port => SortValue::Number(m.local_port.map_or(0, u64::from)),
        }
    }
}

// ── Table state ────────────────────────────────────────────────────

/// Active key and direction for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort<K> {
    pub key: K,
    pub ascending: bool,
}

impl<K: Default> Default for TableSort<K> {
    fn default() -> Self {
        Self {
            key: K::default(),
            ascending: true,
        }
    }
}

impl<K: Copy + Eq> TableSort<K> {
    pub fn new(key: K, ascending: bool) -> Self {
        Self { key, ascending }
    }

    /// Same key toggles direction; a new key starts ascending.
    pub fn select(&mut self, key: K) {
        if self.key == key {
            self.ascending = !self.ascending;
        } else {
            self.key = key;
            self.ascending = true;
        }
    }

    /// Order `items` by the active key. Ties keep their input order.
    pub fn apply<T>(&self, items: &[Arc<T>]) -> Vec<Arc<T>>
    where
        K: SortKey<T>,
    {
        sort_by_key(items, self.key, self.ascending)
    }
}

/// Stable sort on a projected column, in either direction.
pub fn sort_by_key<T, K: SortKey<T>>(items: &[Arc<T>], key: K, ascending: bool) -> Vec<Arc<T>> {
    let mut keyed: Vec<(SortValue, Arc<T>)> = items
        .iter()
        .map(|item| (key.value(item), Arc::clone(item)))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord: Ordering = a.cmp(b);
        if ascending { ord } else { ord.reverse() }
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}
