use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::asset::AssetId;

/// Asset-amount map held by an output.
///
/// Keyed by [`AssetId`]. Zero entries are never stored, so an empty map is
/// the only representation of "no value".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(AssetId, Amount)>", into = "Vec<(AssetId, Amount)>")]
pub struct Value(BTreeMap<AssetId, Amount>);

impl Value {
    pub fn new() -> Self {
        Self::default()
    }

    /// A value holding a single asset.
    pub fn of(asset: AssetId, amount: Amount) -> Self {
        let mut value = Self::new();
        value.add(&asset, &amount);
        value
    }

    /// Quantity of `asset`, zero when absent.
    pub fn amount_of(&self, asset: &AssetId) -> Amount {
        self.0.get(asset).cloned().unwrap_or_default()
    }

    pub fn add(&mut self, asset: &AssetId, amount: &Amount) {
        if amount.is_zero() {
            return;
        }
        *self.0.entry(asset.clone()).or_default() += amount;
    }

    /// Merge every entry of `other` into `self`.
    pub fn merge(&mut self, other: &Value) {
        for (asset, amount) in other.iter() {
            self.add(asset, amount);
        }
    }

    /// Remove `amount` of `asset`; `false` (and no change) if not enough held.
    pub fn subtract(&mut self, asset: &AssetId, amount: &Amount) -> bool {
        let held = self.amount_of(asset);
        match held.checked_sub(amount) {
            Some(rest) if rest.is_zero() => {
                self.0.remove(asset);
                true
            }
            Some(rest) => {
                self.0.insert(asset.clone(), rest);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &Amount)> {
        self.0.iter()
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.0.keys()
    }
}

impl From<Vec<(AssetId, Amount)>> for Value {
    fn from(entries: Vec<(AssetId, Amount)>) -> Self {
        let mut value = Value::new();
        for (asset, amount) in &entries {
            value.add(asset, amount);
        }
        value
    }
}

impl From<Value> for Vec<(AssetId, Amount)> {
    fn from(value: Value) -> Self {
        value.0.into_iter().collect()
    }
}
