use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use voyage_core::Money;

use crate::error::RuleError;

/// Membership tier of the member a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl core::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            MembershipTier::Bronze => "BRONZE",
            MembershipTier::Silver => "SILVER",
            MembershipTier::Gold => "GOLD",
            MembershipTier::Platinum => "PLATINUM",
            MembershipTier::Diamond => "DIAMOND",
        };
        f.write_str(name)
    }
}

/// Kind of booked product a rule can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Accommodation,
    Flight,
    Package,
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ItemKind::Accommodation => "accommodation",
            ItemKind::Flight => "flight",
            ItemKind::Package => "package",
        };
        f.write_str(name)
    }
}

/// Eligibility rule as data.
///
/// Composite nodes own their children, so a rule is always a finite tree.
/// `Always` and `Never` are the identity/absorbing elements of `And`/`Or`.
///
/// Serialized internally tagged, e.g.
/// `{"type":"and","left":{"type":"first_booking"},"right":{"type":"always"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    And { left: Box<Rule>, right: Box<Rule> },
    Or { left: Box<Rule>, right: Box<Rule> },
    Not { rule: Box<Rule> },
    MembershipIs { tier: MembershipTier },
    /// Booking final amount is at least `amount` (same currency).
    MinimumAmount { amount: Money },
    /// Evaluation date within `start..=end`.
    DateInRange { start: NaiveDate, end: NaiveDate },
    ItemTypeIs { kind: ItemKind },
    ItemCountAtLeast { count: u32 },
    FirstBooking,
    Always,
    Never,
}

impl Rule {
    pub fn membership_is(tier: MembershipTier) -> Self {
        Rule::MembershipIs { tier }
    }

    pub fn minimum_amount(amount: Money) -> Self {
        Rule::MinimumAmount { amount }
    }

    /// Inclusive date range; `start` must not be after `end`.
    pub fn date_in_range(start: NaiveDate, end: NaiveDate) -> Result<Self, RuleError> {
        if start > end {
            return Err(RuleError::invalid(format!(
                "date range {start}..{end} starts after it ends"
            )));
        }
        Ok(Rule::DateInRange { start, end })
    }

    pub fn item_type_is(kind: ItemKind) -> Self {
        Rule::ItemTypeIs { kind }
    }

    pub fn item_count_at_least(count: u32) -> Result<Self, RuleError> {
        if count == 0 {
            return Err(RuleError::invalid("item count must be at least 1"));
        }
        Ok(Rule::ItemCountAtLeast { count })
    }

    pub fn first_booking() -> Self {
        Rule::FirstBooking
    }

    pub fn always() -> Self {
        Rule::Always
    }

    pub fn never() -> Self {
        Rule::Never
    }

    pub fn and(self, other: Rule) -> Self {
        Rule::And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn or(self, other: Rule) -> Self {
        Rule::Or {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Rule::Not {
            rule: Box::new(self),
        }
    }

    /// Conjunction of every rule; `Always` for none.
    pub fn all_of<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        let mut iter = rules.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Rule::and),
            None => Rule::Always,
        }
    }

    /// Disjunction of every rule; `Never` for none.
    pub fn any_of<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        let mut iter = rules.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Rule::or),
            None => Rule::Never,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Rule::And { .. } | Rule::Or { .. } | Rule::Not { .. })
    }

    /// Height of the tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Rule::And { left, right } | Rule::Or { left, right } => 1 + left.depth().max(right.depth()),
            Rule::Not { rule } => 1 + rule.depth(),
            Rule::MembershipIs { .. }
            | Rule::MinimumAmount { .. }
            | Rule::DateInRange { .. }
            | Rule::ItemTypeIs { .. }
            | Rule::ItemCountAtLeast { .. }
            | Rule::FirstBooking
            | Rule::Always
            | Rule::Never => 1,
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Rule::And { left, right } | Rule::Or { left, right } => 1 + left.size() + right.size(),
            Rule::Not { rule } => 1 + rule.size(),
            Rule::MembershipIs { .. }
            | Rule::MinimumAmount { .. }
            | Rule::DateInRange { .. }
            | Rule::ItemTypeIs { .. }
            | Rule::ItemCountAtLeast { .. }
            | Rule::FirstBooking
            | Rule::Always
            | Rule::Never => 1,
        }
    }
}

impl core::fmt::Display for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Rule::And { left, right } => write!(f, "({left} AND {right})"),
            Rule::Or { left, right } => write!(f, "({left} OR {right})"),
            Rule::Not { rule } => write!(f, "NOT {rule}"),
            Rule::MembershipIs { tier } => write!(f, "membership = {tier}"),
            Rule::MinimumAmount { amount } => write!(f, "amount >= {amount}"),
            Rule::DateInRange { start, end } => write!(f, "date in {start}..={end}"),
            Rule::ItemTypeIs { kind } => write!(f, "has {kind}"),
            Rule::ItemCountAtLeast { count } => write!(f, "items >= {count}"),
            Rule::FirstBooking => f.write_str("first booking"),
            Rule::Always => f.write_str("always"),
            Rule::Never => f.write_str("never"),
        }
    }
}
