//! Spending budget: the singleton record, its store and the progress math.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ResultEngine,
    document::Document,
    store::{BUDGET_KEY, KeyValueStore, Persistence},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Spending limit for a period.
///
/// The amount is validated when the budget is stored, not when it is read:
/// a budget loaded from storage may still carry a non-positive amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: MoneyCents,
    pub period: BudgetPeriod,
}

impl Budget {
    pub fn new(amount: MoneyCents, period: BudgetPeriod) -> Self {
        Self { amount, period }
    }

    fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "budget amount must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Holds the single persisted budget, if any.
pub struct BudgetStore<S> {
    document: Document<S, Option<Budget>>,
}

impl<S: KeyValueStore> BudgetStore<S> {
    /// Loads the budget. A malformed payload reads as "no budget".
    pub fn open(store: S, persistence: Persistence) -> ResultEngine<Self> {
        Ok(Self {
            document: Document::open(store, BUDGET_KEY, persistence, || None)?,
        })
    }

    pub fn get(&self) -> Option<&Budget> {
        self.document.get().as_ref()
    }

    /// Replaces the stored budget.
    ///
    /// Fails with [`EngineError::InvalidAmount`] if `amount <= 0`; the previous
    /// budget is left untouched in that case.
    pub fn set(&mut self, budget: Budget) -> ResultEngine<()> {
        budget.validate()?;
        self.document.update(|current| {
            let changed = current.as_ref() != Some(&budget);
            *current = Some(budget);
            ((), changed)
        })?;
        tracing::debug!("budget set to {} {}", budget.amount, budget.period);
        Ok(())
    }

    pub fn clear(&mut self) -> ResultEngine<()> {
        self.document.update(|current| {
            let changed = current.is_some();
            *current = None;
            ((), changed)
        })?;
        tracing::debug!("budget cleared");
        Ok(())
    }

    pub fn flush(&mut self) -> ResultEngine<()> {
        self.document.flush()
    }

    pub fn reload(&mut self) -> ResultEngine<()> {
        self.document.reload()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }
}

/// Percentage of the budget consumed by `spent`, clamped to `[0, 100]`.
///
/// Returns 0 without a budget and for a stored budget whose amount is not
/// positive.
pub fn budget_progress(spent: MoneyCents, budget: Option<&Budget>) -> f64 {
    let Some(budget) = budget else {
        return 0.0;
    };
    if !budget.amount.is_positive() {
        return 0.0;
    }
    let ratio = spent.cents() as f64 * 100.0 / budget.amount.cents() as f64;
    ratio.clamp(0.0, 100.0)
}

/// Amount left before the budget is exhausted, never negative.
pub fn budget_remaining(spent: MoneyCents, budget: Option<&Budget>) -> MoneyCents {
    let Some(budget) = budget else {
        return MoneyCents::ZERO;
    };
    if !budget.amount.is_positive() {
        return MoneyCents::ZERO;
    }
    (budget.amount - spent).max(MoneyCents::ZERO)
}

/// Severity bands used to flag how close spending is to the limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Caution,
    Warning,
    Critical,
    Exceeded,
}

impl BudgetStatus {
    pub fn from_progress(progress: f64) -> Self {
        if progress >= 100.0 {
            Self::Exceeded
        } else if progress >= 90.0 {
            Self::Critical
        } else if progress >= 75.0 {
            Self::Warning
        } else if progress >= 50.0 {
            Self::Caution
        } else {
            Self::OnTrack
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "on track",
            Self::Caution => "caution",
            Self::Warning => "warning",
            Self::Critical => "nearly exhausted",
            Self::Exceeded => "exceeded",
        }
    }
}
