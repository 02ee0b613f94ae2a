//! EV incentive resolution: live overlay first, static tables second, zero last.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    FilingStatus, StateCredit, USED_EV_CREDIT, UsedEvCredit, UsedEvPurchase,
};
use crate::overlay::LiveDataOverlay;
use crate::tables::ReferenceTables;

/// Resolves federal and state credits against both data sources.
///
/// Borrowing both sources keeps resolution a plain read: the resolver holds no
/// state of its own and is cheap to build per request.
#[derive(Debug, Clone, Copy)]
pub struct CreditResolver<'a> {
    tables: &'a ReferenceTables,
    overlay: &'a LiveDataOverlay,
}

impl<'a> CreditResolver<'a> {
    pub fn new(
        tables: &'a ReferenceTables,
        overlay: &'a LiveDataOverlay,
    ) -> Self {
        Self { tables, overlay }
    }

    /// Federal clean-vehicle credit for a vehicle.
    ///
    /// A live record must match make, model and year. The static fallback is
    /// keyed by make and model only, and rows flagged ineligible yield zero.
    pub fn federal_credit(
        &self,
        make: &str,
        model: &str,
        year: i32,
    ) -> Decimal {
        if let Some(amount) = self.overlay.federal_credit(make, model, year) {
            return amount;
        }
        match self.tables.static_federal_credit(make, model) {
            Some(entry) => entry.effective_amount(),
            None => {
                debug!(make, model, year, "no federal credit found");
                Decimal::ZERO
            }
        }
    }

    /// State incentive program, or the zero sentinel when neither source has one.
    pub fn state_credit(
        &self,
        state_code: &str,
    ) -> StateCredit {
        if let Some(entry) = self.overlay.state_credit(state_code) {
            return StateCredit::from(&entry);
        }
        self.tables
            .static_state_credit(state_code)
            .map(StateCredit::from)
            .unwrap_or_default()
    }

    /// Federal credit plus the state's new-vehicle rebate.
    pub fn total_new_vehicle_credit(
        &self,
        make: &str,
        model: &str,
        year: i32,
        state_code: &str,
    ) -> Decimal {
        self.federal_credit(make, model, year)
            .saturating_add(self.state_credit(state_code).new_vehicle)
    }

    /// [`federal_credit`](Self::federal_credit), zeroed when `income` is
    /// above the new-vehicle limit for `filing_status`.
    pub fn federal_credit_for_filer(
        &self,
        make: &str,
        model: &str,
        year: i32,
        filing_status: FilingStatus,
        income: Decimal,
    ) -> Decimal {
        if income > filing_status.new_ev_income_limit() {
            debug!(?filing_status, %income, "income above new EV credit limit");
            return Decimal::ZERO;
        }
        self.federal_credit(make, model, year)
    }

    /// Federal used-vehicle credit plus the state's used-vehicle rebate.
    ///
    /// The federal part is all or nothing; the state rebate is passed through
    /// as the state program reports it.
    pub fn used_vehicle_credit(
        &self,
        purchase: &UsedEvPurchase,
        state_code: &str,
    ) -> UsedEvCredit {
        let ineligible = purchase.ineligibility();
        let federal = if ineligible.is_empty() {
            USED_EV_CREDIT
        } else {
            Decimal::ZERO
        };
        UsedEvCredit {
            federal,
            state: self.state_credit(state_code).used_vehicle,
            ineligible,
        }
    }
}
