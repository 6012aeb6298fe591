//! Player currency pool.

use lane_defence_core::Gold;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Treasury {
    balance: Gold,
}

impl Treasury {
    pub(crate) const fn new(balance: Gold) -> Self {
        Self { balance }
    }

    pub(crate) const fn balance(&self) -> Gold {
        self.balance
    }

    pub(crate) fn can_afford(&self, cost: Gold) -> bool {
        self.balance >= cost
    }

    pub(crate) fn credit(&mut self, amount: Gold) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Withdraws `cost`, leaving the balance untouched when it falls short.
    pub(crate) fn try_debit(&mut self, cost: Gold) -> bool {
        match self.balance.checked_sub(cost) {
            Some(remaining) => {
                self.balance = remaining;
                true
            }
            None => false,
        }
    }
}
