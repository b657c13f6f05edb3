/// A purchasable upgrade as listed by the store front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub identifier: String,
    pub title: String,
    pub price: String,
}

/// Source of truth for the premium entitlement. Purchases and their
/// verification happen elsewhere; the game only reads the boolean.
pub trait EntitlementSource {
    fn is_premium(&self) -> bool;

    fn offers(&self) -> Vec<Offer> {
        Vec::new()
    }
}

/// Fixed entitlement, handy for tests and for builds without a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticEntitlement(pub bool);

impl EntitlementSource for StaticEntitlement {
    fn is_premium(&self) -> bool {
        self.0
    }
}

/// Interstitial cadence for free players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdPolicy {
    pub every: u32,
}

impl Default for AdPolicy {
    fn default() -> Self {
        Self { every: 3 }
    }
}

impl AdPolicy {
    pub fn should_show_ad(&self, is_premium: bool, games_played: u32) -> bool {
        !is_premium && games_played >= self.every
    }
}
