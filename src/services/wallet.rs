use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::{PointsOffer, Wallet};
use crate::repos::WalletRepository;
use crate::services::session::SessionContext;

/// The fixed points shop. Offers are immutable values, never persisted.
pub const POINTS_OFFERS: [PointsOffer; 5] = [
    PointsOffer { price: 2.0, points: 5 },
    PointsOffer { price: 8.0, points: 25 },
    PointsOffer { price: 15.0, points: 50 },
    PointsOffer { price: 20.0, points: 100 },
    PointsOffer { price: 50.0, points: 500 },
];

/// Every operation resolves the wallet from the current session's user id on
/// each call, so the whole API is implicitly session-scoped.
#[derive(Clone)]
pub struct WalletService {
    wallet: WalletRepository,
    context: Arc<SessionContext>,
}

impl WalletService {
    pub fn new(wallet: WalletRepository, context: Arc<SessionContext>) -> Self {
        Self { wallet, context }
    }

    pub fn offers(&self) -> &'static [PointsOffer] {
        &POINTS_OFFERS
    }

    pub fn get_balance(&self) -> Result<f64, ServiceError> {
        Ok(self.current_wallet()?.balance)
    }

    pub fn get_points(&self) -> Result<i64, ServiceError> {
        Ok(self.current_wallet()?.points)
    }

    pub fn add_money(&self, amount: f64) -> Result<(), ServiceError> {
        let wallet_id = self.current_wallet_id()?;
        self.wallet
            .add_money(wallet_id, amount)
            .map_err(|e| ServiceError::internal("Failed to add money.", e))
    }

    pub fn add_points(&self, amount: i64) -> Result<(), ServiceError> {
        let wallet_id = self.current_wallet_id()?;
        self.wallet
            .add_points(wallet_id, amount)
            .map_err(|e| ServiceError::internal("Failed to add points.", e))
    }

    pub fn create_wallet(&self, user_id: i64) -> Result<(), ServiceError> {
        self.wallet
            .create_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to create wallet.", e))
    }

    /// Exchange money for points. Fails with `InsufficientFunds` when the
    /// balance does not cover the offer; the debit and credit apply in one
    /// repository call.
    pub fn purchase_points(&self, offer: &PointsOffer) -> Result<(), ServiceError> {
        let wallet = self.current_wallet()?;
        if wallet.balance < offer.price {
            return Err(ServiceError::InsufficientFunds);
        }
        self.wallet
            .buy_points(offer.price, offer.points, wallet.user_id)
            .map_err(|e| ServiceError::internal("Failed to purchase points.", e))
    }

    /// Non-throwing variant: `true` only when the purchase fully applied.
    pub fn try_purchase_points(&self, offer: &PointsOffer) -> bool {
        match self.purchase_points(offer) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("points purchase failed: {e}");
                false
            }
        }
    }

    fn current_wallet_id(&self) -> Result<i64, ServiceError> {
        let user_id = self.context.user_id().ok_or(ServiceError::NoSession)?;
        self.wallet
            .wallet_id_by_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to resolve wallet.", e))?
            .ok_or_else(|| {
                ServiceError::Validation(format!("No wallet found for user with ID {user_id}."))
            })
    }

    fn current_wallet(&self) -> Result<Wallet, ServiceError> {
        let wallet_id = self.current_wallet_id()?;
        self.wallet
            .get_by_id(wallet_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve wallet.", e))?
            .ok_or_else(|| {
                ServiceError::Validation(format!("No wallet found with ID {wallet_id}."))
            })
    }
}
