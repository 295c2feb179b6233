use std::sync::Arc;

use crate::db::datalink::DataLink;
use crate::db::row::{ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::Wallet;

#[derive(Clone)]
pub struct WalletRepository {
    link: Arc<DataLink>,
}

impl WalletRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    /// Create the user's wallet with zero balance and zero points. A user has
    /// exactly one wallet; the unique constraint rejects a second.
    pub fn create_for_user(&self, user_id: i64) -> Result<(), RepositoryError> {
        self.link
            .execute_non_query("CreateWallet", &ProcParams::new().add("user_id", user_id))
            .map_err(|e| RepositoryError::wrap("Database error while creating wallet.", e))?;
        Ok(())
    }

    pub fn wallet_id_by_user(&self, user_id: i64) -> Result<Option<i64>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetWalletIdByUserId",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while resolving wallet.", e))?;
        Ok(rows.first().and_then(|row| row.i64("wallet_id")))
    }

    pub fn get_by_id(&self, wallet_id: i64) -> Result<Option<Wallet>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetWalletById",
                &ProcParams::new().add("wallet_id", wallet_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving wallet.", e))?;
        Ok(rows.iter().find_map(map_wallet))
    }

    pub fn add_money(&self, wallet_id: i64, amount: f64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("wallet_id", wallet_id)
            .add("amount", amount);
        self.link
            .execute_non_query("AddMoneyToWallet", &params)
            .map_err(|e| RepositoryError::wrap("Database error while adding money.", e))?;
        Ok(())
    }

    pub fn add_points(&self, wallet_id: i64, amount: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("wallet_id", wallet_id)
            .add("amount", amount);
        self.link
            .execute_non_query("AddPointsToWallet", &params)
            .map_err(|e| RepositoryError::wrap("Database error while adding points.", e))?;
        Ok(())
    }

    /// Debit the price and credit the points in one statement, so a purchase
    /// can never half-apply.
    pub fn buy_points(
        &self,
        price: f64,
        number_of_points: i64,
        user_id: i64,
    ) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("price", price)
            .add("number_of_points", number_of_points)
            .add("user_id", user_id);
        let affected = self
            .link
            .execute_non_query("BuyPoints", &params)
            .map_err(|e| RepositoryError::wrap("Database error while buying points.", e))?;
        if affected == 0 {
            return Err(RepositoryError::new(format!(
                "No wallet found for user with ID {user_id}."
            )));
        }
        Ok(())
    }

    /// Spend points if the balance allows; returns whether anything was
    /// deducted.
    pub fn deduct_points(&self, user_id: i64, amount: i64) -> Result<bool, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("amount", amount);
        let affected = self
            .link
            .execute_non_query("DeductPoints", &params)
            .map_err(|e| RepositoryError::wrap("Database error while deducting points.", e))?;
        Ok(affected > 0)
    }
}

fn map_wallet(row: &ProcRow) -> Option<Wallet> {
    Some(Wallet {
        id: row.i64("wallet_id")?,
        user_id: row.i64("user_id")?,
        balance: row.f64("balance").unwrap_or(0.0),
        points: row.i64("points").unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repos::UsersRepository;

    fn setup() -> (WalletRepository, i64) {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        let link = Arc::new(DataLink::new(pool));
        let user = UsersRepository::new(link.clone())
            .create_user("alice", "a@example.com", "h", false)
            .unwrap();
        let repo = WalletRepository::new(link);
        repo.create_for_user(user.id).unwrap();
        (repo, user.id)
    }

    #[test]
    fn new_wallet_is_empty() {
        let (repo, user_id) = setup();
        let wallet_id = repo.wallet_id_by_user(user_id).unwrap().unwrap();
        let wallet = repo.get_by_id(wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, 0.0);
        assert_eq!(wallet.points, 0);
    }

    #[test]
    fn second_wallet_for_user_is_rejected() {
        let (repo, user_id) = setup();
        assert!(repo.create_for_user(user_id).is_err());
    }

    #[test]
    fn money_and_points_accumulate() {
        let (repo, user_id) = setup();
        let wallet_id = repo.wallet_id_by_user(user_id).unwrap().unwrap();
        repo.add_money(wallet_id, 10.5).unwrap();
        repo.add_points(wallet_id, 30).unwrap();
        let wallet = repo.get_by_id(wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, 10.5);
        assert_eq!(wallet.points, 30);
    }

    #[test]
    fn buy_points_debits_and_credits_atomically() {
        let (repo, user_id) = setup();
        let wallet_id = repo.wallet_id_by_user(user_id).unwrap().unwrap();
        repo.add_money(wallet_id, 20.0).unwrap();
        repo.buy_points(8.0, 25, user_id).unwrap();
        let wallet = repo.get_by_id(wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, 12.0);
        assert_eq!(wallet.points, 25);
    }

    #[test]
    fn buy_points_without_wallet_is_an_error() {
        let (repo, _) = setup();
        let err = repo.buy_points(8.0, 25, 999).unwrap_err();
        assert_eq!(err.to_string(), "No wallet found for user with ID 999.");
    }

    #[test]
    fn deduct_points_respects_balance() {
        let (repo, user_id) = setup();
        let wallet_id = repo.wallet_id_by_user(user_id).unwrap().unwrap();
        repo.add_points(wallet_id, 100).unwrap();
        assert!(repo.deduct_points(user_id, 60).unwrap());
        assert!(!repo.deduct_points(user_id, 60).unwrap());
        let wallet = repo.get_by_id(wallet_id).unwrap().unwrap();
        assert_eq!(wallet.points, 40);
    }
}
