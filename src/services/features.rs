//! Cosmetic feature shop and the equip-exclusivity rules.
//!
//! Equip, unequip, and purchase are best-effort: they report status instead
//! of raising, so a failed cosmetic change never kills a UI flow. Within a
//! category at most one feature is equipped per user at any time.

use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::Feature;
use crate::repos::{FeaturesRepository, WalletRepository};

#[derive(Clone)]
pub struct FeaturesService {
    features: FeaturesRepository,
    wallet: WalletRepository,
}

impl FeaturesService {
    pub fn new(features: FeaturesRepository, wallet: WalletRepository) -> Self {
        Self { features, wallet }
    }

    /// Equip a purchased feature, unequipping whatever else the user has
    /// equipped in the same category. `false` when the feature is not
    /// purchased, unknown, or the store call fails.
    pub fn equip_feature(&self, user_id: i64, feature_id: i64) -> bool {
        match self.try_equip(user_id, feature_id) {
            Ok(equipped) => equipped,
            Err(e) => {
                tracing::warn!(user_id, feature_id, "equip failed: {e}");
                false
            }
        }
    }

    fn try_equip(&self, user_id: i64, feature_id: i64) -> Result<bool, ServiceError> {
        let purchased = self
            .features
            .is_purchased(user_id, feature_id)
            .map_err(|e| ServiceError::internal("Failed to check feature purchase.", e))?;
        if !purchased {
            return Ok(false);
        }
        let Some(feature) = self
            .features
            .get_by_id(feature_id)
            .map_err(|e| ServiceError::internal("Failed to load feature.", e))?
        else {
            return Ok(false);
        };
        self.features
            .replace_equipped(user_id, feature_id, &feature.category)
            .map_err(|e| ServiceError::internal("Failed to equip feature.", e))
    }

    pub fn unequip_feature(&self, user_id: i64, feature_id: i64) -> (bool, String) {
        match self.features.is_purchased(user_id, feature_id) {
            Ok(false) => return (false, "Feature not purchased".into()),
            Err(e) => {
                tracing::warn!(user_id, feature_id, "unequip failed: {e}");
                return (false, "Failed to unequip feature".into());
            }
            Ok(true) => {}
        }
        match self.features.unequip(user_id, feature_id) {
            Ok(true) => (true, "Feature unequipped successfully".into()),
            Ok(false) => (false, "Failed to unequip feature".into()),
            Err(e) => {
                tracing::warn!(user_id, feature_id, "unequip failed: {e}");
                (false, "Failed to unequip feature".into())
            }
        }
    }

    /// Buy a feature with wallet points. Status tuple, never raises.
    pub fn purchase_feature(&self, user_id: i64, feature_id: i64) -> (bool, String) {
        match self.try_purchase(user_id, feature_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(user_id, feature_id, "purchase failed: {e}");
                (false, "Failed to purchase feature".into())
            }
        }
    }

    fn try_purchase(
        &self,
        user_id: i64,
        feature_id: i64,
    ) -> Result<(bool, String), ServiceError> {
        let already = self
            .features
            .is_purchased(user_id, feature_id)
            .map_err(|e| ServiceError::internal("Failed to check feature purchase.", e))?;
        if already {
            return Ok((false, "Feature already purchased".into()));
        }
        let Some(feature) = self
            .features
            .get_by_id(feature_id)
            .map_err(|e| ServiceError::internal("Failed to load feature.", e))?
        else {
            return Ok((false, "Feature not found".into()));
        };
        let paid = self
            .wallet
            .deduct_points(user_id, feature.cost)
            .map_err(|e| ServiceError::internal("Failed to spend points.", e))?;
        if !paid {
            return Ok((false, "Insufficient points".into()));
        }
        self.features
            .add_user_feature(user_id, feature_id)
            .map_err(|e| ServiceError::internal("Failed to record feature purchase.", e))?;
        Ok((true, "Feature purchased successfully".into()))
    }

    /// Purchased features that are currently equipped.
    pub fn get_user_equipped_features(&self, user_id: i64) -> Result<Vec<Feature>, ServiceError> {
        self.features
            .get_equipped_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve equipped features.", e))
    }

    /// The whole catalog, grouped by category.
    pub fn get_features_by_categories(
        &self,
    ) -> Result<HashMap<String, Vec<Feature>>, ServiceError> {
        let all = self
            .features
            .get_all()
            .map_err(|e| ServiceError::internal("Failed to retrieve features.", e))?;
        let mut grouped: HashMap<String, Vec<Feature>> = HashMap::new();
        for feature in all {
            grouped.entry(feature.category.clone()).or_default().push(feature);
        }
        Ok(grouped)
    }

    pub fn is_feature_purchased(
        &self,
        user_id: i64,
        feature_id: i64,
    ) -> Result<bool, ServiceError> {
        self.features
            .is_purchased(user_id, feature_id)
            .map_err(|e| ServiceError::internal("Failed to check feature purchase.", e))
    }

    /// The user's purchased features. A feature row without a name is corrupt
    /// data and fails the whole read.
    pub fn get_user_features(&self, user_id: i64) -> Result<Vec<Feature>, ServiceError> {
        let features = self
            .features
            .get_user_features(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve user features.", e))?;
        if features.iter().any(|f| f.name.is_empty()) {
            return Err(ServiceError::Validation(format!(
                "Invalid feature data for user with ID {user_id}."
            )));
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::datalink::DataLink;
    use crate::repos::UsersRepository;
    use std::sync::Arc;

    fn setup() -> (FeaturesService, FeaturesRepository, WalletRepository, i64) {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        let link = Arc::new(DataLink::new(pool));
        let user = UsersRepository::new(link.clone())
            .create_user("alice", "a@example.com", "h", false)
            .unwrap();
        let wallet = WalletRepository::new(link.clone());
        wallet.create_for_user(user.id).unwrap();
        let features = FeaturesRepository::new(link);
        (
            FeaturesService::new(features.clone(), wallet.clone()),
            features,
            wallet,
            user.id,
        )
    }

    fn frame_ids(features: &FeaturesRepository) -> Vec<i64> {
        features
            .get_by_category("frame")
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect()
    }

    #[test]
    fn equipping_unpurchased_feature_fails_silently() {
        let (service, features, _, user_id) = setup();
        let frame = frame_ids(&features)[0];
        assert!(!service.equip_feature(user_id, frame));
        assert!(service.get_user_equipped_features(user_id).unwrap().is_empty());
    }

    #[test]
    fn second_frame_replaces_the_first() {
        let (service, features, _, user_id) = setup();
        let frames = frame_ids(&features);
        features.add_user_feature(user_id, frames[0]).unwrap();
        features.add_user_feature(user_id, frames[1]).unwrap();

        assert!(service.equip_feature(user_id, frames[0]));
        assert!(service.equip_feature(user_id, frames[1]));

        let equipped = service.get_user_equipped_features(user_id).unwrap();
        let equipped_frames: Vec<_> = equipped
            .iter()
            .filter(|f| f.category == "frame")
            .collect();
        assert_eq!(equipped_frames.len(), 1);
        assert_eq!(equipped_frames[0].id, frames[1]);
    }

    #[test]
    fn unequip_reports_purchase_state() {
        let (service, features, _, user_id) = setup();
        let frame = frame_ids(&features)[0];
        let (ok, message) = service.unequip_feature(user_id, frame);
        assert!(!ok);
        assert_eq!(message, "Feature not purchased");

        features.add_user_feature(user_id, frame).unwrap();
        service.equip_feature(user_id, frame);
        let (ok, message) = service.unequip_feature(user_id, frame);
        assert!(ok);
        assert_eq!(message, "Feature unequipped successfully");
    }

    #[test]
    fn purchase_needs_points() {
        let (service, features, wallet, user_id) = setup();
        let frame = frame_ids(&features)[0];
        let (ok, message) = service.purchase_feature(user_id, frame);
        assert!(!ok);
        assert_eq!(message, "Insufficient points");

        let wallet_id = wallet.wallet_id_by_user(user_id).unwrap().unwrap();
        wallet.add_points(wallet_id, 10_000).unwrap();
        let (ok, message) = service.purchase_feature(user_id, frame);
        assert!(ok);
        assert_eq!(message, "Feature purchased successfully");

        let (ok, message) = service.purchase_feature(user_id, frame);
        assert!(!ok);
        assert_eq!(message, "Feature already purchased");
    }

    #[test]
    fn catalog_groups_by_category() {
        let (service, _, _, _) = setup();
        let grouped = service.get_features_by_categories().unwrap();
        assert!(grouped.contains_key("frame"));
        assert!(grouped.contains_key("hat"));
        assert!(grouped["frame"].len() >= 2);
    }

    #[test]
    fn user_features_lists_purchases() {
        let (service, features, _, user_id) = setup();
        let frame = frame_ids(&features)[0];
        features.add_user_feature(user_id, frame).unwrap();
        let owned = service.get_user_features(user_id).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, frame);
    }
}
