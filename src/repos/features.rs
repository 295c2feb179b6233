use std::sync::Arc;

use crate::db::datalink::DataLink;
use crate::db::row::{ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::Feature;

/// Purchase record for a (user, feature) pair.
#[derive(Debug, Clone, Copy)]
pub struct FeatureOwnership {
    pub user_id: i64,
    pub feature_id: i64,
    pub equipped: bool,
}

#[derive(Clone)]
pub struct FeaturesRepository {
    link: Arc<DataLink>,
}

impl FeaturesRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    pub fn get_all(&self) -> Result<Vec<Feature>, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetAllFeatures", &ProcParams::new())
            .map_err(|e| RepositoryError::wrap("Database error while retrieving features.", e))?;
        Ok(rows.iter().filter_map(map_feature).collect())
    }

    pub fn get_by_category(&self, category: &str) -> Result<Vec<Feature>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetFeaturesByType",
                &ProcParams::new().add("type", category.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving features.", e))?;
        Ok(rows.iter().filter_map(map_feature).collect())
    }

    pub fn get_by_id(&self, feature_id: i64) -> Result<Option<Feature>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetFeatureById",
                &ProcParams::new().add("feature_id", feature_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving feature.", e))?;
        Ok(rows.iter().find_map(map_feature))
    }

    /// Every feature the user purchased, with its equipped flag.
    pub fn get_user_features(&self, user_id: i64) -> Result<Vec<Feature>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetUserFeatures",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving user features.", e)
            })?;
        Ok(rows.iter().filter_map(map_feature).collect())
    }

    pub fn get_equipped_for_user(&self, user_id: i64) -> Result<Vec<Feature>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetEquippedFeaturesForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving equipped features.", e)
            })?;
        Ok(rows.iter().filter_map(map_feature).collect())
    }

    pub fn get_relationship(
        &self,
        user_id: i64,
        feature_id: i64,
    ) -> Result<Option<FeatureOwnership>, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("feature_id", feature_id);
        let rows = self
            .link
            .execute_reader("GetFeatureUserRelationship", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving feature purchase.", e)
            })?;
        Ok(rows.first().and_then(|row| {
            Some(FeatureOwnership {
                user_id: row.i64("user_id")?,
                feature_id: row.i64("feature_id")?,
                equipped: row.bool("equipped").unwrap_or(false),
            })
        }))
    }

    pub fn is_purchased(&self, user_id: i64, feature_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.get_relationship(user_id, feature_id)?.is_some())
    }

    /// Record a purchase; the feature starts unequipped.
    pub fn add_user_feature(&self, user_id: i64, feature_id: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("feature_id", feature_id);
        self.link
            .execute_non_query("AddUserFeature", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while recording feature purchase.", e)
            })?;
        Ok(())
    }

    pub fn equip(&self, user_id: i64, feature_id: i64) -> Result<bool, RepositoryError> {
        self.toggle("EquipFeature", user_id, feature_id)
    }

    pub fn unequip(&self, user_id: i64, feature_id: i64) -> Result<bool, RepositoryError> {
        self.toggle("UnequipFeature", user_id, feature_id)
    }

    fn toggle(
        &self,
        procedure: &str,
        user_id: i64,
        feature_id: i64,
    ) -> Result<bool, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("feature_id", feature_id);
        let affected = self
            .link
            .execute_non_query(procedure, &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating feature.", e))?;
        Ok(affected > 0)
    }

    pub fn unequip_by_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<usize, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("type", category.to_string());
        self.link
            .execute_non_query("UnequipFeaturesByType", &params)
            .map_err(|e| RepositoryError::wrap("Database error while unequipping features.", e))
    }

    /// Atomic exclusivity update: equips `feature_id` and unequips every other
    /// purchased feature in `category`, in one statement. Returns whether the
    /// requested feature row was touched (i.e. the feature was purchased).
    pub fn replace_equipped(
        &self,
        user_id: i64,
        feature_id: i64,
        category: &str,
    ) -> Result<bool, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("feature_id", feature_id)
            .add("type", category.to_string());
        let affected = self
            .link
            .execute_non_query("ReplaceEquippedFeature", &params)
            .map_err(|e| RepositoryError::wrap("Database error while equipping feature.", e))?;
        if affected == 0 {
            return Ok(false);
        }
        Ok(self
            .get_relationship(user_id, feature_id)?
            .map(|ownership| ownership.equipped)
            .unwrap_or(false))
    }
}

/// Feature rows require only the id; a NULL name maps to an empty string the
/// service tier treats as corrupt data.
fn map_feature(row: &ProcRow) -> Option<Feature> {
    Some(Feature {
        id: row.i64("feature_id")?,
        name: row.text("name").unwrap_or_default().to_string(),
        category: row.text("type").unwrap_or_default().to_string(),
        cost: row.i64("cost").unwrap_or(0),
        description: row.text("description").map(str::to_string),
        source: row.text("source").map(str::to_string),
        equipped: row.bool("equipped").unwrap_or(false),
    })
}
