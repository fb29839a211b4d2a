//! Organization repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{organizations, sea_orm_active_enums::ValuationMethod};

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// URL-safe unique identifier.
    pub slug: String,
    /// Valuation method governing cost layer consumption.
    pub valuation_method: ValuationMethod,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an organization by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new organization.
    ///
    /// The valuation method and currency are read-only dependencies of the
    /// transaction engine and are fixed at creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<organizations::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let org = organizations::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(input.slug),
            valuation_method: Set(input.valuation_method),
            currency: Set(input.currency),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org.insert(&self.db).await
    }
}
