//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Account, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub password_digest: String,
    pub role: String,
    pub first_login: bool,
    /// One-to-one link to the student record for STUDENT accounts
    #[sea_orm(unique)]
    pub student_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Account {
            id: model.id,
            username: model.username,
            password_digest: model.password_digest,
            role: Role::from(model.role.as_str()),
            first_login: model.first_login,
            student_id: model.student_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
