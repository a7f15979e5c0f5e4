//! Course database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Course;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub course_code: String,
    pub course_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((3, 1)))")]
    pub credits: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            code: model.course_code,
            name: model.course_name,
            description: model.description,
            credits: model.credits,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
