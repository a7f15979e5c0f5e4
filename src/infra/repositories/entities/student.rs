//! Student database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Student, StudentIdentifier};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Business identifier, e.g. `CS2024001`; globally unique
    #[sea_orm(unique)]
    pub student_id: String,
    pub name: String,
    pub age: i32,
    #[sea_orm(unique)]
    pub phone: String,
    pub enrollment_date: Date,
    /// Identifier sequence within the (major, enrollment year) scope
    pub sequence_number: i32,
    pub major_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::major::Entity",
        from = "Column::MajorId",
        to = "super::major::Column::Id"
    )]
    Major,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::major::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Major.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Student {
    fn from(model: Model) -> Self {
        Student {
            id: model.id,
            identifier: StudentIdentifier::from_string(model.student_id),
            name: model.name,
            age: model.age,
            phone: model.phone,
            enrollment_date: model.enrollment_date,
            sequence_number: model.sequence_number,
            major_id: model.major_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
