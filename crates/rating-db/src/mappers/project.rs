//! Project entity <-> model mapper

use rating_core::entities::Project;
use rating_core::traits::CategoryCount;
use rating_core::value_objects::Snowflake;

use crate::models::{CategoryCountModel, ProjectModel};

/// Convert ProjectModel to Project entity
impl From<ProjectModel> for Project {
    fn from(model: ProjectModel) -> Self {
        Project {
            id: Snowflake::new(model.id),
            name: model.name,
            category: model.category,
            description: model.description,
            score: model.score,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CategoryCountModel> for CategoryCount {
    fn from(model: CategoryCountModel) -> Self {
        CategoryCount {
            category: model.category,
            count: model.count,
        }
    }
}
